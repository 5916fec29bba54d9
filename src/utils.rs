use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};


const STREAM_ARG: &str = "-";


/// Opens the given path for reading, or stdin for `-`.
pub fn resolve_reader(raw_arg: &str) -> io::Result<Box<dyn Read>> {
    match raw_arg {
        STREAM_ARG => Ok(Box::new(io::stdin())),
        path => fs::File::open(path)
            .map(|file| Box::new(BufReader::new(file)) as Box<dyn Read>)
    }
}

/// Opens the given path for writing, or stdout for `-`.
pub fn resolve_writer(raw_arg: &str) -> io::Result<Box<dyn Write>> {
    match raw_arg {
        STREAM_ARG => Ok(Box::new(io::stdout())),
        path => fs::File::create(path)
            .map(|file| Box::new(BufWriter::new(file)) as Box<dyn Write>)
    }
}

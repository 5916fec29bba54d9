#[macro_use]
extern crate quick_error;

use std::io::{self, Write};
use std::process;

mod cli;
mod tools;
mod utils;


fn main() {
    let matches = cli::build_cli().get_matches();
    cli::init_logging(matches.get_count("verbose"));
    if let Err(err) = cli::run(&matches) {
        let _ = writeln!(io::stderr(), "error: {}", err);
        process::exit(1);
    }
    process::exit(0);
}

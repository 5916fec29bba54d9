use clap::{Arg, ArgAction, ArgMatches, Command};
use log::info;

use gstruct::{GffReader, GffWriter, Pipeline};

use crate::tools::{ToolError, TEMPLATE_SUBCMD};
use crate::utils::{resolve_reader, resolve_writer};

pub const NAME: &str = "dump";


pub fn build_cli() -> Command {
    Command::new(NAME)
        .about("Writes the features of a transcript, introns included, as GFF")
        .help_template(TEMPLATE_SUBCMD)
        .arg(Arg::new("gff")
                .long("gff")
                .value_name("path")
                .help("Path to input GFF3 annotation file or '-' for stdin")
                .required(true))
        .arg(Arg::new("transcript")
                .long("transcript")
                .short('t')
                .value_name("id")
                .help("Identifier of the transcript to dump")
                .required(true))
        .arg(Arg::new("relative")
                .long("relative")
                .help("Shifts coordinates so the first coding base is 1")
                .action(ArgAction::SetTrue))
        .arg(Arg::new("output")
                .value_name("output")
                .help("Path to output file or '-' for stdout")
                .default_value("-"))
}

pub fn run(args: &ArgMatches) -> Result<(), ToolError> {
    let gff = args.get_one::<String>("gff")
        .ok_or(ToolError::InvalidMode("--gff is required"))?;
    let tid = args.get_one::<String>("transcript")
        .ok_or(ToolError::InvalidMode("--transcript is required"))?;
    let output = args.get_one::<String>("output").map_or("-", |s| s.as_str());

    let annotation = GffReader::from_reader(resolve_reader(gff)?).read_annotation()?;
    let transcript = annotation.transcript(tid)?
        .ok_or_else(|| ToolError::MissingTranscript(tid.clone()))?;

    let pipeline = Pipeline::new(transcript).add_introns();
    let transcript = if args.get_flag("relative") {
        pipeline.to_relative().into_transcript()
    } else {
        pipeline.into_transcript()
    };
    info!("dumping {} features of transcript '{}'", transcript.features().len(), tid);

    let mut writer = GffWriter::from_writer(resolve_writer(output)?);
    writer.write_transcript(&transcript)?;
    writer.flush()?;
    Ok(())
}

use clap::{crate_version, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

use crate::tools::{self, ToolError};

const TEMPLATE: &str = "
{bin} {version}
{about}


USAGE:
    {usage}

SUBCOMMANDS:
{subcommands}

OPTIONS:
{options}";

const ABOUT: &str = "
gstools draws schematic gene structures from GFF3 annotations, with protein
domains, deletions, insertions, and SNPs placed on the exons they fall in.";

/// Constructs a new `clap::Command` for argument parsing.
pub fn build_cli() -> Command {
    Command::new("gstools")
        .version(crate_version!())
        .about(ABOUT)
        .help_template(TEMPLATE)
        .max_term_width(80)
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .arg(Arg::new("verbose")
                 .short('v')
                 .long("verbose")
                 .help("Increases logging verbosity, may be repeated")
                 .action(ArgAction::Count)
                 .global(true))
        .subcommand(tools::draw::build_cli())
        .subcommand(tools::dump::build_cli())
}

/// Sets up logging given the number of `-v` flags.
///
/// `RUST_LOG` overrides the level set here.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Runs the appropriate tool given the subcommand argument matches.
pub fn run(matches: &ArgMatches) -> Result<(), ToolError> {
    match matches.subcommand() {
        Some((tools::draw::NAME, m)) => tools::draw::run(m),
        Some((tools::dump::NAME, m)) => tools::dump::run(m),
        // We should not reach this point since we already require
        // that subcommands must be present in the app settings.
        _ => Err(ToolError::InvalidMode("unexpected subcommand parsing error")),
    }
}

#[cfg(test)]
mod test_cli {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }

    #[test]
    fn verbosity_counted() {
        let matches = build_cli()
            .try_get_matches_from(vec!["gstools", "-vv", "dump", "--gff", "a.gff3",
                                       "--transcript", "T1"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn no_author_declared() {
        let cmd = build_cli();
        assert_eq!(cmd.get_author(), None);
        assert_eq!(cmd.get_version(), Some(crate_version!()));
    }

    #[test]
    fn subcommand_required() {
        assert!(build_cli().try_get_matches_from(vec!["gstools"]).is_err());
    }
}

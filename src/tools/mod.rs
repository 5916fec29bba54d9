//! Functions invoked by the subcommands.
use std::io;

pub mod draw;
pub mod dump;

quick_error! {
    /// Errors that stop a subcommand.
    #[derive(Debug)]
    pub enum ToolError {
        /// Occurs when the given flags do not form a valid mode of operation.
        InvalidMode(msg: &'static str) {
            display("{}", msg)
        }
        /// Occurs when a requested transcript is not in the annotation.
        MissingTranscript(tid: String) {
            display("transcript '{}' not found in the annotation", tid)
        }
        Lib(err: gstruct::Error) {
            display("{}", err)
            from()
            source(err)
        }
        Io(err: io::Error) {
            display("{}", err)
            from()
            source(err)
        }
    }
}

const TEMPLATE_SUBCMD: &str = "
{about}

USAGE:
    {usage}

{all-args}";

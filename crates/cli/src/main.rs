//! Main entry point for the sdp-bw command-line tool
//!
//! Exit status: 0 on success, 1 for usage errors, otherwise the code of the
//! fatal error (see `sdp_bw_core::error`). Warnings never change it.

mod cli;
mod logging;

use clap::Parser;
use clap::error::ErrorKind;
use cli::Cli;

/// Wrong number of arguments or unknown flags
const EXIT_USAGE: i32 = 1;

/// Failure outside the core, e.g. writing the rules
const EXIT_OTHER: i32 = 5;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            std::process::exit(code);
        }
    };

    let logging_config = match cli.logging_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_USAGE);
        }
    };
    if let Err(e) = logging::setup_logging(logging_config) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = cli.execute() {
        let code = match e.downcast_ref::<sdp_bw_core::Error>() {
            Some(core) => {
                eprintln!("Error: {}", core.user_message());
                core.exit_code()
            }
            None => {
                eprintln!("Error: {:#}", e);
                EXIT_OTHER
            }
        };
        std::process::exit(code);
    }
}

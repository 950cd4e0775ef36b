//! formlogic CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use formlogic_runtime::{Cli, LogConfig, init_logging, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_config = LogConfig::from_verbosity(cli.verbose).with_ansi(!cli.no_color);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(outcome) => {
            println!("{}", outcome.output);
            if outcome.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(context) = &e.context {
                eprintln!("{context}");
            }
            ExitCode::FAILURE
        }
    }
}

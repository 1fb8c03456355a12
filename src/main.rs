//! `native-assets` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use native_assets_cli::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let name = args.command.log_name();

    match args.command {
        cli::Command::Sync(opts) => {
            let log = start_logging(args.verbose, name);
            commands::sync::run(&args.global, &opts, &log)
        }
        cli::Command::Check => {
            let log = start_logging(args.verbose, name);
            commands::check::run(&args.global, &log)
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}

fn start_logging(verbose: bool, command: &str) -> Arc<logging::Logger> {
    logging::init_subscriber(verbose, command);
    Arc::new(logging::Logger::new(command))
}

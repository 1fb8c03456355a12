//! Command-line argument definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::platform::NativePlatform;

/// Top-level CLI entry point for the native asset synchronizer.
#[derive(Parser, Debug)]
#[command(
    name = "native-assets",
    about = "Synchronize images, app icons and fonts into generated iOS and Android projects",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the project root (defaults to NATIVE_ASSETS_ROOT, then the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Configuration file, relative to the project root
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Disable parallel probing of source files (parallel is enabled by default)
    #[arg(long = "no-parallel", global = true, action = clap::ArgAction::SetFalse)]
    pub parallel: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy resources into the native projects and link them
    Sync(SyncOpts),
    /// Validate configuration and report missing source files
    Check,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Sync(_) => "sync",
            Self::Check => "check",
            Self::Version => "version",
        }
    }
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Run only the given platform passes
    #[arg(long, value_enum, value_delimiter = ',')]
    pub platform: Vec<NativePlatform>,
}

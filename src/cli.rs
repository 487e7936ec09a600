//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Confgen - Generate IDE configuration that points into your workspace
#[derive(Parser, Debug)]
#[command(name = "confgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG applies when unset
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write pyrightconfig.json with search paths made local
    Generate(commands::generate::GenerateArgs),

    /// Clone or update every repository of the organization
    Sync(commands::sync::SyncArgs),

    /// List the package each existing clone provides
    Packages(commands::packages::PackagesArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(self.log_level.as_deref());

        match self.command {
            Commands::Generate(args) => commands::generate::execute(args),
            Commands::Sync(args) => commands::sync::execute(args),
            Commands::Packages(args) => commands::packages::execute(args),
        }
    }
}

fn init_logging(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.format_timestamp(None).init();
}

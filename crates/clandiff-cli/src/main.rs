//! clandiff CLI
//!
//! Cross-checks two Clash of Clans API clients by fetching the same clan
//! through both and diffing the raw payloads.

use clandiff_core::logging_facility::{self, Profile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "clandiff")]
#[command(about = "clandiff - compare clan payloads across API clients", long_about = None)]
struct Cli {
    /// Logging profile: dev, prod (JSON) or test (silent)
    #[arg(long, global = true, default_value = "dev")]
    log_profile: Profile,

    /// Load environment variables from this file instead of searching for `.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch a clan through both clients and compare the payloads
    Compare(commands::compare::CompareArgs),
    /// Fetch a clan with the in-process client and print its raw JSON
    Dump(commands::dump::DumpArgs),
    /// Compare two JSON payload files
    Diff(commands::diff::DiffArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log_profile);

    let env_file = cli.env_file.as_deref();
    let result = match cli.command {
        Commands::Compare(args) => commands::compare::execute(args, env_file).await,
        Commands::Dump(args) => commands::dump::execute(args, env_file).await,
        Commands::Diff(args) => commands::diff::execute(args),
    };

    if let Err(e) = result {
        commands::report_error(&e);
        std::process::exit(1);
    }
}

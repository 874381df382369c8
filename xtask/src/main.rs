// Desktop/tooling crate: unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod check;
mod file;
mod test;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "linebuf development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check no_std builds, clippy and formatting
    Check,
    /// Run all tests (unit, integration, and doc)
    Test {
        /// Run only unit tests
        #[arg(long)]
        unit: bool,
        /// Run only integration tests
        #[arg(long)]
        integration: bool,
    },
    /// Print lines of a text file through the line index
    Lines {
        /// File to read
        path: std::path::PathBuf,
        /// First line to print (0-based)
        #[arg(long, default_value_t = 0)]
        from: u32,
        /// Number of lines to print (all remaining when omitted)
        #[arg(long)]
        count: Option<u32>,
    },
    /// Edit a text file in place, one line at a time
    Edit {
        /// File to edit (created when missing)
        path: std::path::PathBuf,
        #[command(subcommand)]
        op: file::EditOp,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check => check::run(),
        Commands::Test { unit, integration } => test::run(unit, integration),
        Commands::Lines { path, from, count } => file::lines(&path, from, count),
        Commands::Edit { path, op } => file::edit(&path, op),
    }
}

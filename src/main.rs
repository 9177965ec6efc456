use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foldlog::cli::{self, CliResult, ReportCommand, WriteConfigCommand};
use foldlog::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "foldlog",
    version,
    about = "Summarize k-fold training logs into a single report",
    long_about = "Parses the parameter blocks and per-epoch metrics of a cross-validated training \
                  log, summarizes the last epochs of the KGE decomposition metrics per fold and \
                  writes one combined text report."
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set the verbosity level (can be repeated for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Report settings file (JSON or YAML)
    #[arg(short, long, global = true, env = "FOLDLOG_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a training log and write the combined k-fold report
    Report(ReportCommand),

    /// Write an LSTM experiment configuration file
    WriteConfig(WriteConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.json)
        .context("failed to initialize logging")?;

    if let Err(err) = run(cli) {
        err.print_error();
        std::process::exit(1);
    }
    Ok(())
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Report(cmd) => {
            let settings = cli::load_settings(cli.config.as_deref())?;
            cli::commands::report::execute(cmd, settings)?;
        }
        Commands::WriteConfig(cmd) => {
            cli::commands::write_config::execute(cmd)?;
        }
    }
    Ok(())
}

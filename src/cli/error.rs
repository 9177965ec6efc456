use colored::*;
use std::path::PathBuf;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Log file not found: {0}")]
    LogNotFound(PathBuf),

    #[error("Settings file not found: {0}")]
    SettingsNotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Foldlog(#[from] crate::error::Error),
}

impl CliError {
    /// Print a user-friendly error message
    pub fn print_error(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self);

        match self {
            CliError::LogNotFound(path) => {
                eprintln!(
                    "\n{} The log is read from <LOG_PREFIX><INDEX>.txt; check both parts: {}",
                    "Hint:".yellow(),
                    path.display().to_string().cyan()
                );
            }
            CliError::SettingsNotFound(_) => {
                eprintln!(
                    "\n{} Unset {} or pass an existing JSON/YAML file to {}",
                    "Hint:".yellow(),
                    "FOLDLOG_CONFIG".cyan(),
                    "--config".cyan()
                );
            }
            CliError::InvalidArgument(_) => {
                eprintln!(
                    "\n{} Use {} for more information",
                    "Hint:".yellow(),
                    "foldlog --help".cyan()
                );
            }
            _ => {}
        }
    }
}

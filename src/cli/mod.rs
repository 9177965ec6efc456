pub mod commands;
pub mod error;

use std::path::Path;

use crate::settings::ReportSettings;

pub use commands::{report::ReportCommand, write_config::WriteConfigCommand};
pub use error::{CliError, CliResult};

/// Settings from `path`, or the defaults when no path is given
pub fn load_settings(path: Option<&Path>) -> CliResult<ReportSettings> {
    match path {
        None => Ok(ReportSettings::default()),
        Some(path) if !path.is_file() => Err(CliError::SettingsNotFound(path.to_path_buf())),
        Some(path) => Ok(ReportSettings::from_file(path)?),
    }
}

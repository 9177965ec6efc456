//! Run settings for report generation

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::summary::MetricSpec;

/// Settings controlling where and how a report is produced.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Directory created next to the log file
    pub output_dir_name: String,
    /// Prefix of the combined report, followed by `_<index>.txt`
    pub report_prefix: String,
    /// Decimals used for summary statistics
    pub float_precision: usize,
    /// Metrics summarized, in report order
    pub metrics: Vec<MetricSpec>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir_name: "parsed_logs".to_string(),
            report_prefix: "combined_results".to_string(),
            float_precision: 4,
            metrics: MetricSpec::standard(),
        }
    }
}

impl ReportSettings {
    /// Load settings from a JSON or YAML file and validate them
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings: Self = crate::utils::config::load_config(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        check_file_name("output_dir_name", &self.output_dir_name)?;
        check_file_name("report_prefix", &self.report_prefix)?;

        if self.float_precision > 12 {
            return Err(Error::config("float_precision must be at most 12"));
        }

        for metric in &self.metrics {
            if metric.label.trim().is_empty() || metric.column.trim().is_empty() {
                return Err(Error::config("metric label and column must not be empty"));
            }
            check_file_name("metric file_name", &metric.file_name)?;
            if self.is_report_file(&metric.file_name) {
                return Err(Error::config(format!(
                    "metric file {} would survive cleanup as a report",
                    metric.file_name
                )));
            }
        }

        Ok(())
    }

    /// File name of the combined report for run `index`
    pub fn report_file_name(&self, index: u32) -> String {
        format!("{}_{}.txt", self.report_prefix, index)
    }

    /// Whether `name` is a combined report kept by cleanup
    pub fn is_report_file(&self, name: &str) -> bool {
        name.starts_with(&self.report_prefix) && name.ends_with(".txt")
    }
}

fn check_file_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::config(format!("{} must not be empty", field)));
    }
    if name.contains(&['/', '\\'][..]) || name == "." || name == ".." {
        return Err(Error::config(format!(
            "{} must be a plain file name, got {}",
            field, name
        )));
    }
    Ok(())
}

use clap::Args;
use tracing::info;

use crate::cli::error::{CliError, CliResult};
use crate::logging;
use crate::report::{log_file_path, ReportOutcome, ReportPipeline};
use crate::settings::ReportSettings;
use crate::summary::SummaryOutcome;

#[derive(Args, Debug)]
pub struct ReportCommand {
    /// Log path prefix; the log read is `<LOG_PREFIX><INDEX>.txt`
    pub log_prefix: String,

    /// Run index appended to the prefix and to the report name
    pub index: u32,

    /// Number of final epochs per fold used for the statistics
    pub window: usize,
}

pub fn execute(cmd: ReportCommand, settings: ReportSettings) -> CliResult<ReportOutcome> {
    let log_path = log_file_path(&cmd.log_prefix, cmd.index);
    if !log_path.is_file() {
        return Err(CliError::LogNotFound(log_path));
    }

    info!(
        log = %log_path.display(),
        window = cmd.window,
        "building k-fold report"
    );

    let pipeline = ReportPipeline::new(settings);
    let outcome = pipeline.run(&log_path, cmd.index, cmd.window)?;

    for (label, summary) in &outcome.summaries {
        if let SummaryOutcome::Failed(err) = summary {
            logging::warning(&format!("{} summary unavailable: {}", label, err));
        }
    }
    for (path, reason) in &outcome.cleanup.failed {
        logging::warning(&format!("Failed to remove {}: {}", path.display(), reason));
    }

    logging::success(&format!(
        "Report written to {} ({} files concatenated, {} removed)",
        outcome.report_path.display(),
        outcome.concatenated.len(),
        outcome.cleanup.removed.len()
    ));

    Ok(outcome)
}

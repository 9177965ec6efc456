//! Report assembly: intermediate artifacts, concatenation and cleanup
//!
//! A run writes the parameter tables, per-fold tables and one summary per
//! metric into an output directory next to the log, concatenates the
//! parameter and summary files into a single text report, then deletes
//! everything in the directory except combined reports.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::parser::{parse_log_file, ParsedLog};
use crate::settings::ReportSettings;
use crate::summary::{summarize_to_file, SummaryOutcome};
use crate::table::{build_fold_tables, combine_fold_tables, parameters_to_csv};
use crate::utils::io::{ensure_dir_exists, write_file_atomic};

/// Model parameters table
pub const MODEL_PARAMS_FILE: &str = "model_params.csv";
/// Training parameters table
pub const TRAINING_PARAMS_FILE: &str = "training_params.csv";
/// Data parameters table
pub const DATA_PARAMS_FILE: &str = "data_params.csv";
/// All fold tables stacked
pub const COMBINED_FOLDS_FILE: &str = "combined_folds.csv";

/// Path of the log for run `index`: `<prefix><index>.txt`
pub fn log_file_path(prefix: &str, index: u32) -> PathBuf {
    PathBuf::from(format!("{}{}.txt", prefix, index))
}

/// What a cleanup pass did
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
    /// Files that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Result of a full report run
#[derive(Debug)]
pub struct ReportOutcome {
    /// The combined report
    pub report_path: PathBuf,
    /// Directory holding the report
    pub output_dir: PathBuf,
    /// Fold tables written (folds with at least one record)
    pub fold_tables: usize,
    /// Per-metric results, in report order
    pub summaries: Vec<(String, SummaryOutcome)>,
    /// Files concatenated into the report, in order
    pub concatenated: Vec<PathBuf>,
    pub cleanup: CleanupReport,
}

/// Drives log → tables → summaries → report → cleanup
#[derive(Debug, Clone, Default)]
pub struct ReportPipeline {
    settings: ReportSettings,
}

impl ReportPipeline {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Output directory for a log file. `.` components are dropped so
    /// report markers read `runs/parsed_logs/...` for `./runs/log.txt`.
    pub fn output_dir_for(&self, log_path: &Path) -> PathBuf {
        let log_path: PathBuf = log_path
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect();
        log_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.settings.output_dir_name)
    }

    /// Run the whole pipeline on one log file.
    ///
    /// Only unreadable input or unwritable output is an error; parse
    /// oddities and failing metrics degrade the report instead.
    #[instrument(skip(self, log_path), fields(log = %log_path.as_ref().display()))]
    pub fn run(
        &self,
        log_path: impl AsRef<Path>,
        index: u32,
        window: usize,
    ) -> Result<ReportOutcome> {
        let log_path = log_path.as_ref();
        let output_dir = self.output_dir_for(log_path);
        ensure_dir_exists(&output_dir)?;

        let log = parse_log_file(log_path)?;
        info!("Parsed model params: {} keys", log.model.len());
        info!("Parsed training params: {} keys", log.training.len());
        info!("Parsed folds: {} -> saved to {}", log.folds.len(), output_dir.display());

        let (fold_tables, summaries) = self.write_artifacts(&log, &output_dir, window)?;

        let report_path = output_dir.join(self.settings.report_file_name(index));
        let concatenated = concatenate(&self.report_inputs(&output_dir), &report_path)?;
        info!(
            "Concatenated {} files -> {}",
            concatenated.len(),
            report_path.display()
        );

        let settings = &self.settings;
        let cleanup = cleanup_dir(&output_dir, |name| settings.is_report_file(name))?;
        info!(
            removed = cleanup.removed.len(),
            kept = cleanup.kept.len(),
            failed = cleanup.failed.len(),
            "output directory cleaned"
        );

        Ok(ReportOutcome {
            report_path,
            output_dir,
            fold_tables,
            summaries,
            concatenated,
            cleanup,
        })
    }

    /// Write parameter tables, fold tables and metric summaries.
    ///
    /// Returns the number of fold tables and each metric's outcome.
    pub fn write_artifacts(
        &self,
        log: &ParsedLog,
        output_dir: &Path,
        window: usize,
    ) -> Result<(usize, Vec<(String, SummaryOutcome)>)> {
        fs::write(output_dir.join(MODEL_PARAMS_FILE), parameters_to_csv(&log.model)?)?;
        fs::write(output_dir.join(TRAINING_PARAMS_FILE), parameters_to_csv(&log.training)?)?;
        fs::write(output_dir.join(DATA_PARAMS_FILE), parameters_to_csv(&log.data)?)?;

        let tables = build_fold_tables(log);
        for fold in &tables {
            let path = output_dir.join(fold.file_name());
            debug!(fold = %fold.fold, rows = fold.table.num_rows(), path = %path.display(), "writing fold table");
            fold.table.write_csv(&path)?;
        }
        if let Some(combined) = combine_fold_tables(&tables) {
            combined.write_csv(output_dir.join(COMBINED_FOLDS_FILE))?;
        }

        let mut summaries = Vec::with_capacity(self.settings.metrics.len());
        for metric in &self.settings.metrics {
            let outcome = summarize_to_file(
                &tables,
                metric,
                window,
                self.settings.float_precision,
                output_dir.join(&metric.file_name),
            )?;
            summaries.push((metric.label.clone(), outcome));
        }

        Ok((tables.len(), summaries))
    }

    /// Files concatenated into the report, in fixed order
    pub fn report_inputs(&self, output_dir: &Path) -> Vec<PathBuf> {
        [MODEL_PARAMS_FILE, TRAINING_PARAMS_FILE, DATA_PARAMS_FILE]
            .into_iter()
            .map(str::to_string)
            .chain(self.settings.metrics.iter().map(|m| m.file_name.clone()))
            .map(|name| output_dir.join(name))
            .collect()
    }
}

/// Concatenate `inputs` into `out_path`.
///
/// Each existing input contributes its path as a marker line, its bytes
/// verbatim, then a newline. Missing inputs are skipped. Returns the inputs
/// that were used.
pub fn concatenate(inputs: &[PathBuf], out_path: &Path) -> Result<Vec<PathBuf>> {
    let mut report = Vec::new();
    let mut used = Vec::new();

    for path in inputs {
        if !path.is_file() {
            debug!(path = %path.display(), "report input missing, skipping");
            continue;
        }
        report.extend_from_slice(format!("{}\n", path.display()).as_bytes());
        report.extend_from_slice(&fs::read(path)?);
        report.push(b'\n');
        used.push(path.clone());
    }

    write_file_atomic(out_path, &report)?;
    Ok(used)
}

/// Delete every regular file in `dir` whose name `keep` rejects.
///
/// A file that cannot be deleted is logged and recorded; the pass goes on.
/// Subdirectories are left alone.
pub fn cleanup_dir(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<CleanupReport> {
    cleanup_dir_with(dir, keep, |path| fs::remove_file(path))
}

/// [`cleanup_dir`] with the file removal supplied by the caller
pub fn cleanup_dir_with(
    dir: &Path,
    keep: impl Fn(&str) -> bool,
    mut remove: impl FnMut(&Path) -> std::io::Result<()>,
) -> Result<CleanupReport> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    let mut report = CleanupReport::default();
    for path in entries {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if keep(&name) {
            report.kept.push(path);
            continue;
        }

        match remove(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed");
                report.removed.push(path);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to remove");
                report.failed.push((path, err.to_string()));
            }
        }
    }

    Ok(report)
}

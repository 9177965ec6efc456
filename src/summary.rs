//! Tail-window summary statistics per fold
//!
//! For a metric column and a window size `J`, every fold contributes the last
//! `J` non-missing values of that column. The window is described by its
//! size, mean, min, quartiles and max. Each metric is summarized on its own:
//! a failing metric produces an error notice instead of a table and never
//! stops the others.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::table::{csv_writer, into_bytes, FoldTable};
use crate::value::Value;

/// Errors contained to a single metric summary
#[derive(Error, Debug)]
pub enum SummaryError {
    /// No fold table carries the metric column
    #[error("no fold contains column `{0}`")]
    MissingColumn(String),

    /// Rendering the summary table failed
    #[error("failed to render summary table: {0}")]
    Render(String),
}

/// A metric to summarize and where its table goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Short name used in error notices (`KGE`, `Beta`, ...)
    pub label: String,
    /// Column name in the fold tables
    pub column: String,
    /// Output file name inside the report directory
    pub file_name: String,
}

impl MetricSpec {
    pub fn new(
        label: impl Into<String>,
        column: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            column: column.into(),
            file_name: file_name.into(),
        }
    }

    /// Kling-Gupta efficiency followed by its beta, alpha and Pearson terms
    pub fn standard() -> Vec<MetricSpec> {
        vec![
            MetricSpec::new("KGE", "ValKGE(orig)", "valkge_orig_summary.csv"),
            MetricSpec::new("Beta", "ValBeta(orig)", "valbeta_orig_summary.csv"),
            MetricSpec::new("Alpha", "ValAlpha(orig)", "valalpha_orig_summary.csv"),
            MetricSpec::new("Pearson", "ValPearson(orig)", "valr_orig_summary.csv"),
        ]
    }
}

/// Descriptive statistics of a non-empty sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub mean: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Mean, min, quartiles and max; `None` for an empty sample
pub fn describe(values: &[f64]) -> Option<Describe> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(Describe {
        mean,
        min: sorted[0],
        p25: quantile_sorted(&sorted, 0.25),
        p50: quantile_sorted(&sorted, 0.5),
        p75: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Linear interpolation between closest ranks at position `(n - 1) * q`
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }
}

/// One fold's summary for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub fold: String,
    /// Number of values inside the window
    pub n_used: usize,
    /// `None` when the window is empty or the column is not numeric
    pub stats: Option<Describe>,
}

/// The last `window` non-missing values of `values`, in order
pub fn tail_window<'a>(values: &[Option<&'a Value>], window: usize) -> Vec<&'a Value> {
    let present: Vec<&Value> = values
        .iter()
        .flatten()
        .copied()
        .filter(|value| !value.is_missing())
        .collect();
    let start = present.len().saturating_sub(window);
    present[start..].to_vec()
}

/// Summarize `column` over the trailing `window` values of every fold.
///
/// Folds without the column are skipped. Rows come back sorted by fold
/// identifier. Fails when no fold has the column at all.
#[instrument(skip(tables), fields(folds = tables.len()))]
pub fn summarize_metric(
    tables: &[FoldTable],
    column: &str,
    window: usize,
) -> Result<Vec<SummaryRow>, SummaryError> {
    let mut rows = Vec::new();

    for fold in tables {
        let Some(values) = fold.table.column_values(column) else {
            debug!(fold = %fold.fold, "column absent, skipping fold");
            continue;
        };

        // A single non-numeric observation makes the whole column non-numeric
        let numeric = values
            .iter()
            .flatten()
            .filter(|value| !value.is_missing())
            .all(|value| value.is_numeric());

        let tail = tail_window(&values, window);
        let stats = if numeric {
            let sample: Vec<f64> = tail.iter().filter_map(|value| value.as_f64()).collect();
            describe(&sample)
        } else {
            debug!(fold = %fold.fold, "column holds non-numeric values");
            None
        };

        rows.push(SummaryRow {
            fold: fold.fold.clone(),
            n_used: tail.len(),
            stats,
        });
    }

    if rows.is_empty() {
        return Err(SummaryError::MissingColumn(column.to_string()));
    }

    rows.sort_by(|a, b| a.fold.cmp(&b.fold));
    Ok(rows)
}

/// Header of a summary table
pub const SUMMARY_HEADER: [&str; 8] = ["fold", "n_used", "mean", "min", "25%", "50%", "75%", "max"];

/// Render summary rows as CSV with floats at `precision` decimals
pub fn summary_to_csv(rows: &[SummaryRow], precision: usize) -> Result<Vec<u8>, SummaryError> {
    let render = |err: crate::error::Error| SummaryError::Render(err.to_string());

    let mut writer = csv_writer();
    writer
        .write_record(SUMMARY_HEADER)
        .map_err(|err| render(err.into()))?;

    for row in rows {
        let number = |x: f64| format!("{:.*}", precision, x);
        let mut record = vec![row.fold.clone(), row.n_used.to_string()];
        match &row.stats {
            Some(s) => record.extend([s.mean, s.min, s.p25, s.p50, s.p75, s.max].map(number)),
            None => record.extend(std::iter::repeat(String::new()).take(6)),
        }
        writer
            .write_record(&record)
            .map_err(|err| render(err.into()))?;
    }

    into_bytes(writer).map_err(render)
}

/// Outcome of summarizing one metric into a file
#[derive(Debug)]
pub enum SummaryOutcome {
    /// Table written with this many fold rows
    Written(usize),
    /// Error notice written instead of a table
    Failed(SummaryError),
}

/// Summarize one metric and write either its table or a one-line error
/// notice to `path`. Only a failure to write the file itself is returned
/// as an error.
pub fn summarize_to_file(
    tables: &[FoldTable],
    metric: &MetricSpec,
    window: usize,
    precision: usize,
    path: impl AsRef<Path>,
) -> std::io::Result<SummaryOutcome> {
    let path = path.as_ref();

    let rendered = summarize_metric(tables, &metric.column, window)
        .and_then(|rows| Ok((rows.len(), summary_to_csv(&rows, precision)?)));

    match rendered {
        Ok((count, bytes)) => {
            std::fs::write(path, bytes)?;
            info!(metric = %metric.label, rows = count, path = %path.display(), "summary written");
            Ok(SummaryOutcome::Written(count))
        }
        Err(err) => {
            warn!(metric = %metric.label, error = %err, "failed to compute summary");
            std::fs::write(
                path,
                format!("Error computing {} summary: {}\n", metric.label, err),
            )?;
            Ok(SummaryOutcome::Failed(err))
        }
    }
}

//! foldlog - k-fold training log parsing and tail-window reporting
//!
//! This crate reads the plain-text logs written by a cross-validated
//! training runner, turns them into per-fold tables, summarizes the last
//! epochs of selected validation metrics and assembles a single text report.
//! It also writes the experiment configuration the runner consumes.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod cli;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod parser;
pub mod record;
pub mod report;
pub mod settings;
pub mod summary;
pub mod table;
pub mod utils;
pub mod value;

// Re-exports
pub use error::{Error, Result};
pub use experiment::{ConfigOverrides, ExperimentConfig};
pub use parser::{parse_log, parse_log_file, Fold, LogParser, ParsedLog, Section};
pub use record::{EpochRecord, Fields, ParameterSet};
pub use report::{ReportOutcome, ReportPipeline};
pub use settings::ReportSettings;
pub use summary::{describe, summarize_metric, MetricSpec, SummaryError, SummaryRow};
pub use table::{build_fold_tables, FoldTable, Table};
pub use value::{coerce, Value};

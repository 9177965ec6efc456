//! Line-oriented state machine over k-fold training logs
//!
//! A log looks like:
//!
//! ```text
//! Model parameters
//! hidden_size: 64
//! Training parameters
//! learning_rate: 0.001
//! Data parameters
//! window_size: 30
//! KFold: 1
//! Epoch1/200,TrainLoss:0.4994,ValLoss:0.5521,ValKGE(orig):0.3626
//! ```
//!
//! Parsing is tolerant: unexpected lines are dropped and malformed epoch
//! lines degrade to partial records. Content never makes the parser fail.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, instrument, trace};

use crate::error::{Error, Result};
use crate::record::{EpochRecord, ParameterSet};
use crate::value::{coerce, integer, Value};

/// Field holding the fold identifier on every epoch record
pub const FOLD_FIELD: &str = "fold";
/// Parsed epoch number
pub const EPOCH_FIELD: &str = "epoch";
/// Parsed total epoch count
pub const EPOCH_TOTAL_FIELD: &str = "epoch_total";
/// Raw first segment when the epoch token does not match
pub const EPOCH_LABEL_FIELD: &str = "epoch_label";

const MODEL_HEADER: &str = "Model parameters";
const TRAINING_HEADER: &str = "Training parameters";
const DATA_HEADER: &str = "Data parameters";
const FOLD_PREFIX: &str = "KFold:";
const EPOCH_PREFIX: &str = "Epoch";

static EPOCH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Epoch\s*([0-9]+)\s*/\s*([0-9]+)").expect("epoch pattern is valid")
});

/// Section of the log the parser is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    /// Outside any parameter block; epoch lines are read here
    #[default]
    None,
    /// Inside `Model parameters`
    Model,
    /// Inside `Training parameters`
    Training,
    /// Inside `Data parameters`
    Data,
}

/// One cross-validation fold and its epoch records in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    /// Text following `KFold:`
    pub id: String,
    /// Records in order of appearance
    pub records: Vec<EpochRecord>,
}

impl Fold {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Everything extracted from one log file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLog {
    pub model: ParameterSet,
    pub training: ParameterSet,
    pub data: ParameterSet,
    /// Folds in order of first occurrence
    pub folds: Vec<Fold>,
}

impl ParsedLog {
    /// Look up a fold by identifier
    pub fn fold(&self, id: &str) -> Option<&Fold> {
        self.folds.iter().find(|f| f.id == id)
    }
}

/// Counters for lines the parser chose not to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Non-blank lines read
    pub lines: usize,
    /// Lines inside a parameter block without a colon
    pub ignored_parameter_lines: usize,
    /// `Epoch` lines seen before any usable `KFold:` header
    pub orphan_epoch_lines: usize,
    /// Lines matching no known pattern
    pub unrecognized_lines: usize,
}

/// Single-pass parser; feed lines, then call [`LogParser::finish`]
#[derive(Debug, Default)]
pub struct LogParser {
    section: Section,
    current_fold: Option<usize>,
    log: ParsedLog,
    stats: ParseStats,
}

impl LogParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current section
    pub fn section(&self) -> Section {
        self.section
    }

    /// Consume one raw line
    pub fn feed_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }
        self.stats.lines += 1;

        if line.starts_with(MODEL_HEADER) {
            self.section = Section::Model;
            return;
        }
        if line.starts_with(TRAINING_HEADER) {
            self.section = Section::Training;
            return;
        }
        if line.starts_with(DATA_HEADER) {
            self.section = Section::Data;
            return;
        }
        if let Some(rest) = line.strip_prefix(FOLD_PREFIX) {
            self.section = Section::None;
            self.start_fold(rest.trim());
            return;
        }

        match self.section {
            Section::Model | Section::Training | Section::Data => self.parameter_line(line),
            Section::None => self.body_line(line),
        }
    }

    /// Stop parsing and return what was collected
    pub fn finish(self) -> (ParsedLog, ParseStats) {
        (self.log, self.stats)
    }

    fn start_fold(&mut self, id: &str) {
        let index = match self.log.folds.iter().position(|f| f.id == id) {
            Some(index) => {
                debug!(fold = id, "fold header repeated, restarting its records");
                self.log.folds[index].records.clear();
                index
            }
            None => {
                self.log.folds.push(Fold::new(id));
                self.log.folds.len() - 1
            }
        };

        // An empty identifier registers the fold but cannot own epoch lines
        self.current_fold = if id.is_empty() { None } else { Some(index) };
    }

    fn parameter_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            trace!(line, "ignoring parameter line without a colon");
            self.stats.ignored_parameter_lines += 1;
            return;
        };

        let params = match self.section {
            Section::Model => &mut self.log.model,
            Section::Training => &mut self.log.training,
            Section::Data => &mut self.log.data,
            Section::None => return,
        };
        params.insert(key.trim(), coerce(value));
    }

    fn body_line(&mut self, line: &str) {
        if !line.starts_with(EPOCH_PREFIX) {
            trace!(line, "dropping unrecognized line");
            self.stats.unrecognized_lines += 1;
            return;
        }
        let Some(index) = self.current_fold else {
            trace!(line, "dropping epoch line outside a fold");
            self.stats.orphan_epoch_lines += 1;
            return;
        };

        let fold = &mut self.log.folds[index];
        let record = parse_epoch_line(&fold.id, line);
        fold.records.push(record);
    }
}

/// Parse one `Epoch<e>/<total>,<key>:<value>,...` line for `fold`
pub fn parse_epoch_line(fold: &str, line: &str) -> EpochRecord {
    let mut segments = line.split(',').map(str::trim).filter(|s| !s.is_empty());

    let mut record = EpochRecord::new();
    record.insert(FOLD_FIELD, Value::Str(fold.to_string()));

    if let Some(head) = segments.next() {
        match parse_epoch_token(head) {
            Some((epoch, total)) => {
                record.insert(EPOCH_FIELD, epoch);
                record.insert(EPOCH_TOTAL_FIELD, total);
            }
            None => record.insert(EPOCH_LABEL_FIELD, head),
        }
    }

    for segment in segments {
        if let Some((key, value)) = segment.split_once(':') {
            record.insert(key.trim(), coerce(value));
        }
    }

    record
}

/// Match `Epoch <e> / <total>` at the start of a token
pub fn parse_epoch_token(token: &str) -> Option<(Value, Value)> {
    let caps = EPOCH_TOKEN.captures(token)?;
    // Both groups are digit runs, so neither conversion can fail
    let epoch = integer(&caps[1])?;
    let total = integer(&caps[2])?;
    Some((epoch, total))
}

/// Parse log text held in memory
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_log(text: &str) -> ParsedLog {
    let mut parser = LogParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    let (log, stats) = parser.finish();

    debug!(
        lines = stats.lines,
        ignored_parameter_lines = stats.ignored_parameter_lines,
        orphan_epoch_lines = stats.orphan_epoch_lines,
        unrecognized_lines = stats.unrecognized_lines,
        folds = log.folds.len(),
        "log parsed"
    );
    log
}

/// Read a whole log file and parse it
pub fn parse_log_file(path: impl AsRef<Path>) -> Result<ParsedLog> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::LogRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_log(&text))
}

//! Per-fold tables built from heterogeneous epoch records
//!
//! Records in a fold do not share a fixed schema, so the column set is the
//! union of their keys, computed when the table is built. Tables are sorted
//! by epoch and rendered as CSV.

use std::cmp::Ordering;
use std::path::Path;

use crate::error::{Error, Result};
use crate::parser::{ParsedLog, EPOCH_FIELD};
use crate::record::{EpochRecord, ParameterSet};
use crate::utils::sanitize_file_component;
use crate::value::Value;

/// Trim a column name and replace spaces with underscores.
/// Parentheses and other punctuation are kept.
pub fn normalize_column(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// File name of a fold's CSV, e.g. `fold_split_1.csv` for `split 1`
pub fn fold_file_name(fold_id: &str) -> String {
    format!("fold_{}.csv", sanitize_file_component(fold_id))
}

/// Rectangular table with optional cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    /// Build a table from records and sort it by epoch.
    ///
    /// Rows without a numeric `epoch` go after all rows that have one and
    /// keep their file order. The sort is stable.
    pub fn from_records(records: &[EpochRecord]) -> Self {
        let mut table = Table::default();
        for record in records {
            let mut row = vec![None; table.columns.len()];
            for (key, value) in record.iter() {
                let index = table.column_index_or_insert(&normalize_column(key), &mut row);
                row[index] = Some(value.clone());
            }
            table.push_row(row);
        }
        table.sort_by_epoch();
        table
    }

    /// Stack tables vertically; the column set is the union in first-seen order
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        let mut combined = Table::default();
        for table in tables {
            let targets: Vec<usize> = table
                .columns
                .iter()
                .map(|name| combined.column_index_or_insert(name, &mut Vec::new()))
                .collect();

            for source in &table.rows {
                let mut row = vec![None; combined.columns.len()];
                for (cell, &target) in source.iter().zip(&targets) {
                    row[target] = cell.clone();
                }
                combined.rows.push(row);
            }
        }
        combined
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Values of a column in row order; `None` if the column does not exist
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        let index = self.position(&normalize_column(name))?;
        Some(self.rows.iter().map(|row| row[index].as_ref()).collect())
    }

    /// Render as CSV with a header row; missing cells are empty
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv_writer();
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| match cell {
                Some(value) => value.to_string(),
                None => String::new(),
            }))?;
        }
        into_bytes(writer)
    }

    /// Write the CSV rendering to `path`
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_csv()?)?;
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of `name`, adding the column (and growing existing rows plus
    /// `pending`) when it is new
    fn column_index_or_insert(&mut self, name: &str, pending: &mut Vec<Option<Value>>) -> usize {
        if let Some(index) = self.position(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(None);
        }
        pending.push(None);
        self.columns.len() - 1
    }

    fn push_row(&mut self, mut row: Vec<Option<Value>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    fn sort_by_epoch(&mut self) {
        let Some(index) = self.position(EPOCH_FIELD) else {
            return;
        };
        let key = |row: &Vec<Option<Value>>| {
            row[index]
                .as_ref()
                .and_then(Value::as_f64)
                .filter(|epoch| !epoch.is_nan())
        };
        self.rows.sort_by(|a, b| match (key(a), key(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}

/// A fold identifier paired with its sorted table
#[derive(Debug, Clone, PartialEq)]
pub struct FoldTable {
    pub fold: String,
    pub table: Table,
}

impl FoldTable {
    /// CSV file name for this fold
    pub fn file_name(&self) -> String {
        fold_file_name(&self.fold)
    }
}

/// Tables for every fold that has at least one record, in fold order
pub fn build_fold_tables(log: &ParsedLog) -> Vec<FoldTable> {
    log.folds
        .iter()
        .filter(|fold| !fold.is_empty())
        .map(|fold| FoldTable {
            fold: fold.id.clone(),
            table: Table::from_records(&fold.records),
        })
        .collect()
}

/// Cross-fold table; `None` when there are no fold tables
pub fn combine_fold_tables(tables: &[FoldTable]) -> Option<Table> {
    if tables.is_empty() {
        return None;
    }
    Some(Table::concat(tables.iter().map(|t| &t.table)))
}

/// Render a parameter set as a two-column `,value` CSV
pub fn parameters_to_csv(params: &ParameterSet) -> Result<Vec<u8>> {
    let mut writer = csv_writer();
    writer.write_record(["", "value"])?;
    for (key, value) in params.iter() {
        writer.write_record([key.to_string(), value.to_string()])?;
    }
    into_bytes(writer)
}

pub(crate) fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

pub(crate) fn into_bytes(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|err| Error::Io(err.into_error()))
}

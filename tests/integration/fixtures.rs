//! Test fixtures and utilities for integration tests

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two populated folds written out of order, an empty fold, a malformed
/// epoch line, and no Pearson column anywhere.
pub const TWO_FOLD_LOG: &str = "\
Model parameters
lstm_hidden_size: 64
if_gru: False

Training parameters
learning_rate: 0.001
optimizer: adam
Data parameters
window_size: 30
stations: 290
KFold: 0
KFold: 2
Epoch1/4,TrainLoss:0.50,ValLoss:0.60,ValKGE(orig):0.10,ValBeta(orig):1.10,ValAlpha(orig):0.90
Epoch2/4,TrainLoss:0.45,ValLoss:0.55,ValKGE(orig):0.20,ValBeta(orig):1.05,ValAlpha(orig):0.92
Epoch,garbage
Epoch3/4,TrainLoss:0.40,ValLoss:0.50,ValKGE(orig):0.30,ValBeta(orig):1.02,ValAlpha(orig):0.95
Epoch4/4,TrainLoss:0.35,ValLoss:0.45,ValKGE(orig):0.40,ValBeta(orig):1.01,ValAlpha(orig):0.97
KFold: 1
Epoch4/4,TrainLoss:0.30,ValLoss:0.40,ValKGE(orig):0.80,ValBeta(orig):0.99,ValAlpha(orig):1.00
Epoch3/4,TrainLoss:0.32,ValLoss:0.42,ValKGE(orig):0.70,ValBeta(orig):0.98,ValAlpha(orig):0.99
Epoch2/4,TrainLoss:0.34,ValLoss:0.44,ValKGE(orig):0.60,ValBeta(orig):0.97,ValAlpha(orig):0.98
Epoch1/4,TrainLoss:0.36,ValLoss:0.46,ValKGE(orig):0.50,ValBeta(orig):0.96,ValAlpha(orig):0.97
";

/// Create a temporary directory for test outputs
pub fn create_test_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

/// Write `content` as `<dir>/<prefix><index>.txt`; returns the prefix path
pub fn write_log(dir: &Path, prefix: &str, index: u32, content: &str) -> PathBuf {
    let log_path = dir.join(format!("{}{}.txt", prefix, index));
    fs::write(&log_path, content).expect("Failed to write log");
    dir.join(prefix)
}

/// Sorted file names in a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

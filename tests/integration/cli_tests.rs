//! CLI integration tests
//!
//! Runs the compiled `foldlog` binary against scratch directories.

use super::fixtures::*;
use super::init_test_logging;
use foldlog::ExperimentConfig;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Run the binary and capture (stdout, stderr, success)
fn run_cli(args: &[&str], cwd: &Path) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_foldlog"))
        .args(args)
        .current_dir(cwd)
        .env_remove("FOLDLOG_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run foldlog");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

#[test]
fn test_cli_help_lists_subcommands() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();

    let (stdout, _, success) = run_cli(&["--help"], &dir);
    assert!(success);
    assert!(stdout.contains("report"));
    assert!(stdout.contains("write-config"));
}

#[test]
fn test_cli_report_with_positional_arguments() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    write_log(&dir, "results_", 3, TWO_FOLD_LOG);

    let (stdout, stderr, success) = run_cli(&["report", "results_", "3", "2"], &dir);
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("combined_results_3.txt"));

    let out_dir = dir.join("parsed_logs");
    assert_eq!(file_names(&out_dir), vec!["combined_results_3.txt"]);

    let report = fs::read_to_string(out_dir.join("combined_results_3.txt")).unwrap();
    assert!(report.starts_with("parsed_logs/model_params.csv\n,value\n"));
}

#[test]
fn test_cli_report_markers_drop_current_dir() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    fs::create_dir(dir.join("runs")).unwrap();
    write_log(&dir.join("runs"), "results_", 1, TWO_FOLD_LOG);

    let (_, stderr, success) = run_cli(&["report", "./runs/results_", "1", "2"], &dir);
    assert!(success, "stderr: {}", stderr);

    let report =
        fs::read_to_string(dir.join("runs/parsed_logs/combined_results_1.txt")).unwrap();
    assert!(report.starts_with("runs/parsed_logs/model_params.csv\n"));
    assert!(!report.contains("./runs"));
}

#[test]
fn test_cli_report_missing_log_fails() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();

    let (_, stderr, success) = run_cli(&["report", "nothing_", "1", "2"], &dir);
    assert!(!success);
    assert!(stderr.contains("Log file not found"));
    assert!(!dir.join("parsed_logs").exists());
}

#[test]
fn test_cli_report_rejects_non_numeric_window() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    write_log(&dir, "results_", 1, TWO_FOLD_LOG);

    let (_, _, success) = run_cli(&["report", "results_", "1", "many"], &dir);
    assert!(!success);
}

#[test]
fn test_cli_report_with_settings_file() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    write_log(&dir, "results_", 1, TWO_FOLD_LOG);
    fs::write(dir.join("settings.json"), r#"{"output_dir_name": "out"}"#).unwrap();

    let (_, stderr, success) =
        run_cli(&["--config", "settings.json", "report", "results_", "1", "2"], &dir);
    assert!(success, "stderr: {}", stderr);
    assert!(dir.join("out").join("combined_results_1.txt").is_file());
}

#[test]
fn test_cli_write_config_overrides() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();

    let (stdout, stderr, success) = run_cli(
        &[
            "write-config",
            "--output-path",
            "exp.json",
            "--lstm-hidden-size",
            "128",
            "--up-th",
            "0.75",
            "--gru",
            "--X-scaler-path",
            "x.joblib",
        ],
        &dir,
    );
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("Wrote config to:"));

    let config = ExperimentConfig::from_file(dir.join("exp.json")).unwrap();
    assert_eq!(config.lstm_hidden_size, 128);
    assert_eq!(config.up_th, 0.75);
    assert_eq!(config.down_th, 0.25);
    assert!(config.if_gru);
    assert!(!config.if_layer_norm);
    assert_eq!(config.x_scaler_path, "x.joblib");
}

#[test]
fn test_cli_write_config_default_path() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();

    let (_, stderr, success) = run_cli(&["write-config"], &dir);
    assert!(success, "stderr: {}", stderr);

    let config = ExperimentConfig::from_file(dir.join("lstm.json")).unwrap();
    assert_eq!(config, ExperimentConfig::default());
}

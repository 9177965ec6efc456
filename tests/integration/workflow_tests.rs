//! End-to-end report workflow tests

use super::fixtures::*;
use super::init_test_logging;
use foldlog::report::{log_file_path, ReportPipeline};
use foldlog::summary::SummaryOutcome;
use foldlog::{parse_log, ReportSettings};
use std::fs;

#[test]
fn test_report_contains_sorted_kge_summary() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 1, TWO_FOLD_LOG);

    let pipeline = ReportPipeline::default();
    let outcome = pipeline
        .run(log_file_path(prefix.to_str().unwrap(), 1), 1, 2)
        .unwrap();

    let report = fs::read_to_string(&outcome.report_path).unwrap();
    let kge_marker = format!("{}\n", dir.join("parsed_logs/valkge_orig_summary.csv").display());
    let expected_kge = format!(
        "{}fold,n_used,mean,min,25%,50%,75%,max\n\
         1,2,0.7500,0.7000,0.7250,0.7500,0.7750,0.8000\n\
         2,2,0.3500,0.3000,0.3250,0.3500,0.3750,0.4000\n\n",
        kge_marker
    );
    assert!(report.contains(&expected_kge), "report was:\n{}", report);
    assert_eq!(outcome.fold_tables, 2);
}

#[test]
fn test_report_layout() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 4, TWO_FOLD_LOG);

    let outcome = ReportPipeline::default()
        .run(log_file_path(prefix.to_str().unwrap(), 4), 4, 3)
        .unwrap();
    assert_eq!(
        outcome.report_path,
        dir.join("parsed_logs").join("combined_results_4.txt")
    );
    assert_eq!(outcome.concatenated.len(), 7);

    let report = fs::read_to_string(&outcome.report_path).unwrap();
    let model_section = format!(
        "{}\n,value\nlstm_hidden_size,64\nif_gru,False\n\n",
        dir.join("parsed_logs/model_params.csv").display()
    );
    assert!(report.starts_with(&model_section), "report was:\n{}", report);

    let pearson_section = format!(
        "{}\nError computing Pearson summary: no fold contains column `ValPearson(orig)`\n\n",
        dir.join("parsed_logs/valr_orig_summary.csv").display()
    );
    assert!(report.ends_with(&pearson_section), "report was:\n{}", report);

    let markers: Vec<&str> = report
        .lines()
        .filter(|line| line.starts_with(dir.to_str().unwrap()))
        .collect();
    assert_eq!(markers.len(), 7);
    assert!(markers[1].ends_with("training_params.csv"));
    assert!(markers[3].ends_with("valkge_orig_summary.csv"));
    assert!(markers[4].ends_with("valbeta_orig_summary.csv"));
    assert!(markers[5].ends_with("valalpha_orig_summary.csv"));
}

#[test]
fn test_failing_metric_does_not_stop_others() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "run", 2, TWO_FOLD_LOG);

    let outcome = ReportPipeline::default()
        .run(log_file_path(prefix.to_str().unwrap(), 2), 2, 2)
        .unwrap();

    let labels: Vec<&str> = outcome.summaries.iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["KGE", "Beta", "Alpha", "Pearson"]);
    for (label, summary) in &outcome.summaries {
        match (label.as_str(), summary) {
            ("Pearson", SummaryOutcome::Failed(_)) => {}
            (_, SummaryOutcome::Written(rows)) => assert_eq!(*rows, 2),
            other => panic!("unexpected outcome {:?}", other),
        }
    }
}

#[test]
fn test_output_dir_holds_only_the_report() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 7, TWO_FOLD_LOG);

    let outcome = ReportPipeline::default()
        .run(log_file_path(prefix.to_str().unwrap(), 7), 7, 2)
        .unwrap();

    assert_eq!(file_names(&outcome.output_dir), vec!["combined_results_7.txt"]);
    assert!(outcome.cleanup.failed.is_empty());
    assert!(outcome
        .cleanup
        .removed
        .iter()
        .any(|p| p.ends_with("combined_folds.csv")));
    assert!(outcome.cleanup.removed.iter().any(|p| p.ends_with("fold_1.csv")));
    assert!(!outcome.cleanup.removed.iter().any(|p| p.ends_with("fold_0.csv")));
}

#[test]
fn test_rerun_is_byte_identical() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 1, TWO_FOLD_LOG);
    let log_path = log_file_path(prefix.to_str().unwrap(), 1);
    let pipeline = ReportPipeline::default();

    let first = pipeline.run(&log_path, 1, 3).unwrap();
    let first_bytes = fs::read(&first.report_path).unwrap();

    let second = pipeline.run(&log_path, 1, 3).unwrap();
    let second_bytes = fs::read(&second.report_path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(file_names(&second.output_dir), vec!["combined_results_1.txt"]);
}

#[test]
fn test_reports_for_other_runs_survive_cleanup() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 1, TWO_FOLD_LOG);
    write_log(&dir, "results_", 2, TWO_FOLD_LOG);
    let pipeline = ReportPipeline::default();

    pipeline.run(log_file_path(prefix.to_str().unwrap(), 1), 1, 2).unwrap();
    let outcome = pipeline.run(log_file_path(prefix.to_str().unwrap(), 2), 2, 2).unwrap();

    assert_eq!(
        file_names(&outcome.output_dir),
        vec!["combined_results_1.txt", "combined_results_2.txt"]
    );
}

#[test]
fn test_intermediate_artifacts() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let log = parse_log(TWO_FOLD_LOG);
    let pipeline = ReportPipeline::default();

    let (tables, summaries) = pipeline.write_artifacts(&log, &dir, 2).unwrap();
    assert_eq!(tables, 2);
    assert_eq!(summaries.len(), 4);

    assert_eq!(
        file_names(&dir),
        vec![
            "combined_folds.csv",
            "data_params.csv",
            "fold_1.csv",
            "fold_2.csv",
            "model_params.csv",
            "training_params.csv",
            "valalpha_orig_summary.csv",
            "valbeta_orig_summary.csv",
            "valkge_orig_summary.csv",
            "valr_orig_summary.csv",
        ]
    );

    let fold_1 = fs::read_to_string(dir.join("fold_1.csv")).unwrap();
    let mut lines = fold_1.lines();
    assert_eq!(
        lines.next(),
        Some("fold,epoch,epoch_total,TrainLoss,ValLoss,ValKGE(orig),ValBeta(orig),ValAlpha(orig)")
    );
    assert_eq!(lines.next(), Some("1,1,4,0.36,0.46,0.5,0.96,0.97"));

    let fold_2 = fs::read_to_string(dir.join("fold_2.csv")).unwrap();
    assert!(fold_2.ends_with("2,,,,,,,,Epoch\n"), "fold_2.csv was:\n{}", fold_2);

    let combined = fs::read_to_string(dir.join("combined_folds.csv")).unwrap();
    assert_eq!(combined.lines().count(), 1 + 9);
}

#[test]
fn test_window_larger_than_history_uses_everything() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 1, TWO_FOLD_LOG);

    let outcome = ReportPipeline::default()
        .run(log_file_path(prefix.to_str().unwrap(), 1), 1, 50)
        .unwrap();
    let report = fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains("1,4,0.6500,0.5000,0.5750,0.6500,0.7250,0.8000\n"));
}

#[test]
fn test_zero_window_reports_empty_statistics() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 1, TWO_FOLD_LOG);

    let outcome = ReportPipeline::default()
        .run(log_file_path(prefix.to_str().unwrap(), 1), 1, 0)
        .unwrap();
    let report = fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.contains("1,0,,,,,,\n2,0,,,,,,\n"));
}

#[test]
fn test_custom_settings_change_precision_and_directory() {
    init_test_logging();
    let (_guard, dir) = create_test_dir();
    let prefix = write_log(&dir, "results_", 1, TWO_FOLD_LOG);

    let settings = ReportSettings {
        output_dir_name: "summaries".into(),
        float_precision: 2,
        ..Default::default()
    };
    let outcome = ReportPipeline::new(settings)
        .run(log_file_path(prefix.to_str().unwrap(), 1), 1, 2)
        .unwrap();

    assert_eq!(outcome.output_dir, dir.join("summaries"));
    let report = fs::read_to_string(&outcome.report_path).unwrap();
    let fold_2 = report
        .lines()
        .find(|line| line.starts_with("2,2,"))
        .expect("fold 2 summary row");
    let cells: Vec<&str> = fold_2.split(',').collect();
    assert_eq!(cells.len(), 8);
    assert_eq!(&cells[2..4], &["0.35", "0.30"]);
    assert_eq!(cells[7], "0.40");
}

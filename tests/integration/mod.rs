//! Integration tests for the report pipeline, the config writer and the CLI

mod cli_tests;
mod fixtures;
mod workflow_tests;

/// Common test initialization
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("foldlog=debug")
        .try_init();
}

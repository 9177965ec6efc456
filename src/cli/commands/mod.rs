pub mod report;
pub mod write_config;

pub use report::ReportCommand;
pub use write_config::WriteConfigCommand;

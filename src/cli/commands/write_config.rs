use clap::Args;
use std::path::PathBuf;

use crate::cli::error::{CliError, CliResult};
use crate::experiment::{ConfigOverrides, ExperimentConfig};
use crate::logging;

#[derive(Args, Debug)]
pub struct WriteConfigCommand {
    /// Output path; `.yaml`/`.yml` writes YAML, anything else JSON
    #[arg(long = "output-path", default_value = "lstm.json")]
    pub output_path: PathBuf,

    #[arg(long)]
    pub lstm_hidden_size: Option<u32>,

    #[arg(long)]
    pub linear_hidden_size: Option<u32>,

    #[arg(long)]
    pub lstm_num_layers: Option<u32>,

    #[arg(long)]
    pub window_step: Option<u32>,

    #[arg(long)]
    pub window_size: Option<u32>,

    #[arg(long = "X-scaler-path")]
    pub x_scaler_path: Option<String>,

    #[arg(long = "Y-scaler-path")]
    pub y_scaler_path: Option<String>,

    #[arg(long)]
    pub lambda_underestimate: Option<f64>,

    /// Upper threshold; the lower threshold becomes `1 - up_th`
    #[arg(long)]
    pub up_th: Option<f64>,

    /// Use a GRU instead of an LSTM
    #[arg(long)]
    pub gru: bool,

    /// Enable layer normalization
    #[arg(long)]
    pub layer_norm: bool,
}

impl WriteConfigCommand {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            lstm_hidden_size: self.lstm_hidden_size,
            linear_hidden_size: self.linear_hidden_size,
            lstm_num_layers: self.lstm_num_layers,
            window_size: self.window_size,
            window_step: self.window_step,
            x_scaler_path: self.x_scaler_path.clone(),
            y_scaler_path: self.y_scaler_path.clone(),
            lambda_underestimate: self.lambda_underestimate,
            up_th: self.up_th,
            // Flags only ever switch features on
            if_gru: self.gru.then_some(true),
            if_layer_norm: self.layer_norm.then_some(true),
        }
    }
}

pub fn execute(cmd: WriteConfigCommand) -> CliResult<ExperimentConfig> {
    if let Some(up_th) = cmd.up_th {
        if !up_th.is_finite() {
            return Err(CliError::InvalidArgument(format!(
                "--up-th must be a finite number, got {}",
                up_th
            )));
        }
    }

    let config = ExperimentConfig::with_overrides(&cmd.overrides());
    config.write(&cmd.output_path)?;

    let shown = std::fs::canonicalize(&cmd.output_path).unwrap_or(cmd.output_path);
    logging::success(&format!("Wrote config to: {}", shown.display()));

    Ok(config)
}

//! LSTM experiment configuration written for the training runner

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};

/// Configuration consumed by the LSTM training runner.
///
/// Field order is the order keys appear in the written document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub window_size: u32,
    pub window_step: u32,
    pub num_stations: u32,
    #[serde(rename = "X_scaler_path")]
    pub x_scaler_path: String,
    #[serde(rename = "Y_scaler_path")]
    pub y_scaler_path: String,
    pub lstm_hidden_size: u32,
    pub linear_hidden_size: u32,
    pub lstm_num_layers: u32,
    pub lstm_dropout: f64,
    pub linear_dropout: f64,
    pub if_layer_norm: bool,
    pub if_gru: bool,
    pub batch_size: u32,
    pub num_epochs: u32,
    pub learning_rate: f64,
    /// Upper threshold; `down_th` mirrors it as `1 - up_th`
    pub up_th: f64,
    pub down_th: f64,
    pub lambda_underestimate: f64,
    pub lambda_overestimate: f64,
    pub lambda_init: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            window_size: 30,
            window_step: 10,
            num_stations: 290,
            x_scaler_path: "X_scaler.joblib".to_string(),
            y_scaler_path: "Y_scaler.joblib".to_string(),
            lstm_hidden_size: 64,
            linear_hidden_size: 64,
            lstm_num_layers: 2,
            lstm_dropout: 0.2,
            linear_dropout: 0.5,
            if_layer_norm: false,
            if_gru: false,
            batch_size: 32,
            num_epochs: 200,
            learning_rate: 0.001,
            up_th: 0.9,
            down_th: 0.1,
            lambda_underestimate: 1.5,
            lambda_overestimate: 1.0,
            lambda_init: 1.0,
        }
    }
}

/// Fields that can be overridden; `None` keeps the default
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub lstm_hidden_size: Option<u32>,
    pub linear_hidden_size: Option<u32>,
    pub lstm_num_layers: Option<u32>,
    pub window_size: Option<u32>,
    pub window_step: Option<u32>,
    pub x_scaler_path: Option<String>,
    pub y_scaler_path: Option<String>,
    pub lambda_underestimate: Option<f64>,
    pub up_th: Option<f64>,
    pub if_gru: Option<bool>,
    pub if_layer_norm: Option<bool>,
}

impl ExperimentConfig {
    /// Defaults with `overrides` applied
    pub fn with_overrides(overrides: &ConfigOverrides) -> Self {
        let mut config = Self::default();
        config.apply(overrides);
        config
    }

    /// Apply overrides in place. Setting `up_th` also sets `down_th`.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.lstm_hidden_size {
            self.lstm_hidden_size = v;
        }
        if let Some(v) = overrides.linear_hidden_size {
            self.linear_hidden_size = v;
        }
        if let Some(v) = overrides.lstm_num_layers {
            self.lstm_num_layers = v;
        }
        if let Some(v) = overrides.window_size {
            self.window_size = v;
        }
        if let Some(v) = overrides.window_step {
            self.window_step = v;
        }
        if let Some(v) = &overrides.x_scaler_path {
            self.x_scaler_path = v.clone();
        }
        if let Some(v) = &overrides.y_scaler_path {
            self.y_scaler_path = v.clone();
        }
        if let Some(v) = overrides.lambda_underestimate {
            self.lambda_underestimate = v;
        }
        if let Some(v) = overrides.up_th {
            self.up_th = v;
            self.down_th = 1.0 - v;
        }
        if let Some(v) = overrides.if_gru {
            self.if_gru = v;
        }
        if let Some(v) = overrides.if_layer_norm {
            self.if_layer_norm = v;
        }
    }

    /// Reject values the runner cannot use
    pub fn validate(&self) -> Result<()> {
        if !self.up_th.is_finite() {
            return Err(Error::invalid_input("up_th must be a finite number"));
        }
        if !self.lambda_underestimate.is_finite() {
            return Err(Error::invalid_input("lambda_underestimate must be a finite number"));
        }
        Ok(())
    }

    /// Write as JSON (four-space indent) or, for `.yaml`/`.yml`, YAML
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;
        crate::utils::config::save_config(self, path)?;
        info!(path = %path.display(), "experiment config written");
        Ok(())
    }

    /// Read a previously written config
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        crate::utils::config::load_config(path)
    }
}

//! Utility functions shared across the pipeline

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_FILE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_-]+").expect("file-name pattern is valid"));

/// Replace each run of characters outside `[0-9A-Za-z_-]` with one `_`
pub fn sanitize_file_component(name: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(name, "_").into_owned()
}

/// File I/O utilities
pub mod io {
    use crate::error::{Error, Result};
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Ensure directory exists
    pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Sibling used while writing `path`: the full file name plus `.tmp`
    pub fn temp_path_for(path: &Path) -> Result<PathBuf> {
        let mut name = path
            .file_name()
            .ok_or_else(|| Error::invalid_input(format!("not a file path: {}", path.display())))?
            .to_os_string();
        name.push(".tmp");
        Ok(path.with_file_name(name))
    }

    /// Safe file write with atomic operation
    pub fn write_file_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let temp_path = temp_path_for(path)?;

        fs::write(&temp_path, content)?;
        fs::rename(temp_path, path)?;

        Ok(())
    }
}

/// Structured document load/save keyed on file extension
pub mod config {
    use crate::error::Result;
    use serde::{Deserialize, Serialize};
    use std::path::Path;

    fn is_yaml(path: &Path) -> bool {
        path.extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
    }

    /// Load a JSON or YAML document
    pub fn load_config<T, P>(path: P) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
        P: AsRef<Path>,
    {
        let content = std::fs::read_to_string(path.as_ref())?;

        let config = if is_yaml(path.as_ref()) {
            serde_yaml::from_str(&content)?
        } else {
            // Default to JSON
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Save as YAML for `.yaml`/`.yml`, otherwise JSON indented by four spaces
    pub fn save_config<T, P>(config: &T, path: P) -> Result<()>
    where
        T: Serialize,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            super::io::ensure_dir_exists(parent)?;
        }

        let content = if is_yaml(path) {
            serde_yaml::to_string(config)?.into_bytes()
        } else {
            to_json_pretty(config)?
        };

        super::io::write_file_atomic(path, &content)?;
        Ok(())
    }

    /// JSON with four-space indentation and fields in declaration order
    pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        value.serialize(&mut serializer)?;
        Ok(out)
    }
}

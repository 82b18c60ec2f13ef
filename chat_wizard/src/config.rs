//! Runtime configuration for the wizard, TOML-backed.
//!
//! Entrypoints:
//! - Parse from a TOML string: [`load_config_str`]
//! - Read and parse a file path: [`load_config_path`]
//! Unknown keys are rejected so a typo in a config file fails loudly.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Settings the driver can override per deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WizardConfig {
    /// Uploads larger than this many bytes are rejected before parsing and
    /// end the session, like any other bad upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Parse a config from a TOML string.
pub fn load_config_str(s: &str) -> anyhow::Result<WizardConfig> {
    toml::from_str(s).context("invalid wizard config")
}

/// Read and parse a config file.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<WizardConfig> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    load_config_str(&s)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = load_config_str("").unwrap();
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn upload_cap_can_be_overridden() {
        let config = load_config_str("max_upload_bytes = 1024").unwrap();
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(load_config_str("max_upload_byte = 1024").is_err());
    }

    #[test]
    fn loads_from_a_file_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_upload_bytes = 2048").unwrap();

        let config = load_config_path(file.path()).unwrap();
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config_path("/does/not/exist.toml").is_err());
    }
}

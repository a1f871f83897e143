//! Configuration for the pipeline and its completion backend.
//!
//! Configuration is a JSON file. Without an explicit path the file is looked
//! up following the XDG Base Directory specification at
//! `$XDG_CONFIG_HOME/charter/config.json`; a missing default file simply
//! means defaults.

use std::path::{Path, PathBuf};

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

const CONFIG_FILE: &str = "config.json";

/// Tunables for the planning pipeline itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum messages kept per conversation
    pub max_history: usize,
    /// Conversations idle longer than this are removed by cleanup
    pub conversation_retention_hours: u64,
    /// Working hours per day used to turn effort into a timeline
    pub hours_per_day: f64,
    /// Labor rate used for SOW budgets
    pub hourly_rate: f64,
    /// Generate a SOW for every new plan unless the caller says otherwise
    pub generate_sow: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_history: 50,
            conversation_retention_hours: 24,
            hours_per_day: 6.0,
            hourly_rate: 100.0,
            generate_sow: false,
        }
    }
}

impl PipelineConfig {
    /// Check values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.max_history < 2 {
            return Err(PlannerError::Configuration {
                message: "max_history must be at least 2".to_string(),
            });
        }
        if !(self.hours_per_day.is_finite() && self.hours_per_day > 0.0) {
            return Err(PlannerError::Configuration {
                message: "hours_per_day must be a positive number".to_string(),
            });
        }
        if !(self.hourly_rate.is_finite() && self.hourly_rate >= 0.0) {
            return Err(PlannerError::Configuration {
                message: "hourly_rate must not be negative".to_string(),
            });
        }
        Ok(())
    }

    pub fn retention(&self) -> SignedDuration {
        let hours = i64::try_from(self.conversation_retention_hours).unwrap_or(i64::MAX / 3600);
        SignedDuration::from_hours(hours)
    }
}

/// Where and how to reach an OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout_secs() -> u64 {
    60
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CharterConfig {
    pub pipeline: PipelineConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionSettings>,
}

impl CharterConfig {
    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileSystem` if the file cannot be read,
    /// `PlannerError::Serialization` if it is not valid JSON and
    /// `PlannerError::Configuration` if a value is out of range.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PlannerError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.pipeline.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default location when it
    /// exists, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Existing config file under the XDG config directories, if any.
    pub fn default_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("charter").find_config_file(CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_history, 50);
        assert_eq!(config.conversation_retention_hours, 24);
        assert_eq!(config.hours_per_day, 6.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.retention(), SignedDuration::from_hours(24));
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "pipeline": { "hourly_rate": 80.0 },
                "completion": { "base_url": "http://localhost:8080/v1", "model": "local" }
            }"#,
        )
        .expect("Failed to write config");

        let config = CharterConfig::load(&path).expect("Failed to load config");
        assert_eq!(config.pipeline.hourly_rate, 80.0);
        assert_eq!(config.pipeline.max_history, 50);
        let completion = config.completion.expect("completion settings");
        assert_eq!(completion.api_key_env, "OPENAI_API_KEY");
        assert_eq!(completion.timeout_secs, 60);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let err = CharterConfig::load_or_default(Some(&dir.path().join("nope.json")))
            .expect_err("missing file should fail");
        assert!(matches!(err, PlannerError::FileSystem { .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "pipeline": { "hours_per_day": 0 } }"#)
            .expect("Failed to write config");

        let err = CharterConfig::load(&path).expect_err("zero hours per day");
        assert!(matches!(err, PlannerError::Configuration { .. }));
    }
}

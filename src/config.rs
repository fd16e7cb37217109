//! Settings file handling.
//!
//! Optional JSON file with executor and transport tunables. Every field has
//! a default, so an empty object `{}` is a valid settings file. CLI flags are
//! applied on top after loading.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{FirstmateError, Result};
use crate::executor::{ExecutorConfig, FailurePolicy, DEFAULT_STEP_DELAY};
use crate::ssh::{SshConnector, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};

/// Longest pause accepted between steps.
const MAX_STEP_DELAY_MS: u64 = 60_000;

/// SSH transport settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    pub port: u16,
    pub connect_timeout_secs: u64,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
        }
    }
}

/// Runtime settings that can be saved/loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pause after each executed step, in milliseconds
    pub step_delay_ms: u64,
    pub failure_policy: FailurePolicy,
    /// Treat a run with failed steps as a failure (exit code 4)
    pub strict: bool,
    pub ssh: SshSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_delay_ms: DEFAULT_STEP_DELAY.as_millis() as u64,
            failure_policy: FailurePolicy::Continue,
            strict: false,
            ssh: SshSettings::default(),
        }
    }
}

impl Settings {
    /// Save settings to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|e| {
            FirstmateError::config(format!(
                "failed to write settings to {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(())
    }

    /// Load settings from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            FirstmateError::config(format!(
                "failed to read settings from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let settings: Self = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Validate value ranges
    pub fn validate(&self) -> Result<()> {
        if self.step_delay_ms > MAX_STEP_DELAY_MS {
            return Err(FirstmateError::validation(format!(
                "step_delay_ms must be at most {}",
                MAX_STEP_DELAY_MS
            )));
        }
        if self.ssh.port == 0 {
            return Err(FirstmateError::validation("ssh.port must be non-zero"));
        }
        if self.ssh.connect_timeout_secs == 0 {
            return Err(FirstmateError::validation(
                "ssh.connect_timeout_secs must be non-zero",
            ));
        }
        Ok(())
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            step_delay: Duration::from_millis(self.step_delay_ms),
            policy: self.failure_policy,
        }
    }

    pub fn connector(&self) -> SshConnector {
        SshConnector::new(
            self.ssh.port,
            Duration::from_secs(self.ssh.connect_timeout_secs),
        )
    }

    /// Whether a finished run with failed steps should be reported as a
    /// failure. Fail-fast implies strict.
    pub fn fails_on_step_error(&self) -> bool {
        self.strict || self.failure_policy == FailurePolicy::FailFast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.step_delay_ms, 500);
        assert_eq!(settings.failure_policy, FailurePolicy::Continue);
        assert!(!settings.strict);
        assert_eq!(settings.ssh.port, 22);
        assert_eq!(settings.ssh.connect_timeout_secs, 30);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file() {
        let json = r#"{"failure_policy": "fail-fast", "ssh": {"port": 2222}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
        assert_eq!(settings.ssh.port, 2222);
        assert_eq!(settings.ssh.connect_timeout_secs, 30);
        assert!(settings.fails_on_step_error());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("firstmate.json");

        let settings = Settings {
            step_delay_ms: 0,
            strict: true,
            ..Settings::default()
        };
        settings.save_to_file(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load_from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, FirstmateError::Config(_)));
    }

    #[test]
    fn test_load_malformed_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Settings::load_from_file(&path).unwrap_err();
        assert!(matches!(err, FirstmateError::Json(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_port = Settings {
            ssh: SshSettings {
                port: 0,
                ..SshSettings::default()
            },
            ..Settings::default()
        };
        assert!(zero_port.validate().is_err());

        let slow = Settings {
            step_delay_ms: 120_000,
            ..Settings::default()
        };
        assert!(slow.validate().is_err());
    }

    #[test]
    fn test_executor_config_conversion() {
        let settings = Settings {
            step_delay_ms: 25,
            failure_policy: FailurePolicy::FailFast,
            ..Settings::default()
        };
        let config = settings.executor_config();
        assert_eq!(config.step_delay, Duration::from_millis(25));
        assert_eq!(config.policy, FailurePolicy::FailFast);
        assert_eq!(settings.connector().port(), 22);
    }
}

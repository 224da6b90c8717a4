//! Dispatcher configuration via `hostbridge.toml`
//!
//! Timeouts and host-thread sizing live in a small TOML file next to the
//! embedding application. Missing keys take their defaults; values are
//! validated eagerly on load.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Error;

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "hostbridge.toml";

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_timeout_ms() -> u64 {
    300_000
}

fn default_host_queue_capacity() -> usize {
    1024
}

/// Dispatcher configuration loaded from `hostbridge.toml`.
///
/// # Example
///
/// ```toml
/// default_timeout_ms = 15000
/// max_timeout_ms = 300000
/// host_queue_capacity = 1024
///
/// [timeouts]
/// export_report = 120000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Wait budget for commands with no more specific timeout.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Upper bound applied to every resolved timeout.
    #[serde(default = "default_max_timeout_ms")]
    pub max_timeout_ms: u64,
    /// Pending-task capacity of the reference host thread.
    #[serde(default = "default_host_queue_capacity")]
    pub host_queue_capacity: usize,
    /// Per-command wait budgets, keyed by command name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub timeouts: BTreeMap<String, u64>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            max_timeout_ms: default_max_timeout_ms(),
            host_queue_capacity: default_host_queue_capacity(),
            timeouts: BTreeMap::new(),
        }
    }
}

impl BridgeConfig {
    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), Error> {
        if self.default_timeout_ms == 0 {
            return Err(Error::config("default_timeout_ms must be greater than zero"));
        }
        if self.max_timeout_ms < self.default_timeout_ms {
            return Err(Error::config(format!(
                "max_timeout_ms ({}) must be at least default_timeout_ms ({})",
                self.max_timeout_ms, self.default_timeout_ms
            )));
        }
        if self.host_queue_capacity == 0 {
            return Err(Error::config("host_queue_capacity must be greater than zero"));
        }
        if let Some((command, _)) = self.timeouts.iter().find(|(_, ms)| **ms == 0) {
            return Err(Error::config(format!(
                "timeout for '{}' must be greater than zero",
                command
            )));
        }
        Ok(())
    }

    /// Resolve the wait budget for one dispatch of `command`.
    ///
    /// Precedence: the caller's explicit timeout, then the configured
    /// per-command timeout, then the command's registered default, then
    /// `default_timeout_ms`. The result is capped at `max_timeout_ms`.
    /// An explicit zero is rejected.
    pub fn resolve_timeout(
        &self,
        command: &str,
        explicit_ms: Option<u64>,
        registered: Option<Duration>,
    ) -> Result<Duration, Error> {
        if explicit_ms == Some(0) {
            return Err(Error::Validation {
                command: command.to_string(),
                reason: "timeout must be greater than zero".to_string(),
            });
        }
        let resolved = explicit_ms
            .or_else(|| self.timeouts.get(command).copied())
            .map(Duration::from_millis)
            .or(registered)
            .unwrap_or(Duration::from_millis(self.default_timeout_ms));
        Ok(resolved.min(Duration::from_millis(self.max_timeout_ms)))
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# hostbridge configuration
#
# How long a caller waits for the host thread before giving up (default: 15000).
# A timed-out request may still execute later; its result is discarded.
default_timeout_ms = 15000

# Upper bound on any timeout, including ones supplied by callers (default: 300000).
max_timeout_ms = 300000

# Pending-request capacity of the built-in host thread (default: 1024).
host_queue_capacity = 1024

# Per-command timeouts, overriding the default.
# [timeouts]
# export_report = 120000
"#
    }

    /// Read, parse and validate config from a file path.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: BridgeConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        info!(
            target: "hostbridge::dispatch",
            path = %path.display(),
            default_timeout_ms = config.default_timeout_ms,
            overrides = config.timeouts.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<(), Error> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

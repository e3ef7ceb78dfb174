//! Configuration handling for the TUI

use crate::api::DEFAULT_BASE_URL;
use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const BASE_URL_ENV: &str = "FORMGATE_BASE_URL";
const OTP_TTL_ENV: &str = "FORMGATE_OTP_TTL_SECS";

const DEFAULT_OTP_TTL_SECS: u64 = 120;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// User configuration file contents; every field is optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Site backend address
    pub base_url: Option<String>,
    /// How long an emailed code stays usable before a resend is required
    pub otp_ttl_seconds: Option<u64>,
    /// Only accept digits in the code cells
    pub digits_only: Option<bool>,
    /// Per-request HTTP timeout
    pub request_timeout_secs: Option<u64>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub otp_ttl_seconds: u64,
    pub digits_only: bool,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECS,
            digits_only: true,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "formgate", "formgate")
}

impl ClientConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let config: ClientConfig = serde_json::from_str(&content)
                    .with_context(|| format!("Invalid config file {}", path.display()))?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Apply environment overrides and defaults
    pub fn resolve_with<F>(self, env: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let base_url = env(BASE_URL_ENV)
            .or(self.base_url)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.base_url);

        let otp_ttl_seconds = match env(OTP_TTL_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{OTP_TTL_ENV} must be a number of seconds"))?,
            None => self.otp_ttl_seconds.unwrap_or(defaults.otp_ttl_seconds),
        };
        if otp_ttl_seconds == 0 {
            bail!("otp_ttl_seconds must be greater than zero");
        }

        Ok(Settings {
            base_url,
            otp_ttl_seconds,
            digits_only: self.digits_only.unwrap_or(defaults.digits_only),
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        })
    }
}

impl Settings {
    /// Environment overrides the config file; defaults fill the rest
    pub fn load() -> Result<Self> {
        ClientConfig::load()?.resolve_with(|key| std::env::var(key).ok())
    }
}

/// Where the log file goes; `None` if no home directory can be found
pub fn log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("formgate.log"))
}

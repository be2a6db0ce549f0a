//! # Configuration
//!
//! Run settings loaded from environment variables, then overridden by CLI flags.

use crate::constants::{
    DEFAULT_CONFIRM_DELAY_SECS, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS,
    DEFAULT_WARNING_DELAY_SECS,
};
use crate::renewal::PollSettings;
use clap::ValueEnum;
use std::str::FromStr;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

/// Settings for a single audit run
///
/// All settings have defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// Only certificates whose issuer-name annotation equals this are affected.
    /// `None` or empty disables filtering.
    pub issuer_name: Option<String>,
    /// Drive renewals for affected certificates; otherwise report only
    pub renew: bool,
    /// Interval between checks for a new CertificateRequest
    pub poll_interval: Duration,
    /// Ceiling for waiting on a new CertificateRequest
    pub poll_timeout: Duration,
    /// Interrupt window before anything runs when `renew` is set.
    /// Always [`DEFAULT_WARNING_DELAY_SECS`] outside of tests.
    pub warning_delay: Duration,
    /// Delay between listing the affected certificates and the first renewal
    pub confirm_delay: Duration,
    pub log_format: LogFormat,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            issuer_name: None,
            renew: false,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            warning_delay: Duration::from_secs(DEFAULT_WARNING_DELAY_SECS),
            confirm_delay: Duration::from_secs(DEFAULT_CONFIRM_DELAY_SECS),
            log_format: LogFormat::Text,
        }
    }
}

impl AuditConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            issuer_name: None,
            renew: false,
            poll_interval: Duration::from_secs(env_var_or_default(
                "FORCE_RENEW_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )),
            poll_timeout: Duration::from_secs(env_var_or_default(
                "FORCE_RENEW_POLL_TIMEOUT_SECS",
                DEFAULT_POLL_TIMEOUT_SECS,
            )),
            // The interrupt window before any mutation is not configurable
            warning_delay: Duration::from_secs(DEFAULT_WARNING_DELAY_SECS),
            confirm_delay: Duration::from_secs(env_var_or_default(
                "FORCE_RENEW_CONFIRM_DELAY_SECS",
                DEFAULT_CONFIRM_DELAY_SECS,
            )),
            log_format: env_var_or_default("LOG_FORMAT", LogFormat::Text),
        }
    }

    /// The issuer filter, if one is in effect
    #[must_use]
    pub fn issuer_filter(&self) -> Option<&str> {
        self.issuer_name.as_deref().filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: self.poll_interval,
            timeout: self.poll_timeout,
        }
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

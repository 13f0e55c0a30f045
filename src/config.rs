//! # Gateway Configuration
//!
//! Defaults match the online-judge client. [`GatewayConfig::back_office`] is the variant used
//! by the admin console, which does not deduplicate requests. [`GatewayConfig::from_env`]
//! overrides individual fields from the environment.

use crate::gateway::auth_guard::DEFAULT_ALLOW_LIST;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50_000);
pub const DEFAULT_AUTH_DEBOUNCE: Duration = Duration::from_millis(1_500);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    /// Per-call ceiling. A call that exceeds it fails and frees its pending slot.
    pub timeout: Duration,
    pub auth_debounce: Duration,
    pub allow_list: Vec<String>,
    /// Route name of the login view.
    pub login_route: String,
    pub deduplicate: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            auth_debounce: DEFAULT_AUTH_DEBOUNCE,
            allow_list: DEFAULT_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
            login_route: "login".to_owned(),
            deduplicate: true,
        }
    }
}

impl GatewayConfig {
    pub fn back_office() -> Self {
        Self {
            deduplicate: false,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads `JUDGE_API_BASE_URL`, `JUDGE_API_TIMEOUT_MS`, `JUDGE_AUTH_DEBOUNCE_MS`
    /// and `JUDGE_DEDUPLICATE` on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            base_url: try_load(&lookup, "JUDGE_API_BASE_URL", defaults.base_url)?,
            timeout: Duration::from_millis(try_load(
                &lookup,
                "JUDGE_API_TIMEOUT_MS",
                millis(defaults.timeout),
            )?),
            auth_debounce: Duration::from_millis(try_load(
                &lookup,
                "JUDGE_AUTH_DEBOUNCE_MS",
                millis(defaults.auth_debounce),
            )?),
            deduplicate: try_load(&lookup, "JUDGE_DEDUPLICATE", defaults.deduplicate)?,
            ..defaults
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn try_load<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key: key.to_owned(),
                reason: e.to_string(),
            }
        }),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

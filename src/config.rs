//! Runtime configuration
//!
//! Values come from the environment first; command-line flags override them in `main`.

use std::time::Duration;

use crate::shared::constants::{
    LIMIT_GRACE_DELAY, QUOTA_LIMIT, STREAM_CHUNK_SIZE, STREAM_STEP_DELAY,
};
use crate::shared::errors::{AppError, Result};

pub const ENV_API_URL: &str = "TRANSCRIPT_CHAT_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "TRANSCRIPT_CHAT_TIMEOUT_SECS";
pub const ENV_QUOTA: &str = "TRANSCRIPT_CHAT_QUOTA";

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    /// `None` lets a call wait forever
    pub request_timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// Knobs of the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub quota_limit: u32,
    pub chunk_size: usize,
    pub step_delay: Duration,
    pub limit_grace_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            quota_limit: QUOTA_LIMIT,
            chunk_size: STREAM_CHUNK_SIZE,
            step_delay: STREAM_STEP_DELAY,
            limit_grace_delay: LIMIT_GRACE_DELAY,
        }
    }
}

impl SessionSettings {
    pub fn validate(&self) -> Result<()> {
        if self.quota_limit == 0 {
            return Err(AppError::Config("quota limit must be at least 1".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(AppError::Config("stream chunk size must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionSettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config.api.base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse::<u64>().ok()) {
            config.api.request_timeout = timeout_from_secs(secs);
        }

        if let Some(quota) = lookup(ENV_QUOTA).and_then(|q| q.trim().parse::<u32>().ok()) {
            config.session.quota_limit = quota;
        }

        config
    }
}

/// `0` disables the timeout
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.request_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.session.quota_limit, 5);
        assert_eq!(config.session.chunk_size, 8);
        assert_eq!(config.session.step_delay, Duration::from_millis(15));
        assert_eq!(config.session.limit_grace_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_API_URL, "http://backend:5001/"),
            (ENV_TIMEOUT_SECS, "0"),
            (ENV_QUOTA, "3"),
        ]));
        assert_eq!(config.api.base_url, "http://backend:5001");
        assert_eq!(config.api.request_timeout, None);
        assert_eq!(config.session.quota_limit, 3);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_TIMEOUT_SECS, "soon"),
            (ENV_QUOTA, "-1"),
        ]));
        assert_eq!(config.api.request_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.session.quota_limit, 5);
    }

    #[test]
    fn test_validate_rejects_zero_quota() {
        let settings = SessionSettings {
            quota_limit: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(AppError::Config(_))));
        assert!(SessionSettings::default().validate().is_ok());
    }
}

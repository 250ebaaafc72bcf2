use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::protocol::DEFAULT_BASE_URL;
use crate::types::SwingOrientation;

pub const DEFAULT_CACHE_SECONDS: u64 = 30;
pub const DEFAULT_REFRESH_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 3;

/// Platform configuration as handed over by the host.
///
/// Key names follow the host's JSON config block.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntesisConfig {
    #[serde(rename = "apiBaseURL", default = "default_base_url")]
    pub api_base_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_cache_seconds")]
    pub config_cache_seconds: u64,
    /// `"V"` drives swing from the vertical vane, anything else the horizontal one.
    #[serde(default)]
    pub swing_mode: SwingOrientation,
    /// Celsius used when a unit has no thermometer. `0` disables it.
    #[serde(default)]
    pub default_temperature: f64,
    /// Upper bound on one refresh pass. `0` disables the bound.
    #[serde(default = "default_refresh_timeout")]
    pub refresh_timeout_seconds: u64,
    /// Login-then-fetch rounds for the headers page per pass.
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_cache_seconds() -> u64 {
    DEFAULT_CACHE_SECONDS
}

fn default_refresh_timeout() -> u64 {
    DEFAULT_REFRESH_TIMEOUT_SECONDS
}

fn default_max_login_attempts() -> u32 {
    DEFAULT_MAX_LOGIN_ATTEMPTS
}

impl IntesisConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            api_base_url: default_base_url(),
            username: username.into(),
            password: password.into(),
            config_cache_seconds: DEFAULT_CACHE_SECONDS,
            swing_mode: SwingOrientation::default(),
            default_temperature: 0.0,
            refresh_timeout_seconds: DEFAULT_REFRESH_TIMEOUT_SECONDS,
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config_cache_seconds)
    }

    pub fn refresh_timeout(&self) -> Option<Duration> {
        (self.refresh_timeout_seconds > 0).then(|| Duration::from_secs(self.refresh_timeout_seconds))
    }
}

impl fmt::Debug for IntesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntesisConfig")
            .field("api_base_url", &self.api_base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("config_cache_seconds", &self.config_cache_seconds)
            .field("swing_mode", &self.swing_mode)
            .field("default_temperature", &self.default_temperature)
            .field("refresh_timeout_seconds", &self.refresh_timeout_seconds)
            .field("max_login_attempts", &self.max_login_attempts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let cfg: IntesisConfig =
            serde_json::from_str(r#"{"username": "u", "password": "p"}"#).unwrap();
        assert_eq!(cfg.api_base_url, "https://accloud.intesis.com/");
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(30));
        assert_eq!(cfg.swing_mode, SwingOrientation::Horizontal);
        assert_eq!(cfg.default_temperature, 0.0);
        assert_eq!(cfg.refresh_timeout(), Some(Duration::from_secs(60)));
        assert_eq!(cfg.max_login_attempts, 3);
    }

    #[test]
    fn host_key_names() {
        let cfg: IntesisConfig = serde_json::from_str(
            r#"{
                "apiBaseURL": "https://example.test",
                "username": "u",
                "password": "p",
                "configCacheSeconds": 120,
                "swingMode": "V",
                "defaultTemperature": 21.5,
                "refreshTimeoutSeconds": 0
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.api_base_url, "https://example.test");
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(120));
        assert_eq!(cfg.swing_mode, SwingOrientation::Vertical);
        assert_eq!(cfg.default_temperature, 21.5);
        assert_eq!(cfg.refresh_timeout(), None);
    }

    #[test]
    fn unknown_swing_value_is_horizontal() {
        let cfg: IntesisConfig =
            serde_json::from_str(r#"{"username": "u", "password": "p", "swingMode": "X"}"#)
                .unwrap();
        assert_eq!(cfg.swing_mode, SwingOrientation::Horizontal);
    }

    #[test]
    fn debug_redacts_password() {
        let cfg = IntesisConfig::new("user", "hunter2");
        let shown = format!("{cfg:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("user"));
    }
}

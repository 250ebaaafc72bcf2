use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{RefreshCache, RefreshOutcome};
use crate::config::{
    DEFAULT_CACHE_SECONDS, DEFAULT_MAX_LOGIN_ATTEMPTS, DEFAULT_REFRESH_TIMEOUT_SECONDS,
    IntesisConfig,
};
use crate::device::DeviceHandle;
use crate::extract::ExtractOptions;
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{DEFAULT_BASE_URL, normalize_base_url};
use crate::session::Session;
use crate::sync::ConfigSync;
use crate::types::SwingOrientation;
use crate::{Error, Result};

pub struct IntesisClientBuilder {
    base_url: String,
    username: String,
    password: String,
    cache_ttl: Duration,
    orientation: SwingOrientation,
    default_temperature: f64,
    refresh_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    max_login_attempts: u32,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl IntesisClientBuilder {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: username.into(),
            password: password.into(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_SECONDS),
            orientation: SwingOrientation::Horizontal,
            default_temperature: 0.0,
            refresh_timeout: Some(Duration::from_secs(DEFAULT_REFRESH_TIMEOUT_SECONDS)),
            request_timeout: None,
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            log_mode: None,
            log_path: None,
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn swing_orientation(mut self, orientation: SwingOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Celsius used when a unit reports no temperature. `0.0` disables it.
    pub fn default_temperature(mut self, celsius: f64) -> Self {
        self.default_temperature = celsius;
        self
    }

    /// Bound on one refresh pass. `None` lets a hung pass block refreshes.
    pub fn refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    /// Per-request transport timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Headers fetches per pass, each after a fresh login if the session
    /// dropped. A rejected login is not retried.
    pub fn max_login_attempts(mut self, attempts: u32) -> Self {
        self.max_login_attempts = attempts;
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<IntesisClient> {
        if self.username.is_empty() {
            return Err(Error::Config("username is required".to_string()));
        }

        let mut http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = self.request_timeout {
            http = http.timeout(timeout);
        }
        let http = http.build()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        let base_url = normalize_base_url(&self.base_url);
        debug!(base_url = %base_url, ttl = ?self.cache_ttl, "building client");

        let session = Arc::new(Session::new(
            http,
            base_url,
            self.username,
            self.password,
            logger,
        ));
        let options = ExtractOptions {
            default_temperature: self.default_temperature,
            orientation: self.orientation,
        };
        let sync = ConfigSync::new(session, options, self.max_login_attempts);
        let cache = RefreshCache::new(sync, self.cache_ttl, self.refresh_timeout);

        Ok(IntesisClient {
            cache: Arc::new(cache),
        })
    }
}

/// Entry point: discovers devices and hands out per-device handles.
pub struct IntesisClient {
    cache: Arc<RefreshCache>,
}

impl IntesisClient {
    pub fn builder(username: impl Into<String>, password: impl Into<String>) -> IntesisClientBuilder {
        IntesisClientBuilder::new(username, password)
    }

    pub fn from_config(config: &IntesisConfig) -> Result<Self> {
        IntesisClientBuilder::new(config.username.clone(), config.password.clone())
            .base_url(config.api_base_url.clone())
            .cache_ttl(config.cache_ttl())
            .swing_orientation(config.swing_mode)
            .default_temperature(config.default_temperature)
            .refresh_timeout(config.refresh_timeout())
            .max_login_attempts(config.max_login_attempts)
            .build()
    }

    /// Run one full pass and register every named device not seen before.
    ///
    /// Devices already registered take the fetched state like any refresh.
    /// Returns handles for all registered devices.
    pub async fn discover(&self) -> Result<Vec<DeviceHandle>> {
        let report = self.cache.fetch_all().await?;
        for device in &report.devices {
            if device.name.as_str().is_empty() {
                warn!(device_id = %device.device_id, "device had no name, not added");
                continue;
            }
            if !self.cache.register(device.clone()) {
                debug!(name = %device.name, "already instantiated");
            }
        }
        let handles = self.devices();
        info!(count = handles.len(), "devices ready");
        Ok(handles)
    }

    pub fn devices(&self) -> Vec<DeviceHandle> {
        self.cache
            .names()
            .into_iter()
            .filter_map(|name| self.device(name.as_str()))
            .collect()
    }

    pub fn device(&self, name: &str) -> Option<DeviceHandle> {
        let device = self.cache.device(name)?;
        Some(DeviceHandle::new(
            device.name,
            device.device_id,
            Arc::clone(&self.cache),
        ))
    }

    pub async fn refresh(&self, reason: &str) -> RefreshOutcome {
        self.cache.refresh(reason).await
    }

    pub fn session(&self) -> &Session {
        self.cache.session()
    }

    pub fn cache(&self) -> &Arc<RefreshCache> {
        &self.cache
    }
}

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, trace, warn};

use crate::extract::{self, DeviceHeader, ExtractOptions};
use crate::protocol::{HEADERS_PATH, vista_path};
use crate::session::Session;
use crate::types::{Device, DeviceName, Services};
use crate::{Error, Result};

/// Result of one synchronization pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub devices: Vec<Device>,
}

impl SyncReport {
    /// Every device's state page was fetched and parsed.
    pub fn is_clean(&self) -> bool {
        self.devices.iter().all(|d| d.services.is_some())
    }

    pub fn failed(&self) -> usize {
        self.devices.iter().filter(|d| d.services.is_none()).count()
    }
}

/// Fetches the device list and every device's state page.
pub struct ConfigSync {
    session: Arc<Session>,
    options: ExtractOptions,
    max_login_attempts: u32,
}

impl ConfigSync {
    pub fn new(session: Arc<Session>, options: ExtractOptions, max_login_attempts: u32) -> Self {
        Self {
            session,
            options,
            max_login_attempts: max_login_attempts.max(1),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// One full synchronization.
    ///
    /// Login failure or an empty device list aborts the pass. A device whose
    /// page cannot be fetched or parsed comes back with `services: None`
    /// without affecting the others.
    pub async fn get_config(&self) -> Result<SyncReport> {
        let headers = self.fetch_headers().await?;
        let listed = extract::device_list(&headers).inspect_err(|_| {
            trace!(body = %headers, "headers page without devices");
        })?;
        debug!(count = listed.len(), "devices listed");

        let states = join_all(listed.iter().map(|h| self.fetch_state(h))).await;

        let devices: Vec<Device> = listed
            .into_iter()
            .zip(states)
            .map(|(header, services)| Device {
                device_id: header.device_id,
                name: DeviceName::new(header.name),
                services,
            })
            .collect();

        let report = SyncReport { devices };
        if let Ok(dump) = serde_json::to_string_pretty(&report.devices) {
            trace!(devices = %dump, "config fetched");
        }
        Ok(report)
    }

    /// Headers page, logging in first whenever the session is logged out.
    ///
    /// `max_login_attempts` bounds the headers fetches; each one is preceded
    /// by a login when needed. A failed login ends the loop immediately.
    async fn fetch_headers(&self) -> Result<String> {
        let mut last_err = Error::SessionExpired;
        for attempt in 1..=self.max_login_attempts {
            if !self.session.is_logged_in() {
                self.session.login().await?;
            }
            match self.session.fetch_authenticated(HEADERS_PATH).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    debug!(attempt, error = %e, "headers unavailable, retrying after login");
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    async fn fetch_state(&self, header: &DeviceHeader) -> Option<Services> {
        let path = vista_path(&header.device_id);
        let result = match self.session.fetch(&path).await {
            Ok(body) => extract::device_state(&body, &self.options),
            Err(e) => Err(e),
        };
        match result {
            Ok(services) => Some(services),
            Err(e) => {
                warn!(device_id = %header.device_id, name = %header.name, error = %e, "device state unavailable");
                None
            }
        }
    }
}

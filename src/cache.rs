//! Time-boxed cache in front of the synchronizer.
//!
//! Reads inside the TTL of the last clean pass never touch the network.
//! Outside it, concurrent callers share a single in-flight pass and all
//! resolve with its outcome. A pass runs on its own task and completes even
//! when nobody is left waiting for it.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::sync::{ConfigSync, SyncReport};
use crate::session::Session;
use crate::types::{Device, DeviceName, Services};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Within the TTL; nothing fetched.
    Cached,
    /// Every device refreshed; freshness timestamp advanced.
    Clean,
    /// Some devices failed; the rest were applied, cache stays stale.
    Partial { failed: usize },
    /// Login failed or no devices found; nothing applied.
    Failed,
    /// The pass exceeded the refresh timeout.
    TimedOut,
}

type CycleResult = std::result::Result<Arc<SyncReport>, Arc<Error>>;
type Flight = Shared<BoxFuture<'static, CycleResult>>;

#[derive(Default)]
struct CacheMeta {
    last_fetch: Option<Instant>,
    in_flight: Option<Flight>,
}

impl CacheMeta {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.last_fetch.is_some_and(|t| t.elapsed() <= ttl)
    }
}

fn outcome_of(result: &CycleResult) -> RefreshOutcome {
    match result {
        Ok(report) => match report.failed() {
            0 => RefreshOutcome::Clean,
            failed => RefreshOutcome::Partial { failed },
        },
        Err(e) if matches!(**e, Error::Timeout(_)) => RefreshOutcome::TimedOut,
        Err(_) => RefreshOutcome::Failed,
    }
}

/// Owns the device registry and decides when the synchronizer runs.
pub struct RefreshCache {
    sync: ConfigSync,
    ttl: Duration,
    refresh_timeout: Option<Duration>,
    meta: Mutex<CacheMeta>,
    devices: RwLock<BTreeMap<DeviceName, Device>>,
}

impl RefreshCache {
    pub fn new(sync: ConfigSync, ttl: Duration, refresh_timeout: Option<Duration>) -> Self {
        Self {
            sync,
            ttl,
            refresh_timeout,
            meta: Mutex::new(CacheMeta::default()),
            devices: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        self.sync.session()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_fresh(&self) -> bool {
        self.meta.lock().is_fresh(self.ttl)
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        self.meta.lock().last_fetch
    }

    pub fn is_refreshing(&self) -> bool {
        self.meta.lock().in_flight.is_some()
    }

    /// Bring the registry up to date unless the last clean pass is recent.
    ///
    /// Never fails: a failed pass leaves the previous state in place.
    pub async fn refresh(self: &Arc<Self>, reason: &str) -> RefreshOutcome {
        let flight = {
            let mut meta = self.meta.lock();
            if meta.is_fresh(self.ttl) {
                debug!(reason, "using cached data");
                return RefreshOutcome::Cached;
            }
            self.join_or_start(&mut meta, reason)
        };
        outcome_of(&flight.await)
    }

    /// Full pass regardless of freshness, used at discovery time.
    ///
    /// Joins a pass already in flight instead of starting a second one.
    pub async fn fetch_all(self: &Arc<Self>) -> Result<Arc<SyncReport>> {
        let flight = {
            let mut meta = self.meta.lock();
            self.join_or_start(&mut meta, "discovery")
        };
        flight
            .await
            .map_err(|e| Arc::try_unwrap(e).unwrap_or_else(Error::Shared))
    }

    // Caller holds the meta lock across the spawn: the task cannot clear
    // `in_flight` before it is set.
    fn join_or_start(self: &Arc<Self>, meta: &mut CacheMeta, reason: &str) -> Flight {
        if let Some(flight) = meta.in_flight.clone() {
            debug!(reason, "refresh in progress, joining");
            return flight;
        }
        debug!(reason, "refreshing config");
        let task = tokio::spawn(Arc::clone(self).run_cycle());
        let flight = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Arc::new(Error::Task(e))),
            }
        }
        .boxed()
        .shared();
        meta.in_flight = Some(flight.clone());
        flight
    }

    async fn run_cycle(self: Arc<Self>) -> CycleResult {
        let result = match self.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, self.sync.get_config())
                .await
                .unwrap_or_else(|_| Err(Error::Timeout(limit))),
            None => self.sync.get_config().await,
        };
        let result = result.map(Arc::new).map_err(Arc::new);

        match &result {
            Ok(report) => {
                self.apply(&report.devices);
                if !report.is_clean() {
                    warn!(failed = report.failed(), "config refresh incomplete");
                }
            }
            Err(e) if matches!(**e, Error::Timeout(_)) => {
                warn!(error = %e, "config refresh timed out");
            }
            Err(e) => warn!(error = %e, "config refresh failed"),
        }

        let mut meta = self.meta.lock();
        meta.in_flight = None;
        if outcome_of(&result) == RefreshOutcome::Clean {
            meta.last_fetch = Some(Instant::now());
        }
        result
    }

    /// Add a device unless one with the same name is already known.
    pub(crate) fn register(&self, device: Device) -> bool {
        let mut registry = self.devices.write();
        if registry.contains_key(&device.name) {
            return false;
        }
        info!(name = %device.name, device_id = %device.device_id, "device added");
        registry.insert(device.name.clone(), device);
        true
    }

    /// Replace known devices wholesale by name. Unknown names are ignored and
    /// a device without state keeps what it had.
    fn apply(&self, devices: &[Device]) {
        let mut registry = self.devices.write();
        for device in devices {
            let Some(entry) = registry.get_mut(device.name.as_str()) else {
                continue;
            };
            if device.services.is_none() {
                debug!(name = %device.name, "keeping previous state");
                continue;
            }
            *entry = device.clone();
        }
    }

    pub fn device(&self, name: &str) -> Option<Device> {
        self.devices.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<DeviceName> {
        self.devices.read().keys().cloned().collect()
    }

    pub(crate) fn with_services<R>(&self, name: &str, f: impl FnOnce(&Services) -> R) -> Option<R> {
        self.devices
            .read()
            .get(name)
            .and_then(|d| d.services.as_ref())
            .map(f)
    }

    pub(crate) fn update_services(&self, name: &str, f: impl FnOnce(&mut Services)) -> bool {
        match self
            .devices
            .write()
            .get_mut(name)
            .and_then(|d| d.services.as_mut())
        {
            Some(services) => {
                f(services);
                true
            }
            None => false,
        }
    }
}

//! Blocking configuration snapshots.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use color_eyre::eyre::{WrapErr as _, eyre};

/// Values as they sit in the store, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawConfig {
    #[serde(rename = "blocking_enabled")]
    pub enabled: Option<bool>,
    pub blocked_apps: Option<String>,
}

/// Read-only configuration store.
pub trait ConfigStore: Send + Sync {
    /// Read the current raw values.
    fn read_raw(&self) -> color_eyre::eyre::Result<RawConfig>;
}

/// Snapshot of the blocking configuration for a single event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockingConfig {
    pub enabled: bool,
    pub blocked_ids: HashSet<String>,
}

impl BlockingConfig {
    /// Configuration that never blocks.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Apply defaults to raw store values.
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            enabled: raw.enabled.unwrap_or(false),
            blocked_ids: raw
                .blocked_apps
                .as_deref()
                .map(parse_blocked_ids)
                .unwrap_or_default(),
        }
    }
}

/// Parse a comma-separated list of app ids.
///
/// Entries are trimmed; empty entries are dropped. No other normalization.
pub fn parse_blocked_ids(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Take a fresh snapshot. Read failures yield a disabled config.
pub fn snapshot<S: ConfigStore + ?Sized>(store: &S) -> BlockingConfig {
    match store.read_raw() {
        Ok(raw) => BlockingConfig::from_raw(raw),
        Err(e) => {
            tracing::debug!(error = %e, "config read failed, blocking disabled");
            BlockingConfig::disabled()
        }
    }
}

/// Store wrapper that gives up on reads slower than a deadline.
///
/// At most one read runs at a time. While an abandoned read is still
/// outstanding, further reads fail immediately.
pub struct BoundedStore<S> {
    inner: Arc<S>,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

impl<S> BoundedStore<S> {
    /// Wrap `inner`, abandoning reads after `timeout`.
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<S: ConfigStore + 'static> ConfigStore for BoundedStore<S> {
    fn read_raw(&self) -> color_eyre::eyre::Result<RawConfig> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(eyre!("previous config read still pending"));
        }

        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let in_flight = Arc::clone(&self.in_flight);

        // A reader that misses the deadline finishes in the background.
        let spawned = std::thread::Builder::new()
            .name("config-read".into())
            .spawn(move || {
                let result = inner.read_raw();
                in_flight.store(false, Ordering::Release);
                let _ = tx.send(result);
            });
        if let Err(e) = spawned {
            self.in_flight.store(false, Ordering::Release);
            return Err(e).wrap_err("failed to spawn config reader");
        }

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                Err(eyre!("config read timed out after {:?}", self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(eyre!("config reader exited early")),
        }
    }
}

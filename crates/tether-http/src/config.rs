//! Client configuration and submission-time snapshots

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Minimum interval between two expiry sweeps of the request table.
pub(crate) const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// How long an unclaimed terminal outcome is retained before a sweep may
/// evict it.
pub(crate) const RETAIN_FOR: Duration = Duration::from_secs(20);

/// Mutable per-client configuration.
///
/// Header and query-parameter maps are last-write-wins; insertion order is
/// irrelevant. The owning context serializes mutation against
/// submission-time snapshotting, so a change never affects an
/// already-dispatched request.
#[derive(Debug)]
pub struct ClientConfig {
    headers: HashMap<String, String>,
    params: HashMap<String, String>,
    clear_expires_enabled: bool,
    last_sweep: Instant,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            headers: HashMap::new(),
            params: HashMap::new(),
            clear_expires_enabled: true,
            last_sweep: Instant::now(),
        }
    }

    /// Insert or overwrite one outgoing header.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(key.into(), value.into());
    }

    /// Drop all configured headers.
    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    /// Insert or overwrite one query parameter.
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Drop all configured query parameters.
    pub fn clear_params(&mut self) {
        self.params.clear();
    }

    /// Toggle the pre-submission expiry sweep. Re-enabling resets the sweep
    /// clock.
    pub fn set_clear_expires_enabled(&mut self, enabled: bool) {
        self.clear_expires_enabled = enabled;
        if enabled {
            self.last_sweep = Instant::now();
        }
    }

    pub fn clear_expires_enabled(&self) -> bool {
        self.clear_expires_enabled
    }

    /// Whether a sweep is due now; advances the sweep clock when it is.
    pub(crate) fn sweep_due(&mut self) -> bool {
        if !self.clear_expires_enabled {
            return false;
        }
        if self.last_sweep.elapsed() >= SWEEP_INTERVAL {
            self.last_sweep = Instant::now();
            true
        } else {
            false
        }
    }

    /// Freeze the current configuration together with one request's URL and
    /// optional body.
    pub fn snapshot(&self, url: String, body: Option<Vec<u8>>) -> RequestSnapshot {
        RequestSnapshot {
            url,
            body,
            headers: self.headers.clone(),
            params: self.params.clone(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The frozen copy of configuration taken at submission time, immune to
/// later mutation. Absence of a body makes the operation GET-shaped;
/// presence makes it POST-shaped.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub url: String,
    pub body: Option<Vec<u8>>,
    pub headers: HashMap<String, String>,
    pub params: HashMap<String, String>,
}

impl RequestSnapshot {
    /// Build a snapshot directly, outside any client context.
    pub fn bare(url: impl Into<String>, body: Option<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            body,
            headers: HashMap::new(),
            params: HashMap::new(),
        }
    }

    pub fn is_post(&self) -> bool {
        self.body.is_some()
    }
}

//! Client context: configuration, dispatch and lifecycle queries

use std::sync::{Arc, RwLock, RwLockWriteGuard};

use tether_core::{NetRuntime, TransportError};
use tracing::debug;

use crate::config::{ClientConfig, RETAIN_FOR};
use crate::error::TableResult;
use crate::response::ResponseData;
use crate::table::{PollStatus, RequestId, RequestOutcome, RequestTable};
use crate::transport::{HttpTransport, ReqwestTransport};

/// An embeddable HTTP client context.
///
/// Owns the outgoing configuration (headers, query parameters, feature
/// flags) and a [`RequestTable`] tracking every request it issued. All
/// methods take `&self` and may be called from any caller thread;
/// submission and configuration never block on I/O.
///
/// Dropping the context invalidates every identifier it issued. Tasks
/// still in flight hold their own reference to their slot and to the
/// table's storage, so they complete without touching freed memory.
pub struct ClientContext {
    transport: Arc<dyn HttpTransport>,
    table: Arc<RequestTable>,
    config: RwLock<ClientConfig>,
}

impl ClientContext {
    /// Build a context over an arbitrary transport capability.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            table: Arc::new(RequestTable::new()),
            config: RwLock::new(ClientConfig::new()),
        }
    }

    /// Build a context over the production reqwest transport.
    pub fn with_reqwest(decompress: bool, persist_cookies: bool) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(
            decompress,
            persist_cookies,
        )?)))
    }

    /// Insert or overwrite one outgoing header. Last write wins.
    pub fn add_header(&self, key: impl Into<String>, value: impl Into<String>) {
        self.config_write().add_header(key, value);
    }

    /// Drop all configured headers.
    pub fn clear_headers(&self) {
        self.config_write().clear_headers();
    }

    /// Insert or overwrite one query parameter. Last write wins.
    pub fn add_param(&self, key: impl Into<String>, value: impl Into<String>) {
        self.config_write().add_param(key, value);
    }

    /// Drop all configured query parameters.
    pub fn clear_params(&self) {
        self.config_write().clear_params();
    }

    /// Toggle the pre-submission expiry sweep.
    pub fn set_clear_expires_enabled(&self, enabled: bool) {
        self.config_write().set_clear_expires_enabled(enabled);
    }

    /// Submit a GET-shaped request. Returns the new identifier immediately;
    /// transport errors surface later as a Failed state, never here.
    pub fn submit_get(&self, runtime: &NetRuntime, url: impl Into<String>) -> RequestId {
        self.submit(runtime, url.into(), None)
    }

    /// Submit a POST-shaped request carrying `body`.
    pub fn submit_post(
        &self,
        runtime: &NetRuntime,
        url: impl Into<String>,
        body: Vec<u8>,
    ) -> RequestId {
        self.submit(runtime, url.into(), Some(body))
    }

    fn submit(&self, runtime: &NetRuntime, url: String, body: Option<Vec<u8>>) -> RequestId {
        // Snapshot under the config lock: mutations serialize against
        // request construction here, never against running tasks.
        let (snapshot, sweep_due) = {
            let mut config = self.config_write();
            let snapshot = config.snapshot(url, body);
            (snapshot, config.sweep_due())
        };

        if sweep_due {
            let evicted = self.table.sweep_expired(RETAIN_FOR);
            if evicted > 0 {
                debug!(evicted, "expired request entries swept");
            }
        }

        let (id, slot) = self.table.insert();
        let transport = Arc::clone(&self.transport);
        debug!(%id, url = %snapshot.url, post = snapshot.is_post(), "request dispatched");

        runtime.spawn(async move {
            let outcome = match transport.send(&snapshot).await {
                Ok(response) => RequestOutcome::Success(ResponseData::from(response)),
                Err(error) => RequestOutcome::Failure(error.to_string()),
            };
            if !slot.complete(outcome) {
                debug!(%id, "terminal write discarded, slot already terminal");
            }
        });

        id
    }

    /// Non-blocking state query for one identifier.
    pub fn poll(&self, id: RequestId) -> PollStatus {
        self.table.poll(id)
    }

    /// Retrieve a Succeeded response, transferring buffer ownership to the
    /// caller. Valid only once per outcome.
    pub fn take_response(&self, id: RequestId) -> TableResult<ResponseData> {
        self.table.take_response(id)
    }

    /// Retrieve a Failed request's captured description. Valid only once
    /// per outcome.
    pub fn take_error(&self, id: RequestId) -> TableResult<String> {
        self.table.take_error(id)
    }

    /// Evict one entry. Safe on any state, including NotFound; on Pending
    /// the eventual outcome is discarded while the network operation runs
    /// to completion on the runtime.
    pub fn remove(&self, id: RequestId) {
        self.table.remove(id);
    }

    /// Number of tracked entries (in-flight plus unclaimed outcomes).
    pub fn tracked_requests(&self) -> usize {
        self.table.len()
    }

    fn config_write(&self) -> RwLockWriteGuard<'_, ClientConfig> {
        match self.config.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

//! Embedding hub: typed handles over client and stream contexts
//!
//! The hub mirrors the flat operation surface an embedder expects (create
//! and destroy contexts, configure, submit, poll, retrieve, stream) but
//! replaces raw-pointer handles with generation-tagged typed handles. A
//! destroyed or recycled handle resolves to an error value, never to a
//! dangling reference.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use tether_core::{CookiePair, Handle, HandleMap, NetRuntime};
use tether_http::{ClientContext, HttpTransport, PollStatus, RequestId, ResponseData};
use tether_ws::{StreamContext, StreamMessage, TungsteniteTransport, WsTransport};

use crate::error::{TetherError, TetherResult};

/// Handle naming one client context owned by a [`Hub`].
pub type ClientHandle = Handle<ClientContext>;

/// Handle naming one stream context owned by a [`Hub`].
pub type StreamHandle = Handle<StreamContext>;

/// The embedding facade: one worker runtime plus registries of client and
/// stream contexts.
///
/// All operations take `&self`; registry locks are held only to resolve a
/// handle, never across I/O or a blocking wait. The hub owns its runtime,
/// so contexts can never outlive the pool driving them.
pub struct Hub {
    runtime: NetRuntime,
    clients: Mutex<HandleMap<ClientContext>>,
    streams: Mutex<HandleMap<StreamContext>>,
}

impl Hub {
    /// Build a hub whose runtime has `thread_count` worker threads.
    pub fn new(thread_count: u32) -> TetherResult<Self> {
        Ok(Self {
            runtime: NetRuntime::new(thread_count)?,
            clients: Mutex::new(HandleMap::new()),
            streams: Mutex::new(HandleMap::new()),
        })
    }

    /// The worker runtime driving this hub's contexts.
    pub fn runtime(&self) -> &NetRuntime {
        &self.runtime
    }

    // ---- clients ----

    /// Create a client context over the production HTTP transport.
    ///
    /// `decompress` enables brotli decompression; `persist_cookies` gives
    /// the context its own persistent cookie store.
    pub fn client_create(
        &self,
        decompress: bool,
        persist_cookies: bool,
    ) -> TetherResult<ClientHandle> {
        let context = ClientContext::with_reqwest(decompress, persist_cookies)?;
        Ok(self.lock_clients().insert(context))
    }

    /// Create a client context over an arbitrary transport capability.
    pub fn client_create_with(&self, transport: Arc<dyn HttpTransport>) -> ClientHandle {
        self.lock_clients().insert(ClientContext::new(transport))
    }

    /// Destroy a client context, invalidating its handle and every request
    /// identifier it issued. Tasks still in flight finish against their own
    /// table reference.
    pub fn client_destroy(&self, client: ClientHandle) -> TetherResult<()> {
        self.lock_clients().remove(client)?;
        debug!(?client, "client context destroyed");
        Ok(())
    }

    /// Insert or overwrite one outgoing header on a client.
    pub fn add_header(
        &self,
        client: ClientHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> TetherResult<()> {
        self.client(client)?.add_header(key, value);
        Ok(())
    }

    /// Drop all configured headers on a client.
    pub fn clear_headers(&self, client: ClientHandle) -> TetherResult<()> {
        self.client(client)?.clear_headers();
        Ok(())
    }

    /// Insert or overwrite one query parameter on a client.
    pub fn add_param(
        &self,
        client: ClientHandle,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> TetherResult<()> {
        self.client(client)?.add_param(key, value);
        Ok(())
    }

    /// Drop all configured query parameters on a client.
    pub fn clear_params(&self, client: ClientHandle) -> TetherResult<()> {
        self.client(client)?.clear_params();
        Ok(())
    }

    /// Toggle a client's pre-submission expiry sweep.
    pub fn set_clear_expires_enabled(
        &self,
        client: ClientHandle,
        enabled: bool,
    ) -> TetherResult<()> {
        self.client(client)?.set_clear_expires_enabled(enabled);
        Ok(())
    }

    // ---- requests ----

    /// Submit a GET-shaped request on a client.
    pub fn submit_get(
        &self,
        client: ClientHandle,
        url: impl Into<String>,
    ) -> TetherResult<RequestId> {
        Ok(self.client(client)?.submit_get(&self.runtime, url))
    }

    /// Submit a POST-shaped request carrying `body` on a client.
    pub fn submit_post(
        &self,
        client: ClientHandle,
        url: impl Into<String>,
        body: Vec<u8>,
    ) -> TetherResult<RequestId> {
        Ok(self.client(client)?.submit_post(&self.runtime, url, body))
    }

    /// Non-blocking state query for one request identifier.
    pub fn poll(&self, client: ClientHandle, id: RequestId) -> TetherResult<PollStatus> {
        Ok(self.client(client)?.poll(id))
    }

    /// Retrieve a Succeeded response, transferring buffer ownership to the
    /// caller.
    pub fn take_response(
        &self,
        client: ClientHandle,
        id: RequestId,
    ) -> TetherResult<ResponseData> {
        Ok(self.client(client)?.take_response(id)?)
    }

    /// Retrieve a Failed request's captured description.
    pub fn take_error(&self, client: ClientHandle, id: RequestId) -> TetherResult<String> {
        Ok(self.client(client)?.take_error(id)?)
    }

    /// Evict one request entry. Safe on any state, including NotFound.
    pub fn remove(&self, client: ClientHandle, id: RequestId) -> TetherResult<()> {
        self.client(client)?.remove(id);
        Ok(())
    }

    // ---- streams ----

    /// Open a stream over the production WebSocket transport.
    ///
    /// `cookies_json` is the embedder wire format
    /// (`[{"key": "...", "value": "..."}]`); `None` or an empty string
    /// attaches no cookies.
    pub fn ws_connect(
        &self,
        url: impl Into<String>,
        cookies_json: Option<&str>,
    ) -> TetherResult<StreamHandle> {
        let cookies = parse_cookies(cookies_json)?;
        let context =
            StreamContext::connect(&self.runtime, Arc::new(TungsteniteTransport), url, cookies);
        Ok(self.lock_streams().insert(context))
    }

    /// Open a stream over an arbitrary transport capability.
    pub fn ws_connect_with(
        &self,
        transport: Arc<dyn WsTransport>,
        url: impl Into<String>,
        cookies: Vec<CookiePair>,
    ) -> StreamHandle {
        let context = StreamContext::connect(&self.runtime, transport, url, cookies);
        self.lock_streams().insert(context)
    }

    /// Queue one outbound binary frame on a stream.
    pub fn ws_send(&self, stream: StreamHandle, bytes: Vec<u8>) -> TetherResult<()> {
        self.stream(stream)?.send(bytes)?;
        Ok(())
    }

    /// Dequeue the next inbound message, blocking the calling thread.
    ///
    /// The registry lock is released before the wait: other hub operations
    /// proceed while this caller is parked.
    pub fn ws_receive(&self, stream: StreamHandle) -> TetherResult<StreamMessage> {
        let context = self.stream(stream)?;
        Ok(context.receive()?)
    }

    /// Close a stream and destroy its context. The handle is stale
    /// afterwards; queued-but-undelivered inbound messages are dropped.
    pub fn ws_close(&self, stream: StreamHandle) -> TetherResult<()> {
        let context = self.lock_streams().remove(stream)?;
        context.close();
        debug!(?stream, "stream context destroyed");
        Ok(())
    }

    fn client(&self, handle: ClientHandle) -> TetherResult<Arc<ClientContext>> {
        Ok(self.lock_clients().get(handle)?)
    }

    fn stream(&self, handle: StreamHandle) -> TetherResult<Arc<StreamContext>> {
        Ok(self.lock_streams().get(handle)?)
    }

    fn lock_clients(&self) -> MutexGuard<'_, HandleMap<ClientContext>> {
        match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_streams(&self) -> MutexGuard<'_, HandleMap<StreamContext>> {
        match self.streams.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn parse_cookies(json: Option<&str>) -> TetherResult<Vec<CookiePair>> {
    match json {
        None => Ok(Vec::new()),
        Some(text) if text.trim().is_empty() => Ok(Vec::new()),
        Some(text) => {
            serde_json::from_str(text).map_err(|e| TetherError::InvalidCookies(e.to_string()))
        }
    }
}

//! # Tether
//!
//! Tether is an embeddable asynchronous network client: a caller living
//! outside the async runtime submits HTTP requests and WebSocket
//! connections, receives an opaque handle immediately, and later polls for
//! completion without blocking its own thread.
//!
//! ## Core components
//!
//! - **[`NetRuntime`]**: fixed-size pool of worker threads executing the
//!   network tasks; owns nothing about requests, only schedules them
//! - **[`ClientContext`]**: outgoing configuration plus the request table,
//!   the concurrent mapping that lets a synchronous caller observe
//!   asynchronous results by identifier
//! - **[`StreamContext`]**: one live duplex connection with a bounded
//!   inbound queue and a blocking `receive`
//! - **[`Hub`]**: the embedding facade, with typed generation-tagged
//!   handles over contexts, so a stale handle is a detectable error rather
//!   than a dangling reference
//!
//! The underlying HTTP and WebSocket mechanics are delegated: the engine
//! consumes them through the minimal [`HttpTransport`] and [`WsTransport`]
//! capabilities, with production implementations over reqwest and
//! tokio-tungstenite.
//!
//! ## Quick start
//!
//! ```no_run
//! use tether::{Hub, PollStatus};
//!
//! let hub = Hub::new(2).expect("runtime");
//! let client = hub.client_create(false, false).expect("client");
//!
//! let id = hub.submit_get(client, "https://example.org/").expect("submit");
//! loop {
//!     match hub.poll(client, id).expect("live handle") {
//!         PollStatus::Pending => std::thread::sleep(std::time::Duration::from_millis(10)),
//!         _ => break,
//!     }
//! }
//! let response = hub.take_response(client, id).expect("response");
//! println!("{} ({} bytes)", response.status, response.body.len());
//! ```

pub mod error;
pub mod hub;

pub use error::{TetherError, TetherResult};
pub use hub::{ClientHandle, Hub, StreamHandle};

pub use tether_core::{
    CookiePair, Handle, HandleError, HandleMap, NetRuntime, Payload, RuntimeError, TransportError,
};
pub use tether_http::{
    ClientConfig, ClientContext, HttpTransport, HttpVersion, PollStatus, ReqwestTransport,
    RequestId, RequestSnapshot, RequestTable, ResponseData, TableError, TransportResponse,
};
pub use tether_ws::{
    InboundFrame, MessageKind, OutboundFrame, StreamContext, StreamError, StreamMessage,
    StreamState, TungsteniteTransport, WsTransport,
};

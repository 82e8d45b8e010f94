//! # Tether WS
//!
//! The duplex half of tether: one [`StreamContext`] per live WebSocket
//! connection. The caller sends frames without blocking and drains a
//! bounded inbound queue with a blocking `receive`; the connection itself
//! is driven by a task on the worker runtime.
//!
//! Unlike requests there is no identifier table here: a stream context is
//! a single long-lived handle, not a polled-by-id operation.

pub mod error;
pub mod message;
pub mod queue;
pub mod stream;
pub mod transport;

pub use error::{StreamError, StreamResult};
pub use message::{MessageKind, StreamMessage};
pub use queue::{InboundQueue, StreamState};
pub use stream::StreamContext;
pub use transport::{
    InboundFrame, OutboundFrame, TungsteniteTransport, WsSink, WsSource, WsTransport,
};

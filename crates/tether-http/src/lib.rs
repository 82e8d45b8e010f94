//! # Tether HTTP
//!
//! The request/response half of tether: a synchronous caller submits HTTP
//! requests, receives an identifier immediately, and later polls for the
//! outcome without blocking its own thread.
//!
//! ## Core pieces
//!
//! - **[`ClientContext`]**: owns outgoing configuration (headers, query
//!   params, feature flags) and the request table tracking every request it
//!   issued
//! - **[`RequestTable`]**: the concurrency core, guaranteeing exactly one
//!   terminal transition per identifier and linearizable non-blocking
//!   status queries
//! - **[`HttpTransport`]**: the minimal capability consumed from a delegated
//!   HTTP library; [`ReqwestTransport`] is the production implementation
//!
//! Identifiers rather than callbacks let a caller that cannot suspend
//! interoperate with the async engine: the caller supplies its own polling
//! cadence.

pub mod client;
pub mod config;
pub mod error;
pub mod response;
pub mod table;
pub mod transport;

pub use client::ClientContext;
pub use config::{ClientConfig, RequestSnapshot};
pub use error::{TableError, TableResult};
pub use response::{HttpVersion, ResponseData};
pub use table::{PollStatus, RequestId, RequestOutcome, RequestSlot, RequestTable};
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};

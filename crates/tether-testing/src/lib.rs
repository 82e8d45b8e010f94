//! # Tether Testing
//!
//! Programmable mock implementations of the transport capabilities,
//! allowing reliable and controlled testing of the lifecycle engine with
//! no network involved: scripted outcomes, hang-forever requests, injected
//! inbound frames, and full call histories for asserting on captured
//! configuration snapshots.

pub mod http;
pub mod ws;

pub use http::MockHttpTransport;
pub use ws::{MockWsController, MockWsTransport};

//! # Tether Core
//!
//! Shared foundation for the tether network client: the worker-pool runtime
//! that executes network tasks off the caller's thread, the generation-tagged
//! handle registry that replaces raw-pointer handles at the embedding
//! boundary, and the buffer ownership-transfer types handed back to callers.
//!
//! Higher layers build on these pieces:
//!
//! - **[`NetRuntime`]**: fixed-size pool of worker threads; owns nothing about
//!   requests, only schedules them
//! - **[`HandleMap`] / [`Handle`]**: arena storage with generation tags, so a
//!   stale handle is a detectable error instead of a dangling reference
//! - **[`Payload`]**: an owned byte buffer moved out of internal storage on
//!   retrieval; release is a single consuming operation
//! - **[`CookiePair`]**: the cookie unit exchanged with the embedder

pub mod cookie;
pub mod error;
pub mod payload;
pub mod registry;
pub mod runtime;

pub use cookie::CookiePair;
pub use error::{HandleError, RuntimeError, RuntimeResult, TransportError};
pub use payload::Payload;
pub use registry::{Handle, HandleMap};
pub use runtime::NetRuntime;

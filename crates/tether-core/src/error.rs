//! Error types shared across the tether crates

use thiserror::Error;

/// Result type for runtime construction and scheduling.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised while building the worker runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Construction-time misconfiguration, fatal to that call only.
    #[error("Invalid runtime configuration: {0}")]
    InvalidConfig(String),

    /// The underlying thread pool could not be built.
    #[error("Runtime build failed: {0}")]
    Build(String),
}

/// A failure reported by a delegated transport library.
///
/// DNS resolution, TLS, connection resets and timeouts all land here. The
/// engine captures the description as data and surfaces it through a Failed
/// request state or a stream error; it never unwinds across the caller
/// boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Transport failure: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    /// Capture a failure description from the delegated library.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors from resolving typed handles against a registry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    /// The slot this handle names was destroyed or recycled since the handle
    /// was issued.
    #[error("Stale handle: slot {index} generation {generation} is no longer live")]
    Stale { index: u32, generation: u32 },
}

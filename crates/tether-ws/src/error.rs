//! Error types for stream contexts

use thiserror::Error;

/// Result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors surfaced to the caller of a stream context.
///
/// Transport failures never unwind across the boundary: a failed handshake
/// is stored and surfaces on the first `send` or `receive`; a connection
/// lost after open surfaces as a Close message, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Connection establishment failed; the handle never became usable.
    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    /// The stream is closed or the engine side of it is gone.
    #[error("Stream is not connected")]
    NotConnected,
}

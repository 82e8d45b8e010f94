//! Umbrella error type for the embedding surface

use thiserror::Error;

use tether_core::{HandleError, RuntimeError, TransportError};
use tether_http::TableError;
use tether_ws::StreamError;

/// Result type for hub operations.
pub type TetherResult<T> = Result<T, TetherError>;

/// Any failure surfaced by the embedding hub.
///
/// Each variant wraps the error of the layer it came from; nothing is
/// flattened into strings until the embedder decides to.
#[derive(Error, Debug)]
pub enum TetherError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Handle(#[from] HandleError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The cookie JSON handed to `ws_connect` was malformed.
    #[error("Invalid cookie JSON: {0}")]
    InvalidCookies(String),
}

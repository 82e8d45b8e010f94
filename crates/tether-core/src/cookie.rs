//! Cookie name/value pairs exchanged with the embedder

use serde::{Deserialize, Serialize};

/// One cookie, in the wire shape the embedder consumes and produces:
/// `[{"key": "...", "value": "..."}]`.
///
/// The same type serves both directions: cookies captured from an HTTP
/// response, and cookies the embedder attaches to a WebSocket handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookiePair {
    pub key: String,
    pub value: String,
}

impl CookiePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Render as a `Cookie` header fragment (`name=value`).
    pub fn header_value(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}

//! Completed responses handed back to the caller

use std::fmt;

use tether_core::{CookiePair, Payload};

/// HTTP protocol version of a completed response.
///
/// A proper discriminant replacing the sentinel integers (9/10/11/20/30)
/// the embedder wire format used historically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    Http09,
    Http10,
    Http11,
    H2,
    H3,
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpVersion::Http09 => write!(f, "HTTP/0.9"),
            HttpVersion::Http10 => write!(f, "HTTP/1.0"),
            HttpVersion::Http11 => write!(f, "HTTP/1.1"),
            HttpVersion::H2 => write!(f, "HTTP/2"),
            HttpVersion::H3 => write!(f, "HTTP/3"),
        }
    }
}

/// A completed response.
///
/// Buffers are owned by the request table until the caller retrieves the
/// value; retrieval moves them out, and from then on the caller owns them
/// exclusively.
#[derive(Debug, PartialEq, Eq)]
pub struct ResponseData {
    pub status: u16,
    pub version: HttpVersion,
    pub body: Payload,
    pub cookies: Vec<CookiePair>,
}

impl ResponseData {
    /// Render the captured cookies in the embedder wire format.
    pub fn cookies_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.cookies)
    }
}

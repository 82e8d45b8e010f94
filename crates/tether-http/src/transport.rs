//! HTTP transport capability and the reqwest-backed production transport

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tether_core::{CookiePair, Payload, TransportError};

use crate::config::RequestSnapshot;
use crate::response::{HttpVersion, ResponseData};

/// Raw outcome handed back by the delegated HTTP library.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub version: HttpVersion,
    pub body: Vec<u8>,
    pub cookies: Vec<CookiePair>,
}

impl From<TransportResponse> for ResponseData {
    fn from(response: TransportResponse) -> Self {
        ResponseData {
            status: response.status,
            version: response.version,
            body: Payload::new(response.body),
            cookies: response.cookies,
        }
    }
}

/// The minimal capability the engine consumes from an HTTP library.
///
/// The engine calls `send` exactly once per submitted request, with the
/// snapshot frozen at submission time. A non-success status is still an
/// outcome; only failures of the transport itself (DNS, TLS, resets,
/// timeouts) are errors.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn send(&self, request: &RequestSnapshot) -> Result<TransportResponse, TransportError>;
}

/// Production transport over [`reqwest`].
///
/// Connection pooling, TLS, redirects and decompression remain the
/// library's concern. The cookie store, when enabled, belongs to this
/// transport instance alone; nothing is process-wide.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the underlying client. `decompress` enables brotli response
    /// decompression; `persist_cookies` attaches a persistent cookie store.
    pub fn new(decompress: bool, persist_cookies: bool) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .brotli(decompress)
            .cookie_store(persist_cookies)
            .build()
            .map_err(|e| TransportError::new(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &RequestSnapshot) -> Result<TransportResponse, TransportError> {
        let builder = match &request.body {
            Some(body) => self.client.post(&request.url).body(body.clone()),
            None => self.client.get(&request.url),
        };

        let response = builder
            .query(&request.params)
            .headers(header_map(&request.headers))
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        let version = version_of(response.version());
        let cookies = response
            .cookies()
            .map(|cookie| CookiePair::new(cookie.name(), cookie.value()))
            .collect();

        // Body bytes are read for success statuses only; other statuses are
        // captured with status/version/cookies and an empty body.
        let body = if status.is_success() {
            response
                .bytes()
                .await
                .map_err(|e| TransportError::new(e.to_string()))?
                .to_vec()
        } else {
            Vec::new()
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            version,
            body,
            cookies,
        })
    }
}

/// Convert the snapshot's header map, skipping entries the HTTP library
/// would reject as malformed.
fn header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            map.insert(name, value);
        }
    }
    map
}

fn version_of(version: reqwest::Version) -> HttpVersion {
    if version == reqwest::Version::HTTP_09 {
        HttpVersion::Http09
    } else if version == reqwest::Version::HTTP_10 {
        HttpVersion::Http10
    } else if version == reqwest::Version::HTTP_2 {
        HttpVersion::H2
    } else if version == reqwest::Version::HTTP_3 {
        HttpVersion::H3
    } else {
        HttpVersion::Http11
    }
}

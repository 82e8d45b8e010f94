//! Mock HTTP transport with scripted outcomes and call history

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use tether_core::{CookiePair, TransportError};
use tether_http::{HttpTransport, HttpVersion, RequestSnapshot, TransportResponse};

#[derive(Clone)]
enum MockOutcome {
    Respond(TransportResponse),
    Fail(String),
    Hang,
}

/// A mock HTTP transport returning predefined outcomes keyed by URL.
///
/// Every `send` records the full request snapshot it received, so tests
/// can assert on the exact configuration captured at submission time.
/// Unmatched URLs fall back to the default outcome (success 200, empty
/// body, unless overridden).
pub struct MockHttpTransport {
    outcomes: HashMap<String, MockOutcome>,
    default: MockOutcome,
    calls: Mutex<Vec<RequestSnapshot>>,
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            default: MockOutcome::Respond(Self::response(200, b"", Vec::new())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a success outcome for a specific URL.
    pub fn with_success(mut self, url: impl Into<String>, status: u16, body: &[u8]) -> Self {
        self.outcomes.insert(
            url.into(),
            MockOutcome::Respond(Self::response(status, body, Vec::new())),
        );
        self
    }

    /// Script a success outcome that also carries cookies.
    pub fn with_success_and_cookies(
        mut self,
        url: impl Into<String>,
        status: u16,
        body: &[u8],
        cookies: Vec<CookiePair>,
    ) -> Self {
        self.outcomes.insert(
            url.into(),
            MockOutcome::Respond(Self::response(status, body, cookies)),
        );
        self
    }

    /// Script an exact transport response for a specific URL.
    pub fn with_response(mut self, url: impl Into<String>, response: TransportResponse) -> Self {
        self.outcomes
            .insert(url.into(), MockOutcome::Respond(response));
        self
    }

    /// Script a transport failure for a specific URL.
    pub fn with_failure(mut self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.outcomes
            .insert(url.into(), MockOutcome::Fail(message.into()));
        self
    }

    /// Script a request that never completes, for exercising Pending
    /// forever.
    pub fn with_hang(mut self, url: impl Into<String>) -> Self {
        self.outcomes.insert(url.into(), MockOutcome::Hang);
        self
    }

    /// Replace the default outcome with a success.
    pub fn with_default_success(mut self, status: u16, body: &[u8]) -> Self {
        self.default = MockOutcome::Respond(Self::response(status, body, Vec::new()));
        self
    }

    /// Replace the default outcome with a failure.
    pub fn with_default_failure(mut self, message: impl Into<String>) -> Self {
        self.default = MockOutcome::Fail(message.into());
        self
    }

    /// Number of `send` calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// The snapshots received, in arrival order.
    pub fn snapshots(&self) -> Vec<RequestSnapshot> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any call targeted the given URL.
    pub fn was_called_with(&self, url: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|s| s.url == url)
    }

    fn response(status: u16, body: &[u8], cookies: Vec<CookiePair>) -> TransportResponse {
        TransportResponse {
            status,
            version: HttpVersion::Http11,
            body: body.to_vec(),
            cookies,
        }
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: &RequestSnapshot) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());

        let outcome = self
            .outcomes
            .get(&request.url)
            .unwrap_or(&self.default)
            .clone();
        match outcome {
            MockOutcome::Respond(response) => Ok(response),
            MockOutcome::Fail(message) => Err(TransportError::new(message)),
            MockOutcome::Hang => std::future::pending().await,
        }
    }
}

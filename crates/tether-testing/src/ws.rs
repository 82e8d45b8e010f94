//! Mock WebSocket transport driven by a test-side controller

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use tether_core::{CookiePair, TransportError};
use tether_ws::{InboundFrame, OutboundFrame, WsSink, WsSource, WsTransport};

struct MockWsShared {
    sent: Mutex<Vec<OutboundFrame>>,
    connect_urls: Mutex<Vec<String>>,
}

/// Scripted WebSocket transport for a single connection.
///
/// The paired [`MockWsController`] plays the remote peer: it injects
/// inbound frames (before or after the handshake completes) and observes
/// every frame the engine wrote.
pub struct MockWsTransport {
    fail_with: Option<String>,
    inbound: Mutex<Option<UnboundedReceiver<InboundFrame>>>,
    shared: Arc<MockWsShared>,
}

impl MockWsTransport {
    /// A transport whose handshake succeeds.
    pub fn new() -> (Arc<Self>, MockWsController) {
        Self::build(None)
    }

    /// A transport whose handshake fails with the given reason.
    pub fn failing(reason: impl Into<String>) -> (Arc<Self>, MockWsController) {
        Self::build(Some(reason.into()))
    }

    fn build(fail_with: Option<String>) -> (Arc<Self>, MockWsController) {
        let (inbound_tx, inbound_rx) = unbounded_channel();
        let shared = Arc::new(MockWsShared {
            sent: Mutex::new(Vec::new()),
            connect_urls: Mutex::new(Vec::new()),
        });
        let transport = Arc::new(Self {
            fail_with,
            inbound: Mutex::new(Some(inbound_rx)),
            shared: Arc::clone(&shared),
        });
        (transport, MockWsController { inbound_tx, shared })
    }
}

#[async_trait]
impl WsTransport for MockWsTransport {
    async fn connect(
        &self,
        url: &str,
        _cookies: &[CookiePair],
    ) -> Result<(Box<dyn WsSink>, Box<dyn WsSource>), TransportError> {
        self.shared.connect_urls.lock().unwrap().push(url.to_string());

        if let Some(reason) = &self.fail_with {
            return Err(TransportError::new(reason.clone()));
        }

        let inbound = self
            .inbound
            .lock()
            .unwrap()
            .take()
            .expect("MockWsTransport supports a single connect");

        Ok((
            Box::new(MockSink(Arc::clone(&self.shared))),
            Box::new(MockSource(inbound)),
        ))
    }
}

struct MockSink(Arc<MockWsShared>);

#[async_trait]
impl WsSink for MockSink {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError> {
        self.0.sent.lock().unwrap().push(frame);
        Ok(())
    }
}

struct MockSource(UnboundedReceiver<InboundFrame>);

#[async_trait]
impl WsSource for MockSource {
    async fn next(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        self.0.recv().await.map(Ok)
    }
}

/// Test-side remote peer for a [`MockWsTransport`].
pub struct MockWsController {
    inbound_tx: UnboundedSender<InboundFrame>,
    shared: Arc<MockWsShared>,
}

impl MockWsController {
    /// Inject one inbound frame, as if the remote peer sent it. Frames
    /// injected before the handshake completes are delivered right after
    /// it.
    pub fn push_inbound(&self, frame: InboundFrame) {
        let _ = self.inbound_tx.send(frame);
    }

    /// Close the remote side: after any already-injected frames, the
    /// engine observes end-of-stream.
    pub fn close_remote(&self) {
        let _ = self.inbound_tx.send(InboundFrame::Close);
    }

    /// Every frame the engine wrote, in order.
    pub fn sent_frames(&self) -> Vec<OutboundFrame> {
        self.shared.sent.lock().unwrap().clone()
    }

    /// Number of frames the engine wrote.
    pub fn sent_count(&self) -> usize {
        self.shared.sent.lock().unwrap().len()
    }

    /// URLs passed to `connect`, in order.
    pub fn connect_urls(&self) -> Vec<String> {
        self.shared.connect_urls.lock().unwrap().clone()
    }
}

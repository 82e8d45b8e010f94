//! Stream context: one live duplex connection

use std::sync::Arc;

use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, warn};

use tether_core::{CookiePair, NetRuntime};

use crate::error::{StreamError, StreamResult};
use crate::message::StreamMessage;
use crate::queue::{DEFAULT_CAPACITY, InboundQueue, StreamState};
use crate::transport::{InboundFrame, OutboundFrame, WsSink, WsSource, WsTransport};

/// One live WebSocket-shaped duplex connection.
///
/// `connect` returns the handle immediately; the connection is established
/// by a task on the worker runtime. Sends made while the handshake is in
/// flight are buffered and flushed in order once it completes; a failed
/// handshake surfaces on the first `send` or `receive` as an error, never
/// as a panic.
///
/// `receive` blocks the calling thread (not the runtime) and must not be
/// called from a runtime worker.
pub struct StreamContext {
    queue: Arc<InboundQueue>,
    outbound: UnboundedSender<OutboundFrame>,
}

impl StreamContext {
    /// Open a connection with the default inbound queue capacity.
    pub fn connect(
        runtime: &NetRuntime,
        transport: Arc<dyn WsTransport>,
        url: impl Into<String>,
        cookies: Vec<CookiePair>,
    ) -> Self {
        Self::connect_with_capacity(runtime, transport, url, cookies, DEFAULT_CAPACITY)
    }

    /// Open a connection with an explicit inbound queue capacity.
    pub fn connect_with_capacity(
        runtime: &NetRuntime,
        transport: Arc<dyn WsTransport>,
        url: impl Into<String>,
        cookies: Vec<CookiePair>,
        capacity: usize,
    ) -> Self {
        let queue = Arc::new(InboundQueue::new(capacity));
        let (outbound, rx) = unbounded_channel();
        let url = url.into();

        // The task holds its own queue reference, independent of this
        // handle's lifetime.
        runtime.spawn(run_stream(transport, url, cookies, Arc::clone(&queue), rx));

        Self { queue, outbound }
    }

    /// Queue one outbound binary frame.
    ///
    /// Order is preserved for frames sent from a single thread; concurrent
    /// senders are serialized with unspecified relative order.
    pub fn send(&self, bytes: Vec<u8>) -> StreamResult<()> {
        match self.queue.state() {
            StreamState::Failed => Err(StreamError::HandshakeFailed(
                self.queue.failure().unwrap_or_default(),
            )),
            StreamState::Closed => Err(StreamError::NotConnected),
            StreamState::Connecting | StreamState::Open => self
                .outbound
                .send(OutboundFrame::Binary(bytes))
                .map_err(|_| StreamError::NotConnected),
        }
    }

    /// Dequeue the next inbound message, blocking the calling thread until
    /// data, close or an error is available. No implicit timeout.
    pub fn receive(&self) -> StreamResult<StreamMessage> {
        self.queue.pop_blocking()
    }

    /// Release the connection and every queued-but-undelivered inbound
    /// message. Idempotent.
    pub fn close(&self) {
        let _ = self.outbound.send(OutboundFrame::Close);
        self.queue.mark_closed(true);
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> StreamState {
        self.queue.state()
    }
}

impl Drop for StreamContext {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_stream(
    transport: Arc<dyn WsTransport>,
    url: String,
    cookies: Vec<CookiePair>,
    queue: Arc<InboundQueue>,
    outbound_rx: UnboundedReceiver<OutboundFrame>,
) {
    match transport.connect(&url, &cookies).await {
        Err(error) => {
            warn!(%url, %error, "handshake failed");
            queue.mark_failed(error.0);
        }
        Ok((sink, source)) => {
            debug!(%url, "stream open");
            queue.mark_open();
            select! {
                _ = read_pump(source, Arc::clone(&queue)) => {}
                _ = write_pump(sink, outbound_rx) => {}
            }
            queue.mark_closed(false);
            debug!(%url, "stream task finished");
        }
    }
}

async fn read_pump(mut source: Box<dyn WsSource>, queue: Arc<InboundQueue>) {
    while let Some(result) = source.next().await {
        match result {
            Ok(InboundFrame::Text(text)) => queue.push(StreamMessage::text(text)),
            Ok(InboundFrame::Binary(bytes)) => queue.push(StreamMessage::binary(bytes)),
            // Keepalive frames are the protocol library's business; they
            // never reach the caller's queue.
            Ok(InboundFrame::Ping) | Ok(InboundFrame::Pong) => debug!("keepalive frame"),
            Ok(InboundFrame::Close) => break,
            Err(error) => {
                warn!(%error, "stream read failed");
                break;
            }
        }
    }
}

async fn write_pump(mut sink: Box<dyn WsSink>, mut rx: UnboundedReceiver<OutboundFrame>) {
    while let Some(frame) = rx.recv().await {
        match frame {
            OutboundFrame::Binary(bytes) => {
                if let Err(error) = sink.send(OutboundFrame::Binary(bytes)).await {
                    warn!(%error, "stream write failed");
                    break;
                }
            }
            OutboundFrame::Close => {
                let _ = sink.send(OutboundFrame::Close).await;
                break;
            }
        }
    }
    rx.close();
}

//! WebSocket transport capability and the tungstenite-backed implementation

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use tether_core::{CookiePair, TransportError};

/// One outbound frame queued by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Binary(Vec<u8>),
    Close,
}

/// One inbound frame produced by the delegated WebSocket library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close,
}

/// Writer half of an established connection.
#[async_trait]
pub trait WsSink: Send {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError>;
}

/// Reader half of an established connection. `None` means the underlying
/// stream ended.
#[async_trait]
pub trait WsSource: Send {
    async fn next(&mut self) -> Option<Result<InboundFrame, TransportError>>;
}

/// The minimal capability the engine consumes from a WebSocket library:
/// one handshake yielding the two halves of a duplex stream.
#[async_trait]
pub trait WsTransport: Send + Sync + 'static {
    async fn connect(
        &self,
        url: &str,
        cookies: &[CookiePair],
    ) -> Result<(Box<dyn WsSink>, Box<dyn WsSource>), TransportError>;
}

type WsTcpStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Production transport over [`tokio_tungstenite`].
///
/// Framing, masking and the handshake itself stay the library's concern;
/// cookies are attached to the client request as `Cookie` headers.
pub struct TungsteniteTransport;

#[async_trait]
impl WsTransport for TungsteniteTransport {
    async fn connect(
        &self,
        url: &str,
        cookies: &[CookiePair],
    ) -> Result<(Box<dyn WsSink>, Box<dyn WsSource>), TransportError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| TransportError::new(e.to_string()))?;

        let headers = request.headers_mut();
        for pair in cookies {
            let value = HeaderValue::from_str(&pair.header_value())
                .map_err(|e| TransportError::new(e.to_string()))?;
            headers.append(COOKIE, value);
        }

        let (stream, _response) = connect_async(request)
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let (sink, source) = stream.split();

        Ok((
            Box::new(TungsteniteSink(sink)),
            Box::new(TungsteniteSource(source)),
        ))
    }
}

struct TungsteniteSink(SplitSink<WsTcpStream, Message>);

#[async_trait]
impl WsSink for TungsteniteSink {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError> {
        let message = match frame {
            OutboundFrame::Binary(bytes) => Message::Binary(bytes),
            OutboundFrame::Close => Message::Close(None),
        };
        self.0
            .send(message)
            .await
            .map_err(|e| TransportError::new(e.to_string()))
    }
}

struct TungsteniteSource(SplitStream<WsTcpStream>);

#[async_trait]
impl WsSource for TungsteniteSource {
    async fn next(&mut self) -> Option<Result<InboundFrame, TransportError>> {
        loop {
            let frame = match StreamExt::next(&mut self.0).await? {
                Ok(Message::Text(text)) => InboundFrame::Text(text),
                Ok(Message::Binary(bytes)) => InboundFrame::Binary(bytes),
                Ok(Message::Ping(_)) => InboundFrame::Ping,
                Ok(Message::Pong(_)) => InboundFrame::Pong,
                Ok(Message::Close(_)) => InboundFrame::Close,
                // Raw frames never reach the capability surface.
                Ok(Message::Frame(_)) => continue,
                Err(e) => return Some(Err(TransportError::new(e.to_string()))),
            };
            return Some(Ok(frame));
        }
    }
}

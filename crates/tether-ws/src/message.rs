//! Inbound messages dequeued by the caller

use tether_core::Payload;

/// Kind of one inbound stream message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Binary,
    /// Terminal: the connection is gone. Not an error; receives after
    /// Close keep returning Close.
    Close,
}

/// One inbound message.
///
/// The payload is owned by the stream's queue until dequeued; dequeuing
/// transfers ownership to the caller. Close carries an empty payload.
#[derive(Debug, PartialEq, Eq)]
pub struct StreamMessage {
    pub kind: MessageKind,
    pub payload: Payload,
}

impl StreamMessage {
    pub fn text(text: String) -> Self {
        Self {
            kind: MessageKind::Text,
            payload: Payload::from(text),
        }
    }

    pub fn binary(bytes: Vec<u8>) -> Self {
        Self {
            kind: MessageKind::Binary,
            payload: Payload::new(bytes),
        }
    }

    pub fn close() -> Self {
        Self {
            kind: MessageKind::Close,
            payload: Payload::empty(),
        }
    }

    pub fn is_close(&self) -> bool {
        self.kind == MessageKind::Close
    }
}

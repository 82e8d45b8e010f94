//! Bounded inbound queue with a condvar-backed blocking dequeue

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

use tracing::warn;

use crate::error::{StreamError, StreamResult};
use crate::message::StreamMessage;

/// Lifecycle phase of a stream context.
///
/// `Connecting -> Open -> Closed`, with `Connecting -> Failed` on handshake
/// error. No transition leaves Closed or Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Connecting,
    Open,
    Closed,
    Failed,
}

pub(crate) const DEFAULT_CAPACITY: usize = 1024;

struct QueueInner {
    messages: VecDeque<StreamMessage>,
    state: StreamState,
    failure: Option<String>,
    dropped: u64,
}

/// FIFO of inbound messages, fed by the runtime task and drained by the
/// blocking caller.
///
/// Capacity-bounded: when the reader falls behind by more than `capacity`
/// undelivered messages, the oldest is dropped. The wait in
/// [`InboundQueue::pop_blocking`] parks on a condvar: no busy poll, no
/// implicit timeout.
pub struct InboundQueue {
    capacity: usize,
    inner: Mutex<QueueInner>,
    readable: Condvar,
}

impl InboundQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(QueueInner {
                messages: VecDeque::new(),
                state: StreamState::Connecting,
                failure: None,
                dropped: 0,
            }),
            readable: Condvar::new(),
        }
    }

    /// Enqueue one inbound message. Messages arriving after Close or a
    /// handshake failure are dropped.
    pub fn push(&self, message: StreamMessage) {
        let mut inner = self.lock();
        if matches!(inner.state, StreamState::Closed | StreamState::Failed) {
            return;
        }
        if inner.messages.len() >= self.capacity {
            inner.messages.pop_front();
            inner.dropped += 1;
            warn!(
                dropped = inner.dropped,
                capacity = self.capacity,
                "inbound queue full, oldest message dropped"
            );
        }
        inner.messages.push_back(message);
        self.readable.notify_one();
    }

    /// Transition Connecting -> Open.
    pub fn mark_open(&self) {
        let mut inner = self.lock();
        if inner.state == StreamState::Connecting {
            inner.state = StreamState::Open;
        }
        drop(inner);
        self.readable.notify_all();
    }

    /// Transition Connecting -> Failed, recording the handshake error.
    pub fn mark_failed(&self, reason: impl Into<String>) {
        let mut inner = self.lock();
        if inner.state == StreamState::Connecting {
            inner.state = StreamState::Failed;
            inner.failure = Some(reason.into());
        }
        drop(inner);
        self.readable.notify_all();
    }

    /// Transition Connecting/Open -> Closed. With `discard` set,
    /// queued-but-undelivered messages are dropped as well.
    pub fn mark_closed(&self, discard: bool) {
        let mut inner = self.lock();
        if !matches!(inner.state, StreamState::Closed | StreamState::Failed) {
            inner.state = StreamState::Closed;
        }
        if discard {
            inner.messages.clear();
        }
        drop(inner);
        self.readable.notify_all();
    }

    /// Dequeue the next message, parking the calling thread until one is
    /// available or the stream reaches a terminal phase.
    ///
    /// A drained Closed queue keeps yielding Close; a Failed handshake
    /// yields the recorded error.
    pub fn pop_blocking(&self) -> StreamResult<StreamMessage> {
        let mut inner = self.lock();
        loop {
            if let Some(message) = inner.messages.pop_front() {
                return Ok(message);
            }
            match inner.state {
                StreamState::Closed => return Ok(StreamMessage::close()),
                StreamState::Failed => {
                    return Err(StreamError::HandshakeFailed(
                        inner.failure.clone().unwrap_or_default(),
                    ));
                }
                StreamState::Connecting | StreamState::Open => {
                    inner = match self.readable.wait(inner) {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                }
            }
        }
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> StreamState {
        self.lock().state
    }

    /// The recorded handshake failure, if the stream reached Failed.
    pub fn failure(&self) -> Option<String> {
        self.lock().failure.clone()
    }

    /// Number of queued undelivered messages.
    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

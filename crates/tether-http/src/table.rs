//! # Request Table
//!
//! The concurrency core: a concurrent mapping from request identifier to
//! request state. Every entry has a single writer (the dispatch task that
//! owns its slot) and arbitrarily many readers polling from caller
//! threads. The table guarantees at most one terminal transition per
//! identifier and that a concurrent poll never observes a torn state.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::error::{TableError, TableResult};
use crate::response::ResponseData;

/// Caller-visible identifier naming one submitted request's lifecycle
/// entry. Identifiers are assigned monotonically and never reused within
/// their client context's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-blocking view of one request's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// The dispatch task has not written its outcome yet.
    Pending,
    /// Terminal: a response was captured and can be taken.
    Succeeded,
    /// Terminal: a failure description was captured and can be taken.
    Failed,
    /// The identifier never existed or its entry was removed.
    NotFound,
}

impl PollStatus {
    /// Whether this state is terminal (never changes again).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollStatus::Succeeded | PollStatus::Failed)
    }
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollStatus::Pending => write!(f, "pending"),
            PollStatus::Succeeded => write!(f, "succeeded"),
            PollStatus::Failed => write!(f, "failed"),
            PollStatus::NotFound => write!(f, "not found"),
        }
    }
}

/// The terminal value written exactly once per request.
#[derive(Debug)]
pub enum RequestOutcome {
    Success(ResponseData),
    Failure(String),
}

const STATE_PENDING: u8 = 0;
const STATE_SUCCEEDED: u8 = 1;
const STATE_FAILED: u8 = 2;

struct SlotInner {
    outcome: Option<RequestOutcome>,
    completed_at: Option<Instant>,
}

/// One request's slot: a lock-free state word plus the outcome cell.
///
/// The dispatch task holds its own `Arc` to the slot, independent of the
/// table entry. `remove` therefore only detaches the table's reference; a
/// terminal write arriving afterwards lands in storage nothing else can
/// observe and is reclaimed when the task drops its `Arc`.
pub struct RequestSlot {
    state: AtomicU8,
    inner: Mutex<SlotInner>,
}

impl RequestSlot {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_PENDING),
            inner: Mutex::new(SlotInner {
                outcome: None,
                completed_at: None,
            }),
        }
    }

    /// Perform the single terminal write for this slot.
    ///
    /// Returns `false` when the slot was already terminal; the offered
    /// outcome is discarded in that case.
    pub fn complete(&self, outcome: RequestOutcome) -> bool {
        let mut inner = lock_recover(&self.inner);
        let next = match outcome {
            RequestOutcome::Success(_) => STATE_SUCCEEDED,
            RequestOutcome::Failure(_) => STATE_FAILED,
        };
        if self
            .state
            .compare_exchange(STATE_PENDING, next, Ordering::Release, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }
        inner.outcome = Some(outcome);
        inner.completed_at = Some(Instant::now());
        true
    }

    /// Current state. Lock-free; a reader racing the terminal write sees
    /// either Pending or the fully-published terminal state.
    pub fn status(&self) -> PollStatus {
        match self.state.load(Ordering::Acquire) {
            STATE_SUCCEEDED => PollStatus::Succeeded,
            STATE_FAILED => PollStatus::Failed,
            _ => PollStatus::Pending,
        }
    }

    fn take_outcome(&self) -> Option<RequestOutcome> {
        lock_recover(&self.inner).outcome.take()
    }

    fn expired(&self, retain_for: Duration) -> bool {
        if self.status() == PollStatus::Pending {
            return false;
        }
        match lock_recover(&self.inner).completed_at {
            Some(at) => at.elapsed() >= retain_for,
            None => false,
        }
    }
}

// The state word, not the mutex, governs visibility; recover the data from
// a poisoned lock instead of propagating a panic across the boundary.
fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Concurrent mapping from request identifier to request slot.
pub struct RequestTable {
    entries: DashMap<u64, Arc<RequestSlot>>,
    next_id: AtomicU64,
}

impl RequestTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate the next identifier and insert a Pending slot for it.
    ///
    /// The returned `Arc` is the dispatch task's own reference to the slot.
    pub fn insert(&self) -> (RequestId, Arc<RequestSlot>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::new(RequestSlot::new());
        self.entries.insert(id, Arc::clone(&slot));
        (RequestId(id), slot)
    }

    /// Non-blocking state query.
    pub fn poll(&self, id: RequestId) -> PollStatus {
        match self.entries.get(&id.0) {
            Some(entry) => entry.status(),
            None => PollStatus::NotFound,
        }
    }

    fn slot(&self, id: RequestId) -> TableResult<Arc<RequestSlot>> {
        self.entries
            .get(&id.0)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(TableError::NotFound(id))
    }

    /// Move a Succeeded outcome out, transferring buffer ownership to the
    /// caller.
    pub fn take_response(&self, id: RequestId) -> TableResult<ResponseData> {
        let slot = self.slot(id)?;
        match slot.status() {
            PollStatus::Succeeded => {}
            actual => {
                return Err(TableError::WrongState {
                    id,
                    actual,
                    expected: PollStatus::Succeeded,
                });
            }
        }
        match slot.take_outcome() {
            Some(RequestOutcome::Success(response)) => Ok(response),
            Some(RequestOutcome::Failure(_)) | None => Err(TableError::AlreadyTaken(id)),
        }
    }

    /// Move a Failed outcome's captured description out.
    pub fn take_error(&self, id: RequestId) -> TableResult<String> {
        let slot = self.slot(id)?;
        match slot.status() {
            PollStatus::Failed => {}
            actual => {
                return Err(TableError::WrongState {
                    id,
                    actual,
                    expected: PollStatus::Failed,
                });
            }
        }
        match slot.take_outcome() {
            Some(RequestOutcome::Failure(message)) => Ok(message),
            Some(RequestOutcome::Success(_)) | None => Err(TableError::AlreadyTaken(id)),
        }
    }

    /// Caller-initiated eviction. Always succeeds: safe on Pending (the
    /// eventual outcome is silently discarded), on terminal states (retained
    /// buffers are freed), and on NotFound.
    pub fn remove(&self, id: RequestId) {
        if self.entries.remove(&id.0).is_some() {
            debug!(%id, "request entry removed");
        }
    }

    /// Evict terminal entries whose outcome has been retained unclaimed for
    /// at least `retain_for`. Pending entries are never touched. Returns the
    /// number of evicted entries.
    pub fn sweep_expired(&self, retain_for: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, slot| !slot.expired(retain_for));
        before - self.entries.len()
    }

    /// Number of tracked entries (in-flight plus unclaimed outcomes).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RequestTable {
    fn default() -> Self {
        Self::new()
    }
}

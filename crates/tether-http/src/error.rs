//! Error types for request table queries

use thiserror::Error;

use crate::table::{PollStatus, RequestId};

/// Result type for request table retrievals.
pub type TableResult<T> = Result<T, TableError>;

/// Errors from querying or retrieving request outcomes.
///
/// `NotFound` is a normal terminal query result, not a fault: it covers
/// identifiers that never existed and identifiers already removed alike.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No entry for this identifier (never existed, or already removed).
    #[error("No request entry for identifier {0}")]
    NotFound(RequestId),

    /// The entry exists but is not in the state this retrieval requires.
    #[error("Request {id} is {actual}, expected {expected}")]
    WrongState {
        id: RequestId,
        actual: PollStatus,
        expected: PollStatus,
    },

    /// The outcome was already moved out by an earlier retrieval. Retrieving
    /// twice without an intervening release is caller misuse; this variant
    /// makes it a detectable fault instead of undefined behavior.
    #[error("Outcome of request {0} was already taken")]
    AlreadyTaken(RequestId),
}

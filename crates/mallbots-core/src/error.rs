//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Every failure surfaced by loading or saving an aggregate maps to exactly one
/// of these kinds so callers can decide how to react: reload-and-retry on a
/// conflict, retry dispatch on a publication failure, give up on a replay
/// contract violation.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The aggregate has no recorded events or snapshot.
    #[error("aggregate not found: {aggregate_name} {aggregate_id}")]
    AggregateNotFound {
        /// The aggregate type name.
        aggregate_name: String,
        /// The aggregate identifier.
        aggregate_id: String,
    },

    /// The type registry could not build or encode a value.
    #[error("registry error: {0}")]
    Registry(String),

    /// The registry built a value that is not the requested aggregate type.
    #[error("registry built {aggregate_name} as a type other than {expected}")]
    TypeMismatch {
        /// The aggregate type name that was built.
        aggregate_name: String,
        /// The Rust type the caller expected.
        expected: &'static str,
    },

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: String,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// An event or snapshot the aggregate's apply logic does not recognize.
    #[error("replay contract violation: {0}")]
    ReplayContract(String),

    /// Events were durably stored but could not be published.
    #[error("events stored but not published: {0}")]
    Publication(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Returns `true` for an optimistic concurrency conflict, the one failure
    /// after which reloading and re-running the business operation is safe.
    #[must_use]
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

//! Error types for the connection pool.
//!
//! Exhaustion is an expected, recoverable outcome of a borrow attempt.
//! The remaining variants signal caller misuse or lifecycle conditions.

use thiserror::Error;

/// Errors returned by [`ResourcePool`](crate::ResourcePool) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No idle handle existed at the moment of the borrow attempt
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Returning the handle would break pool bookkeeping (double return or
    /// an idle store already at capacity)
    #[error("pool invariant violated: {0}")]
    InvariantViolation(String),

    /// The handle was not issued by this pool
    #[error("unknown handle: connection {id} was not issued by this pool")]
    UnknownHandle {
        /// Id carried by the rejected handle
        id: usize,
    },

    /// The pool has been closed and no longer lends handles
    #[error("connection pool is closed")]
    PoolClosed,

    /// Drain gave up before every borrowed handle came back
    #[error("drain timed out with {outstanding} connection(s) still borrowed")]
    DrainTimeout {
        /// Handles still borrowed when the timeout elapsed
        outstanding: usize,
    },
}

impl PoolError {
    /// Whether the caller can reasonably retry the operation later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PoolExhausted | Self::DrainTimeout { .. })
    }
}

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PoolError::PoolExhausted.to_string(),
            "connection pool exhausted"
        );
        assert_eq!(
            PoolError::UnknownHandle { id: 7 }.to_string(),
            "unknown handle: connection 7 was not issued by this pool"
        );
        assert_eq!(
            PoolError::DrainTimeout { outstanding: 2 }.to_string(),
            "drain timed out with 2 connection(s) still borrowed"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(PoolError::PoolExhausted.is_retryable());
        assert!(!PoolError::PoolClosed.is_retryable());
        assert!(!PoolError::InvariantViolation("double return".into()).is_retryable());
    }
}

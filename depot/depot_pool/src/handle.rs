//! The pooled resource handle.

use crate::id::PoolId;
use log::info;

/// One pooled connection.
///
/// A handle is minted once per slot when the pool is built and lives as long
/// as the pool does. It is deliberately neither `Clone` nor `Copy`: whoever
/// holds the value owns the connection, and giving it back to the pool means
/// moving it into [`ResourcePool::return_handle`](crate::ResourcePool::return_handle).
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    id: usize,
    pool: PoolId,
}

impl ResourceHandle {
    pub(crate) fn new(id: usize, pool: PoolId) -> Self {
        Self { id, pool }
    }

    /// Slot id of this connection, in `0..capacity`
    pub fn id(&self) -> usize {
        self.id
    }

    /// Id of the pool that minted this connection
    pub fn pool_id(&self) -> PoolId {
        self.pool
    }

    /// Run an operation on this connection.
    ///
    /// The connection is a placeholder resource, so running an operation
    /// only records it in the log.
    pub fn execute(&self, operation: &str) {
        info!("Connection {}: running {}", self.id, operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_identity() {
        let pool = PoolId::new();
        let handle = ResourceHandle::new(3, pool);
        assert_eq!(handle.id(), 3);
        assert_eq!(handle.pool_id(), pool);

        // Running an operation leaves the identity untouched
        handle.execute("SELECT 1");
        assert_eq!(handle.id(), 3);
    }
}

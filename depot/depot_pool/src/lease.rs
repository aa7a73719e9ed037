//! Scoped leases that give their connection back when dropped.

use crate::error::Result;
use crate::handle::ResourceHandle;
use crate::pool::ResourcePool;
use log::error;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A borrowed connection that returns itself to its pool on drop
pub struct PooledConnection {
    /// The connection, taken out on release
    handle: Option<ResourceHandle>,

    /// Pool the connection goes back to
    pool: Arc<ResourcePool>,

    /// When this connection was borrowed
    acquired_at: Instant,
}

impl PooledConnection {
    pub(crate) fn new(handle: ResourceHandle, pool: Arc<ResourcePool>) -> Self {
        Self {
            handle: Some(handle),
            pool,
            acquired_at: Instant::now(),
        }
    }

    /// Return the connection now and report any bookkeeping error
    pub fn release(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.pool.return_handle(handle),
            None => Ok(()),
        }
    }

    /// Time since the connection was borrowed
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

impl Deref for PooledConnection {
    type Target = ResourceHandle;

    fn deref(&self) -> &ResourceHandle {
        self.handle.as_ref().expect("Connection missing")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = self.pool.return_handle(handle) {
                error!("Failed to return leased connection: {}", e);
            }
        }
    }
}

impl fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.handle {
            Some(handle) => write!(f, "PooledConnection({})", handle.id()),
            None => write!(f, "PooledConnection(returned)"),
        }
    }
}

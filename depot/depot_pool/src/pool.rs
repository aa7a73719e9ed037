//! Fixed-size connection pool with fail-fast borrowing.
//!
//! The pool owns `capacity` connections for its whole lifetime. Idle
//! connections sit in a bounded FIFO queue; borrowing pops the connection
//! that has been idle longest, returning pushes to the back. Both happen in
//! one critical section together with the per-slot state table, so a
//! connection can never be lent to two callers at once.
//!
//! Borrowing never waits. When the queue is empty the caller gets
//! [`PoolError::PoolExhausted`] straight away and owns the retry policy.

use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::handle::ResourceHandle;
use crate::id::PoolId;
use crate::lease::PooledConnection;
use log::{debug, error, info, trace, warn};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Where a slot's connection currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Idle,
    Borrowed,
}

/// Everything guarded by the pool mutex
struct PoolState {
    /// Idle connections, oldest first
    idle: VecDeque<ResourceHandle>,

    /// State of each slot, indexed by connection id
    slots: Vec<SlotState>,

    /// Set by `close`/`drain`; no further borrows
    closed: bool,

    total_borrows: u64,
    total_returns: u64,
    exhausted: u64,
}

impl PoolState {
    /// Slots whose connection is out with a caller
    fn borrowed(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| **slot == SlotState::Borrowed)
            .count()
    }
}

/// Point-in-time statistics about a pool
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Fixed number of connections
    pub capacity: usize,

    /// Connections currently idle
    pub idle: usize,

    /// Connections currently borrowed
    pub borrowed: usize,

    /// Successful borrows since construction
    pub total_borrows: u64,

    /// Successful returns since construction
    pub total_returns: u64,

    /// Borrow attempts rejected with `PoolExhausted`
    pub exhausted: u64,

    /// Whether the pool has been closed
    pub closed: bool,
}

/// A fixed-size pool of connections
pub struct ResourcePool {
    id: PoolId,
    name: String,
    capacity: usize,
    state: Mutex<PoolState>,

    /// Signalled on every successful return; only `drain` waits on it
    returned: Condvar,
}

impl ResourcePool {
    /// Create a pool holding `capacity` connections with ids `0..capacity`.
    ///
    /// A capacity of zero is valid; every borrow on such a pool fails.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(PoolConfig::with_capacity(capacity))
    }

    /// Create a pool from a configuration
    pub fn with_config(config: PoolConfig) -> Self {
        let id = PoolId::new();
        let capacity = config.capacity;

        let mut idle = VecDeque::with_capacity(capacity);
        for slot in 0..capacity {
            idle.push_back(ResourceHandle::new(slot, id));
        }

        info!(
            "Initialized connection pool '{}' ({}) with {} connections",
            config.name, id, capacity
        );

        Self {
            id,
            name: config.name,
            capacity,
            state: Mutex::new(PoolState {
                idle,
                slots: vec![SlotState::Idle; capacity],
                closed: false,
                total_borrows: 0,
                total_returns: 0,
                exhausted: 0,
            }),
            returned: Condvar::new(),
        }
    }

    /// Borrow the connection that has been idle longest.
    ///
    /// Fails immediately with [`PoolError::PoolExhausted`] if nothing is
    /// idle, or [`PoolError::PoolClosed`] once the pool is closed.
    pub fn borrow(&self) -> Result<ResourceHandle> {
        let mut state = self.state.lock();

        if state.closed {
            trace!("Pool '{}' is closed, refusing borrow", self.name);
            return Err(PoolError::PoolClosed);
        }

        let handle = match state.idle.pop_front() {
            Some(handle) => handle,
            None => {
                state.exhausted += 1;
                warn!(
                    "Pool '{}' exhausted: all {} connections borrowed",
                    self.name, self.capacity
                );
                return Err(PoolError::PoolExhausted);
            }
        };

        state.slots[handle.id()] = SlotState::Borrowed;
        state.total_borrows += 1;
        debug!("Borrow connection {}", handle.id());

        Ok(handle)
    }

    /// Give a borrowed connection back to the pool.
    ///
    /// Rejects handles minted by another pool with
    /// [`PoolError::UnknownHandle`], and returns that would double-park a
    /// connection or overfill the idle queue with
    /// [`PoolError::InvariantViolation`]. Returns are still accepted after
    /// the pool has been closed so that a drain can finish.
    pub fn return_handle(&self, handle: ResourceHandle) -> Result<()> {
        let id = handle.id();

        if handle.pool_id() != self.id || id >= self.capacity {
            error!(
                "Pool '{}' rejected connection {} from pool {}",
                self.name,
                id,
                handle.pool_id()
            );
            return Err(PoolError::UnknownHandle { id });
        }

        let mut state = self.state.lock();

        if state.slots[id] == SlotState::Idle {
            let reason = format!("connection {} returned while already idle", id);
            error!("Pool '{}': {}", self.name, reason);
            return Err(PoolError::InvariantViolation(reason));
        }

        if state.idle.len() >= self.capacity {
            let reason = format!(
                "idle queue already holds {} of {} connections",
                state.idle.len(),
                self.capacity
            );
            error!("Pool '{}': {}", self.name, reason);
            return Err(PoolError::InvariantViolation(reason));
        }

        state.slots[id] = SlotState::Idle;
        state.idle.push_back(handle);
        state.total_returns += 1;
        debug!("Return connection {}", id);

        self.returned.notify_all();
        Ok(())
    }

    /// Borrow a connection wrapped in a guard that returns it on drop
    pub fn try_lease(self: &Arc<Self>) -> Result<PooledConnection> {
        let handle = self.borrow()?;
        Ok(PooledConnection::new(handle, Arc::clone(self)))
    }

    /// Stop lending connections. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            info!("Closed connection pool '{}'", self.name);
        }
    }

    /// Close the pool and wait for every borrowed connection to come back.
    ///
    /// Fails with [`PoolError::DrainTimeout`] if connections are still out
    /// when `timeout` elapses. The pool stays closed either way.
    pub fn drain(&self, timeout: Duration) -> Result<()> {
        // Too far out to represent as an instant: wait without a deadline
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();

        if !state.closed {
            state.closed = true;
            info!("Draining connection pool '{}'...", self.name);
        }

        loop {
            let outstanding = state.borrowed();
            if outstanding == 0 {
                info!("Connection pool '{}' drained", self.name);
                return Ok(());
            }

            if deadline.map_or(false, |deadline| Instant::now() >= deadline) {
                warn!(
                    "Drain of pool '{}' timed out with {} connection(s) outstanding",
                    self.name, outstanding
                );
                return Err(PoolError::DrainTimeout { outstanding });
            }

            trace!("Waiting for {} connection(s) to be returned", outstanding);
            match deadline {
                Some(deadline) => {
                    self.returned.wait_until(&mut state, deadline);
                }
                None => self.returned.wait(&mut state),
            }
        }
    }

    /// Identity of this pool
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Name from the configuration
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed number of connections
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of connections currently idle
    pub fn idle_count(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Number of connections currently borrowed
    pub fn borrowed_count(&self) -> usize {
        self.state.lock().borrowed()
    }

    /// Whether the pool has been closed
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Snapshot of the pool's counters
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        PoolStats {
            capacity: self.capacity,
            idle: state.idle.len(),
            borrowed: state.borrowed(),
            total_borrows: state.total_borrows,
            total_returns: state.total_returns,
            exhausted: state.exhausted,
            closed: state.closed,
        }
    }
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::with_config(PoolConfig::default())
    }
}

impl std::fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .finish()
    }
}

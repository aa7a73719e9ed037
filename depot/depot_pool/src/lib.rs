#![deny(warnings)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Depot Pool
//!
//! A fixed-size pool of reusable connections for many concurrent callers.
//!
//! - Connections are created once, up front, with ids `0..capacity`
//! - Borrowing never blocks: an empty pool fails with `PoolExhausted`
//! - Returning validates the handle, so a connection is never lent twice
//! - Leases return their connection automatically when dropped
//! - Closing and draining give the pool an orderly shutdown
//!
//! ```
//! use depot_pool::{PoolError, ResourcePool};
//!
//! let pool = ResourcePool::new(1);
//! let conn = pool.borrow()?;
//! conn.execute("SELECT 1");
//! assert_eq!(pool.borrow().unwrap_err(), PoolError::PoolExhausted);
//! pool.return_handle(conn)?;
//! # Ok::<(), PoolError>(())
//! ```

/// Pool configuration
pub mod config;

/// Error types
pub mod error;

/// The pooled connection handle
pub mod handle;

/// Pool identity
pub mod id;

/// RAII leases
pub mod lease;

/// The pool itself
pub mod pool;

pub use config::PoolConfig;
pub use error::{PoolError, Result};
pub use handle::ResourceHandle;
pub use id::PoolId;
pub use lease::PooledConnection;
pub use pool::{PoolStats, ResourcePool};

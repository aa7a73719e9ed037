//! Pool configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a connection pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of connections created up front; fixed for the pool's lifetime
    pub capacity: usize,

    /// Name used in log lines
    pub name: String,

    /// How long a drain waits for borrowed connections, in seconds
    pub drain_timeout_secs: u64,
}

impl PoolConfig {
    /// Configuration with the given capacity and default everything else
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Drain timeout as a [`Duration`]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            name: "default".to_string(),
            drain_timeout_secs: 30,
        }
    }
}

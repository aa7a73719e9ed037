//! Interactive query loop
//!
//! Reads one query per line. The loop itself borrows a connection for each
//! query so exhaustion is reported before the next prompt; the query then
//! runs on a worker thread which gives the connection back when done.

use crate::config::{DriverConfig, Settings};
use anyhow::{Context, Result};
use clap::Args;
use depot_pool::{ResourceHandle, ResourcePool};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

const PROMPT: &str = "Press enter to run a query: ";

/// Arguments for the run command
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Number of pooled connections
    #[clap(long)]
    pub capacity: Option<usize>,

    /// Seconds a slow query keeps its connection
    #[clap(long)]
    pub hold_secs: Option<u64>,
}

/// Implementation of the run command
pub fn execute_run(args: &RunArgs, mut settings: Settings) -> Result<()> {
    if let Some(capacity) = args.capacity {
        settings.pool.capacity = capacity;
    }
    if let Some(hold_secs) = args.hold_secs {
        settings.driver.hold_secs = hold_secs;
    }

    let drain_timeout = settings.pool.drain_timeout();
    let pool = Arc::new(ResourcePool::with_config(settings.pool));

    let stdin = io::stdin();
    let stdout = io::stdout();
    query_loop(&pool, &settings.driver, stdin.lock(), stdout.lock())?;

    if let Err(e) = pool.drain(drain_timeout) {
        warn!("Exiting with connections still in use: {}", e);
    }

    let summary = serde_json::to_string(&pool.stats()).context("failed to encode pool stats")?;
    println!("{}", summary);
    Ok(())
}

/// Read queries from `input` until `exit` or end of input
pub fn query_loop<R: BufRead, W: Write>(
    pool: &Arc<ResourcePool>,
    driver: &DriverConfig,
    input: R,
    mut output: W,
) -> Result<()> {
    write!(output, "{}", PROMPT)?;
    output.flush()?;

    for line in input.lines() {
        let query = line.context("failed to read query")?;
        let query = query.trim();

        if query == "exit" {
            info!("Exiting...");
            writeln!(output)?;
            break;
        }

        match pool.borrow() {
            Ok(conn) => {
                dispatch(Arc::clone(pool), driver.clone(), conn, query.to_string());
            }
            Err(e) if e.is_retryable() => {
                warn!("{}", e);
            }
            Err(e) => return Err(e.into()),
        }

        write!(output, "{}", PROMPT)?;
        output.flush()?;
    }

    Ok(())
}

/// Run `query` on its own thread and return the connection afterwards
fn dispatch(pool: Arc<ResourcePool>, driver: DriverConfig, conn: ResourceHandle, query: String) {
    thread::spawn(move || {
        conn.execute(&query);

        if driver.is_slow(&query) {
            info!(
                "Slow query on connection {}, holding it for {}s",
                conn.id(),
                driver.hold_secs
            );
            thread::sleep(driver.hold());
        }

        if let Err(e) = pool.return_handle(conn) {
            error!("Failed to return connection: {}", e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_pool::PoolError;
    use std::io::Cursor;
    use std::time::Duration;

    fn driver(hold_secs: u64) -> DriverConfig {
        DriverConfig {
            hold_secs,
            ..DriverConfig::default()
        }
    }

    #[test]
    fn test_queries_run_and_connections_come_back() {
        let pool = Arc::new(ResourcePool::new(2));
        let input = Cursor::new("SELECT a\nSELECT b\nexit\nSELECT never\n");
        let mut output = Vec::new();

        query_loop(&pool, &driver(0), input, &mut output).unwrap();
        pool.drain(Duration::from_secs(5)).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.total_borrows, 2);
        assert_eq!(stats.total_returns, 2);

        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches(PROMPT).count(), 3);
    }

    #[test]
    fn test_slow_query_exhausts_single_connection() {
        let pool = Arc::new(ResourcePool::new(1));
        let input = Cursor::new("SELECT slow 1\nSELECT fast\n");

        query_loop(&pool, &driver(1), input, Vec::new()).unwrap();

        let stats = pool.stats();
        assert_eq!(stats.total_borrows, 1);
        assert_eq!(stats.exhausted, 1);

        pool.drain(Duration::from_secs(5)).unwrap();
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_closed_pool_stops_loop() {
        let pool = Arc::new(ResourcePool::new(1));
        pool.close();

        let err = query_loop(&pool, &driver(0), Cursor::new("SELECT a\n"), Vec::new())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<PoolError>(),
            Some(&PoolError::PoolClosed)
        );
    }
}

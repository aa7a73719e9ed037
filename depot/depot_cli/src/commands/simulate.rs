//! Concurrent load simulation
//!
//! Releases a batch of workers against one pool at the same instant. Each
//! worker tries to borrow once; nobody gives a connection back until every
//! worker has tried. Winners then hold their connection for a while and
//! return it, losers give up.

use crate::config::Settings;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use depot_pool::{PoolError, PoolStats, ResourcePool};
use log::{debug, info};
use serde::Serialize;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

/// Arguments for the simulate command
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Number of concurrent workers
    #[clap(long, default_value_t = 6)]
    pub workers: usize,

    /// Number of pooled connections
    #[clap(long)]
    pub capacity: Option<usize>,

    /// Milliseconds each worker holds its connection
    #[clap(long, default_value_t = 200)]
    pub hold_ms: u64,
}

/// Outcome of a simulation run
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub workers: usize,
    pub succeeded: usize,
    pub exhausted: usize,
    pub stats: PoolStats,
}

/// Outcome of a single worker
enum Outcome {
    Ran,
    Exhausted,
}

/// Implementation of the simulate command
pub fn execute_simulate(args: &SimulateArgs, mut settings: Settings) -> Result<()> {
    if let Some(capacity) = args.capacity {
        settings.pool.capacity = capacity;
    }

    let report = simulate(
        ResourcePool::with_config(settings.pool),
        args.workers,
        Duration::from_millis(args.hold_ms),
    )?;

    let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
    println!("{}", json);
    Ok(())
}

/// Run `workers` concurrent borrowers against `pool`
pub fn simulate(pool: ResourcePool, workers: usize, hold: Duration) -> Result<SimulationReport> {
    let pool = Arc::new(pool);
    let start = Arc::new(Barrier::new(workers));
    let attempted = Arc::new(Barrier::new(workers));

    info!(
        "Simulating {} workers against {} connections",
        workers,
        pool.capacity()
    );

    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let pool = Arc::clone(&pool);
            let start = Arc::clone(&start);
            let attempted = Arc::clone(&attempted);
            thread::spawn(move || -> std::result::Result<Outcome, PoolError> {
                start.wait();
                let lease = pool.try_lease();
                // Connections stay out until every worker has tried once
                attempted.wait();

                let conn = match lease {
                    Ok(conn) => conn,
                    Err(PoolError::PoolExhausted) => {
                        debug!("Worker {} found the pool exhausted", worker);
                        return Ok(Outcome::Exhausted);
                    }
                    Err(e) => return Err(e),
                };

                conn.execute(&format!("worker {} query", worker));
                thread::sleep(hold);
                conn.release()?;
                Ok(Outcome::Ran)
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut exhausted = 0;
    for handle in handles {
        match handle.join() {
            Ok(Ok(Outcome::Ran)) => succeeded += 1,
            Ok(Ok(Outcome::Exhausted)) => exhausted += 1,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => return Err(anyhow!("simulation worker panicked")),
        }
    }

    Ok(SimulationReport {
        workers,
        succeeded,
        exhausted,
        stats: pool.stats(),
    })
}

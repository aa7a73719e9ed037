//! Command implementations

pub mod run;
pub mod simulate;

pub use run::{execute_run, RunArgs};
pub use simulate::{execute_simulate, SimulateArgs};

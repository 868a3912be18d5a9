//! Simulation driver for the order-manager core.
//!
//! Stitches the engine into a running simulation:
//! - a weighted random action source feeding inserts, amends, deletes,
//!   quotes and quote deletes
//! - the per-tick loop: generate, flush the throttle queue, process
//!   acks, collect garbage
//! - config loading, logging setup and the `omsim` binary

pub mod actions;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;

pub use actions::{Action, ActionSource, RandomActionSource};
pub use driver::{Driver, DriverStats};
pub use error::{AppError, AppResult};
pub use logging::init_logging;

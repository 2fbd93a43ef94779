//! Simulation driver.
//!
//! Provides the [`simulator::Simulator`] context that owns simulated memory, the MMU,
//! the cache hierarchy and the run statistics, and replays memory accesses through them.

pub mod simulator;

pub use self::simulator::Simulator;

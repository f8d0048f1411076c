//! Async variant of the pi estimator, scheduling tasks on tokio.

pub mod monte_carlo;

pub use monte_carlo::run_simulation;

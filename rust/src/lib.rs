//! Monte Carlo estimation of pi on a fixed pool of worker threads.
//!
//! A run splits the requested sample count into equal tasks, samples each
//! task on its own worker with its own random generator, and folds the task
//! results in submission order into a running estimate.
//!
//! ```no_run
//! use std::sync::Arc;
//! use monte_carlo_pi::{LogSink, SimulationConfig, Simulator};
//!
//! let mut simulator = Simulator::new(SimulationConfig::default());
//! let estimate = simulator.run(1_000_000, Arc::new(LogSink))?;
//! println!("{estimate}");
//! # Ok::<(), monte_carlo_pi::SimulationError>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod logging;
pub mod monte_carlo;
pub mod partition;
pub mod plot;
pub mod pool;
pub mod simulator;
pub mod sink;

use std::sync::Arc;

pub use aggregate::{Aggregator, RunningEstimate};
pub use config::{SimulationConfig, DEFAULT_TASK_COUNT};
pub use error::{InvalidRequestError, Result, SampleError, SimulationError, TeardownError};
pub use monte_carlo::{run_task, task_rng, PointClassified, SampleGenerator, TaskResult};
pub use partition::{partition, SimulationRequest, TaskDescriptor};
pub use plot::PointPlot;
pub use pool::{TaskHandle, WorkerPool};
pub use simulator::{RunState, Simulator};
pub use sink::{ChannelSink, LogSink, NoopSink, ProgressSink, RecordingSink, SinkEvent};

/// One-shot run with the default configuration.
pub fn run_simulation(total_points: i64, sink: Arc<dyn ProgressSink>) -> Result<RunningEstimate> {
    Simulator::default().run(total_points, sink)
}

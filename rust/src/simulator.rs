//! Run entry points: one simulation per call, plus reset.
//!
//! A [`Simulator`] holds the configuration, the lifecycle state and the
//! estimate of the last completed run. Nothing is shared through globals;
//! every run builds its own pool and releases it before returning.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::aggregate::{Aggregator, RunningEstimate};
use crate::config::SimulationConfig;
use crate::error::{Result, SimulationError};
use crate::partition::{partition, SimulationRequest};
use crate::pool::WorkerPool;
use crate::sink::ProgressSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Dispatching,
    Aggregating { task_index: usize },
    Completed,
    Aborted,
}

#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    state: RunState,
    last_estimate: Option<RunningEstimate>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: RunState::Idle,
            last_estimate: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Final estimate of the last successful run, cleared by [`Simulator::reset`].
    pub fn last_estimate(&self) -> Option<RunningEstimate> {
        self.last_estimate
    }

    /// Estimate pi from `total_points` samples split across the configured tasks.
    ///
    /// Invalid requests fail before any worker starts. Any task failure
    /// aborts the run, discards the partial estimate and is reported to
    /// `sink` through [`ProgressSink::on_failure`]. The pool is released on
    /// every path.
    pub fn run(&mut self, total_points: i64, sink: Arc<dyn ProgressSink>) -> Result<RunningEstimate> {
        let request = SimulationRequest::new(total_points, self.config.task_count)?;

        self.last_estimate = None;
        self.state = RunState::Dispatching;

        let tasks = partition(&request);
        let pool = match WorkerPool::new(request.task_count()) {
            Ok(pool) => pool,
            Err(err) => return Err(self.abort(err, sink.as_ref())),
        };
        let handles = pool.dispatch(&tasks, self.config.seed, &sink);
        debug!(
            tasks = handles.len(),
            points_per_task = request.points_per_task(),
            "tasks dispatched"
        );

        let mut aggregator = Aggregator::new(RunningEstimate::default(), self.config.task_timeout);
        let mut failure = None;
        for handle in handles {
            self.state = RunState::Aggregating {
                task_index: handle.task_id(),
            };
            if let Err(err) = aggregator.resolve(handle, sink.as_ref()) {
                failure = Some(err);
                break;
            }
        }

        if failure.is_some() {
            pool.cancel_pending();
        }
        if let Err(err) = pool.shutdown() {
            warn!(error = %err, "worker pool teardown failed");
        }

        if let Some(err) = failure {
            return Err(self.abort(err, sink.as_ref()));
        }

        let estimate = aggregator.into_estimate();
        self.state = RunState::Completed;
        self.last_estimate = Some(estimate);
        info!(
            total_points = request.total_points(),
            processed = estimate.cumulative_processed,
            inside = estimate.cumulative_inside,
            pi = ?estimate.pi_estimate(),
            "simulation completed"
        );
        Ok(estimate)
    }

    /// Return to the initial state. Idempotent.
    pub fn reset(&mut self) {
        self.state = RunState::Idle;
        self.last_estimate = None;
    }

    fn abort(&mut self, err: SimulationError, sink: &dyn ProgressSink) -> SimulationError {
        error!(error = %err, "simulation aborted");
        self.state = RunState::Aborted;
        self.last_estimate = None;
        sink.on_failure(&err);
        err
    }
}

//! Folding of task results into a running pi estimate.
//!
//! Results are retrieved strictly in submission order. A slow early task
//! holds back the snapshots of every later task, which keeps the sequence of
//! reported estimates identical for a given partition no matter how the
//! workers are scheduled.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;
use crate::monte_carlo::TaskResult;
use crate::pool::TaskHandle;
use crate::sink::ProgressSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningEstimate {
    pub cumulative_inside: u64,
    pub cumulative_processed: u64,
    pub tasks_resolved: usize,
}

impl RunningEstimate {
    /// `4 * inside / processed`, or `None` while no point has been processed.
    pub fn pi_estimate(&self) -> Option<f64> {
        if self.cumulative_processed == 0 {
            return None;
        }
        Some(4.0 * self.cumulative_inside as f64 / self.cumulative_processed as f64)
    }

    pub fn fold(&mut self, result: &TaskResult) {
        self.cumulative_inside += result.inside_count;
        self.cumulative_processed += result.points_assigned;
        self.tasks_resolved += 1;
    }

    pub fn is_initial(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for RunningEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pi_estimate() {
            Some(pi) => write!(
                f,
                "Estimation of Pi: {:.4} ({} points simulated)",
                pi, self.cumulative_processed
            ),
            None => write!(
                f,
                "Estimation of Pi: undefined ({} points simulated)",
                self.cumulative_processed
            ),
        }
    }
}

/// Owns the cumulative counters for one run.
#[derive(Debug)]
pub struct Aggregator {
    estimate: RunningEstimate,
    timeout: Option<Duration>,
}

impl Aggregator {
    pub fn new(estimate: RunningEstimate, timeout: Option<Duration>) -> Self {
        Self { estimate, timeout }
    }

    pub fn estimate(&self) -> RunningEstimate {
        self.estimate
    }

    /// Block on `handle`, fold its result and publish the new snapshot.
    pub fn resolve(&mut self, handle: TaskHandle, sink: &dyn ProgressSink) -> Result<RunningEstimate> {
        let result = handle.join(self.timeout)?;
        Ok(self.accept(&result, sink))
    }

    pub fn accept(&mut self, result: &TaskResult, sink: &dyn ProgressSink) -> RunningEstimate {
        self.estimate.fold(result);
        debug!(
            task_id = result.task_id,
            inside = result.inside_count,
            processed = self.estimate.cumulative_processed,
            "task folded"
        );
        sink.on_progress(&self.estimate);
        self.estimate
    }

    pub fn into_estimate(self) -> RunningEstimate {
        self.estimate
    }
}

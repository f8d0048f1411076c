//! Error types surfaced by the estimation engine.
//!
//! Request validation fails before any task is dispatched. Task faults and
//! interrupted retrievals abort a run. Pool teardown problems are reported
//! separately and never turn a finished run into a failure.
use std::io;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequestError {
    #[error("total points must be non-negative, got {0}")]
    NegativeTotalPoints(i64),

    #[error("task count must be at least 1")]
    ZeroTaskCount,
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),

    #[error("task {task_id} failed: {reason}")]
    TaskFailed { task_id: usize, reason: String },

    #[error("interrupted while waiting for task {task_id}")]
    Interrupted { task_id: usize },

    #[error("task {task_id} did not finish within {timeout:?}")]
    TimedOut { task_id: usize, timeout: Duration },

    #[error("failed to start worker thread")]
    PoolSpawn(#[source] io::Error),
}

impl SimulationError {
    /// Id of the task whose retrieval failed, if the failure belongs to one.
    pub fn task_id(&self) -> Option<usize> {
        match self {
            SimulationError::TaskFailed { task_id, .. }
            | SimulationError::Interrupted { task_id }
            | SimulationError::TimedOut { task_id, .. } => Some(*task_id),
            SimulationError::InvalidRequest(_) | SimulationError::PoolSpawn(_) => None,
        }
    }
}

/// Raised while releasing the worker pool. Logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeardownError {
    #[error("worker {worker} panicked before it could be joined")]
    WorkerPanicked { worker: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    #[error("sampling stopped with {remaining} points still unprocessed")]
    Incomplete { remaining: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_converts_into_simulation_error() {
        let err: SimulationError = InvalidRequestError::NegativeTotalPoints(-4).into();
        assert!(matches!(
            err,
            SimulationError::InvalidRequest(InvalidRequestError::NegativeTotalPoints(-4))
        ));
        assert_eq!(err.to_string(), "total points must be non-negative, got -4");
        assert_eq!(err.task_id(), None);
    }

    #[test]
    fn task_errors_carry_their_task_id() {
        let err = SimulationError::Interrupted { task_id: 3 };
        assert_eq!(err.task_id(), Some(3));

        let err = SimulationError::TaskFailed {
            task_id: 1,
            reason: "boom".into(),
        };
        assert_eq!(err.to_string(), "task 1 failed: boom");
    }
}

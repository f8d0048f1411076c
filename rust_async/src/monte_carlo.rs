//! Pi estimation on tokio's blocking pool.
//!
//! Each task runs through `spawn_blocking`; handles are awaited in
//! submission order, so snapshots arrive exactly as in the threaded engine.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use monte_carlo_pi::{
    partition, run_task, task_rng, Aggregator, ProgressSink, Result, RunningEstimate,
    SimulationConfig, SimulationError, SimulationRequest, TaskDescriptor, TaskResult,
};
use tokio::task::{self, JoinError, JoinHandle};
use tracing::{debug, error, info};

struct PendingTask {
    task_id: usize,
    handle: JoinHandle<Result<TaskResult>>,
}

fn spawn_task(
    descriptor: TaskDescriptor,
    seed: Option<u64>,
    sink: &Arc<dyn ProgressSink>,
) -> PendingTask {
    let sink = Arc::clone(sink);
    let handle = task::spawn_blocking(move || {
        let rng = task_rng(seed, descriptor.id);
        run_task(descriptor, rng, sink.as_ref()).map_err(|err| SimulationError::TaskFailed {
            task_id: descriptor.id,
            reason: err.to_string(),
        })
    });
    PendingTask {
        task_id: descriptor.id,
        handle,
    }
}

/// Await one task. On timeout the handle stays in `pending` so the caller
/// can still wait for the task to end.
async fn resolve(pending: &mut PendingTask, timeout: Option<Duration>) -> Result<TaskResult> {
    let task_id = pending.task_id;
    let joined = match timeout {
        None => (&mut pending.handle).await,
        Some(timeout) => match tokio::time::timeout(timeout, &mut pending.handle).await {
            Ok(joined) => joined,
            Err(_) => return Err(SimulationError::TimedOut { task_id, timeout }),
        },
    };
    joined.map_err(|err| join_error(task_id, err))?
}

fn join_error(task_id: usize, err: JoinError) -> SimulationError {
    if err.is_panic() {
        SimulationError::TaskFailed {
            task_id,
            reason: panic_message(err.into_panic()),
        }
    } else {
        SimulationError::Interrupted { task_id }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "task panicked".to_string(),
        },
    }
}

/// Async counterpart of `Simulator::run`.
///
/// Fails with an invalid request before spawning anything. On the first task
/// failure, tasks that have not started are aborted and every remaining task,
/// including one that timed out, is awaited before the error is returned. A
/// timeout therefore bounds the wait for a result, not the length of the run.
pub async fn run_simulation(
    total_points: i64,
    config: &SimulationConfig,
    sink: Arc<dyn ProgressSink>,
) -> Result<RunningEstimate> {
    let request = SimulationRequest::new(total_points, config.task_count)?;
    let tasks = partition(&request);

    let pending: Vec<_> = tasks
        .iter()
        .map(|&descriptor| spawn_task(descriptor, config.seed, &sink))
        .collect();
    debug!(tasks = pending.len(), "tasks spawned on blocking pool");

    let mut aggregator = Aggregator::new(RunningEstimate::default(), None);
    let mut remaining = pending.into_iter();
    while let Some(mut next) = remaining.next() {
        match resolve(&mut next, config.task_timeout).await {
            Ok(result) => {
                aggregator.accept(&result, sink.as_ref());
            }
            Err(err) => {
                let rest: Vec<_> = remaining.collect();
                for task in &rest {
                    task.handle.abort();
                }
                // A timed-out task never yielded its output and may still be sampling.
                if matches!(err, SimulationError::TimedOut { .. }) {
                    let _ = next.handle.await;
                }
                for task in rest {
                    let _ = task.handle.await;
                }
                error!(error = %err, "simulation aborted");
                sink.on_failure(&err);
                return Err(err);
            }
        }
    }

    let estimate = aggregator.into_estimate();
    info!(
        total_points = request.total_points(),
        processed = estimate.cumulative_processed,
        pi = ?estimate.pi_estimate(),
        "simulation completed"
    );
    Ok(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_handles_both_string_kinds() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(7u8)), "task panicked");
    }

    #[tokio::test]
    async fn timeout_is_reported_for_the_waiting_task() {
        let mut pending = PendingTask {
            task_id: 3,
            handle: task::spawn_blocking(|| {
                std::thread::sleep(Duration::from_millis(200));
                Ok(TaskResult {
                    task_id: 3,
                    inside_count: 0,
                    points_assigned: 0,
                })
            }),
        };

        let err = resolve(&mut pending, Some(Duration::from_millis(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, SimulationError::TimedOut { task_id: 3, .. }));

        // The handle is still owned and yields the late result.
        let late = pending.handle.await.unwrap().unwrap();
        assert_eq!(late.task_id, 3);
    }

    #[tokio::test]
    async fn panicking_task_becomes_task_failure() {
        let mut pending = PendingTask {
            task_id: 1,
            handle: task::spawn_blocking(|| -> Result<TaskResult> { panic!("bad sample") }),
        };
        match resolve(&mut pending, None).await {
            Err(SimulationError::TaskFailed { task_id, reason }) => {
                assert_eq!(task_id, 1);
                assert_eq!(reason, "bad sample");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}

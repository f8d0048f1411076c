//! Fixed-size worker pool that runs sampling tasks on OS threads.
//!
//! Submitting never blocks: each job is queued and a [`TaskHandle`] is
//! returned immediately. A handle yields its task's result exactly once.
//! Dropping or shutting down the pool joins every worker thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, SimulationError, TeardownError};
use crate::monte_carlo::{run_task, task_rng, TaskResult};
use crate::partition::TaskDescriptor;
use crate::sink::ProgressSink;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Blocks on a single task's result.
#[derive(Debug)]
pub struct TaskHandle {
    task_id: usize,
    rx: Receiver<Result<TaskResult>>,
}

impl TaskHandle {
    pub fn task_id(&self) -> usize {
        self.task_id
    }

    /// Wait for the result. `None` waits without limit.
    pub fn join(self, timeout: Option<Duration>) -> Result<TaskResult> {
        let task_id = self.task_id;
        match timeout {
            None => self
                .rx
                .recv()
                .map_err(|_| SimulationError::Interrupted { task_id })?,
            Some(timeout) => match self.rx.recv_timeout(timeout) {
                Ok(outcome) => outcome,
                Err(RecvTimeoutError::Timeout) => Err(SimulationError::TimedOut { task_id, timeout }),
                Err(RecvTimeoutError::Disconnected) => Err(SimulationError::Interrupted { task_id }),
            },
        }
    }
}

pub struct WorkerPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Start `slots` worker threads.
    pub fn new(slots: usize) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let cancelled = Arc::new(AtomicBool::new(false));

        // Built incrementally so a failed spawn still joins the started workers on drop.
        let mut pool = Self {
            jobs: Some(tx),
            workers: Vec::with_capacity(slots),
            cancelled,
        };

        for worker in 0..slots {
            let rx = Arc::clone(&rx);
            let cancelled = Arc::clone(&pool.cancelled);
            let handle = thread::Builder::new()
                .name(format!("pi-worker-{worker}"))
                .spawn(move || worker_loop(rx, cancelled))
                .map_err(SimulationError::PoolSpawn)?;
            pool.workers.push(handle);
        }

        debug!(slots, "worker pool started");
        Ok(pool)
    }

    pub fn slots(&self) -> usize {
        self.workers.len()
    }

    /// Queue `work` and return a handle to its outcome. A panic inside `work`
    /// becomes [`SimulationError::TaskFailed`].
    pub fn submit<F>(&self, task_id: usize, work: F) -> TaskHandle
    where
        F: FnOnce() -> Result<TaskResult> + Send + 'static,
    {
        let (result_tx, result_rx) = mpsc::sync_channel(1);
        let job: Job = Box::new(move || execute(task_id, work, result_tx));

        // A closed queue drops the job and its sender; the handle then reports an interruption.
        if let Some(jobs) = &self.jobs {
            let _ = jobs.send(job);
        }

        TaskHandle {
            task_id,
            rx: result_rx,
        }
    }

    /// Submit one sampling task per descriptor, in descriptor order.
    pub fn dispatch(
        &self,
        tasks: &[TaskDescriptor],
        seed: Option<u64>,
        sink: &Arc<dyn ProgressSink>,
    ) -> Vec<TaskHandle> {
        tasks
            .iter()
            .map(|&descriptor| {
                let sink = Arc::clone(sink);
                self.submit(descriptor.id, move || {
                    let rng = task_rng(seed, descriptor.id);
                    run_task(descriptor, rng, sink.as_ref()).map_err(|err| {
                        SimulationError::TaskFailed {
                            task_id: descriptor.id,
                            reason: err.to_string(),
                        }
                    })
                })
            })
            .collect()
    }

    /// Skip queued jobs that have not started. Running jobs finish normally.
    pub fn cancel_pending(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Close the queue and join every worker.
    pub fn shutdown(mut self) -> std::result::Result<(), TeardownError> {
        self.release()
    }

    fn release(&mut self) -> std::result::Result<(), TeardownError> {
        self.jobs.take();

        let mut outcome = Ok(());
        for (worker, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() && outcome.is_ok() {
                outcome = Err(TeardownError::WorkerPanicked { worker });
            }
        }
        outcome
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        if let Err(err) = self.release() {
            warn!(error = %err, "worker pool teardown failed");
        }
    }
}

fn worker_loop(rx: Arc<Mutex<Receiver<Job>>>, cancelled: Arc<AtomicBool>) {
    loop {
        let job = {
            let Ok(rx) = rx.lock() else { break };
            match rx.recv() {
                Ok(job) => job,
                Err(_) => break,
            }
        };
        if cancelled.load(Ordering::Acquire) {
            continue;
        }
        job();
    }
}

fn execute<F>(task_id: usize, work: F, result_tx: SyncSender<Result<TaskResult>>)
where
    F: FnOnce() -> Result<TaskResult>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(work)).unwrap_or_else(|payload| {
        Err(SimulationError::TaskFailed {
            task_id,
            reason: panic_message(payload.as_ref()),
        })
    });
    let _ = result_tx.send(outcome);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

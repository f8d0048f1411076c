//! Run configuration shared by the threaded and async schedulers.

use std::time::Duration;

/// Number of tasks a run is split into unless configured otherwise.
pub const DEFAULT_TASK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Tasks per run. Also the number of worker slots in the pool.
    pub task_count: usize,
    /// Seed for reproducible runs. `None` seeds every task from OS entropy.
    pub seed: Option<u64>,
    /// Upper bound on the wait for any single task result. `None` waits forever.
    /// A run that times out still waits for its running tasks to finish before
    /// returning, so this does not bound the length of the run.
    pub task_timeout: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            task_count: DEFAULT_TASK_COUNT,
            seed: None,
            task_timeout: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_task_count(mut self, task_count: usize) -> Self {
        self.task_count = task_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_five_unseeded_tasks() {
        let config = SimulationConfig::default();
        assert_eq!(config.task_count, 5);
        assert_eq!(config.seed, None);
        assert_eq!(config.task_timeout, None);
    }

    #[test]
    fn builders_override_defaults() {
        let config = SimulationConfig::default()
            .with_task_count(8)
            .with_seed(42)
            .with_task_timeout(Duration::from_secs(3));
        assert_eq!(config.task_count, 8);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.task_timeout, Some(Duration::from_secs(3)));
    }
}

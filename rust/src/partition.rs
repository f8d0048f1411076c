//! Splits a requested sample count into equal tasks.
//!
//! Every task receives `total_points / task_count` points. The remainder is
//! never assigned; [`SimulationRequest::dropped_points`] reports how many
//! samples a run leaves out.

use tracing::warn;

use crate::error::InvalidRequestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationRequest {
    total_points: u64,
    task_count: usize,
}

impl SimulationRequest {
    /// Validates raw input. Negative totals and zero task counts are rejected.
    pub fn new(total_points: i64, task_count: usize) -> Result<Self, InvalidRequestError> {
        if total_points < 0 {
            return Err(InvalidRequestError::NegativeTotalPoints(total_points));
        }
        if task_count == 0 {
            return Err(InvalidRequestError::ZeroTaskCount);
        }
        Ok(Self {
            total_points: total_points as u64,
            task_count,
        })
    }

    pub fn total_points(&self) -> u64 {
        self.total_points
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn points_per_task(&self) -> u64 {
        self.total_points / self.task_count as u64
    }

    pub fn dropped_points(&self) -> u64 {
        self.total_points % self.task_count as u64
    }

    /// Points a fully successful run will have processed.
    pub fn assigned_points(&self) -> u64 {
        self.points_per_task() * self.task_count as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub id: usize,
    pub points_assigned: u64,
}

/// Produce exactly `task_count` descriptors with ids `0..task_count`.
pub fn partition(request: &SimulationRequest) -> Vec<TaskDescriptor> {
    let dropped = request.dropped_points();
    if dropped > 0 {
        warn!(
            total_points = request.total_points(),
            task_count = request.task_count(),
            dropped,
            "remainder points are not assigned to any task"
        );
    }

    let points_assigned = request.points_per_task();
    (0..request.task_count())
        .map(|id| TaskDescriptor {
            id,
            points_assigned,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assigned_sum(tasks: &[TaskDescriptor]) -> u64 {
        tasks.iter().map(|t| t.points_assigned).sum()
    }

    #[test]
    fn even_split_across_five_tasks() {
        let request = SimulationRequest::new(1_000_000, 5).unwrap();
        let tasks = partition(&request);
        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| t.points_assigned == 200_000));
        assert_eq!(
            tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn remainder_is_dropped() {
        let request = SimulationRequest::new(17, 5).unwrap();
        let tasks = partition(&request);
        assert!(tasks.iter().all(|t| t.points_assigned == 3));
        assert_eq!(assigned_sum(&tasks), 15);
        assert_eq!(request.dropped_points(), 2);
        assert_eq!(request.assigned_points(), 15);
    }

    #[test]
    fn fewer_points_than_tasks_assigns_nothing() {
        let request = SimulationRequest::new(3, 5).unwrap();
        let tasks = partition(&request);
        assert_eq!(tasks.len(), 5);
        assert!(tasks.iter().all(|t| t.points_assigned == 0));
    }

    #[test]
    fn zero_points_still_produces_every_task() {
        let request = SimulationRequest::new(0, 4).unwrap();
        let tasks = partition(&request);
        assert_eq!(tasks.len(), 4);
        assert_eq!(assigned_sum(&tasks), 0);
    }

    #[test]
    fn assigned_sum_never_exceeds_total() {
        for total in [0i64, 1, 4, 5, 6, 99, 100, 101, 12_345] {
            for task_count in 1..=9usize {
                let request = SimulationRequest::new(total, task_count).unwrap();
                let tasks = partition(&request);
                let expected = task_count as u64 * (total as u64 / task_count as u64);
                assert_eq!(tasks.len(), task_count);
                assert_eq!(assigned_sum(&tasks), expected);
                assert!(assigned_sum(&tasks) <= total as u64);
            }
        }
    }

    #[test]
    fn partition_shape_is_deterministic() {
        let request = SimulationRequest::new(777, 5).unwrap();
        assert_eq!(partition(&request), partition(&request));
    }

    #[test]
    fn negative_total_is_rejected() {
        assert_eq!(
            SimulationRequest::new(-1, 5),
            Err(InvalidRequestError::NegativeTotalPoints(-1))
        );
    }

    #[test]
    fn zero_task_count_is_rejected() {
        assert_eq!(
            SimulationRequest::new(10, 0),
            Err(InvalidRequestError::ZeroTaskCount)
        );
    }
}

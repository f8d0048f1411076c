//! Sampling of random points in the unit square.
//!
//! A [`SampleGenerator`] owns its random source and yields one
//! [`PointClassified`] per assigned point, counting how many land inside the
//! quarter circle of radius 1. Generators are never shared between tasks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::SampleError;
use crate::partition::TaskDescriptor;
use crate::sink::ProgressSink;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointClassified {
    pub x: f64,
    pub y: f64,
    pub inside: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskResult {
    pub task_id: usize,
    pub inside_count: u64,
    pub points_assigned: u64,
}

#[inline]
pub fn is_inside(x: f64, y: f64) -> bool {
    x * x + y * y <= 1.0
}

/// Random source for one task.
///
/// Seeded runs give every task the same key on its own stream, so tasks
/// never overlap and a run is reproducible. Unseeded runs draw a fresh key.
pub fn task_rng(seed: Option<u64>, task_id: usize) -> ChaCha8Rng {
    match seed {
        Some(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(task_id as u64);
            rng
        }
        None => ChaCha8Rng::seed_from_u64(rand::random()),
    }
}

/// Lazy, finite stream of classified points for one task.
pub struct SampleGenerator<R> {
    rng: R,
    task_id: usize,
    points_assigned: u64,
    remaining: u64,
    inside: u64,
}

impl<R: Rng> SampleGenerator<R> {
    pub fn new(descriptor: TaskDescriptor, rng: R) -> Self {
        Self {
            rng,
            task_id: descriptor.id,
            points_assigned: descriptor.points_assigned,
            remaining: descriptor.points_assigned,
            inside: 0,
        }
    }

    pub fn inside_so_far(&self) -> u64 {
        self.inside
    }

    /// Consume the generator. Fails if points are still pending.
    pub fn finish(self) -> Result<TaskResult, SampleError> {
        if self.remaining > 0 {
            return Err(SampleError::Incomplete {
                remaining: self.remaining,
            });
        }
        Ok(TaskResult {
            task_id: self.task_id,
            inside_count: self.inside,
            points_assigned: self.points_assigned,
        })
    }
}

impl<R: Rng> Iterator for SampleGenerator<R> {
    type Item = PointClassified;

    fn next(&mut self) -> Option<PointClassified> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let x: f64 = self.rng.gen();
        let y: f64 = self.rng.gen();
        let inside = is_inside(x, y);
        if inside {
            self.inside += 1;
        }
        Some(PointClassified { x, y, inside })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<R: Rng> std::iter::FusedIterator for SampleGenerator<R> {}

/// Sample every point of `descriptor`, reporting each one to `sink`.
pub fn run_task<R: Rng>(
    descriptor: TaskDescriptor,
    rng: R,
    sink: &dyn ProgressSink,
) -> Result<TaskResult, SampleError> {
    let mut generator = SampleGenerator::new(descriptor, rng);
    for point in generator.by_ref() {
        sink.on_point_classified(point.x, point.y, point.inside);
    }
    generator.finish()
}

//! Compare run times across task counts.
//!
//! Run with: `cargo bench --bench estimate`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use monte_carlo_pi::{
    run_task, task_rng, NoopSink, ProgressSink, SimulationConfig, Simulator, TaskDescriptor,
};

const TOTAL_POINTS: i64 = 1_000_000;

fn bench_task_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    for task_count in [1usize, 2, 5, 8] {
        let config = SimulationConfig::default()
            .with_task_count(task_count)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(task_count),
            &config,
            |b, config| {
                b.iter(|| {
                    let sink: Arc<dyn ProgressSink> = Arc::new(NoopSink);
                    black_box(Simulator::new(config.clone()).run(TOTAL_POINTS, sink))
                });
            },
        );
    }
    group.finish();
}

fn bench_single_task(c: &mut Criterion) {
    let descriptor = TaskDescriptor {
        id: 0,
        points_assigned: 100_000,
    };
    c.bench_function("sample_100k", |b| {
        b.iter(|| black_box(run_task(descriptor, task_rng(Some(7), 0), &NoopSink)))
    });
}

criterion_group!(benches, bench_task_counts, bench_single_task);
criterion_main!(benches);

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use monte_carlo_pi::logging::init_logging;
use monte_carlo_pi::{LogSink, SimulationConfig, DEFAULT_TASK_COUNT};
use monte_carlo_pi_async::run_simulation;

#[derive(Parser)]
#[command(name = "monte_carlo_pi_async")]
#[command(about = "Estimate pi with sampling tasks on the tokio blocking pool", long_about = None)]
#[command(version)]
struct Args {
    /// Number of points to sample
    #[arg(allow_negative_numbers = true)]
    points: i64,

    /// Number of sampling tasks
    #[arg(long, default_value_t = DEFAULT_TASK_COUNT)]
    tasks: usize,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Give up on a task after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut config = SimulationConfig::default().with_task_count(args.tasks);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_task_timeout(Duration::from_secs(secs));
    }

    println!(
        "Sampling {} points using {} async tasks...",
        args.points, config.task_count
    );
    let start = Instant::now();
    let estimate = run_simulation(args.points, &config, Arc::new(LogSink)).await?;
    let duration = start.elapsed();

    println!("Monte Carlo Pi Estimation (Async)");
    println!("Total samples: {}", args.points);
    println!("Points simulated: {}", estimate.cumulative_processed);
    println!("Points inside circle: {}", estimate.cumulative_inside);
    match estimate.pi_estimate() {
        Some(pi) => {
            println!("Pi estimate: {:.6}", pi);
            println!("Error: {:.6}", std::f64::consts::PI - pi);
        }
        None => println!("Pi estimate: undefined (no points simulated)"),
    }
    println!("Completed in {:?}", duration);

    Ok(())
}

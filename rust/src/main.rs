use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use monte_carlo_pi::logging::init_logging;
use monte_carlo_pi::plot::DEFAULT_PLOT_SIZE;
use monte_carlo_pi::{
    ChannelSink, PointPlot, ProgressSink, RunningEstimate, SimulationConfig, SimulationError,
    Simulator, DEFAULT_TASK_COUNT,
};

#[derive(Parser)]
#[command(name = "monte_carlo_pi")]
#[command(about = "Estimate pi by sampling random points in the unit square", long_about = None)]
#[command(version)]
struct Args {
    /// Number of points to sample
    #[arg(allow_negative_numbers = true, required_unless_present = "interactive")]
    points: Option<i64>,

    /// Number of tasks (and worker threads) per run
    #[arg(long, default_value_t = DEFAULT_TASK_COUNT)]
    tasks: usize,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Give up on a task after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Write a PNG plot of every sampled point to this path
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Plot width and height in pixels
    #[arg(long, default_value_t = DEFAULT_PLOT_SIZE)]
    plot_size: u32,

    /// Read point counts from stdin; `reset` clears, `quit` exits
    #[arg(long)]
    interactive: bool,
}

/// Prints snapshots and forwards points to the plot thread, if any.
struct CliSink {
    points: Option<ChannelSink>,
}

impl ProgressSink for CliSink {
    fn on_point_classified(&self, x: f64, y: f64, inside: bool) {
        if let Some(points) = &self.points {
            points.on_point_classified(x, y, inside);
        }
    }

    fn on_progress(&self, estimate: &RunningEstimate) {
        println!("{estimate}");
    }

    fn on_failure(&self, error: &SimulationError) {
        eprintln!("Simulation failed: {error}");
    }
}

struct Session {
    simulator: Simulator,
    plot: Option<PointPlot>,
    plot_path: Option<PathBuf>,
}

impl Session {
    fn new(args: &Args) -> Self {
        let mut config = SimulationConfig::default().with_task_count(args.tasks);
        if let Some(seed) = args.seed {
            config = config.with_seed(seed);
        }
        if let Some(secs) = args.timeout_secs {
            config = config.with_task_timeout(Duration::from_secs(secs));
        }

        Self {
            simulator: Simulator::new(config),
            plot: args.plot.as_ref().map(|_| PointPlot::new(args.plot_size)),
            plot_path: args.plot.clone(),
        }
    }

    fn run(&mut self, total_points: i64) -> Result<()> {
        let (points, plotter) = match self.plot.take() {
            Some(mut plot) => {
                let (sink, rx) = ChannelSink::new();
                let plotter = thread::Builder::new()
                    .name("pi-plot".into())
                    .spawn(move || {
                        plot.consume(rx);
                        plot
                    })
                    .context("failed to start plot thread")?;
                (Some(sink), Some(plotter))
            }
            None => (None, None),
        };

        let start = Instant::now();
        let outcome = self
            .simulator
            .run(total_points, Arc::new(CliSink { points }));
        let elapsed = start.elapsed();

        // Every sink clone is gone once the run returns, which ends the plot thread.
        if let Some(plotter) = plotter {
            let plot = plotter
                .join()
                .map_err(|_| anyhow!("plot thread panicked"))?;
            self.plot = Some(plot);
            self.save_plot()?;
        }

        let estimate = outcome?;
        print_summary(total_points, &estimate, elapsed);
        Ok(())
    }

    fn reset(&mut self) {
        self.simulator.reset();
        if let Some(plot) = self.plot.as_mut() {
            plot.reset();
        }
    }

    fn save_plot(&self) -> Result<()> {
        if let (Some(plot), Some(path)) = (&self.plot, &self.plot_path) {
            plot.save(path)
                .with_context(|| format!("failed to write plot '{}'", path.display()))?;
            println!("Plot saved to {}", path.display());
        }
        Ok(())
    }
}

fn print_summary(total_points: i64, estimate: &RunningEstimate, elapsed: Duration) {
    println!("Monte Carlo Pi Estimation");
    println!("Total samples: {}", total_points);
    println!("Points simulated: {}", estimate.cumulative_processed);
    println!("Points inside circle: {}", estimate.cumulative_inside);
    match estimate.pi_estimate() {
        Some(pi) => {
            println!("Pi estimate: {:.6}", pi);
            println!("Error: {:.6}", std::f64::consts::PI - pi);
        }
        None => println!("Pi estimate: undefined (no points simulated)"),
    }
    println!("Simulation time: {}ms", elapsed.as_millis());
}

fn interactive(session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    print_prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "reset" => {
                session.reset();
                println!("Reset");
            }
            input => match input.parse::<i64>() {
                Ok(points) => {
                    if let Err(err) = session.run(points) {
                        eprintln!("Error: {err:#}");
                    }
                }
                Err(_) => eprintln!("Not a number of points: {input}"),
            },
        }
        print_prompt()?;
    }
    Ok(())
}

fn print_prompt() -> Result<()> {
    print!("points> ");
    io::stdout().flush().context("failed to flush stdout")
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let mut session = Session::new(&args);
    if args.interactive {
        return interactive(&mut session);
    }

    match args.points {
        Some(points) => session.run(points),
        None => Err(anyhow!("number of points is required")),
    }
}

//! Paddock herding simulator CLI
//!
//! Runs sheep and dogs on a walled grid until a sheep escapes through a gate.

use clap::Parser;
use paddock_env::{PaddockContext, TokioContext};
use paddock_core::ConfigError;
use paddock_sim::{
    run_cap_from_secs, NullSink, SimConfig, SimContext, SimError, SimulationRunner, TerminalSink,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Paddock herding simulation
#[derive(Parser, Debug)]
#[command(name = "paddock-sim")]
#[command(about = "Run a concurrent herding simulation on a walled grid", long_about = None)]
struct Args {
    /// Grid rows ((rows - 2) must be divisible by 3)
    #[arg(short, long, default_value = "14")]
    rows: i32,

    /// Grid columns ((cols - 2) must be divisible by 3)
    #[arg(short, long, default_value = "14")]
    cols: i32,

    /// Number of herded agents (sheep)
    #[arg(long, default_value = "10")]
    herded: usize,

    /// Number of herder agents (dogs)
    #[arg(long, default_value = "5")]
    herders: usize,

    /// Agent idle time between moves, in milliseconds
    #[arg(long, default_value = "200")]
    tick_ms: u64,

    /// Escape check and redraw interval, in milliseconds
    #[arg(long, default_value = "200")]
    poll_ms: u64,

    /// How long to wait for agents to stop before aborting them, in milliseconds
    #[arg(long, default_value = "5000")]
    shutdown_ms: u64,

    /// Candidate steps sampled per agent tick
    #[arg(long, default_value = "64")]
    max_attempts: u32,

    /// Stop after this many seconds even without an escape
    #[arg(long)]
    max_duration: Option<f64>,

    /// Master seed for the layout and agent moves (0 = random from time)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Use a virtual clock instead of real time
    #[arg(long)]
    virtual_clock: bool,

    /// Do not clear the screen between frames
    #[arg(long)]
    no_clear: bool,

    /// Print a JSON summary instead of drawing the grid
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig, ConfigError> {
        Ok(SimConfig {
            rows: self.rows,
            cols: self.cols,
            herded_count: self.herded,
            herder_count: self.herders,
            tick_interval: Duration::from_millis(self.tick_ms),
            poll_interval: Duration::from_millis(self.poll_ms),
            shutdown_timeout: Duration::from_millis(self.shutdown_ms),
            max_move_attempts: self.max_attempts,
            max_duration: self.max_duration.map(run_cap_from_secs).transpose()?,
        })
    }
}

async fn run<Ctx: PaddockContext>(args: &Args, ctx: Arc<Ctx>) -> Result<(), SimError> {
    let seed = ctx.seed();
    let runner = SimulationRunner::new(args.sim_config()?);

    if args.json {
        let result = runner.run(ctx, &mut NullSink).await?;
        let summary = serde_json::to_string_pretty(&result.summary(seed))
            .map_err(std::io::Error::from)?;
        println!("{}", summary);
        return Ok(());
    }

    let mut sink = TerminalSink::stdout(!args.no_clear);
    let result = runner.run(ctx, &mut sink).await?;
    info!(
        seed,
        escaped = result.escaped(),
        polls = result.polls,
        elapsed = ?result.elapsed,
        "run finished"
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging; stdout belongs to the grid.
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Determine master seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    if !args.json {
        info!(seed, virtual_clock = args.virtual_clock, "Paddock simulator v0.1.0");
    }

    let outcome = if args.virtual_clock {
        run(&args, SimContext::shared(seed)).await
    } else {
        run(&args, TokioContext::shared(seed)).await
    };

    if let Err(e) = outcome {
        error!("{}", e);
        std::process::exit(1);
    }
}

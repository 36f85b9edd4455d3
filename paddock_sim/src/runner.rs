//! Simulation runner - build the farm, run agents until a herded agent escapes.

use crate::error::SimError;
use crate::lifecycle::{AgentScheduler, ShutdownReport};
use crate::sink::FrameSink;

use paddock_core::render::render;
use paddock_core::{AgentConfig, AgentExit, AgentId, ConfigError, EscapeDetector, Farm, FarmConfig};
use paddock_core::{AgentKind, AgentStats, Position};
use paddock_env::{PaddockContext, LAYOUT_STREAM};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Notice emitted when a herded agent reaches a gate.
pub const ESCAPE_NOTICE: &str = "A herded agent has escaped! Please wait a few seconds...";
/// Notice emitted when the run cap is reached first.
pub const TIMEOUT_NOTICE: &str = "Run limit reached without an escape.";
/// Notice emitted when some agents had to be aborted.
pub const FORCED_NOTICE: &str = "Forcing shutdown...";
/// Final notice.
pub const TERMINATED_NOTICE: &str = "Simulation terminated.";

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Grid rows (default: 14)
    pub rows: i32,

    /// Grid columns (default: 14)
    pub cols: i32,

    /// Herded agents (default: 10)
    pub herded_count: usize,

    /// Herder agents (default: 5)
    pub herder_count: usize,

    /// Agent idle interval between moves (default: 200ms)
    pub tick_interval: Duration,

    /// Escape check and render cadence (default: 200ms)
    pub poll_interval: Duration,

    /// Cooperative shutdown wait before aborting (default: 5s)
    pub shutdown_timeout: Duration,

    /// Candidate samples per agent tick (default: 64)
    pub max_move_attempts: u32,

    /// Stop without an escape after this long (default: unlimited)
    pub max_duration: Option<Duration>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let farm = FarmConfig::default();
        let agent = AgentConfig::default();
        Self {
            rows: farm.rows,
            cols: farm.cols,
            herded_count: farm.herded_count,
            herder_count: farm.herder_count,
            tick_interval: agent.tick_interval,
            poll_interval: Duration::from_millis(200),
            shutdown_timeout: Duration::from_secs(5),
            max_move_attempts: agent.max_move_attempts,
            max_duration: None,
        }
    }
}

impl SimConfig {
    pub fn farm_config(&self) -> FarmConfig {
        FarmConfig {
            rows: self.rows,
            cols: self.cols,
            herded_count: self.herded_count,
            herder_count: self.herder_count,
        }
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            tick_interval: self.tick_interval,
            max_move_attempts: self.max_move_attempts,
        }
    }

    /// Checks every parameter. Nothing is spawned if this fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.farm_config().validate()?;
        self.validate_timing()
    }

    /// Checks the timing and sampling parameters only, for runs on a farm
    /// that was built elsewhere.
    pub fn validate_timing(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("tick_interval"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll_interval"));
        }
        if self.max_move_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if matches!(self.max_duration, Some(cap) if cap.is_zero()) {
            return Err(ConfigError::ZeroDuration("max_duration"));
        }
        Ok(())
    }
}

/// Converts a run cap given in seconds.
///
/// Negative, NaN, infinite and zero values are rejected rather than read as
/// "no cap".
pub fn run_cap_from_secs(secs: f64) -> Result<Duration, ConfigError> {
    let cap = Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidDuration("max_duration"))?;
    if cap.is_zero() {
        return Err(ConfigError::ZeroDuration("max_duration"));
    }
    Ok(cap)
}

/// Why the run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Herded agents found standing on gates
    Escaped { agents: Vec<AgentId> },
    /// `max_duration` elapsed first
    TimedOut,
}

/// Results from a simulation run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Why the run ended
    pub outcome: RunOutcome,

    /// Context time from agent start to the end of polling
    pub elapsed: Duration,

    /// Escape checks performed
    pub polls: u64,

    /// Frames handed to the sink, including the final one
    pub frames: u64,

    /// Agent shutdown details and per-agent reports
    pub shutdown: ShutdownReport,
}

impl RunResult {
    pub fn escaped(&self) -> bool {
        matches!(self.outcome, RunOutcome::Escaped { .. })
    }

    /// Flattened, serializable view of the result.
    pub fn summary(&self, seed: u64) -> RunSummary {
        let escaped = match &self.outcome {
            RunOutcome::Escaped { agents } => agents.iter().map(|id| id.0).collect(),
            RunOutcome::TimedOut => Vec::new(),
        };
        RunSummary {
            seed,
            outcome: if self.escaped() { "escaped" } else { "timed_out" },
            escaped,
            elapsed_secs: self.elapsed.as_secs_f64(),
            polls: self.polls,
            frames: self.frames,
            stopped: self.shutdown.stopped(),
            aborted: self.shutdown.aborted.iter().map(|id| id.0).collect(),
            panicked: self.shutdown.panicked.iter().map(|id| id.0).collect(),
            agents: self
                .shutdown
                .reports
                .iter()
                .map(|r| AgentSummary {
                    id: r.id.0,
                    kind: r.kind,
                    position: r.position,
                    stats: r.stats,
                    fault: match &r.exit {
                        AgentExit::Canceled => None,
                        AgentExit::Faulted(err) => Some(err.to_string()),
                    },
                })
                .collect(),
        }
    }
}

/// JSON summary of a run, printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub outcome: &'static str,
    pub escaped: Vec<u32>,
    pub elapsed_secs: f64,
    pub polls: u64,
    pub frames: u64,
    pub stopped: usize,
    pub aborted: Vec<u32>,
    pub panicked: Vec<u32>,
    pub agents: Vec<AgentSummary>,
}

/// Final state of one agent that stopped cooperatively.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: u32,
    pub kind: AgentKind,
    pub position: Position,
    pub stats: AgentStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// Runs simulations.
pub struct SimulationRunner {
    config: SimConfig,
}

impl SimulationRunner {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Validates the configuration, builds a random farm from the context's
    /// layout stream and runs it.
    pub async fn run<Ctx, S>(&self, ctx: Arc<Ctx>, sink: &mut S) -> Result<RunResult, SimError>
    where
        Ctx: PaddockContext,
        S: FrameSink,
    {
        self.config.validate()?;
        let farm = Farm::build(&self.config.farm_config(), &mut ctx.rng_stream(LAYOUT_STREAM))?;
        info!(
            seed = ctx.seed(),
            rows = self.config.rows,
            cols = self.config.cols,
            gates = ?farm.gates(),
            "farm ready"
        );
        self.run_farm(ctx, &farm, sink).await
    }

    /// Runs an already built farm.
    ///
    /// Polls the escape detector every `poll_interval`, rendering a frame
    /// each time. On escape (or run cap) renders once more, emits a notice
    /// and shuts the agents down. Agents are always shut down, even when the
    /// sink fails.
    pub async fn run_farm<Ctx, S>(&self, ctx: Arc<Ctx>, farm: &Farm, sink: &mut S) -> Result<RunResult, SimError>
    where
        Ctx: PaddockContext,
        S: FrameSink,
    {
        self.config.validate_timing()?;
        let detector = farm.detector();
        let scheduler = AgentScheduler::start(&ctx, farm.agents(ctx.as_ref(), self.config.agent_config()));
        let started = ctx.now();

        let mut polls = 0;
        let mut frames = 0;
        let watched = self
            .watch(ctx.as_ref(), farm, &detector, sink, started, &mut polls, &mut frames)
            .await;
        let elapsed = ctx.now().saturating_sub(started);

        let outcome = match watched {
            Ok(outcome) => outcome,
            Err(err) => {
                scheduler.shutdown(self.config.shutdown_timeout).await;
                return Err(err);
            }
        };

        let closing = self.close(farm, sink, &outcome, &mut frames);
        let shutdown = scheduler.shutdown(self.config.shutdown_timeout).await;
        closing?;
        if shutdown.forced() {
            sink.notice(FORCED_NOTICE)?;
        }
        sink.notice(TERMINATED_NOTICE)?;

        Ok(RunResult {
            outcome,
            elapsed,
            polls,
            frames,
            shutdown,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn watch<Ctx, S>(
        &self,
        ctx: &Ctx,
        farm: &Farm,
        detector: &EscapeDetector,
        sink: &mut S,
        started: Duration,
        polls: &mut u64,
        frames: &mut u64,
    ) -> Result<RunOutcome, SimError>
    where
        Ctx: PaddockContext,
        S: FrameSink,
    {
        loop {
            *polls += 1;
            if detector.has_escaped() {
                let agents = detector.escaped_agents();
                info!(?agents, polls = *polls, "herded agent escaped");
                return Ok(RunOutcome::Escaped { agents });
            }
            if let Some(limit) = self.config.max_duration {
                if ctx.now().saturating_sub(started) >= limit {
                    info!(polls = *polls, "run limit reached");
                    return Ok(RunOutcome::TimedOut);
                }
            }

            sink.frame(&render(&farm.grid().snapshot(), farm.roster()))?;
            *frames += 1;
            if *polls % 50 == 0 {
                debug!(polls = *polls, t = ?ctx.now().saturating_sub(started), "still running");
            }
            ctx.sleep(self.config.poll_interval).await;
        }
    }

    fn close<S: FrameSink>(
        &self,
        farm: &Farm,
        sink: &mut S,
        outcome: &RunOutcome,
        frames: &mut u64,
    ) -> Result<(), SimError> {
        sink.frame(&render(&farm.grid().snapshot(), farm.roster()))?;
        *frames += 1;
        match outcome {
            RunOutcome::Escaped { .. } => sink.notice(ESCAPE_NOTICE)?,
            RunOutcome::TimedOut => sink.notice(TIMEOUT_NOTICE)?,
        }
        Ok(())
    }
}

//! Agent - one long-lived task per herded or herder entity.
//!
//! ```text
//!          ┌────────────── Running ───────────────┐
//!          │  tick(): one MovementProtocol step    │
//!          │  sleep(tick_interval)  ◄── stop? ─────┼──► Canceled
//!          └──────────────────────────────────────┘
//! ```
//!
//! A tick is synchronous and never awaits, so a stop request (or a forced
//! abort) can only land between moves, never inside one.

use crate::cell::{AgentId, AgentKind, Position};
use crate::error::MoveError;
use crate::grid::GridState;
use crate::movement::{MoveOutcome, MovementProtocol, StayReason, DEFAULT_MAX_ATTEMPTS};
use crate::roster::AgentRecord;
use crate::signal::StopSignal;

use paddock_env::PaddockContext;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Per-agent timing and sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// Idle interval between ticks (default: 200ms)
    pub tick_interval: Duration,

    /// Candidate samples per tick before skipping it (default: 64)
    pub max_move_attempts: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            max_move_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Counters kept by each agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgentStats {
    /// Movement protocol invocations
    pub ticks: u64,
    /// Successful moves
    pub moves: u64,
    /// Targets lost to another agent under lock
    pub conflicts: u64,
    /// Ticks skipped for lack of a legal target
    pub boxed: u64,
}

impl AgentStats {
    fn record(&mut self, outcome: &MoveOutcome) {
        self.ticks += 1;
        self.conflicts += u64::from(outcome.conflicts());
        match outcome {
            MoveOutcome::Moved { .. } => self.moves += 1,
            MoveOutcome::Stayed { reason: StayReason::Boxed, .. } => self.boxed += 1,
            MoveOutcome::Stayed { reason: StayReason::Escaped, .. } => {}
        }
    }
}

/// Lifecycle state of an agent loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Running,
    Canceled,
}

/// How an agent loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentExit {
    /// Stopped by the stop signal
    Canceled,
    /// Stopped by an internal fault; locks were released first
    Faulted(MoveError),
}

/// Final report returned by an agent task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReport {
    pub id: AgentId,
    pub kind: AgentKind,
    pub position: Position,
    pub stats: AgentStats,
    pub exit: AgentExit,
}

/// A single herded or herder agent.
pub struct Agent {
    record: Arc<AgentRecord>,
    grid: Arc<GridState>,
    rng: ChaCha8Rng,
    config: AgentConfig,
    stats: AgentStats,
}

impl Agent {
    /// Creates an agent already placed on the grid at its record's position.
    pub fn new(
        record: Arc<AgentRecord>,
        grid: Arc<GridState>,
        rng: ChaCha8Rng,
        config: AgentConfig,
    ) -> Self {
        Self {
            record,
            grid,
            rng,
            config,
            stats: AgentStats::default(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.record.id()
    }

    pub fn kind(&self) -> AgentKind {
        self.record.kind()
    }

    pub fn position(&self) -> Position {
        self.record.position()
    }

    pub fn stats(&self) -> AgentStats {
        self.stats
    }

    /// Runs one movement protocol step.
    pub fn tick(&mut self) -> Result<MoveOutcome, MoveError> {
        let protocol = MovementProtocol::new(&self.grid, self.config.max_move_attempts);
        let outcome = protocol.step(&self.record, &mut self.rng)?;
        self.stats.record(&outcome);
        Ok(outcome)
    }

    /// Runs the agent loop until the stop signal is raised.
    pub async fn run<Ctx: PaddockContext>(mut self, ctx: Arc<Ctx>, mut stop: StopSignal) -> AgentReport {
        let mut state = AgentState::Running;

        while state == AgentState::Running {
            if stop.is_stopped() {
                state = AgentState::Canceled;
                continue;
            }

            if let Err(err) = self.tick() {
                error!(agent = %self.id(), kind = %self.kind(), "movement fault: {}", err);
                return self.report(AgentExit::Faulted(err));
            }

            tokio::select! {
                _ = ctx.sleep(self.config.tick_interval) => {}
                _ = stop.stopped() => state = AgentState::Canceled,
            }
        }

        debug!(
            agent = %self.id(),
            kind = %self.kind(),
            ticks = self.stats.ticks,
            moves = self.stats.moves,
            conflicts = self.stats.conflicts,
            "agent stopped"
        );
        self.report(AgentExit::Canceled)
    }

    fn report(&self, exit: AgentExit) -> AgentReport {
        AgentReport {
            id: self.id(),
            kind: self.kind(),
            position: self.position(),
            stats: self.stats,
            exit,
        }
    }
}

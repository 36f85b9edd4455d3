//! Paddock Simulation Runner
//!
//! This crate drives a herding run end to end: it builds a farm, starts one
//! task per agent, watches the gates and stops everything once a herded agent
//! gets out.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    SimulationRunner                      │
//! │                                                          │
//! │   poll ──► EscapeDetector ──► escaped? ──► shutdown      │
//! │    │                                          │          │
//! │    ▼                                          ▼          │
//! │  render ──► FrameSink              AgentScheduler        │
//! │             (terminal / null)      stop ─► wait ─► abort │
//! │                                        │                 │
//! │                            ┌───────────┴──────────┐      │
//! │                            │ Agent │ Agent │ ...  │      │
//! │                            └──────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Time and randomness come from a [`PaddockContext`](paddock_env::PaddockContext):
//! `TokioContext` for the real clock, [`SimContext`] for a virtual one.
//!
//! # Usage
//!
//! ```ignore
//! use paddock_sim::{SimConfig, SimContext, SimulationRunner, TerminalSink};
//!
//! let runner = SimulationRunner::new(SimConfig::default());
//! let result = runner
//!     .run(SimContext::shared(42), &mut TerminalSink::stdout(true))
//!     .await?;
//! ```

mod context;
mod error;
mod lifecycle;
mod runner;
mod sink;

pub use context::SimContext;
pub use error::SimError;
pub use lifecycle::{AgentScheduler, ShutdownReport};
pub use runner::{
    run_cap_from_secs, AgentSummary, RunOutcome, RunResult, RunSummary, SimConfig,
    SimulationRunner, ESCAPE_NOTICE, FORCED_NOTICE, TERMINATED_NOTICE, TIMEOUT_NOTICE,
};
pub use sink::{FrameSink, NullSink, TerminalSink, CLEAR_SCREEN};

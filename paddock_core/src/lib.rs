//! Paddock Core - concurrent herding on a per-cell locked grid
//!
//! Herded agents ("sheep") and herder agents ("dogs") each run as their own
//! task, taking one random step per tick on a shared bounded grid. The crate
//! guarantees three properties without any grid-wide lock:
//!
//! 1. **Mutual exclusion**: a cell holds at most one agent, and an agent's
//!    published position always names the one cell that holds it
//! 2. **Deadlock freedom**: the two cells of a move are locked in row-major
//!    rank order
//! 3. **Zone containment**: herders never leave the outer zone
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Farm                            │
//! │  ┌──────────────┐   ┌───────────────┐   ┌─────────────┐  │
//! │  │  GridState   │   │    Roster     │   │    Gates    │  │
//! │  │ Mutex / cell │   │ atomic coords │   │   [Pos; 4]  │  │
//! │  └──────▲───────┘   └──────▲────────┘   └──────▲──────┘  │
//! │         │ lock pair        │ publish           │         │
//! │  ┌──────┴──────────────────┴───┐        ┌──────┴──────┐  │
//! │  │  Agent ──► MovementProtocol │  ...   │   Escape    │  │
//! │  │  (one task per agent)       │        │  Detector   │  │
//! │  └─────────────────────────────┘        └─────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod cell;
pub mod error;
pub mod escape;
pub mod farm;
pub mod grid;
pub mod movement;
pub mod render;
pub mod roster;
pub mod signal;
pub mod zone;

// Re-export key types for convenience
pub use agent::{Agent, AgentConfig, AgentExit, AgentReport, AgentState, AgentStats};
pub use cell::{AgentId, AgentKind, CellContent, Position, Step};
pub use error::{ConfigError, MoveError};
pub use escape::EscapeDetector;
pub use farm::{Farm, FarmConfig};
pub use grid::{CellGuard, CellPair, GridSnapshot, GridState};
pub use movement::{CommitOutcome, MoveOutcome, MovementProtocol, StayReason};
pub use roster::{AgentRecord, Roster};
pub use signal::{stop_channel, StopHandle, StopSignal};
pub use zone::{GridDims, ZoneClassifier};

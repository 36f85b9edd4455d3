//! Error types for the Paddock core.

use crate::cell::{AgentId, AgentKind, Position};
use thiserror::Error;

/// Rejected configuration. Raised before any agent is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Dimensions below the 5×5 minimum
    #[error("Grid {rows}x{cols} is too small: both dimensions must be at least 5")]
    TooSmall { rows: i32, cols: i32 },

    /// Dimensions above the supported maximum side
    #[error("Grid {rows}x{cols} is too large: both dimensions must be at most {max}")]
    TooLarge { rows: i32, cols: i32, max: i32 },

    /// Dimensions that do not split the interior into exact thirds
    #[error("Grid {rows}x{cols} is invalid: dimensions must be a multiple of three plus two")]
    InvalidDimensions { rows: i32, cols: i32 },

    /// More agents of a kind than free cells in their starting zone
    #[error("Cannot place {requested} {kind} agents: only {available} cells available")]
    PlacementCapacity {
        kind: AgentKind,
        requested: usize,
        available: usize,
    },

    /// A fixed layout names a cell the kind may not start on
    #[error("Cannot place {kind} agent at {position}: {reason}")]
    InvalidPlacement {
        kind: AgentKind,
        position: Position,
        reason: &'static str,
    },

    /// A gate that is not a non-corner border cell of its side
    #[error("Gate at {0} is not a non-corner cell of its border side")]
    InvalidGate(Position),

    /// A zero-length timing parameter
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// A timing parameter that is negative, not a number or out of range
    #[error("{0} must be a finite, positive number of seconds")]
    InvalidDuration(&'static str),

    /// Rejection sampling needs at least one attempt per tick
    #[error("max_move_attempts must be at least 1")]
    ZeroAttempts,
}

/// Internal fault raised by the movement protocol.
///
/// These indicate a broken invariant, not contention. Both cell locks are
/// released before the error reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The agent's recorded cell does not hold the agent
    #[error("Agent {agent} expected at {position} but the cell is {found}")]
    PositionMismatch {
        agent: AgentId,
        position: Position,
        found: String,
    },

    /// The agent's recorded position is off the grid
    #[error("Agent {agent} recorded at out-of-bounds {position}")]
    OutOfBounds { agent: AgentId, position: Position },
}

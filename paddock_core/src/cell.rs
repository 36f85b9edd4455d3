//! Cell contents, coordinates and agent identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid coordinate. `row` indexes top to bottom, `col` left to right.
///
/// Signed so that neighbours of border cells can be expressed and then
/// rejected by the bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Creates a position.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the position shifted by a step.
    pub fn offset(self, step: Step) -> Self {
        Self {
            row: self.row + step.d_row,
            col: self.col + step.d_col,
        }
    }

    /// Packs the position into a single word for atomic publication.
    ///
    /// Only meaningful for in-bounds (non-negative) positions.
    pub(crate) fn pack(self) -> u64 {
        ((self.row as u32 as u64) << 32) | (self.col as u32 as u64)
    }

    /// Inverse of [`Position::pack`].
    pub(crate) fn unpack(word: u64) -> Self {
        Self {
            row: (word >> 32) as u32 as i32,
            col: word as u32 as i32,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A one-cell move to any of the eight neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub d_row: i32,
    pub d_col: i32,
}

impl Step {
    /// Creates a step. Returns `None` for the null step or components
    /// outside `{-1, 0, 1}`.
    pub fn new(d_row: i32, d_col: i32) -> Option<Self> {
        let unit = (-1..=1).contains(&d_row) && (-1..=1).contains(&d_col);
        (unit && (d_row, d_col) != (0, 0)).then_some(Self { d_row, d_col })
    }
}

/// Stable agent identity. Doubles as the index into the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    /// Returns the roster index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two kinds of agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Wanders anywhere passable; escapes by reaching a gate ("sheep")
    Herded,
    /// Confined to the outer zone ("dog")
    Herder,
}

impl AgentKind {
    /// Returns the kind name.
    pub fn name(&self) -> &'static str {
        match self {
            AgentKind::Herded => "herded",
            AgentKind::Herder => "herder",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellContent {
    /// Immutable border
    Wall,
    /// Passable border opening
    Gate,
    /// Unoccupied interior cell
    Empty,
    /// Holds exactly one agent
    Occupied(AgentId),
}

impl CellContent {
    /// Returns the occupying agent, if any.
    pub fn occupant(&self) -> Option<AgentId> {
        match self {
            CellContent::Occupied(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellContent::Wall => f.write_str("wall"),
            CellContent::Gate => f.write_str("gate"),
            CellContent::Empty => f.write_str("empty"),
            CellContent::Occupied(id) => write!(f, "occupied by {}", id),
        }
    }
}

//! GridState - cell contents guarded by one lock per cell.
//!
//! Every cell owns its own `Mutex<CellContent>`, created once in
//! [`GridState::new`] and never replaced. There is no grid-wide lock:
//! movement only ever holds the two locks of the cells it touches.
//!
//! # Lock Order
//!
//! ```text
//!   rank(cell) = row * cols + col        (row-major index)
//!
//!   agent A: (2,3) -> (2,4)   locks rank 31, then 32
//!   agent B: (2,4) -> (2,3)   locks rank 31, then 32
//! ```
//!
//! Pairs are always locked lowest rank first, so two movers can never each
//! hold the lock the other is waiting for.

use crate::cell::{CellContent, Position};
use crate::zone::{GridDims, ZoneClassifier};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The shared grid.
pub struct GridState {
    dims: GridDims,
    zones: ZoneClassifier,
    cells: Vec<Mutex<CellContent>>,
}

impl GridState {
    /// Creates a grid with walls on the border and empty interior cells.
    pub fn new(dims: GridDims) -> Self {
        let cells = dims
            .positions()
            .map(|pos| {
                let content = if dims.is_border(pos) {
                    CellContent::Wall
                } else {
                    CellContent::Empty
                };
                Mutex::new(content)
            })
            .collect();

        Self {
            dims,
            zones: ZoneClassifier::new(dims),
            cells,
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn zones(&self) -> &ZoneClassifier {
        &self.zones
    }

    /// Returns the fixed lock of a cell.
    ///
    /// The same position always yields the same lock.
    pub fn lock_for(&self, pos: Position) -> Option<&Mutex<CellContent>> {
        self.dims.index_of(pos).map(|index| &self.cells[index])
    }

    /// Best-effort read of a cell, for candidate filtering only.
    ///
    /// The lock is held just long enough to copy the content, so the value
    /// may be stale by the time the caller acts on it.
    pub fn peek(&self, pos: Position) -> Option<CellContent> {
        self.lock_for(pos).map(|lock| *acquire(lock))
    }

    /// Locks a single cell.
    pub fn lock_cell(&self, pos: Position) -> Option<CellGuard<'_>> {
        self.lock_for(pos).map(|lock| CellGuard {
            position: pos,
            guard: acquire(lock),
        })
    }

    /// Locks the source and target cells of a move in canonical order.
    ///
    /// Returns `None` if either position is out of bounds. When both
    /// positions name the same cell only one lock is taken.
    pub fn lock_pair(&self, source: Position, target: Position) -> Option<CellPair<'_>> {
        let source_rank = self.dims.index_of(source)?;
        let target_rank = self.dims.index_of(target)?;

        if source_rank == target_rank {
            return Some(CellPair {
                source: CellGuard { position: source, guard: acquire(&self.cells[source_rank]) },
                target: None,
            });
        }

        let (source_guard, target_guard) = if source_rank < target_rank {
            let s = acquire(&self.cells[source_rank]);
            let t = acquire(&self.cells[target_rank]);
            (s, t)
        } else {
            let t = acquire(&self.cells[target_rank]);
            let s = acquire(&self.cells[source_rank]);
            (s, t)
        };

        Some(CellPair {
            source: CellGuard { position: source, guard: source_guard },
            target: Some(CellGuard { position: target, guard: target_guard }),
        })
    }

    /// Copies every cell, locking one cell at a time.
    ///
    /// Each cell is individually consistent; the frame as a whole may mix
    /// states from moves in flight.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            dims: self.dims,
            cells: self.cells.iter().map(|lock| *acquire(lock)).collect(),
        }
    }
}

/// Cell contents are `Copy` values replaced in one assignment, so a poisoned
/// lock still guards a coherent value.
fn acquire(lock: &Mutex<CellContent>) -> MutexGuard<'_, CellContent> {
    lock.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A held cell lock. Dropping it releases the lock.
pub struct CellGuard<'g> {
    position: Position,
    guard: MutexGuard<'g, CellContent>,
}

impl CellGuard<'_> {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn get(&self) -> CellContent {
        *self.guard
    }

    pub fn set(&mut self, content: CellContent) {
        *self.guard = content;
    }
}

/// Both locks of a move. Dropping it releases both, on every exit path.
pub struct CellPair<'g> {
    source: CellGuard<'g>,
    target: Option<CellGuard<'g>>,
}

impl CellPair<'_> {
    pub fn source(&self) -> CellContent {
        self.source.get()
    }

    pub fn target(&self) -> CellContent {
        self.target.as_ref().unwrap_or(&self.source).get()
    }

    pub fn set_source(&mut self, content: CellContent) {
        self.source.set(content);
    }

    pub fn set_target(&mut self, content: CellContent) {
        self.target.as_mut().unwrap_or(&mut self.source).set(content);
    }

    /// True when source and target are the same cell.
    pub fn is_single(&self) -> bool {
        self.target.is_none()
    }
}

/// A copied frame of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    dims: GridDims,
    cells: Vec<CellContent>,
}

impl GridSnapshot {
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn get(&self, pos: Position) -> Option<CellContent> {
        self.dims.index_of(pos).map(|index| self.cells[index])
    }

    /// Rows of cells, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[CellContent]> {
        self.cells.chunks(self.dims.cols() as usize)
    }

    /// Occupied cells with their occupants.
    pub fn occupants(&self) -> impl Iterator<Item = (Position, crate::cell::AgentId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(index, cell)| cell.occupant().map(|id| (self.dims.position_of(index), id)))
    }
}

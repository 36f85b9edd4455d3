//! Grid dimensions and inner/outer zone classification.

use crate::cell::Position;
use crate::error::ConfigError;
use std::ops::Range;

/// Validated grid dimensions.
///
/// Both sides are between 5 and [`GridDims::MAX_SIDE`] and
/// `(side - 2) % 3 == 0`, so the interior divides into exact thirds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    rows: i32,
    cols: i32,
}

impl GridDims {
    /// Default side length.
    pub const DEFAULT_SIDE: i32 = 14;

    /// Largest accepted side length. Keeps `rows * cols` well inside `i32`.
    pub const MAX_SIDE: i32 = 1_000;

    /// Validates and creates dimensions.
    pub fn new(rows: i32, cols: i32) -> Result<Self, ConfigError> {
        if rows < 5 || cols < 5 {
            return Err(ConfigError::TooSmall { rows, cols });
        }
        if rows > Self::MAX_SIDE || cols > Self::MAX_SIDE {
            return Err(ConfigError::TooLarge { rows, cols, max: Self::MAX_SIDE });
        }
        if (rows - 2) % 3 != 0 || (cols - 2) % 3 != 0 {
            return Err(ConfigError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Always false; dimensions are at least 5×5.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Row-major index, or `None` when out of bounds.
    ///
    /// This is also the canonical lock rank of the cell.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.row * self.cols + pos.col) as usize)
    }

    /// Inverse of [`GridDims::index_of`].
    pub fn position_of(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index / self.cols, index % self.cols)
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        (0..self.rows).contains(&pos.row) && (0..self.cols).contains(&pos.col)
    }

    /// True for the outermost ring of cells.
    pub fn is_border(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && (pos.row == 0 || pos.col == 0 || pos.row == self.rows - 1 || pos.col == self.cols - 1)
    }

    /// True for border cells that are not corners (legal gate sites).
    pub fn is_gate_site(&self, pos: Position) -> bool {
        let row_edge = pos.row == 0 || pos.row == self.rows - 1;
        let col_edge = pos.col == 0 || pos.col == self.cols - 1;
        self.is_border(pos) && !(row_edge && col_edge)
    }

    /// Iterates every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }
}

impl Default for GridDims {
    fn default() -> Self {
        Self {
            rows: Self::DEFAULT_SIDE,
            cols: Self::DEFAULT_SIDE,
        }
    }
}

/// Pure zone classification over fixed dimensions.
///
/// Inner rows are `[rows/3, 2*rows/3)` and inner columns `[cols/3, 2*cols/3)`.
/// A cell is inner only when both its row and column are inner; every other
/// in-bounds cell is outer.
#[derive(Debug, Clone)]
pub struct ZoneClassifier {
    dims: GridDims,
    inner_rows: Range<i32>,
    inner_cols: Range<i32>,
}

impl ZoneClassifier {
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            inner_rows: dims.rows / 3..2 * dims.rows / 3,
            inner_cols: dims.cols / 3..2 * dims.cols / 3,
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.dims.in_bounds(pos)
    }

    pub fn is_inner_zone(&self, pos: Position) -> bool {
        self.inner_rows.contains(&pos.row) && self.inner_cols.contains(&pos.col)
    }

    /// False out of bounds.
    pub fn is_outer_zone(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_inner_zone(pos)
    }

    /// Number of inner-zone cells.
    pub fn inner_len(&self) -> usize {
        self.inner_rows.len() * self.inner_cols.len()
    }

    /// Number of interior (non-border) cells in the outer zone.
    pub fn outer_interior_len(&self) -> usize {
        let interior = (self.dims.rows - 2) as usize * (self.dims.cols - 2) as usize;
        interior - self.inner_len()
    }

    /// Inner-zone positions in row-major order.
    pub fn inner_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.inner_rows.clone().flat_map(move |row| {
            self.inner_cols.clone().map(move |col| Position::new(row, col))
        })
    }
}

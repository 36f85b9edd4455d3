//! Farm construction - walls, gates and initial agent placement.

use crate::agent::{Agent, AgentConfig};
use crate::cell::{AgentKind, CellContent, Position};
use crate::error::ConfigError;
use crate::escape::EscapeDetector;
use crate::grid::GridState;
use crate::roster::Roster;
use crate::zone::{GridDims, ZoneClassifier};

use paddock_env::PaddockContext;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmConfig {
    /// Grid rows (default: 14)
    pub rows: i32,

    /// Grid columns (default: 14)
    pub cols: i32,

    /// Herded agents, placed in the inner zone (default: 10)
    pub herded_count: usize,

    /// Herder agents, placed in the outer zone (default: 5)
    pub herder_count: usize,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            rows: GridDims::DEFAULT_SIDE,
            cols: GridDims::DEFAULT_SIDE,
            herded_count: 10,
            herder_count: 5,
        }
    }
}

impl FarmConfig {
    /// Validates dimensions and zone capacity.
    pub fn validate(&self) -> Result<GridDims, ConfigError> {
        let dims = GridDims::new(self.rows, self.cols)?;
        let zones = ZoneClassifier::new(dims);

        let inner = zones.inner_len();
        if self.herded_count > inner {
            return Err(ConfigError::PlacementCapacity {
                kind: AgentKind::Herded,
                requested: self.herded_count,
                available: inner,
            });
        }
        let outer = zones.outer_interior_len();
        if self.herder_count > outer {
            return Err(ConfigError::PlacementCapacity {
                kind: AgentKind::Herder,
                requested: self.herder_count,
                available: outer,
            });
        }
        Ok(dims)
    }
}

/// A constructed farm: the shared grid, the roster and the gates.
pub struct Farm {
    grid: Arc<GridState>,
    roster: Arc<Roster>,
    gates: [Position; 4],
}

impl Farm {
    /// Builds a random layout.
    ///
    /// One gate per side at a random non-corner offset, herded agents on
    /// distinct empty inner-zone cells, herders on distinct empty outer-zone
    /// interior cells.
    pub fn build<R: Rng + ?Sized>(config: &FarmConfig, rng: &mut R) -> Result<Self, ConfigError> {
        let dims = config.validate()?;
        let grid = GridState::new(dims);
        let (rows, cols) = (dims.rows(), dims.cols());

        let gates = [
            Position::new(0, rng.gen_range(1..cols - 1)),
            Position::new(rows - 1, rng.gen_range(1..cols - 1)),
            Position::new(rng.gen_range(1..rows - 1), 0),
            Position::new(rng.gen_range(1..rows - 1), cols - 1),
        ];
        for gate in gates {
            set_cell(&grid, gate, CellContent::Gate);
        }

        let mut roster = Roster::default();
        let herded: Vec<Position> = herded_sites(&grid)
            .choose_multiple(rng, config.herded_count)
            .copied()
            .collect();
        for pos in herded {
            occupy(&grid, &mut roster, AgentKind::Herded, pos);
        }
        let herders: Vec<Position> = herder_sites(&grid)
            .choose_multiple(rng, config.herder_count)
            .copied()
            .collect();
        for pos in herders {
            occupy(&grid, &mut roster, AgentKind::Herder, pos);
        }

        debug!(rows, cols, ?gates, agents = roster.len(), "farm built");
        Ok(Self {
            grid: Arc::new(grid),
            roster: Arc::new(roster),
            gates,
        })
    }

    /// Builds a fixed layout.
    ///
    /// Gates are given top, bottom, left, right, and each must be a
    /// non-corner cell of its own side. Every agent must start on an empty
    /// interior cell, and herders must start in the outer zone.
    pub fn with_layout(
        dims: GridDims,
        gates: [Position; 4],
        placements: &[(AgentKind, Position)],
    ) -> Result<Self, ConfigError> {
        let [top, bottom, left, right] = gates;
        let on_side = [
            top.row == 0,
            bottom.row == dims.rows() - 1,
            left.col == 0,
            right.col == dims.cols() - 1,
        ];
        for (gate, on_side) in gates.into_iter().zip(on_side) {
            if !on_side || !dims.is_gate_site(gate) {
                return Err(ConfigError::InvalidGate(gate));
            }
        }

        let grid = GridState::new(dims);
        for gate in gates {
            set_cell(&grid, gate, CellContent::Gate);
        }

        let mut roster = Roster::default();
        for &(kind, position) in placements {
            let reject = |reason| ConfigError::InvalidPlacement { kind, position, reason };
            if !dims.in_bounds(position) || dims.is_border(position) {
                return Err(reject("agents start on interior cells"));
            }
            if grid.peek(position) != Some(CellContent::Empty) {
                return Err(reject("cell is already occupied"));
            }
            if kind == AgentKind::Herder && !grid.zones().is_outer_zone(position) {
                return Err(reject("herders start in the outer zone"));
            }
            occupy(&grid, &mut roster, kind, position);
        }

        Ok(Self {
            grid: Arc::new(grid),
            roster: Arc::new(roster),
            gates,
        })
    }

    pub fn grid(&self) -> &Arc<GridState> {
        &self.grid
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }

    pub fn gates(&self) -> &[Position; 4] {
        &self.gates
    }

    /// Returns a detector over this farm's gates and roster.
    pub fn detector(&self) -> EscapeDetector {
        EscapeDetector::new(self.gates, Arc::clone(&self.roster))
    }

    /// Creates one agent per roster entry, each with its own RNG stream.
    pub fn agents<Ctx: PaddockContext>(&self, ctx: &Ctx, config: AgentConfig) -> Vec<Agent> {
        self.roster
            .iter()
            .map(|record| {
                let rng = ctx.rng_stream(u64::from(record.id().0));
                Agent::new(Arc::clone(record), Arc::clone(&self.grid), rng, config)
            })
            .collect()
    }
}

fn herded_sites(grid: &GridState) -> Vec<Position> {
    grid.zones()
        .inner_positions()
        .filter(|pos| grid.peek(*pos) == Some(CellContent::Empty))
        .collect()
}

fn herder_sites(grid: &GridState) -> Vec<Position> {
    let dims = grid.dims();
    dims.positions()
        .filter(|pos| !dims.is_border(*pos) && grid.zones().is_outer_zone(*pos))
        .filter(|pos| grid.peek(*pos) == Some(CellContent::Empty))
        .collect()
}

fn set_cell(grid: &GridState, pos: Position, content: CellContent) {
    if let Some(mut cell) = grid.lock_cell(pos) {
        cell.set(content);
    }
}

fn occupy(grid: &GridState, roster: &mut Roster, kind: AgentKind, pos: Position) {
    let record = roster.register(kind, pos);
    set_cell(grid, pos, CellContent::Occupied(record.id()));
}

//! Movement protocol - one random step per tick under per-cell locks.
//!
//! # Protocol
//!
//! ```text
//!   sample step ──► snapshot legal? ──no──► resample
//!        ▲                │ yes
//!        │                ▼
//!        │        lock source+target (lowest rank first)
//!        │                │
//!        │                ▼
//!        └──no── target still legal?
//!                         │ yes
//!                         ▼
//!     source = Empty, publish position, target = Occupied(id)
//!                         │
//!                         ▼
//!                  drop both guards
//! ```
//!
//! The snapshot check only filters candidates. The decision to write is
//! taken again under both locks, so a target that another agent claimed in
//! the meantime is never overwritten.

use crate::cell::{AgentKind, CellContent, Position, Step};
use crate::error::MoveError;
use crate::grid::GridState;
use crate::roster::AgentRecord;
use rand::Rng;
use tracing::trace;

/// Default cap on candidate samples per tick.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Why an agent did not move this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayReason {
    /// No legal candidate within the attempt budget
    Boxed,
    /// Herded agent already standing on a gate
    Escaped,
}

/// Result of one tick of movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved {
        from: Position,
        to: Position,
        /// Candidates invalidated under lock before this one succeeded
        conflicts: u32,
    },
    Stayed {
        reason: StayReason,
        conflicts: u32,
    },
}

impl MoveOutcome {
    pub fn conflicts(&self) -> u32 {
        match self {
            MoveOutcome::Moved { conflicts, .. } | MoveOutcome::Stayed { conflicts, .. } => *conflicts,
        }
    }
}

/// Result of the locked half of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Source emptied, target occupied
    Committed,
    /// Target no longer legal under lock; nothing was written
    Invalidated { found: Option<CellContent> },
}

/// The movement protocol over a shared grid.
pub struct MovementProtocol<'g> {
    grid: &'g GridState,
    max_attempts: u32,
}

impl<'g> MovementProtocol<'g> {
    pub fn new(grid: &'g GridState, max_attempts: u32) -> Self {
        Self {
            grid,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Legality predicate for a target cell with the given content.
    ///
    /// - Herder: outer zone and `Empty`
    /// - Herded: in bounds and `Empty` or `Gate`
    pub fn is_legal_target(&self, kind: AgentKind, target: Position, content: CellContent) -> bool {
        let zones = self.grid.zones();
        match kind {
            AgentKind::Herder => zones.is_outer_zone(target) && content == CellContent::Empty,
            AgentKind::Herded => {
                zones.in_bounds(target) && matches!(content, CellContent::Empty | CellContent::Gate)
            }
        }
    }

    /// Draws a uniformly random non-null step.
    pub fn sample_step<R: Rng + ?Sized>(rng: &mut R) -> Step {
        loop {
            let d_row = rng.gen_range(-1..=1);
            let d_col = rng.gen_range(-1..=1);
            if let Some(step) = Step::new(d_row, d_col) {
                return step;
            }
        }
    }

    /// Locks both cells, re-validates the target and commits the move.
    ///
    /// The guards are dropped on every return path, including errors.
    pub fn try_commit(
        &self,
        record: &AgentRecord,
        from: Position,
        to: Position,
    ) -> Result<CommitOutcome, MoveError> {
        let agent = record.id();
        if !self.grid.zones().in_bounds(from) {
            return Err(MoveError::OutOfBounds { agent, position: from });
        }
        let Some(mut cells) = self.grid.lock_pair(from, to) else {
            return Ok(CommitOutcome::Invalidated { found: None });
        };

        let source = cells.source();
        if source != CellContent::Occupied(agent) {
            return Err(MoveError::PositionMismatch {
                agent,
                position: from,
                found: source.to_string(),
            });
        }
        if cells.is_single() {
            return Ok(CommitOutcome::Invalidated { found: Some(source) });
        }

        let found = cells.target();
        if !self.is_legal_target(record.kind(), to, found) {
            return Ok(CommitOutcome::Invalidated { found: Some(found) });
        }

        cells.set_source(CellContent::Empty);
        record.publish(to);
        cells.set_target(CellContent::Occupied(agent));
        Ok(CommitOutcome::Committed)
    }

    /// Runs one tick of movement for an agent.
    ///
    /// Samples candidates until one commits or `max_attempts` samples are
    /// spent; a target lost to another agent costs one attempt and the
    /// agent resamples.
    pub fn step<R: Rng + ?Sized>(
        &self,
        record: &AgentRecord,
        rng: &mut R,
    ) -> Result<MoveOutcome, MoveError> {
        let kind = record.kind();
        let from = record.position();

        if kind == AgentKind::Herded && self.grid.dims().is_border(from) {
            return Ok(MoveOutcome::Stayed { reason: StayReason::Escaped, conflicts: 0 });
        }

        let mut conflicts = 0;
        for _ in 0..self.max_attempts {
            let to = from.offset(Self::sample_step(rng));
            let Some(seen) = self.grid.peek(to) else {
                continue;
            };
            if !self.is_legal_target(kind, to, seen) {
                continue;
            }

            match self.try_commit(record, from, to)? {
                CommitOutcome::Committed => {
                    trace!(agent = %record.id(), %from, %to, "moved");
                    return Ok(MoveOutcome::Moved { from, to, conflicts });
                }
                CommitOutcome::Invalidated { found } => {
                    conflicts += 1;
                    trace!(agent = %record.id(), %to, ?found, "target taken, resampling");
                }
            }
        }

        Ok(MoveOutcome::Stayed { reason: StayReason::Boxed, conflicts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::AgentId;
    use crate::roster::Roster;
    use crate::zone::GridDims;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::{mpsc, Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn place(grid: &GridState, roster: &mut Roster, kind: AgentKind, pos: Position) -> Arc<AgentRecord> {
        let record = roster.register(kind, pos);
        grid.lock_cell(pos).unwrap().set(CellContent::Occupied(record.id()));
        record
    }

    fn check_consistency(grid: &GridState, roster: &Roster) {
        let snapshot = grid.snapshot();
        let occupants: Vec<_> = snapshot.occupants().collect();
        assert_eq!(occupants.len(), roster.len(), "agent lost or duplicated");
        for (pos, id) in occupants {
            assert_eq!(roster.get(id).unwrap().position(), pos);
        }
    }

    #[test]
    fn test_herded_moves_to_neighbour() {
        let grid = GridState::new(GridDims::default());
        let mut roster = Roster::default();
        let sheep = place(&grid, &mut roster, AgentKind::Herded, Position::new(6, 6));
        let protocol = MovementProtocol::new(&grid, DEFAULT_MAX_ATTEMPTS);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = protocol.step(&sheep, &mut rng).unwrap();
        let MoveOutcome::Moved { from, to, conflicts } = outcome else {
            panic!("expected a move, got {:?}", outcome);
        };
        assert_eq!(from, Position::new(6, 6));
        assert_eq!((to.row - from.row).abs().max((to.col - from.col).abs()), 1);
        assert_eq!(conflicts, 0);
        assert_eq!(grid.peek(from), Some(CellContent::Empty));
        assert_eq!(grid.peek(to), Some(CellContent::Occupied(sheep.id())));
        assert_eq!(sheep.position(), to);
    }

    #[test]
    fn test_herder_never_enters_inner_zone() {
        let grid = GridState::new(GridDims::default());
        let mut roster = Roster::default();
        // Diagonally adjacent to the inner zone corner (4, 4)
        let dog = place(&grid, &mut roster, AgentKind::Herder, Position::new(3, 3));
        let protocol = MovementProtocol::new(&grid, DEFAULT_MAX_ATTEMPTS);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..2_000 {
            protocol.step(&dog, &mut rng).unwrap();
            assert!(grid.zones().is_outer_zone(dog.position()));
            assert!(!grid.dims().is_border(dog.position()));
        }
    }

    #[test]
    fn test_herder_rejects_gate() {
        let grid = GridState::new(GridDims::default());
        let protocol = MovementProtocol::new(&grid, DEFAULT_MAX_ATTEMPTS);
        let gate = Position::new(0, 5);

        assert!(!protocol.is_legal_target(AgentKind::Herder, gate, CellContent::Gate));
        assert!(protocol.is_legal_target(AgentKind::Herded, gate, CellContent::Gate));
        assert!(!protocol.is_legal_target(AgentKind::Herded, gate, CellContent::Wall));
        assert!(!protocol.is_legal_target(AgentKind::Herder, Position::new(6, 6), CellContent::Empty));
    }

    #[test]
    fn test_herded_steps_onto_gate_and_stays() {
        let dims = GridDims::new(5, 5).unwrap();
        let grid = GridState::new(dims);
        let mut roster = Roster::default();
        let gate = Position::new(0, 2);
        grid.lock_cell(gate).unwrap().set(CellContent::Gate);

        // Fill every other interior cell so the gate is the only way out.
        let sheep = place(&grid, &mut roster, AgentKind::Herded, Position::new(1, 2));
        for pos in dims.positions() {
            if grid.peek(pos) == Some(CellContent::Empty) {
                place(&grid, &mut roster, AgentKind::Herder, pos);
            }
        }

        let protocol = MovementProtocol::new(&grid, 10_000);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let outcome = protocol.step(&sheep, &mut rng).unwrap();

        assert!(matches!(outcome, MoveOutcome::Moved { to, .. } if to == gate));
        assert_eq!(grid.peek(gate), Some(CellContent::Occupied(sheep.id())));

        let again = protocol.step(&sheep, &mut rng).unwrap();
        assert_eq!(again, MoveOutcome::Stayed { reason: StayReason::Escaped, conflicts: 0 });
        assert_eq!(sheep.position(), gate);
    }

    #[test]
    fn test_boxed_agent_stays_put() {
        let dims = GridDims::new(5, 5).unwrap();
        let grid = GridState::new(dims);
        let mut roster = Roster::default();
        let sheep = place(&grid, &mut roster, AgentKind::Herded, Position::new(2, 2));
        for pos in dims.positions() {
            if grid.peek(pos) == Some(CellContent::Empty) {
                place(&grid, &mut roster, AgentKind::Herder, pos);
            }
        }
        let before = grid.snapshot();

        let protocol = MovementProtocol::new(&grid, 32);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let outcome = protocol.step(&sheep, &mut rng).unwrap();

        assert_eq!(outcome, MoveOutcome::Stayed { reason: StayReason::Boxed, conflicts: 0 });
        assert_eq!(grid.snapshot(), before);
    }

    #[test]
    fn test_commit_rejects_target_taken_after_snapshot() {
        // Two agents both saw (5, 6) empty; the second commit must fail.
        let grid = GridState::new(GridDims::default());
        let mut roster = Roster::default();
        let a = place(&grid, &mut roster, AgentKind::Herded, Position::new(5, 5));
        let b = place(&grid, &mut roster, AgentKind::Herded, Position::new(5, 7));
        let target = Position::new(5, 6);
        let protocol = MovementProtocol::new(&grid, DEFAULT_MAX_ATTEMPTS);

        assert_eq!(grid.peek(target), Some(CellContent::Empty));
        assert_eq!(protocol.try_commit(&a, a.position(), target), Ok(CommitOutcome::Committed));

        let second = protocol.try_commit(&b, b.position(), target).unwrap();
        assert_eq!(
            second,
            CommitOutcome::Invalidated { found: Some(CellContent::Occupied(a.id())) }
        );
        assert_eq!(b.position(), Position::new(5, 7));
        assert_eq!(grid.peek(Position::new(5, 7)), Some(CellContent::Occupied(b.id())));
        check_consistency(&grid, &roster);
    }

    #[test]
    fn test_racing_commits_exactly_one_wins() {
        for round in 0..200 {
            let grid = Arc::new(GridState::new(GridDims::default()));
            let mut roster = Roster::default();
            let a = place(&grid, &mut roster, AgentKind::Herded, Position::new(5, 5));
            let b = place(&grid, &mut roster, AgentKind::Herded, Position::new(5, 7));
            let target = Position::new(5, 6);
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = [a, b]
                .into_iter()
                .map(|record| {
                    let grid = Arc::clone(&grid);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        let protocol = MovementProtocol::new(&grid, DEFAULT_MAX_ATTEMPTS);
                        barrier.wait();
                        protocol.try_commit(&record, record.position(), target).unwrap()
                    })
                })
                .collect();

            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            let wins = results.iter().filter(|r| **r == CommitOutcome::Committed).count();
            assert_eq!(wins, 1, "round {}: {:?}", round, results);
            check_consistency(&grid, &roster);
        }
    }

    #[test]
    fn test_position_mismatch_releases_locks() {
        let grid = GridState::new(GridDims::default());
        let mut roster = Roster::default();
        let record = roster.register(AgentKind::Herded, Position::new(5, 5));
        let protocol = MovementProtocol::new(&grid, DEFAULT_MAX_ATTEMPTS);

        let err = protocol
            .try_commit(&record, Position::new(5, 5), Position::new(5, 6))
            .unwrap_err();
        assert!(matches!(err, MoveError::PositionMismatch { agent: AgentId(0), .. }));
        assert!(grid.lock_for(Position::new(5, 5)).unwrap().try_lock().is_ok());
        assert!(grid.lock_for(Position::new(5, 6)).unwrap().try_lock().is_ok());
    }

    #[test]
    fn test_concurrent_agents_keep_grid_consistent() {
        let dims = GridDims::new(8, 8).unwrap();
        let grid = Arc::new(GridState::new(dims));
        let mut roster = Roster::default();
        let zones = grid.zones().clone();

        // Crowd the small grid so that neighbouring agents contend constantly.
        let mut records = Vec::new();
        for (i, pos) in dims.positions().filter(|p| !dims.is_border(*p)).enumerate() {
            if i % 3 == 0 {
                continue;
            }
            let kind = if zones.is_inner_zone(pos) { AgentKind::Herded } else { AgentKind::Herder };
            records.push(place(&grid, &mut roster, kind, pos));
        }

        let (done_tx, done_rx) = mpsc::channel();
        let barrier = Arc::new(Barrier::new(records.len()));
        for (i, record) in records.iter().cloned().enumerate() {
            let grid = Arc::clone(&grid);
            let barrier = Arc::clone(&barrier);
            let done_tx = done_tx.clone();
            thread::spawn(move || {
                let protocol = MovementProtocol::new(&grid, DEFAULT_MAX_ATTEMPTS);
                let mut rng = ChaCha8Rng::seed_from_u64(i as u64);
                barrier.wait();
                for _ in 0..500 {
                    protocol.step(&record, &mut rng).unwrap();
                    if record.kind() == AgentKind::Herder {
                        assert!(grid.zones().is_outer_zone(record.position()));
                    }
                }
                let _ = done_tx.send(());
            });
        }

        for _ in 0..records.len() {
            done_rx
                .recv_timeout(Duration::from_secs(30))
                .expect("agents failed to make progress");
        }
        check_consistency(&grid, &roster);
    }
}

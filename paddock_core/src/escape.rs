//! Escape detection - the global termination predicate.

use crate::cell::{AgentId, AgentKind, Position};
use crate::roster::Roster;
use std::sync::Arc;

/// Checks herded agents' published positions against the four gates.
///
/// Read-only: it never takes a cell lock. Each position read is a single
/// atomic load, so a position is never observed half-updated.
#[derive(Debug, Clone)]
pub struct EscapeDetector {
    gates: [Position; 4],
    roster: Arc<Roster>,
}

impl EscapeDetector {
    pub fn new(gates: [Position; 4], roster: Arc<Roster>) -> Self {
        Self { gates, roster }
    }

    pub fn gates(&self) -> &[Position; 4] {
        &self.gates
    }

    /// True iff any herded agent stands on a gate.
    pub fn has_escaped(&self) -> bool {
        self.herded_positions().any(|(_, pos)| self.gates.contains(&pos))
    }

    /// Herded agents currently on a gate.
    pub fn escaped_agents(&self) -> Vec<AgentId> {
        self.herded_positions()
            .filter(|(_, pos)| self.gates.contains(pos))
            .map(|(id, _)| id)
            .collect()
    }

    fn herded_positions(&self) -> impl Iterator<Item = (AgentId, Position)> + '_ {
        self.roster
            .iter()
            .filter(|record| record.kind() == AgentKind::Herded)
            .map(|record| (record.id(), record.position()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GATES: [Position; 4] = [
        Position::new(0, 3),
        Position::new(7, 5),
        Position::new(2, 0),
        Position::new(4, 7),
    ];

    #[test]
    fn test_no_escape() {
        let mut roster = Roster::default();
        roster.register(AgentKind::Herded, Position::new(3, 3));
        let detector = EscapeDetector::new(GATES, Arc::new(roster));

        assert!(!detector.has_escaped());
        assert!(detector.escaped_agents().is_empty());
    }

    #[test]
    fn test_herded_on_gate_escapes() {
        let mut roster = Roster::default();
        roster.register(AgentKind::Herded, Position::new(3, 3));
        let sheep = roster.register(AgentKind::Herded, Position::new(1, 3));
        let detector = EscapeDetector::new(GATES, Arc::new(roster));

        sheep.publish(Position::new(0, 3));
        assert!(detector.has_escaped());
        assert_eq!(detector.escaped_agents(), vec![sheep.id()]);
    }

    #[test]
    fn test_herder_on_gate_coordinate_is_ignored() {
        let mut roster = Roster::default();
        roster.register(AgentKind::Herder, Position::new(4, 7));
        let detector = EscapeDetector::new(GATES, Arc::new(roster));

        assert!(!detector.has_escaped());
    }
}

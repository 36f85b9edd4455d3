//! Agent roster with atomically published positions.
//!
//! The roster is built once and never resized, so it needs no lock. Each
//! record publishes its agent's position as one packed 64-bit word: readers
//! never see a row from one move paired with a column from another.

use crate::cell::{AgentId, AgentKind, Position};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared, read-mostly view of one agent.
#[derive(Debug)]
pub struct AgentRecord {
    id: AgentId,
    kind: AgentKind,
    position: AtomicU64,
}

impl AgentRecord {
    pub fn new(id: AgentId, kind: AgentKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position: AtomicU64::new(position.pack()),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Last published position.
    pub fn position(&self) -> Position {
        Position::unpack(self.position.load(Ordering::Acquire))
    }

    /// Only the owning agent's movement commit calls this.
    pub(crate) fn publish(&self, position: Position) {
        self.position.store(position.pack(), Ordering::Release);
    }
}

/// Fixed set of agents, indexed by [`AgentId`].
#[derive(Debug, Default, Clone)]
pub struct Roster {
    records: Vec<Arc<AgentRecord>>,
}

impl Roster {
    /// Appends an agent and returns its id.
    pub(crate) fn register(&mut self, kind: AgentKind, position: Position) -> Arc<AgentRecord> {
        let id = AgentId(self.records.len() as u32);
        let record = Arc::new(AgentRecord::new(id, kind, position));
        self.records.push(Arc::clone(&record));
        record
    }

    pub fn get(&self, id: AgentId) -> Option<&Arc<AgentRecord>> {
        self.records.get(id.index())
    }

    pub fn kind_of(&self, id: AgentId) -> Option<AgentKind> {
        self.get(id).map(|record| record.kind())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<AgentRecord>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of agents of a kind.
    pub fn count(&self, kind: AgentKind) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut roster = Roster::default();
        let a = roster.register(AgentKind::Herded, Position::new(5, 5));
        let b = roster.register(AgentKind::Herder, Position::new(1, 1));

        assert_eq!(a.id(), AgentId(0));
        assert_eq!(b.id(), AgentId(1));
        assert_eq!(roster.kind_of(AgentId(1)), Some(AgentKind::Herder));
        assert_eq!(roster.count(AgentKind::Herded), 1);
        assert!(roster.get(AgentId(2)).is_none());
    }

    #[test]
    fn test_publish_is_visible() {
        let record = AgentRecord::new(AgentId(0), AgentKind::Herded, Position::new(5, 5));
        record.publish(Position::new(6, 4));
        assert_eq!(record.position(), Position::new(6, 4));
    }
}

//! Plain-text rendering of a grid snapshot.

use crate::cell::{AgentKind, CellContent};
use crate::grid::GridSnapshot;
use crate::roster::Roster;

pub const WALL_GLYPH: char = '#';
pub const OPEN_GLYPH: char = ' ';
pub const HERDED_GLYPH: char = 'S';
pub const HERDER_GLYPH: char = 'D';
/// Occupant missing from the roster. Should never be drawn.
pub const UNKNOWN_GLYPH: char = '?';

/// Glyph for one cell. Gates render like empty ground.
pub fn glyph(cell: CellContent, roster: &Roster) -> char {
    match cell {
        CellContent::Wall => WALL_GLYPH,
        CellContent::Gate | CellContent::Empty => OPEN_GLYPH,
        CellContent::Occupied(id) => match roster.kind_of(id) {
            Some(AgentKind::Herded) => HERDED_GLYPH,
            Some(AgentKind::Herder) => HERDER_GLYPH,
            None => UNKNOWN_GLYPH,
        },
    }
}

/// Renders one line per grid row, each terminated by `\n`.
pub fn render(snapshot: &GridSnapshot, roster: &Roster) -> String {
    let dims = snapshot.dims();
    let mut out = String::with_capacity(dims.len() + dims.rows() as usize);
    for row in snapshot.rows() {
        out.extend(row.iter().map(|cell| glyph(*cell, roster)));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{AgentId, Position};
    use crate::farm::Farm;
    use crate::zone::GridDims;

    #[test]
    fn test_render_small_farm() {
        let dims = GridDims::new(5, 5).unwrap();
        let gates = [
            Position::new(0, 2),
            Position::new(4, 1),
            Position::new(3, 0),
            Position::new(1, 4),
        ];
        let placements = [
            (AgentKind::Herded, Position::new(2, 2)),
            (AgentKind::Herder, Position::new(3, 3)),
        ];
        let farm = Farm::with_layout(dims, gates, &placements).unwrap();

        let text = render(&farm.grid().snapshot(), farm.roster());
        let expected = ["## ##", "#    ", "# S #", "   D#", "# ###"];
        assert_eq!(text.lines().collect::<Vec<_>>(), expected);
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_unknown_occupant() {
        let roster = Roster::default();
        assert_eq!(glyph(CellContent::Occupied(AgentId(9)), &roster), UNKNOWN_GLYPH);
    }
}

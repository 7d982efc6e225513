//! Time decay of unvisited open floor back into superposition.

use std::collections::BTreeMap;

use quantum_maze_core::{CellCoord, Event, Tile, TileGrid};

/// Remaining lifetime of every tracked open cell.
///
/// Backed by an ordered map so ticks revert cells in a deterministic order.
#[derive(Clone, Debug, Default)]
pub(crate) struct DecoherenceTable {
    ttl: BTreeMap<CellCoord, u32>,
}

impl DecoherenceTable {
    /// Advances every tracked cell by one turn.
    ///
    /// Cells within `protection_radius` of `player` are refreshed to
    /// `max_ttl`; every other tracked cell loses one turn and reverts to
    /// superposition once its lifetime runs out.
    pub(crate) fn tick(
        &mut self,
        grid: &mut TileGrid,
        player: CellCoord,
        max_ttl: u32,
        protection_radius: u32,
        out_events: &mut Vec<Event>,
    ) {
        for (cell, tile) in grid.iter() {
            if tile == Tile::Empty {
                let _ = self.ttl.entry(cell).or_insert(max_ttl);
            } else {
                let _ = self.ttl.remove(&cell);
            }
        }

        let mut expired = Vec::new();
        for (cell, ttl) in &mut self.ttl {
            if cell.manhattan_distance(player) <= protection_radius {
                *ttl = max_ttl;
                continue;
            }

            *ttl = ttl.saturating_sub(1);
            if *ttl == 0 {
                expired.push(*cell);
            }
        }

        for cell in expired {
            let _ = self.ttl.remove(&cell);
            if grid.is(cell, Tile::Empty) {
                let _ = grid.set(cell, Tile::Superposed);
                out_events.push(Event::CellDecohered { cell });
            }
        }
    }

    /// Remaining lifetime of a tracked cell.
    #[must_use]
    pub(crate) fn ttl(&self, cell: CellCoord) -> Option<u32> {
        self.ttl.get(&cell).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum_maze_core::GridDimensions;

    fn corridor() -> TileGrid {
        let mut grid = TileGrid::bordered(GridDimensions::new(8, 3));
        for column in 1..7 {
            let _ = grid.set(CellCoord::new(column, 1), Tile::Empty);
        }
        grid
    }

    #[test]
    fn unprotected_floor_reverts_after_ttl_turns() {
        let mut grid = corridor();
        let mut table = DecoherenceTable::default();
        let mut events = Vec::new();
        let player = CellCoord::new(1, 1);
        let far = CellCoord::new(6, 1);

        table.tick(&mut grid, player, 2, 1, &mut events);
        assert_eq!(table.ttl(far), Some(1));
        assert!(grid.is(far, Tile::Empty));

        table.tick(&mut grid, player, 2, 1, &mut events);
        assert_eq!(table.ttl(far), None);
        assert!(grid.is(far, Tile::Superposed));
        assert!(events.contains(&Event::CellDecohered { cell: far }));
    }

    #[test]
    fn protected_floor_stays_at_max() {
        let mut grid = corridor();
        let mut table = DecoherenceTable::default();
        let mut events = Vec::new();
        let player = CellCoord::new(1, 1);
        let near = CellCoord::new(2, 1);

        for _ in 0..10 {
            table.tick(&mut grid, player, 3, 1, &mut events);
            assert_eq!(table.ttl(near), Some(3));
        }
        assert!(grid.is(near, Tile::Empty));
        assert!(grid.is(player, Tile::Empty));
    }

    #[test]
    fn entries_drop_when_cell_stops_being_floor() {
        let mut grid = corridor();
        let mut table = DecoherenceTable::default();
        let mut events = Vec::new();
        let cell = CellCoord::new(4, 1);

        table.tick(&mut grid, CellCoord::new(1, 1), 5, 0, &mut events);
        assert_eq!(table.ttl(cell), Some(4));

        let _ = grid.set(cell, Tile::Wall);
        table.tick(&mut grid, CellCoord::new(1, 1), 5, 0, &mut events);
        assert_eq!(table.ttl(cell), None);
        assert!(grid.is(cell, Tile::Wall));
    }
}

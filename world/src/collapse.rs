//! Resolution of superposed cells, single or propagated through entanglement.

use log::trace;
use quantum_maze_core::{CellCoord, EntanglementMap, Event, SafeSet, Tile, TileGrid};
use rand::Rng;

/// Mutable view over the parts of a level the collapse engine touches.
#[derive(Debug)]
pub(crate) struct Observer<'a> {
    pub(crate) grid: &'a mut TileGrid,
    pub(crate) entanglement: &'a EntanglementMap,
    pub(crate) safe: &'a SafeSet,
    pub(crate) wall_probability: f64,
}

impl Observer<'_> {
    /// Resolves a single superposed cell and its entangled partner.
    ///
    /// Returns the number of cells resolved: 0 when the cell was not
    /// superposed, 2 when a still-superposed partner was forced as well,
    /// otherwise 1.
    pub(crate) fn collapse_at<R>(
        &mut self,
        cell: CellCoord,
        bias: Option<f64>,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> u32
    where
        R: Rng + ?Sized,
    {
        if !self.grid.is(cell, Tile::Superposed) {
            return 0;
        }

        let resolved = if self.safe.contains(cell) {
            Tile::Empty
        } else if draw(rng, bias.unwrap_or(self.wall_probability)) {
            Tile::Wall
        } else {
            Tile::Empty
        };

        let _ = self.grid.set(cell, resolved);
        out_events.push(Event::CellCollapsed {
            cell,
            tile: resolved,
        });

        let Some((partner, mode)) = self.entanglement.partner(cell) else {
            return 1;
        };
        if !self.grid.is(partner, Tile::Superposed) {
            return 1;
        }

        // Entanglement wins over the partner's safe-path membership.
        let forced = mode.partner_tile(resolved);
        let _ = self.grid.set(partner, forced);
        trace!("[Collapse] {cell:?} -> {resolved:?} forced {partner:?} -> {forced:?} ({mode:?})");
        out_events.push(Event::EntanglementPropagated {
            source: cell,
            partner,
            mode,
            tile: forced,
        });
        2
    }

    /// Resolves every superposed cell within Manhattan `radius` of `center`,
    /// nearest first.
    pub(crate) fn collapse_area<R>(
        &mut self,
        center: CellCoord,
        radius: u32,
        bias: Option<f64>,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> u32
    where
        R: Rng + ?Sized,
    {
        center
            .cells_within(radius)
            .into_iter()
            .map(|cell| self.collapse_at(cell, bias, rng, out_events))
            .sum()
    }
}

/// Bernoulli draw with the probability clamped into `[0, 1]`.
pub(crate) fn draw<R>(rng: &mut R, probability: f64) -> bool
where
    R: Rng + ?Sized,
{
    if probability.is_nan() {
        return false;
    }
    rng.gen_bool(probability.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum_maze_core::{EntanglementMode, GridDimensions};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_grid() -> TileGrid {
        TileGrid::bordered(GridDimensions::new(7, 7))
    }

    #[test]
    fn collapse_skips_resolved_cells() {
        let mut grid = open_grid();
        let entanglement = EntanglementMap::new();
        let safe = SafeSet::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut events = Vec::new();
        let mut observer = Observer {
            grid: &mut grid,
            entanglement: &entanglement,
            safe: &safe,
            wall_probability: 0.5,
        };

        assert_eq!(observer.collapse_at(CellCoord::new(0, 0), None, &mut rng, &mut events), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn area_collapse_resolves_nearest_first() {
        let mut grid = open_grid();
        let entanglement = EntanglementMap::new();
        let safe = SafeSet::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut events = Vec::new();
        let center = CellCoord::new(3, 3);
        let mut observer = Observer {
            grid: &mut grid,
            entanglement: &entanglement,
            safe: &safe,
            wall_probability: 0.5,
        };

        let resolved = observer.collapse_area(center, 2, Some(0.0), &mut rng, &mut events);

        assert_eq!(resolved, 13);
        let distances: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                Event::CellCollapsed { cell, tile } => {
                    assert_eq!(*tile, Tile::Empty);
                    Some(cell.manhattan_distance(center))
                }
                _ => None,
            })
            .collect();
        assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn propagation_counts_partner_once() {
        let mut grid = open_grid();
        let mut entanglement = EntanglementMap::new();
        let a = CellCoord::new(1, 1);
        let b = CellCoord::new(2, 2);
        assert!(entanglement.insert_pair(a, b, EntanglementMode::Opposite));
        let safe = SafeSet::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut events = Vec::new();
        let mut observer = Observer {
            grid: &mut grid,
            entanglement: &entanglement,
            safe: &safe,
            wall_probability: 0.5,
        };

        assert_eq!(observer.collapse_at(a, Some(0.0), &mut rng, &mut events), 2);
        assert_eq!(observer.collapse_at(b, Some(0.0), &mut rng, &mut events), 0);
        assert_eq!(grid.tile(a), Some(Tile::Empty));
        assert_eq!(grid.tile(b), Some(Tile::Wall));
    }

    #[test]
    fn draw_tolerates_out_of_range_probabilities() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(draw(&mut rng, 4.0));
        assert!(!draw(&mut rng, -1.0));
        assert!(!draw(&mut rng, f64::NAN));
    }
}

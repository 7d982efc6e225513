//! Breadth-first route field used by the connectivity queries.

use std::collections::VecDeque;

use quantum_maze_core::{CellCoord, GridDimensions};

/// Dense step-count grid seeded from a single origin cell.
///
/// Distances default to `u16::MAX` for cells the search never reached so
/// callers can distinguish sealed-off cells from open ones. The origin is
/// always expanded, whatever terrain it holds, because the player may stand
/// on a tunnelled wall.
#[derive(Clone, Debug, Default)]
pub(crate) struct RouteField {
    dimensions: Option<GridDimensions>,
    distances: Vec<u16>,
}

impl RouteField {
    /// Rebuilds the distances using a breadth-first search from `origin`.
    pub(crate) fn rebuild_with<F>(
        &mut self,
        dimensions: GridDimensions,
        origin: CellCoord,
        mut is_open: F,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let cell_count = dimensions.cell_count();
        self.dimensions = Some(dimensions);

        if self.distances.len() != cell_count {
            self.distances = vec![u16::MAX; cell_count];
        } else {
            self.distances.fill(u16::MAX);
        }

        let Some(origin_index) = dimensions.index(origin) else {
            return;
        };
        self.distances[origin_index] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(origin);

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = dimensions.index(cell) else {
                continue;
            };
            let current_distance = self.distances[current_index];

            if current_distance >= u16::MAX.saturating_sub(1) {
                continue;
            }

            let next_distance = current_distance + 1;

            for neighbor in cell.neighbors() {
                let Some(neighbor_index) = dimensions.index(neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                if !is_open(neighbor) {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Steps from the origin to the cell, if the search reached it.
    #[must_use]
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u16> {
        let index = self.dimensions?.index(cell)?;
        self.distances
            .get(index)
            .copied()
            .filter(|distance| *distance != u16::MAX)
    }
}

/// Reports whether `to` can be reached from `from` by axis steps over cells
/// accepted by `is_open`.
pub fn reachable_through<F>(dimensions: GridDimensions, from: CellCoord, to: CellCoord, is_open: F) -> bool
where
    F: FnMut(CellCoord) -> bool,
{
    route_length_through(dimensions, from, to, is_open).is_some()
}

/// Length of the shortest axis-step route from `from` to `to` over cells
/// accepted by `is_open`.
pub fn route_length_through<F>(
    dimensions: GridDimensions,
    from: CellCoord,
    to: CellCoord,
    is_open: F,
) -> Option<u32>
where
    F: FnMut(CellCoord) -> bool,
{
    let mut field = RouteField::default();
    field.rebuild_with(dimensions, from, is_open);
    field.distance(to).map(u32::from)
}

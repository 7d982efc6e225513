//! Dense tile storage and the coordinate rules of the maze.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, Tile};

/// Size of a maze measured in whole cells, border included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    columns: u32,
    rows: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns, border included.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows, border included.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell lies on the outer wall ring.
    #[must_use]
    pub const fn is_border(&self, cell: CellCoord) -> bool {
        self.contains(cell)
            && (cell.column() == 0
                || cell.row() == 0
                || cell.column() + 1 == self.columns
                || cell.row() + 1 == self.rows)
    }

    /// Reports whether the cell lies strictly inside the border ring.
    #[must_use]
    pub const fn is_interior(&self, cell: CellCoord) -> bool {
        self.contains(cell) && !self.is_border(cell)
    }

    /// Cell the player starts each level on.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        CellCoord::new(1, 1)
    }

    /// Cell holding the exit: the interior corner opposite the start.
    #[must_use]
    pub fn exit(&self) -> CellCoord {
        CellCoord::new(
            self.columns.saturating_sub(2).max(1),
            self.rows.saturating_sub(2).max(1),
        )
    }

    /// Row-major index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }
}

/// Rectangular tile array owned by a single level instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    dimensions: GridDimensions,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid whose border is [`Tile::Wall`] and whose interior is
    /// [`Tile::Superposed`].
    #[must_use]
    pub fn bordered(dimensions: GridDimensions) -> Self {
        let tiles = dimensions
            .cells()
            .map(|cell| {
                if dimensions.is_border(cell) {
                    Tile::Wall
                } else {
                    Tile::Superposed
                }
            })
            .collect();
        Self { dimensions, tiles }
    }

    /// Wraps pre-built row-major tiles.
    ///
    /// Returns `None` when the tile count does not match the dimensions.
    #[must_use]
    pub fn from_tiles(dimensions: GridDimensions, tiles: Vec<Tile>) -> Option<Self> {
        (tiles.len() == dimensions.cell_count()).then_some(Self { dimensions, tiles })
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Tile stored at the cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.dimensions
            .index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the cell holds exactly `tile`.
    #[must_use]
    pub fn is(&self, cell: CellCoord, tile: Tile) -> bool {
        self.tile(cell) == Some(tile)
    }

    /// Overwrites the tile at the cell. Returns `false` when out of bounds.
    pub fn set(&mut self, cell: CellCoord, tile: Tile) -> bool {
        let Some(slot) = self
            .dimensions
            .index(cell)
            .and_then(|index| self.tiles.get_mut(index))
        else {
            return false;
        };
        *slot = tile;
        true
    }

    /// Every cell paired with its tile, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Tile)> + '_ {
        self.dimensions.cells().zip(self.tiles.iter().copied())
    }

    /// Number of cells holding `tile`.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|candidate| **candidate == tile).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bordered_grid_rings_interior_with_walls() {
        let dimensions = GridDimensions::new(5, 4);
        let grid = TileGrid::bordered(dimensions);

        for (cell, tile) in grid.iter() {
            if dimensions.is_border(cell) {
                assert_eq!(tile, Tile::Wall, "border cell {cell:?}");
            } else {
                assert_eq!(tile, Tile::Superposed, "interior cell {cell:?}");
            }
        }
        assert_eq!(grid.count(Tile::Superposed), 6);
    }

    #[test]
    fn start_and_exit_sit_in_opposite_interior_corners() {
        let dimensions = GridDimensions::new(16, 12);
        assert_eq!(dimensions.start(), CellCoord::new(1, 1));
        assert_eq!(dimensions.exit(), CellCoord::new(14, 10));
        assert!(dimensions.is_interior(dimensions.exit()));
    }

    #[test]
    fn set_rejects_out_of_bounds_cells() {
        let mut grid = TileGrid::bordered(GridDimensions::new(3, 3));
        assert!(!grid.set(CellCoord::new(3, 0), Tile::Empty));
        assert!(grid.set(CellCoord::new(1, 1), Tile::Empty));
        assert_eq!(grid.tile(CellCoord::new(1, 1)), Some(Tile::Empty));
        assert_eq!(grid.tile(CellCoord::new(0, 3)), None);
    }

    #[test]
    fn from_tiles_validates_length() {
        let dimensions = GridDimensions::new(2, 2);
        assert!(TileGrid::from_tiles(dimensions, vec![Tile::Wall; 3]).is_none());
        assert!(TileGrid::from_tiles(dimensions, vec![Tile::Wall; 4]).is_some());
    }
}

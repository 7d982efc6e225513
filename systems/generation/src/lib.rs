#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure level generation system.
//!
//! The generator turns a set of [`LevelRules`] and a random source into a
//! [`LevelBlueprint`]: a bordered grid of superposed cells seeded with
//! obstructions, a hidden start-to-exit path that always resolves to open
//! floor, entangled cell pairs, and teleport and absorber tiles kept clear of
//! that path. It never mutates a live level; the world adopts the blueprint.

use std::{cmp::Ordering, collections::HashSet, ops::RangeInclusive};

use log::debug;
use quantum_maze_core::{
    CellCoord, Direction, EntanglementMap, EntanglementMode, GridDimensions, LevelBlueprint,
    LevelRules, SafeSet, TeleportMap, Tile, TileGrid,
};
use rand::{seq::SliceRandom, Rng};

/// Knobs steering the hidden path walk and special tile placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorTuning {
    /// Chance, per axis, that a walk step does not advance toward the exit.
    pub hold_probability: f64,
    /// Chance that a walk step is replaced by a random axis-aligned detour.
    pub detour_probability: f64,
    /// Walk steps attempted before the path is finished with a corridor.
    pub max_carve_attempts: u32,
    /// Random probes spent placing each kind of special tile.
    pub max_special_probes: u32,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            hold_probability: 0.4,
            detour_probability: 0.35,
            max_carve_attempts: 5000,
            max_special_probes: 5000,
        }
    }
}

/// Builds solvable level blueprints.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Generator {
    tuning: GeneratorTuning,
}

impl Generator {
    /// Creates a generator with explicit tuning.
    #[must_use]
    pub const fn new(tuning: GeneratorTuning) -> Self {
        Self { tuning }
    }

    /// Tuning applied by the generator.
    #[must_use]
    pub const fn tuning(&self) -> GeneratorTuning {
        self.tuning
    }

    /// Generates a level blueprint for the provided rules.
    pub fn generate<R>(&self, rules: &LevelRules, rng: &mut R) -> LevelBlueprint
    where
        R: Rng + ?Sized,
    {
        let dimensions = rules.dimensions;
        let start = dimensions.start();
        let exit = dimensions.exit();

        let mut grid = TileGrid::bordered(dimensions);
        let _ = grid.set(start, Tile::Empty);
        let _ = grid.set(exit, Tile::Exit);

        if let Some((columns, rows)) = probe_ranges(dimensions) {
            for _ in 0..rules.obstruction_count {
                let cell = CellCoord::new(rng.gen_range(columns.clone()), rng.gen_range(rows.clone()));
                let tile = if rng.gen_bool(0.5) {
                    Tile::Wall
                } else {
                    Tile::Superposed
                };
                let _ = grid.set(cell, tile);
            }
        }

        let path = self.carve_path(dimensions, start, exit, rng);
        for &cell in &path {
            if cell != start && cell != exit {
                let _ = grid.set(cell, Tile::Superposed);
            }
        }
        let safe = SafeSet::from_path(path);

        let entanglement = entangle(&grid, rules.entangled_pairs, start, exit, rng);

        let mut forbidden: HashSet<CellCoord> = safe.path().iter().copied().collect();
        let _ = forbidden.insert(start);
        let _ = forbidden.insert(exit);
        for pair in entanglement.pairs() {
            let _ = forbidden.insert(pair.first);
            let _ = forbidden.insert(pair.second);
        }

        let mut teleport_cells =
            self.place_specials(&mut grid, rules.teleports, Tile::Teleport, &mut forbidden, rng);
        let absorbers =
            self.place_specials(&mut grid, rules.absorbs, Tile::Absorb, &mut forbidden, rng);

        teleport_cells.shuffle(rng);
        let mut teleports = TeleportMap::new();
        for pair in teleport_cells.chunks_exact(2) {
            let _ = teleports.link(pair[0], pair[1]);
        }

        debug!(
            "[Generator] path {} cells, {} entangled pairs, {} teleports ({} linked pairs), {} absorbers",
            safe.len(),
            entanglement.len(),
            teleport_cells.len(),
            teleports.pair_count(),
            absorbers.len()
        );

        LevelBlueprint {
            grid,
            start,
            exit,
            entanglement,
            teleports,
            safe,
        }
    }

    /// Walks a biased random path from `start` to `goal` through the interior.
    ///
    /// Every consecutive pair of cells is axis-adjacent. A walk that runs out
    /// of attempts is finished with a straight corridor, columns first.
    fn carve_path<R>(
        &self,
        dimensions: GridDimensions,
        start: CellCoord,
        goal: CellCoord,
        rng: &mut R,
    ) -> Vec<CellCoord>
    where
        R: Rng + ?Sized,
    {
        let mut path = vec![start];
        let mut visited = HashSet::from([start]);
        let mut current = start;
        let mut attempts = 0;

        while current != goal && attempts < self.tuning.max_carve_attempts {
            attempts += 1;
            let Some(next) = current.step(self.walk_direction(current, goal, rng)) else {
                continue;
            };
            if dimensions.is_interior(next) && visited.insert(next) {
                path.push(next);
                current = next;
            }
        }

        if current != goal {
            debug!("[Generator] walk stalled at {current:?}, finishing with a corridor");
        }
        while let Some(direction) = corridor_direction(current, goal) {
            let Some(next) = current.step(direction) else {
                break;
            };
            path.push(next);
            current = next;
        }

        path
    }

    fn walk_direction<R>(&self, current: CellCoord, goal: CellCoord, rng: &mut R) -> Direction
    where
        R: Rng + ?Sized,
    {
        let horizontal = if rng.gen_bool(self.tuning.hold_probability) {
            None
        } else {
            toward(current.column(), goal.column(), Direction::West, Direction::East)
        };
        let vertical = if rng.gen_bool(self.tuning.hold_probability) {
            None
        } else {
            toward(current.row(), goal.row(), Direction::North, Direction::South)
        };

        let detour = rng.gen_bool(self.tuning.detour_probability);
        match (horizontal, vertical) {
            (Some(horizontal), Some(vertical)) if !detour => {
                if rng.gen_bool(0.5) {
                    horizontal
                } else {
                    vertical
                }
            }
            (Some(direction), None) | (None, Some(direction)) if !detour => direction,
            _ => {
                let horizontal_axis = rng.gen_bool(0.5);
                let positive = rng.gen_bool(0.5);
                match (horizontal_axis, positive) {
                    (true, true) => Direction::East,
                    (true, false) => Direction::West,
                    (false, true) => Direction::South,
                    (false, false) => Direction::North,
                }
            }
        }
    }

    fn place_specials<R>(
        &self,
        grid: &mut TileGrid,
        count: u32,
        tile: Tile,
        forbidden: &mut HashSet<CellCoord>,
        rng: &mut R,
    ) -> Vec<CellCoord>
    where
        R: Rng + ?Sized,
    {
        let mut placed = Vec::new();
        let Some((columns, rows)) = probe_ranges(grid.dimensions()) else {
            return placed;
        };

        let mut probes = 0;
        while placed.len() < count as usize && probes < self.tuning.max_special_probes {
            probes += 1;
            let cell = CellCoord::new(rng.gen_range(columns.clone()), rng.gen_range(rows.clone()));
            if forbidden.contains(&cell) {
                continue;
            }
            if matches!(grid.tile(cell), Some(Tile::Superposed | Tile::Empty)) {
                let _ = grid.set(cell, tile);
                let _ = forbidden.insert(cell);
                placed.push(cell);
            }
        }

        if placed.len() < count as usize {
            debug!(
                "[Generator] placed {} of {count} {tile:?} tiles",
                placed.len()
            );
        }
        placed
    }
}

fn entangle<R>(
    grid: &TileGrid,
    requested: u32,
    start: CellCoord,
    exit: CellCoord,
    rng: &mut R,
) -> EntanglementMap
where
    R: Rng + ?Sized,
{
    let dimensions = grid.dimensions();
    let mut candidates: Vec<CellCoord> = grid
        .iter()
        .filter(|&(cell, tile)| {
            tile == Tile::Superposed && dimensions.is_interior(cell) && cell != start && cell != exit
        })
        .map(|(cell, _)| cell)
        .collect();
    candidates.shuffle(rng);

    let target = (requested as usize).min(candidates.len() / 4);
    let mut entanglement = EntanglementMap::new();
    for pair in candidates.chunks_exact(2) {
        if entanglement.len() >= target {
            break;
        }
        let (first, second) = (pair[0], pair[1]);
        if first.manhattan_distance(second) < 2 {
            continue;
        }
        let mode = if rng.gen_bool(0.5) {
            EntanglementMode::Same
        } else {
            EntanglementMode::Opposite
        };
        let _ = entanglement.insert_pair(first, second, mode);
    }

    if entanglement.len() < requested as usize {
        debug!(
            "[Generator] entangled {} of {requested} requested pairs",
            entanglement.len()
        );
    }
    entanglement
}

/// Column and row ranges used for obstruction and special tile probes.
///
/// Probes keep a two-cell margin so they never land on the start or exit.
fn probe_ranges(dimensions: GridDimensions) -> Option<(RangeInclusive<u32>, RangeInclusive<u32>)> {
    let last_column = dimensions.columns().checked_sub(3)?;
    let last_row = dimensions.rows().checked_sub(3)?;
    (last_column >= 2 && last_row >= 2).then_some((2..=last_column, 2..=last_row))
}

fn toward(from: u32, to: u32, decreasing: Direction, increasing: Direction) -> Option<Direction> {
    match to.cmp(&from) {
        Ordering::Less => Some(decreasing),
        Ordering::Greater => Some(increasing),
        Ordering::Equal => None,
    }
}

fn corridor_direction(current: CellCoord, goal: CellCoord) -> Option<Direction> {
    toward(current.column(), goal.column(), Direction::West, Direction::East)
        .or_else(|| toward(current.row(), goal.row(), Direction::North, Direction::South))
}

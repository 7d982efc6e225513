#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Quantum Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired actions, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that
//! presentation collaborators may react to. Systems such as the generator
//! only ever produce plain data (a [`LevelBlueprint`]) for the world to adopt.

pub mod grid;
pub mod maps;
pub mod tables;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use grid::{GridDimensions, TileGrid};
pub use maps::{EntangledPair, EntanglementMap, SafeSet, TeleportMap};
pub use tables::{Difficulty, DifficultyConfig, LevelConfig, LevelRules, UnknownDifficulty, LEVELS};

/// Canonical title shown by adapters when the experience boots.
pub const GAME_TITLE: &str = "Quantum Maze Explorer";

/// Terrain held by a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Resolved open floor.
    Empty,
    /// Resolved blocking terrain.
    Wall,
    /// Undetermined terrain that resolves on observation.
    Superposed,
    /// Level goal.
    Exit,
    /// Node linked to a partner teleport.
    Teleport,
    /// Node that collapses the player and forces a level rebuild.
    Absorb,
}

impl Tile {
    /// Reports whether the player may stand on the tile without tunnelling.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Empty | Self::Exit | Self::Teleport)
    }

    /// Reports whether the tile still awaits collapse.
    #[must_use]
    pub const fn is_superposed(self) -> bool {
        matches!(self, Self::Superposed)
    }
}

/// Correlation between the two members of an entangled pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntanglementMode {
    /// The partner resolves to the identical terrain.
    Same,
    /// The partner resolves to the inverted terrain (`Wall` ↔ `Empty`).
    Opposite,
}

impl EntanglementMode {
    /// Terrain forced onto the partner once its twin resolved to `resolved`.
    #[must_use]
    pub const fn partner_tile(self, resolved: Tile) -> Tile {
        match self {
            Self::Same => resolved,
            Self::Opposite => match resolved {
                Tile::Wall => Tile::Empty,
                Tile::Empty => Tile::Wall,
                other => other,
            },
        }
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in neighbour scan order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring cell one step away in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant;
    /// upper bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self.row.checked_sub(1).map(|row| Self::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| Self::new(column, self.row)),
            Direction::South => self.row.checked_add(1).map(|row| Self::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| Self::new(column, self.row)),
        }
    }

    /// Axis neighbours in [`Direction::ALL`] order.
    pub fn neighbors(self) -> impl Iterator<Item = CellCoord> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(direction))
    }

    /// Cells within Manhattan `radius` of `self`, nearest first.
    ///
    /// Cells at equal distance keep row-major scan order. Coordinates that
    /// would be negative are skipped.
    #[must_use]
    pub fn cells_within(self, radius: u32) -> Vec<CellCoord> {
        let radius = i64::from(radius);
        let mut cells = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() + dy.abs() > radius {
                    continue;
                }
                let column = u32::try_from(i64::from(self.column) + dx);
                let row = u32::try_from(i64::from(self.row) + dy);
                if let (Ok(column), Ok(row)) = (column, row) {
                    cells.push(CellCoord::new(column, row));
                }
            }
        }
        cells.sort_by_key(|cell| cell.manhattan_distance(self));
        cells
    }
}

/// Everything the generator hands to the world for one level instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelBlueprint {
    /// Initial terrain, bordered by walls.
    pub grid: TileGrid,
    /// Cell the player starts on.
    pub start: CellCoord,
    /// Cell holding the [`Tile::Exit`].
    pub exit: CellCoord,
    /// Pairs of superposed cells whose collapse is linked.
    pub entanglement: EntanglementMap,
    /// Links between paired teleport tiles.
    pub teleports: TeleportMap,
    /// Hidden path guaranteed to resolve to open floor.
    pub safe: SafeSet,
}

/// Per-run preferences that survive level rebuilds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Toggles {
    /// Allows stepping into walls at an energy cost.
    pub tunneling: bool,
    /// Requests that adapters draw links between entangled cells.
    pub entanglement_overlay: bool,
    /// Requests that adapters draw a pointer toward the exit.
    pub exit_arrow: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            tunneling: false,
            entanglement_overlay: true,
            exit_arrow: true,
        }
    }
}

/// Lifecycle of a single level instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelStatus {
    /// The player may act.
    Playing,
    /// The player reached the exit; only restart or advance leave this state.
    Won,
    /// The player stepped onto an absorber; the level must be rebuilt.
    Absorbed,
}

/// Result of a movement request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The player changed cell.
    Moved,
    /// Nothing moved.
    Blocked,
    /// The player stepped onto an absorber.
    Absorbed,
    /// The level is won.
    Won,
}

/// Result of an attempt to pass through a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TunnelOutcome {
    /// The player passed into the wall cell and paid the tunnel cost.
    Success,
    /// The draw failed; nothing was spent.
    Failed,
    /// Not enough energy to attempt the tunnel.
    InsufficientEnergy,
}

/// Result of a quantum reroute request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RerouteOutcome {
    /// The reroute ran.
    Applied {
        /// Number of cells resolved by the re-collapse, partners included.
        collapsed: u32,
    },
    /// The reroute was refused without touching any state.
    Refused(RerouteRefusal),
}

/// Reasons a reroute request may be refused.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RerouteRefusal {
    /// Every reroute charge for the level has been used.
    #[error("no reroute charges left")]
    NoCharges,
    /// The ability is still recharging.
    #[error("reroute cooldown: {remaining} moves")]
    OnCooldown {
        /// Moves left until the ability is ready.
        remaining: u32,
    },
    /// The player cannot afford the reroute cost.
    #[error("not enough energy to reroute")]
    InsufficientEnergy,
    /// The level is no longer in play.
    #[error("level is not in play")]
    Inactive,
}

/// Snapshot of the spendable resources of a level instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    /// Budget spent by reroute, tunnel and teleport.
    pub energy: u32,
    /// Reroute uses left in the level.
    pub reroute_charges: u32,
    /// Moves left before reroute becomes available again.
    pub reroute_cooldown: u32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Requests that the player step one cell in the provided direction.
    Move {
        /// Direction of the attempted step.
        direction: Direction,
    },
    /// Requests an explicit tunnel attempt into an adjacent wall.
    Tunnel {
        /// Direction of the wall to tunnel into.
        direction: Direction,
    },
    /// Requests the quantum reroute ability.
    Reroute,
    /// Advances decoherence by one turn.
    TickDecoherence,
    /// Replaces the per-run preferences of the level.
    SetToggles {
        /// Preferences that should become active.
        toggles: Toggles,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a fresh level instance became active.
    LevelStarted {
        /// Zero-based index into the level table.
        level: u32,
        /// Difficulty tier the level was built with.
        difficulty: Difficulty,
    },
    /// A superposed cell resolved through observation.
    CellCollapsed {
        /// Cell that resolved.
        cell: CellCoord,
        /// Terrain it resolved to.
        tile: Tile,
    },
    /// A collapse forced the entangled partner to resolve as well.
    EntanglementPropagated {
        /// Cell whose collapse triggered the propagation.
        source: CellCoord,
        /// Partner forced to resolve.
        partner: CellCoord,
        /// Correlation of the pair.
        mode: EntanglementMode,
        /// Terrain forced onto the partner.
        tile: Tile,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// The player jumped between linked teleports.
    Teleported {
        /// Teleport the player stepped on.
        from: CellCoord,
        /// Linked teleport the player arrived at.
        to: CellCoord,
    },
    /// The player stood on a teleport without enough energy to use it.
    TeleportBlocked {
        /// Teleport that stayed inactive.
        cell: CellCoord,
    },
    /// The player stepped onto an absorber.
    Absorbed {
        /// Absorber the player stepped onto.
        cell: CellCoord,
    },
    /// A tunnel attempt resolved.
    TunnelResolved {
        /// Wall cell targeted by the attempt.
        target: CellCoord,
        /// Result of the attempt.
        outcome: TunnelOutcome,
    },
    /// A reroute request resolved.
    RerouteResolved {
        /// Result of the request.
        outcome: RerouteOutcome,
    },
    /// The connectivity guard opened a neighbour of a boxed-in cell.
    EscapeOpened {
        /// Cell that had no traversable neighbour.
        from: CellCoord,
        /// Neighbour forced open.
        opened: CellCoord,
    },
    /// Unvisited floor decayed back into superposition.
    CellDecohered {
        /// Cell that reverted.
        cell: CellCoord,
    },
    /// The player reached the exit.
    LevelWon {
        /// Steps taken during the level.
        steps: u32,
        /// Energy left when the level was won.
        energy: u32,
    },
    /// The per-run preferences changed.
    TogglesChanged {
        /// Preferences now in effect.
        toggles: Toggles,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        CellCoord, Direction, EntanglementMap, EntanglementMode, Event, GridDimensions,
        LevelBlueprint, RerouteOutcome, RerouteRefusal, SafeSet, TeleportMap, Tile, TileGrid,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn blueprint_round_trips_through_bincode() {
        let dimensions = GridDimensions::new(6, 5);
        let mut grid = TileGrid::bordered(dimensions);
        let start = dimensions.start();
        let exit = dimensions.exit();
        assert!(grid.set(start, Tile::Empty));
        assert!(grid.set(exit, Tile::Exit));
        assert!(grid.set(CellCoord::new(2, 2), Tile::Teleport));
        assert!(grid.set(CellCoord::new(3, 1), Tile::Teleport));

        let mut entanglement = EntanglementMap::new();
        assert!(entanglement.insert_pair(
            CellCoord::new(1, 3),
            CellCoord::new(3, 3),
            EntanglementMode::Opposite
        ));
        let mut teleports = TeleportMap::new();
        assert!(teleports.link(CellCoord::new(2, 2), CellCoord::new(3, 1)));

        let blueprint = LevelBlueprint {
            grid,
            start,
            exit,
            entanglement,
            teleports,
            safe: SafeSet::from_path(vec![start, CellCoord::new(2, 1), CellCoord::new(2, 1)]),
        };
        assert_round_trip(&blueprint);
    }

    #[test]
    fn reroute_event_round_trips_through_bincode() {
        assert_round_trip(&Event::RerouteResolved {
            outcome: RerouteOutcome::Refused(RerouteRefusal::OnCooldown { remaining: 3 }),
        });
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn step_refuses_negative_coordinates() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::East), Some(CellCoord::new(1, 0)));
        assert_eq!(origin.step(Direction::South), Some(CellCoord::new(0, 1)));
    }

    #[test]
    fn neighbors_follow_scan_order() {
        let neighbors: Vec<_> = CellCoord::new(2, 2).neighbors().collect();
        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(2, 1),
                CellCoord::new(3, 2),
                CellCoord::new(2, 3),
                CellCoord::new(1, 2),
            ]
        );
    }

    #[test]
    fn cells_within_orders_nearest_first() {
        let center = CellCoord::new(3, 3);
        let cells = center.cells_within(2);

        assert_eq!(cells.len(), 13);
        assert_eq!(cells[0], center);
        assert!(cells
            .windows(2)
            .all(|pair| pair[0].manhattan_distance(center) <= pair[1].manhattan_distance(center)));
        assert_eq!(cells[1], CellCoord::new(3, 2), "ties keep scan order");
    }

    #[test]
    fn cells_within_clips_at_origin() {
        let cells = CellCoord::new(0, 0).cells_within(1);
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1)
            ]
        );
    }

    #[test]
    fn opposite_mode_inverts_terrain() {
        assert_eq!(EntanglementMode::Opposite.partner_tile(Tile::Wall), Tile::Empty);
        assert_eq!(EntanglementMode::Opposite.partner_tile(Tile::Empty), Tile::Wall);
        assert_eq!(EntanglementMode::Same.partner_tile(Tile::Wall), Tile::Wall);
    }

    #[test]
    fn traversable_set_matches_floor_tiles() {
        assert!(Tile::Empty.is_traversable());
        assert!(Tile::Exit.is_traversable());
        assert!(Tile::Teleport.is_traversable());
        assert!(!Tile::Wall.is_traversable());
        assert!(!Tile::Superposed.is_traversable());
        assert!(!Tile::Absorb.is_traversable());
    }
}

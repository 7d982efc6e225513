#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level progression for a single Quantum Maze run.
//!
//! The session owns the seeded random source, the generator and the active
//! [`World`]. It translates player intents into world operations, advances
//! decoherence once per turn, and is the only place a level is discarded and
//! rebuilt: on restart, on absorption, and when advancing after a win.

use log::info;
use quantum_maze_core::{
    Difficulty, Direction, Event, LevelRules, LevelStatus, MoveOutcome, RerouteOutcome, Toggles,
    LEVELS,
};
use quantum_maze_system_generation::Generator;
use quantum_maze_world::{query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Parameters for starting a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Seed of the run's random source.
    pub seed: u64,
    /// Zero-based level to start on; clamped to the last level.
    pub level: usize,
    /// Difficulty tier used for every level of the run.
    pub difficulty: Difficulty,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            level: 0,
            difficulty: Difficulty::default(),
        }
    }
}

/// Player requests understood by the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Step one cell in the direction.
    Move(Direction),
    /// Use the quantum reroute ability.
    Reroute,
    /// Flip wall tunnelling.
    ToggleTunneling,
    /// Flip the entanglement overlay preference.
    ToggleEntanglementOverlay,
    /// Flip the exit arrow preference.
    ToggleExitArrow,
    /// Rebuild the current level from scratch.
    Restart,
    /// Move on to the next level once the current one is won.
    Advance,
}

/// Result of handling a single intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntentOutcome {
    /// A movement resolved.
    Move(MoveOutcome),
    /// A reroute request resolved.
    Reroute(RerouteOutcome),
    /// Preferences changed.
    Toggled(Toggles),
    /// A fresh level instance became active.
    LevelStarted {
        /// Zero-based index of the level.
        level: usize,
    },
    /// The intent does not apply in the current state.
    Ignored,
}

/// A run through the level table.
#[derive(Debug)]
pub struct Session {
    generator: Generator,
    rng: ChaCha8Rng,
    difficulty: Difficulty,
    level: usize,
    toggles: Toggles,
    world: World,
}

impl Session {
    /// Starts a run with the default generator.
    pub fn new(config: SessionConfig, out_events: &mut Vec<Event>) -> Self {
        Self::with_generator(config, Generator::default(), out_events)
    }

    /// Starts a run with an explicit generator.
    pub fn with_generator(
        config: SessionConfig,
        generator: Generator,
        out_events: &mut Vec<Event>,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let level = config.level.min(LEVELS.len() - 1);
        let toggles = Toggles::default();
        let world = build_level(
            &generator,
            level,
            config.difficulty,
            toggles,
            &mut rng,
            out_events,
        );

        Self {
            generator,
            rng,
            difficulty: config.difficulty,
            level,
            toggles,
            world,
        }
    }

    /// Active level instance.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Zero-based index of the active level.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Difficulty tier of the run.
    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Preferences carried across levels.
    #[must_use]
    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    /// Handles one player intent.
    pub fn handle(&mut self, intent: Intent, out_events: &mut Vec<Event>) -> IntentOutcome {
        match intent {
            Intent::Move(direction) => {
                let outcome = self.world.try_move(direction, &mut self.rng, out_events);
                if outcome == MoveOutcome::Absorbed {
                    info!("[Session] absorbed on level {}, rebuilding", self.level);
                    self.start_level(self.level, out_events);
                } else {
                    self.world.tick_decoherence(out_events);
                }
                IntentOutcome::Move(outcome)
            }
            Intent::Reroute => {
                // A refused reroute still spends the turn.
                let outcome = self.world.quantum_reroute(&mut self.rng, out_events);
                self.world.tick_decoherence(out_events);
                IntentOutcome::Reroute(outcome)
            }
            Intent::ToggleTunneling => self.update_toggles(
                Toggles {
                    tunneling: !self.toggles.tunneling,
                    ..self.toggles
                },
                out_events,
            ),
            Intent::ToggleEntanglementOverlay => self.update_toggles(
                Toggles {
                    entanglement_overlay: !self.toggles.entanglement_overlay,
                    ..self.toggles
                },
                out_events,
            ),
            Intent::ToggleExitArrow => self.update_toggles(
                Toggles {
                    exit_arrow: !self.toggles.exit_arrow,
                    ..self.toggles
                },
                out_events,
            ),
            Intent::Restart => {
                self.start_level(self.level, out_events);
                IntentOutcome::LevelStarted { level: self.level }
            }
            Intent::Advance => {
                if query::status(&self.world) != LevelStatus::Won {
                    return IntentOutcome::Ignored;
                }
                let next = next_level_index(self.level);
                self.start_level(next, out_events);
                IntentOutcome::LevelStarted { level: next }
            }
        }
    }

    fn update_toggles(&mut self, toggles: Toggles, out_events: &mut Vec<Event>) -> IntentOutcome {
        self.toggles = toggles;
        self.world.set_toggles(toggles, out_events);
        IntentOutcome::Toggled(toggles)
    }

    fn start_level(&mut self, level: usize, out_events: &mut Vec<Event>) {
        self.level = level;
        self.world = build_level(
            &self.generator,
            level,
            self.difficulty,
            self.toggles,
            &mut self.rng,
            out_events,
        );
    }

    #[cfg(test)]
    fn adopt(&mut self, blueprint: quantum_maze_core::LevelBlueprint, rules: LevelRules) {
        let mut events = Vec::new();
        self.world = World::from_blueprint(blueprint, rules, self.toggles, &mut self.rng, &mut events);
    }
}

/// Index of the level that follows `current`, wrapping after the last one.
#[must_use]
pub fn next_level_index(current: usize) -> usize {
    (current + 1) % LEVELS.len()
}

fn build_level(
    generator: &Generator,
    level: usize,
    difficulty: Difficulty,
    toggles: Toggles,
    rng: &mut ChaCha8Rng,
    out_events: &mut Vec<Event>,
) -> World {
    let rules = LevelRules::for_level(level, difficulty);
    let blueprint = generator.generate(&rules, rng);
    out_events.push(Event::LevelStarted {
        level: u32::try_from(level).unwrap_or(u32::MAX),
        difficulty,
    });
    info!("[Session] level {} started on {difficulty}", level + 1);
    World::from_blueprint(blueprint, rules, toggles, rng, out_events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantum_maze_core::{
        CellCoord, EntanglementMap, GridDimensions, LevelBlueprint, SafeSet, TeleportMap, Tile,
        TileGrid,
    };

    fn corridor_blueprint(tiles: &[Tile]) -> (LevelBlueprint, LevelRules) {
        let dimensions = GridDimensions::new(tiles.len() as u32 + 2, 3);
        let mut grid = TileGrid::bordered(dimensions);
        for (offset, tile) in tiles.iter().enumerate() {
            let _ = grid.set(CellCoord::new(offset as u32 + 1, 1), *tile);
        }
        let exit = CellCoord::new(tiles.len() as u32, 1);
        let _ = grid.set(exit, Tile::Exit);

        let mut rules = LevelRules::for_level(0, Difficulty::Standard);
        rules.dimensions = dimensions;
        let blueprint = LevelBlueprint {
            grid,
            start: CellCoord::new(1, 1),
            exit,
            entanglement: EntanglementMap::new(),
            teleports: TeleportMap::new(),
            safe: SafeSet::default(),
        };
        (blueprint, rules)
    }

    #[test]
    fn next_level_wraps_after_last() {
        assert_eq!(next_level_index(0), 1);
        assert_eq!(next_level_index(LEVELS.len() - 1), 0);
    }

    #[test]
    fn absorption_rebuilds_the_same_level() {
        let mut events = Vec::new();
        let mut session = Session::new(
            SessionConfig {
                seed: 4,
                level: 2,
                difficulty: Difficulty::Standard,
            },
            &mut events,
        );
        let (blueprint, rules) = corridor_blueprint(&[Tile::Empty, Tile::Absorb, Tile::Empty, Tile::Empty]);
        session.adopt(blueprint, rules);
        events.clear();

        let outcome = session.handle(Intent::Move(Direction::East), &mut events);

        assert_eq!(outcome, IntentOutcome::Move(MoveOutcome::Absorbed));
        assert_eq!(session.level(), 2);
        assert_eq!(query::status(session.world()), LevelStatus::Playing);
        assert_eq!(query::dimensions(session.world()), GridDimensions::new(16, 12));
        assert!(events.contains(&Event::LevelStarted {
            level: 2,
            difficulty: Difficulty::Standard,
        }));
    }

    #[test]
    fn advance_requires_a_win_and_keeps_toggles() {
        let mut events = Vec::new();
        let mut session = Session::new(
            SessionConfig {
                seed: 8,
                level: LEVELS.len() - 1,
                difficulty: Difficulty::Relaxed,
            },
            &mut events,
        );
        assert_eq!(session.handle(Intent::Advance, &mut events), IntentOutcome::Ignored);
        let _ = session.handle(Intent::ToggleTunneling, &mut events);

        let (blueprint, rules) = corridor_blueprint(&[Tile::Empty, Tile::Empty, Tile::Empty]);
        session.adopt(blueprint, rules);
        assert_eq!(
            session.handle(Intent::Move(Direction::East), &mut events),
            IntentOutcome::Move(MoveOutcome::Moved)
        );
        assert_eq!(
            session.handle(Intent::Move(Direction::East), &mut events),
            IntentOutcome::Move(MoveOutcome::Won)
        );

        assert_eq!(
            session.handle(Intent::Advance, &mut events),
            IntentOutcome::LevelStarted { level: 0 }
        );
        assert_eq!(session.level(), 0);
        assert!(query::toggles(session.world()).tunneling);
        assert_eq!(query::status(session.world()), LevelStatus::Playing);
    }

    #[test]
    fn moves_advance_decoherence() {
        let mut events = Vec::new();
        let mut session = Session::new(SessionConfig::default(), &mut events);
        let (blueprint, mut rules) =
            corridor_blueprint(&[Tile::Empty, Tile::Empty, Tile::Empty, Tile::Empty, Tile::Empty]);
        rules.decoherence_ttl = 5;
        rules.protection_radius = 0;
        session.adopt(blueprint, rules);

        let _ = session.handle(Intent::Move(Direction::East), &mut events);
        assert_eq!(query::decoherence_ttl(session.world(), CellCoord::new(1, 1)), Some(4));

        let refused = session.handle(Intent::Reroute, &mut events);
        assert!(matches!(
            refused,
            IntentOutcome::Reroute(RerouteOutcome::Refused(_))
        ));
        assert_eq!(query::decoherence_ttl(session.world(), CellCoord::new(1, 1)), Some(3));
    }
}

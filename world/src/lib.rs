#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for Quantum Maze.
//!
//! A [`World`] owns one level instance: the tile grid, the typed maps handed
//! over by the generator, the player and their resources. Every mutation goes
//! through the collapse engine, the connectivity guard or the decoherence
//! engine, and every observable change is reported as an [`Event`].

mod collapse;
mod decoherence;
mod navigation;

use log::{debug, warn};
use quantum_maze_core::{
    CellCoord, Command, Direction, EntanglementMap, Event, LevelBlueprint, LevelRules,
    LevelStatus, MoveOutcome, RerouteOutcome, RerouteRefusal, Resources, SafeSet, TeleportMap,
    Tile, TileGrid, Toggles, TunnelOutcome,
};
use rand::Rng;

use crate::{collapse::Observer, decoherence::DecoherenceTable};

pub use navigation::{reachable_through, route_length_through};

/// Represents one authoritative Quantum Maze level instance.
#[derive(Debug)]
pub struct World {
    rules: LevelRules,
    grid: TileGrid,
    start: CellCoord,
    exit: CellCoord,
    entanglement: EntanglementMap,
    teleports: TeleportMap,
    safe: SafeSet,
    decoherence: DecoherenceTable,
    player: CellCoord,
    resources: Resources,
    steps: u32,
    toggles: Toggles,
    status: LevelStatus,
}

impl World {
    /// Adopts a generated blueprint and runs the level-start observation.
    ///
    /// The cells around the start are observed with the passive bias and the
    /// connectivity guard then makes sure the player is not boxed in.
    pub fn from_blueprint<R>(
        blueprint: LevelBlueprint,
        rules: LevelRules,
        toggles: Toggles,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let LevelBlueprint {
            grid,
            start,
            exit,
            entanglement,
            teleports,
            safe,
        } = blueprint;
        let resources = Resources {
            energy: rules.energy,
            reroute_charges: rules.reroute_charges,
            reroute_cooldown: rules.reroute_cooldown,
        };

        let mut world = Self {
            rules,
            grid,
            start,
            exit,
            entanglement,
            teleports,
            safe,
            decoherence: DecoherenceTable::default(),
            player: start,
            resources,
            steps: 0,
            toggles,
            status: LevelStatus::Playing,
        };

        let _ = world.observe_surroundings(rng, out_events);
        let _ = world.ensure_escape(start, rng, out_events);
        world
    }

    fn observer(&mut self) -> Observer<'_> {
        Observer {
            grid: &mut self.grid,
            entanglement: &self.entanglement,
            safe: &self.safe,
            wall_probability: self.rules.wall_probability,
        }
    }

    /// Resolves a superposed cell, propagating to its entangled partner.
    ///
    /// `bias` overrides the level's wall probability. Safe-path cells always
    /// resolve to open floor. Returns the number of cells resolved; resolved
    /// cells are never collapsed again, so that count is 0 for them.
    pub fn collapse_at<R>(
        &mut self,
        cell: CellCoord,
        bias: Option<f64>,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> u32
    where
        R: Rng + ?Sized,
    {
        self.observer().collapse_at(cell, bias, rng, out_events)
    }

    /// Resolves every superposed cell within Manhattan `radius` of `center`,
    /// nearest first, and returns the total resolved count.
    pub fn collapse_area<R>(
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
        self.observer()
            .collapse_area(center, radius, bias, rng, out_events)
    }

    fn observe_surroundings<R>(&mut self, rng: &mut R, out_events: &mut Vec<Event>) -> u32
    where
        R: Rng + ?Sized,
    {
        let center = self.player;
        let radius = self.rules.observe_radius;
        let bias = Some(self.rules.passive_wall_probability);
        self.collapse_area(center, radius, bias, rng, out_events)
    }

    /// Guarantees the cell keeps at least one traversable axis neighbour.
    ///
    /// When every neighbour is closed, the superposed neighbour nearest the
    /// exit is forced open. Without one, the interior wall neighbour nearest
    /// the exit is dissolved back into superposition and forced open instead.
    /// Returns the neighbour that was opened, if any.
    pub fn ensure_escape<R>(
        &mut self,
        cell: CellCoord,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Option<CellCoord>
    where
        R: Rng + ?Sized,
    {
        let dimensions = self.grid.dimensions();
        let mut superposed = Vec::new();
        let mut walls = Vec::new();

        for neighbor in cell.neighbors() {
            match self.grid.tile(neighbor) {
                Some(tile) if tile.is_traversable() => return None,
                Some(Tile::Superposed) => superposed.push(neighbor),
                Some(Tile::Wall) if dimensions.is_interior(neighbor) => walls.push(neighbor),
                _ => {}
            }
        }

        let exit = self.exit;
        let nearest_exit = |cells: &[CellCoord]| {
            cells
                .iter()
                .copied()
                .min_by_key(|candidate| candidate.manhattan_distance(exit))
        };

        let opened = if let Some(target) = nearest_exit(&superposed) {
            target
        } else if let Some(target) = nearest_exit(&walls) {
            debug!("[Guard] {cell:?} sealed in, dissolving wall at {target:?}");
            let _ = self.grid.set(target, Tile::Superposed);
            target
        } else {
            warn!("[Guard] {cell:?} has no neighbour that can be opened");
            return None;
        };

        let _ = self.collapse_at(opened, Some(0.0), rng, out_events);
        out_events.push(Event::EscapeOpened { from: cell, opened });
        Some(opened)
    }

    /// Attempts to step the player one cell in `direction`.
    ///
    /// A superposed target is collapsed first, with the frontier bias during
    /// the opening steps. Walls are only passable through tunnelling.
    pub fn try_move<R>(
        &mut self,
        direction: Direction,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> MoveOutcome
    where
        R: Rng + ?Sized,
    {
        match self.status {
            LevelStatus::Won => return MoveOutcome::Won,
            LevelStatus::Absorbed => return MoveOutcome::Absorbed,
            LevelStatus::Playing => {}
        }

        let dimensions = self.grid.dimensions();
        let Some(target) = self
            .player
            .step(direction)
            .filter(|cell| dimensions.contains(*cell))
        else {
            return MoveOutcome::Blocked;
        };

        if self.grid.is(target, Tile::Superposed) {
            let bias = (self.steps < self.rules.frontier_steps)
                .then_some(self.rules.frontier_wall_probability);
            let _ = self.collapse_at(target, bias, rng, out_events);
        }

        let moved = match self.grid.tile(target) {
            Some(Tile::Absorb) => {
                debug!("[World] absorbed at {target:?}");
                self.status = LevelStatus::Absorbed;
                out_events.push(Event::Absorbed { cell: target });
                return MoveOutcome::Absorbed;
            }
            Some(tile) if tile.is_traversable() => {
                self.step_to(target, rng, out_events);
                if tile == Tile::Teleport {
                    self.use_teleport(target, rng, out_events);
                }
                let _ = self.ensure_escape(self.player, rng, out_events);
                true
            }
            Some(Tile::Wall) if self.toggles.tunneling => matches!(
                self.tunnel_attempt(direction, rng, out_events),
                Some(TunnelOutcome::Success)
            ),
            _ => false,
        };

        if !moved {
            return MoveOutcome::Blocked;
        }

        if self.player == self.exit && self.resources.energy >= self.rules.min_energy_to_win {
            self.status = LevelStatus::Won;
            debug!("[World] exit reached after {} steps", self.steps);
            out_events.push(Event::LevelWon {
                steps: self.steps,
                energy: self.resources.energy,
            });
            return MoveOutcome::Won;
        }

        MoveOutcome::Moved
    }

    /// Attempts to pass through the adjacent interior wall in `direction`.
    ///
    /// Returns `None` when no attempt applies: the level is not in play,
    /// tunnelling is disabled, or the target is not an interior wall.
    pub fn tunnel_attempt<R>(
        &mut self,
        direction: Direction,
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Option<TunnelOutcome>
    where
        R: Rng + ?Sized,
    {
        if self.status != LevelStatus::Playing || !self.toggles.tunneling {
            return None;
        }

        let target = self.player.step(direction)?;
        if !self.grid.is(target, Tile::Wall) || !self.grid.dimensions().is_interior(target) {
            return None;
        }

        let outcome = if self.resources.energy < self.rules.tunnel_cost {
            TunnelOutcome::InsufficientEnergy
        } else if collapse::draw(rng, self.rules.tunnel_probability) {
            TunnelOutcome::Success
        } else {
            TunnelOutcome::Failed
        };
        out_events.push(Event::TunnelResolved { target, outcome });

        if outcome == TunnelOutcome::Success {
            self.resources.energy -= self.rules.tunnel_cost;
            self.step_to(target, rng, out_events);
            let _ = self.ensure_escape(self.player, rng, out_events);
        }

        Some(outcome)
    }

    /// Re-superposes nearby walls and re-collapses them with friendlier odds.
    pub fn quantum_reroute<R>(&mut self, rng: &mut R, out_events: &mut Vec<Event>) -> RerouteOutcome
    where
        R: Rng + ?Sized,
    {
        let outcome = match self.reroute_refusal() {
            Some(reason) => RerouteOutcome::Refused(reason),
            None => RerouteOutcome::Applied {
                collapsed: self.apply_reroute(rng, out_events),
            },
        };
        out_events.push(Event::RerouteResolved { outcome });
        outcome
    }

    fn reroute_refusal(&self) -> Option<RerouteRefusal> {
        if self.status != LevelStatus::Playing {
            return Some(RerouteRefusal::Inactive);
        }
        if self.resources.reroute_charges == 0 {
            return Some(RerouteRefusal::NoCharges);
        }
        if self.resources.reroute_cooldown > 0 {
            return Some(RerouteRefusal::OnCooldown {
                remaining: self.resources.reroute_cooldown,
            });
        }
        if self.resources.energy < self.rules.reroute_cost {
            return Some(RerouteRefusal::InsufficientEnergy);
        }
        None
    }

    fn apply_reroute<R>(&mut self, rng: &mut R, out_events: &mut Vec<Event>) -> u32
    where
        R: Rng + ?Sized,
    {
        self.resources.energy -= self.rules.reroute_cost;
        self.resources.reroute_charges -= 1;

        let dimensions = self.grid.dimensions();
        let center = self.player;
        let radius = self.rules.reroute_radius;
        for cell in center.cells_within(radius) {
            if cell != self.exit && dimensions.is_interior(cell) && self.grid.is(cell, Tile::Wall) {
                let _ = self.grid.set(cell, Tile::Superposed);
            }
        }

        let bias = Some(self.rules.reroute_wall_probability);
        let collapsed = self.collapse_area(center, radius, bias, rng, out_events);
        self.resources.reroute_cooldown = self.rules.reroute_cooldown;
        debug!(
            "[World] reroute at {center:?} resolved {collapsed} cells, {} charges left",
            self.resources.reroute_charges
        );
        collapsed
    }

    /// Advances decoherence by one turn. No-op once the level left play.
    pub fn tick_decoherence(&mut self, out_events: &mut Vec<Event>) {
        if self.status != LevelStatus::Playing {
            return;
        }
        self.decoherence.tick(
            &mut self.grid,
            self.player,
            self.rules.decoherence_ttl,
            self.rules.protection_radius,
            out_events,
        );
    }

    /// Replaces the per-run preferences.
    pub fn set_toggles(&mut self, toggles: Toggles, out_events: &mut Vec<Event>) {
        self.toggles = toggles;
        out_events.push(Event::TogglesChanged { toggles });
    }

    fn step_to<R>(&mut self, target: CellCoord, rng: &mut R, out_events: &mut Vec<Event>)
    where
        R: Rng + ?Sized,
    {
        let from = self.player;
        self.player = target;
        self.steps = self.steps.saturating_add(1);
        out_events.push(Event::PlayerMoved { from, to: target });
        let _ = self.observe_surroundings(rng, out_events);
        self.resources.reroute_cooldown = self.resources.reroute_cooldown.saturating_sub(1);
    }

    fn use_teleport<R>(&mut self, cell: CellCoord, rng: &mut R, out_events: &mut Vec<Event>)
    where
        R: Rng + ?Sized,
    {
        if self.resources.energy < self.rules.teleport_cost {
            out_events.push(Event::TeleportBlocked { cell });
            return;
        }

        self.resources.energy -= self.rules.teleport_cost;
        let Some(destination) = self.teleports.destination(cell) else {
            return;
        };
        self.player = destination;
        out_events.push(Event::Teleported {
            from: cell,
            to: destination,
        });
        let _ = self.observe_surroundings(rng, out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically
/// for a given random source.
pub fn apply<R>(world: &mut World, command: Command, rng: &mut R, out_events: &mut Vec<Event>)
where
    R: Rng + ?Sized,
{
    match command {
        Command::Move { direction } => {
            let _ = world.try_move(direction, rng, out_events);
        }
        Command::Tunnel { direction } => {
            let _ = world.tunnel_attempt(direction, rng, out_events);
        }
        Command::Reroute => {
            let _ = world.quantum_reroute(rng, out_events);
        }
        Command::TickDecoherence => world.tick_decoherence(out_events),
        Command::SetToggles { toggles } => world.set_toggles(toggles, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use quantum_maze_core::{
        CellCoord, EntangledPair, EntanglementMap, GridDimensions, LevelRules, LevelStatus,
        Resources, Tile, TileGrid, Toggles,
    };

    use super::{navigation, World};

    /// Tile stored at the cell, if it lies inside the grid.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<Tile> {
        world.grid.tile(cell)
    }

    /// Provides read-only access to the complete tile grid.
    #[must_use]
    pub fn tiles(world: &World) -> &TileGrid {
        &world.grid
    }

    /// Size of the level.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.grid.dimensions()
    }

    /// Cell the player currently occupies.
    #[must_use]
    pub fn player(world: &World) -> CellCoord {
        world.player
    }

    /// Cell the level started from.
    #[must_use]
    pub fn start(world: &World) -> CellCoord {
        world.start
    }

    /// Cell holding the exit.
    #[must_use]
    pub fn exit(world: &World) -> CellCoord {
        world.exit
    }

    /// Lifecycle state of the level.
    #[must_use]
    pub fn status(world: &World) -> LevelStatus {
        world.status
    }

    /// Successful steps taken so far.
    #[must_use]
    pub fn steps(world: &World) -> u32 {
        world.steps
    }

    /// Spendable resources left.
    #[must_use]
    pub fn resources(world: &World) -> Resources {
        world.resources
    }

    /// Per-run preferences in effect.
    #[must_use]
    pub fn toggles(world: &World) -> Toggles {
        world.toggles
    }

    /// Rules the level was built with.
    #[must_use]
    pub fn rules(world: &World) -> &LevelRules {
        &world.rules
    }

    /// Reports whether `to` can be reached from `from` over open floor,
    /// exits and teleports.
    #[must_use]
    pub fn reachable(world: &World, from: CellCoord, to: CellCoord) -> bool {
        navigation::reachable_through(world.grid.dimensions(), from, to, |cell| {
            world.grid.tile(cell).is_some_and(Tile::is_traversable)
        })
    }

    /// Length of the shortest currently open route from the player to the
    /// exit, if one exists.
    #[must_use]
    pub fn open_route_length(world: &World) -> Option<u32> {
        navigation::route_length_through(world.grid.dimensions(), world.player, world.exit, |cell| {
            world.grid.tile(cell).is_some_and(Tile::is_traversable)
        })
    }

    /// Manhattan distance from the player to the exit.
    #[must_use]
    pub fn distance_to_exit(world: &World) -> u32 {
        world.player.manhattan_distance(world.exit)
    }

    /// Entangled pairs with at least one superposed member, for overlays.
    #[must_use]
    pub fn entangled_pairs(world: &World) -> Vec<EntangledPair> {
        world
            .entanglement
            .pairs()
            .iter()
            .filter(|pair| {
                world.grid.is(pair.first, Tile::Superposed)
                    || world.grid.is(pair.second, Tile::Superposed)
            })
            .copied()
            .collect()
    }

    /// Complete entanglement map, inert pairs included.
    #[must_use]
    pub fn entanglement(world: &World) -> &EntanglementMap {
        &world.entanglement
    }

    /// Teleport linked to the cell, if any.
    #[must_use]
    pub fn teleport_destination(world: &World, cell: CellCoord) -> Option<CellCoord> {
        world.teleports.destination(cell)
    }

    /// Turns left before the open cell decoheres, if it is tracked.
    #[must_use]
    pub fn decoherence_ttl(world: &World, cell: CellCoord) -> Option<u32> {
        world.decoherence.ttl(cell)
    }

    /// Hidden path carved by the generator, in walking order.
    #[must_use]
    pub fn safe_path(world: &World) -> &[CellCoord] {
        world.safe.path()
    }

    /// Reports whether the cell lies on the hidden safe path.
    #[must_use]
    pub fn is_safe(world: &World, cell: CellCoord) -> bool {
        world.safe.contains(cell)
    }
}

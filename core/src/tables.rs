//! Fixed level and difficulty tables, and the rules derived from them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GridDimensions;

const ENERGY_MAX_BASE: u32 = 20;
const DECOHERENCE_TTL_BASE: u32 = 10;
const REROUTE_CHARGES_BASE: u32 = 3;
const REROUTE_COOLDOWN_BASE: u32 = 5;

/// Columns of every generated maze, border included.
pub const GRID_COLUMNS: u32 = 16;
/// Rows of every generated maze, border included.
pub const GRID_ROWS: u32 = 12;

/// Parameters describing one entry of the level table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelConfig {
    /// Chance that an unbiased collapse resolves to a wall.
    pub wall_probability: f64,
    /// Chance that a tunnel attempt succeeds.
    pub tunnel_probability: f64,
    /// Teleport tiles requested from the generator.
    pub teleports: u32,
    /// Absorber tiles requested from the generator.
    pub absorbs: u32,
    /// Starting energy budget.
    pub energy: u32,
    /// Turns an unvisited floor cell survives before decohering.
    pub decoherence_ttl: u32,
    /// Entangled pairs requested from the generator.
    pub entangled_pairs: u32,
}

/// Campaign levels in play order.
pub const LEVELS: [LevelConfig; 6] = [
    LevelConfig {
        wall_probability: 0.35,
        tunnel_probability: 0.08,
        teleports: 0,
        absorbs: 0,
        energy: ENERGY_MAX_BASE + 5,
        decoherence_ttl: DECOHERENCE_TTL_BASE + 5,
        entangled_pairs: 6,
    },
    LevelConfig {
        wall_probability: 0.40,
        tunnel_probability: 0.10,
        teleports: 2,
        absorbs: 2,
        energy: ENERGY_MAX_BASE + 4,
        decoherence_ttl: DECOHERENCE_TTL_BASE + 4,
        entangled_pairs: 8,
    },
    LevelConfig {
        wall_probability: 0.43,
        tunnel_probability: 0.11,
        teleports: 3,
        absorbs: 2,
        energy: ENERGY_MAX_BASE + 2,
        decoherence_ttl: DECOHERENCE_TTL_BASE + 3,
        entangled_pairs: 9,
    },
    LevelConfig {
        wall_probability: 0.45,
        tunnel_probability: 0.12,
        teleports: 4,
        absorbs: 3,
        energy: ENERGY_MAX_BASE,
        decoherence_ttl: DECOHERENCE_TTL_BASE + 2,
        entangled_pairs: 10,
    },
    LevelConfig {
        wall_probability: 0.48,
        tunnel_probability: 0.12,
        teleports: 5,
        absorbs: 4,
        energy: ENERGY_MAX_BASE - 2,
        decoherence_ttl: DECOHERENCE_TTL_BASE + 1,
        entangled_pairs: 11,
    },
    LevelConfig {
        wall_probability: 0.50,
        tunnel_probability: 0.13,
        teleports: 6,
        absorbs: 4,
        energy: ENERGY_MAX_BASE - 3,
        decoherence_ttl: DECOHERENCE_TTL_BASE,
        entangled_pairs: 12,
    },
];

/// Modifiers a difficulty tier applies on top of a level entry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyConfig {
    /// Multiplier applied to the level's wall probability.
    pub wall_multiplier: f64,
    /// Wall probability used when cells around the player are observed.
    pub passive_wall_probability: f64,
    /// Number of opening steps that enjoy the frontier bias.
    pub frontier_steps: u32,
    /// Wall probability for stepping into superposed cells during the opening.
    pub frontier_wall_probability: f64,
    /// Turns added to the level's decoherence lifetime.
    pub decoherence_ttl_bonus: u32,
    /// Manhattan radius around the player where floor never decays.
    pub protection_radius: u32,
    /// Signed adjustment to the reroute charge count.
    pub reroute_charge_bonus: i32,
    /// Signed adjustment to the reroute cooldown.
    pub reroute_cooldown_delta: i32,
    /// Multiplier applied to the level's tunnel probability.
    pub tunnel_multiplier: f64,
}

/// Difficulty tiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Forgiving collapse odds and longer-lived floor.
    Relaxed,
    /// The default tier.
    #[default]
    Standard,
    /// Harsher walls and fewer reroutes.
    Hard,
}

impl Difficulty {
    /// Every tier, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Relaxed, Difficulty::Standard, Difficulty::Hard];

    /// Modifiers for the tier.
    #[must_use]
    pub const fn config(self) -> DifficultyConfig {
        match self {
            Self::Relaxed => DifficultyConfig {
                wall_multiplier: 1.00,
                passive_wall_probability: 0.00,
                frontier_steps: 10,
                frontier_wall_probability: 0.05,
                decoherence_ttl_bonus: 5,
                protection_radius: 2,
                reroute_charge_bonus: 1,
                reroute_cooldown_delta: -2,
                tunnel_multiplier: 1.2,
            },
            Self::Standard => DifficultyConfig {
                wall_multiplier: 1.00,
                passive_wall_probability: 0.20,
                frontier_steps: 5,
                frontier_wall_probability: 0.15,
                decoherence_ttl_bonus: 2,
                protection_radius: 1,
                reroute_charge_bonus: 0,
                reroute_cooldown_delta: 0,
                tunnel_multiplier: 1.3,
            },
            Self::Hard => DifficultyConfig {
                wall_multiplier: 1.15,
                passive_wall_probability: 0.30,
                frontier_steps: 3,
                frontier_wall_probability: 0.20,
                decoherence_ttl_bonus: 0,
                protection_radius: 1,
                reroute_charge_bonus: -1,
                reroute_cooldown_delta: 1,
                tunnel_multiplier: 0.9,
            },
        }
    }

    /// Lowercase display name of the tier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Standard => "standard",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a difficulty name is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown difficulty `{0}` (expected relaxed, standard or hard)")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownDifficulty(value.to_owned()))
    }
}

/// Immutable parameters for one level instance.
///
/// Every probabilistic and economic decision made by the generator and the
/// world reads from this value; nothing is stored globally. Fields are public
/// so designers and tests can adjust individual knobs.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRules {
    /// Size of the maze.
    pub dimensions: GridDimensions,
    /// Random cells seeded as wall-or-superposed before the path is carved.
    pub obstruction_count: u32,
    /// Entangled pairs requested from the generator.
    pub entangled_pairs: u32,
    /// Teleport tiles requested from the generator.
    pub teleports: u32,
    /// Absorber tiles requested from the generator.
    pub absorbs: u32,
    /// Chance that a collapse without override resolves to a wall.
    pub wall_probability: f64,
    /// Wall probability used when cells around the player are observed.
    pub passive_wall_probability: f64,
    /// Manhattan radius observed around the player after each move.
    pub observe_radius: u32,
    /// Number of opening steps that enjoy the frontier bias.
    pub frontier_steps: u32,
    /// Wall probability for stepping into superposed cells during the opening.
    pub frontier_wall_probability: f64,
    /// Chance that a tunnel attempt succeeds.
    pub tunnel_probability: f64,
    /// Energy spent by a successful tunnel.
    pub tunnel_cost: u32,
    /// Energy spent by using a teleport.
    pub teleport_cost: u32,
    /// Manhattan radius affected by a reroute.
    pub reroute_radius: u32,
    /// Wall probability of the re-collapse after a reroute.
    pub reroute_wall_probability: f64,
    /// Energy spent by a reroute.
    pub reroute_cost: u32,
    /// Reroute uses available in the level.
    pub reroute_charges: u32,
    /// Moves a reroute takes to recharge; also the cooldown at level start.
    pub reroute_cooldown: u32,
    /// Starting energy budget.
    pub energy: u32,
    /// Minimum energy required to claim a win.
    pub min_energy_to_win: u32,
    /// Turns an unvisited floor cell survives before decohering.
    pub decoherence_ttl: u32,
    /// Manhattan radius around the player where floor never decays.
    pub protection_radius: u32,
}

impl LevelRules {
    /// Combines a level entry with difficulty modifiers.
    #[must_use]
    pub fn derive(level: &LevelConfig, difficulty: &DifficultyConfig) -> Self {
        Self {
            dimensions: GridDimensions::new(GRID_COLUMNS, GRID_ROWS),
            obstruction_count: 48,
            entangled_pairs: level.entangled_pairs,
            teleports: level.teleports,
            absorbs: level.absorbs,
            wall_probability: (level.wall_probability * difficulty.wall_multiplier).clamp(0.0, 1.0),
            passive_wall_probability: difficulty.passive_wall_probability,
            observe_radius: 1,
            frontier_steps: difficulty.frontier_steps,
            frontier_wall_probability: difficulty.frontier_wall_probability,
            tunnel_probability: (level.tunnel_probability * difficulty.tunnel_multiplier)
                .clamp(0.0, 1.0),
            tunnel_cost: 2,
            teleport_cost: 1,
            reroute_radius: 2,
            reroute_wall_probability: 0.20,
            reroute_cost: 3,
            reroute_charges: REROUTE_CHARGES_BASE.saturating_add_signed(difficulty.reroute_charge_bonus),
            reroute_cooldown: REROUTE_COOLDOWN_BASE
                .saturating_add_signed(difficulty.reroute_cooldown_delta)
                .max(1),
            energy: level.energy,
            min_energy_to_win: 0,
            decoherence_ttl: level.decoherence_ttl + difficulty.decoherence_ttl_bonus,
            protection_radius: difficulty.protection_radius,
        }
    }

    /// Rules for the level at `index` (clamped to the last level).
    #[must_use]
    pub fn for_level(index: usize, difficulty: Difficulty) -> Self {
        let level = &LEVELS[index.min(LEVELS.len() - 1)];
        Self::derive(level, &difficulty.config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_rules_follow_tables() {
        let rules = LevelRules::for_level(1, Difficulty::Standard);

        assert!((rules.wall_probability - 0.40).abs() < 1e-9);
        assert!((rules.tunnel_probability - 0.13).abs() < 1e-9);
        assert!((rules.passive_wall_probability - 0.20).abs() < 1e-9);
        assert_eq!(rules.energy, 24);
        assert_eq!(rules.decoherence_ttl, 16);
        assert_eq!(rules.reroute_charges, 3);
        assert_eq!(rules.reroute_cooldown, 5);
        assert_eq!(rules.entangled_pairs, 8);
    }

    #[test]
    fn difficulty_modifiers_adjust_abilities() {
        let relaxed = LevelRules::for_level(0, Difficulty::Relaxed);
        let hard = LevelRules::for_level(0, Difficulty::Hard);

        assert_eq!(relaxed.reroute_charges, 4);
        assert_eq!(relaxed.reroute_cooldown, 3);
        assert_eq!(relaxed.protection_radius, 2);
        assert_eq!(hard.reroute_charges, 2);
        assert_eq!(hard.reroute_cooldown, 6);
        assert!((hard.wall_probability - 0.35 * 1.15).abs() < 1e-9);
    }

    #[test]
    fn level_index_clamps_to_last_entry() {
        assert_eq!(
            LevelRules::for_level(99, Difficulty::Standard),
            LevelRules::for_level(LEVELS.len() - 1, Difficulty::Standard)
        );
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" relaxed ".parse::<Difficulty>(), Ok(Difficulty::Relaxed));
        assert_eq!(
            "brutal".parse::<Difficulty>(),
            Err(UnknownDifficulty("brutal".to_owned()))
        );
    }
}

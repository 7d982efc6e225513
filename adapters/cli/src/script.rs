//! Compact intent scripts accepted on the command line.

use anyhow::{bail, Result};
use quantum_maze_core::Direction;
use quantum_maze_system_session::Intent;

/// Parses a script such as `"EES Q T E+"` into intents.
///
/// `N`, `E`, `S` and `W` move, `Q` reroutes, `T`, `O` and `A` flip the
/// tunnelling, overlay and arrow preferences, `R` restarts and `+` advances.
/// Letters are case-insensitive; whitespace and commas are ignored.
pub(crate) fn parse_script(script: &str) -> Result<Vec<Intent>> {
    let mut intents = Vec::new();
    for (position, symbol) in script.chars().enumerate() {
        let intent = match symbol.to_ascii_uppercase() {
            'N' => Intent::Move(Direction::North),
            'E' => Intent::Move(Direction::East),
            'S' => Intent::Move(Direction::South),
            'W' => Intent::Move(Direction::West),
            'Q' => Intent::Reroute,
            'T' => Intent::ToggleTunneling,
            'O' => Intent::ToggleEntanglementOverlay,
            'A' => Intent::ToggleExitArrow,
            'R' => Intent::Restart,
            '+' => Intent::Advance,
            ',' => continue,
            other if other.is_whitespace() => continue,
            other => bail!("unknown script symbol {other:?} at position {position}"),
        };
        intents.push(intent);
    }
    Ok(intents)
}

/// Script symbol for an intent, used when echoing a run.
pub(crate) fn symbol(intent: Intent) -> char {
    match intent {
        Intent::Move(Direction::North) => 'N',
        Intent::Move(Direction::East) => 'E',
        Intent::Move(Direction::South) => 'S',
        Intent::Move(Direction::West) => 'W',
        Intent::Reroute => 'Q',
        Intent::ToggleTunneling => 'T',
        Intent::ToggleEntanglementOverlay => 'O',
        Intent::ToggleExitArrow => 'A',
        Intent::Restart => 'R',
        Intent::Advance => '+',
    }
}

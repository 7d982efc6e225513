//! Plain-text snapshot of a level.

use std::fmt::Write as _;

use quantum_maze_core::{CellCoord, EntanglementMode, Tile};
use quantum_maze_world::{query, World};

/// Draws the grid with the player as `@`, followed by a status block.
pub(crate) fn render(world: &World) -> String {
    let dimensions = query::dimensions(world);
    let player = query::player(world);
    let mut output = String::new();

    for row in 0..dimensions.rows() {
        for column in 0..dimensions.columns() {
            let cell = CellCoord::new(column, row);
            let symbol = if cell == player {
                '@'
            } else {
                query::tile_at(world, cell).map_or(' ', glyph)
            };
            output.push(symbol);
        }
        output.push('\n');
    }

    let resources = query::resources(world);
    let toggles = query::toggles(world);
    let _ = writeln!(
        output,
        "energy {} | reroutes {} (cooldown {}) | steps {} | {:?}",
        resources.energy,
        resources.reroute_charges,
        resources.reroute_cooldown,
        query::steps(world),
        query::status(world)
    );
    let _ = writeln!(
        output,
        "tunnelling {}",
        if toggles.tunneling { "on" } else { "off" }
    );

    if toggles.exit_arrow {
        let _ = writeln!(output, "exit: {}", exit_hint(player, query::exit(world)));
    }

    if toggles.entanglement_overlay {
        for pair in query::entangled_pairs(world) {
            let mode = match pair.mode {
                EntanglementMode::Same => "same",
                EntanglementMode::Opposite => "opposite",
            };
            let _ = writeln!(
                output,
                "entangled ({},{}) ~ ({},{}) {mode}",
                pair.first.column(),
                pair.first.row(),
                pair.second.column(),
                pair.second.row()
            );
        }
    }

    output
}

fn glyph(tile: Tile) -> char {
    match tile {
        Tile::Empty => '.',
        Tile::Wall => '#',
        Tile::Superposed => '?',
        Tile::Exit => 'E',
        Tile::Teleport => 'T',
        Tile::Absorb => 'A',
    }
}

fn exit_hint(player: CellCoord, exit: CellCoord) -> String {
    let mut parts = Vec::new();
    if exit.column() > player.column() {
        parts.push(format!("{} east", exit.column() - player.column()));
    } else if exit.column() < player.column() {
        parts.push(format!("{} west", player.column() - exit.column()));
    }
    if exit.row() > player.row() {
        parts.push(format!("{} south", exit.row() - player.row()));
    } else if exit.row() < player.row() {
        parts.push(format!("{} north", player.row() - exit.row()));
    }

    if parts.is_empty() {
        "here".to_owned()
    } else {
        parts.join(", ")
    }
}

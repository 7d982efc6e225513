#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a scripted Quantum Maze run.

mod render;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::{info, LevelFilter};
use quantum_maze_core::{Difficulty, GAME_TITLE, LEVELS};
use quantum_maze_system_session::{Session, SessionConfig};

/// Headless Quantum Maze runner.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Seed for the run's random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// One-based level to start on.
    #[arg(long, default_value_t = 1)]
    level: usize,

    /// Difficulty tier: relaxed, standard or hard.
    #[arg(long, default_value = "standard")]
    difficulty: Difficulty,

    /// Intents to replay: N/E/S/W move, Q reroutes, T/O/A toggle
    /// tunnelling, overlay and arrow, R restarts, + advances.
    #[arg(long, default_value = "")]
    script: String,

    /// Print a snapshot after every intent instead of only at the end.
    #[arg(long, default_value_t = false)]
    every_turn: bool,

    /// Log engine decisions at debug level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// Entry point for the Quantum Maze command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logger(args.verbose);

    let intents = script::parse_script(&args.script).context("invalid --script")?;
    let config = SessionConfig {
        seed: args.seed,
        level: args.level.saturating_sub(1),
        difficulty: args.difficulty,
    };

    let mut events = Vec::new();
    let mut session = Session::new(config, &mut events);
    println!(
        "{GAME_TITLE} | level {}/{} ({}) | seed {}",
        session.level() + 1,
        LEVELS.len(),
        session.difficulty(),
        args.seed
    );

    for intent in intents {
        events.clear();
        let outcome = session.handle(intent, &mut events);
        info!(
            "{} -> {outcome:?} ({} events)",
            script::symbol(intent),
            events.len()
        );
        if args.every_turn {
            println!("{} -> {outcome:?}", script::symbol(intent));
            print!("{}", render::render(session.world()));
        }
    }

    if !args.every_turn {
        print!("{}", render::render(session.world()));
    }
    Ok(())
}

fn init_logger(verbose: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if verbose {
        let _ = builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

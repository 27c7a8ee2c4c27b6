//! Vaultrun - headless harness
//!
//! Runs a scripted input sequence through the simulation, logs movement
//! transitions, then replays the run and checks that both runs end in
//! bit-identical states.
//!
//! Usage:
//!   RUST_LOG=info cargo run -- --ticks 600 --characters 3
//!   cargo run -- --config sim.toml --level yard.toml

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use vaultrun_game::{CharacterId, Level, MovementEvents, MovementListener, PlayerInput, Simulation, SimulationConfig};

#[derive(Debug, Parser)]
#[command(name = "vaultrun", about = "Deterministic movement harness")]
struct Args {
    /// Simulation config (TOML). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level description (TOML). The built-in test arena is used when omitted.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 500)]
    ticks: u64,

    /// Number of characters.
    #[arg(long, default_value_t = 2)]
    characters: usize,

    /// How many ticks to rewind for the rollback check.
    #[arg(long, default_value_t = 30)]
    rollback: u64,
}

/// Logs every movement transition.
struct LogListener;

impl MovementListener for LogListener {
    fn on_movement_events(&mut self, tick: u64, character: CharacterId, events: MovementEvents) {
        log::info!("tick {tick:>5} character {character}: {}", events.names().collect::<Vec<_>>().join(", "));
    }

    fn on_respawn(&mut self, tick: u64, character: CharacterId) {
        log::info!("tick {tick:>5} character {character}: respawned");
    }
}

/// Input for one character on one tick. Each character gets the same
/// pattern, phase shifted.
fn scripted_input(tick: u64, character: usize) -> PlayerInput {
    let t = tick + character as u64 * 37;
    let mut input = PlayerInput::forward();

    // Strafe in alternating directions
    match (t / 40) % 4 {
        1 => input.movement.right = true,
        3 => input.movement.left = true,
        _ => {}
    }

    // Hold jump in bursts
    input.actions.jump = t % 90 < 20;

    // Tap crouch now and then
    input.actions.crouch = t % 150 == 75 || t % 150 == 100;

    // Sweep the mouse back and forth
    let sweep = if (t / 60) % 2 == 0 { 8.0 } else { -8.0 };
    input.mouse_delta = (sweep, 0.0);

    input
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let source = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    SimulationConfig::from_toml_str(&source).with_context(|| format!("load config {}", path.display()))
}

fn load_level(path: Option<&PathBuf>) -> Result<Level> {
    let Some(path) = path else {
        return Ok(Level::test_arena());
    };
    let source = fs::read_to_string(path).with_context(|| format!("read level {}", path.display()))?;
    Level::from_toml_str(&source).with_context(|| format!("load level {}", path.display()))
}

fn build(config: &SimulationConfig, level: &Level, characters: usize) -> Result<Simulation> {
    let mut simulation = Simulation::new(config.clone(), level.clone())?;
    for i in 0..characters {
        simulation.add_character(&format!("runner{}", i + 1));
    }
    Ok(simulation)
}

fn run(simulation: &mut Simulation, ticks: u64) {
    let count = simulation.characters().len();
    for tick in 0..ticks {
        let inputs: Vec<PlayerInput> = (0..count).map(|c| scripted_input(tick, c)).collect();
        simulation.tick(&inputs);
    }
}

fn fingerprint(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    let level = load_level(args.level.as_ref())?;
    log::info!(
        "level '{}' at {} ticks/s, {} characters, {} ticks",
        level.name,
        config.tick_rate,
        args.characters,
        args.ticks
    );

    // First run, with transitions logged
    let mut first = build(&config, &level, args.characters)?;
    first.subscribe(Box::new(LogListener));
    run(&mut first, args.ticks);
    let first_state = first.serialize_state()?;

    for character in first.characters() {
        log::info!(
            "character {} '{}' ends at {} moving {:.2} u/s, {} deaths",
            character.id,
            character.name,
            character.position(),
            character.movement.horizontal_speed(),
            character.deaths
        );
    }

    // Replay from scratch
    let mut replay = build(&config, &level, args.characters)?;
    run(&mut replay, args.ticks);
    let replay_state = replay.serialize_state()?;
    if replay_state != first_state {
        bail!(
            "replay diverged: {:016x} != {:016x}",
            fingerprint(&replay_state),
            fingerprint(&first_state)
        );
    }

    // Rewind and re-run the tail with the same inputs
    let depth = args.rollback.min(config.history_length as u64).min(args.ticks);
    first.rollback_and_resimulate(args.ticks - depth, &[])?;
    let resimulated = first.serialize_state()?;
    if resimulated != first_state {
        bail!(
            "rollback of {depth} ticks diverged: {:016x} != {:016x}",
            fingerprint(&resimulated),
            fingerprint(&first_state)
        );
    }

    println!(
        "ok: {} ticks, {} bytes of state, fingerprint {:016x}, rollback of {depth} ticks identical",
        args.ticks,
        first_state.len(),
        fingerprint(&first_state)
    );
    Ok(())
}

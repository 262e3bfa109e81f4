//! Duel Simulator
//!
//! Runs a scripted match between the two characters of a roster and checks
//! that a replay of the same script lands on the same state hash.
//!
//! Usage: `duel-sim [roster.json]`. Without a path the sample roster is used.

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use duel_core::{
    game::events::SimEventData,
    input::{AttackButtons, Direction, InputFrame},
    replay, RosterConfig, ScriptedTick, TICK_RATE, VERSION,
};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("DUEL_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Duel Core v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let roster = match std::env::args().nth(1) {
        Some(path) => RosterConfig::load(&path).with_context(|| format!("loading roster {path}"))?,
        None => RosterConfig::sample(),
    };

    demo_match(&roster)
}

/// Player one walks in and blocks low; player two jabs, sweeps and throws.
fn demo_script() -> Vec<ScriptedTick> {
    let idle = InputFrame::new();
    let walk = InputFrame::with_direction(Direction::FRONT);
    let guard = InputFrame::with_direction(Direction::BACK | Direction::DOWN);
    let crouch = InputFrame::with_direction(Direction::DOWN);

    let mut script = Vec::new();
    script.extend((0..10).map(|_| ScriptedTick::input(walk, idle)));
    script.push(ScriptedTick::input(idle, InputFrame::with_attack(Direction::empty(), AttackButtons::LIGHT_PUNCH)));
    script.extend((0..20).map(|_| ScriptedTick::contact(idle, idle)));
    script.push(ScriptedTick::input(guard, crouch));
    script.push(ScriptedTick::input(guard, InputFrame::with_attack(Direction::DOWN, AttackButtons::LIGHT_KICK)));
    script.extend((0..30).map(|_| ScriptedTick::contact(guard, crouch)));
    script.push(ScriptedTick::input(
        idle,
        InputFrame::with_attack(Direction::empty(), AttackButtons::LIGHT_PUNCH | AttackButtons::LIGHT_KICK),
    ));
    script.extend((0..40).map(|_| ScriptedTick::contact(idle, idle)));
    script
}

fn demo_match(roster: &RosterConfig) -> Result<()> {
    info!("=== Starting Demo Match ===");

    let script = demo_script();
    info!("Running {} ticks...", script.len());

    let (sim, events) = replay(roster, &script)?;

    for event in &events {
        match &event.data {
            SimEventData::HitResolved { attacker, target, hit_type, damage, remaining_health, known_gap, .. } => {
                info!(
                    tick = event.tick,
                    "{} hit {}: {:?} for {} ({} left)",
                    attacker, target, hit_type, damage, remaining_health
                );
                if *known_gap {
                    warn!(tick = event.tick, "hit took an unmodelled path");
                }
            }
            SimEventData::StateChanged { character, from, to } => {
                info!(tick = event.tick, "{} {} -> {}", character, from, to);
            }
            SimEventData::KnockedOut { character } => {
                info!(tick = event.tick, "{} knocked out", character);
            }
            _ => {}
        }
    }

    // Print final results
    info!("=== Match Results ===");
    for character in sim.characters() {
        info!("{}: {} health, in {}", character.name(), character.health(), character.state_name());
    }
    let hash = sim.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Total events: {}", events.len());

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (again, _) = replay(roster, &script)?;
    let replay_hash = again.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: hashes differ");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

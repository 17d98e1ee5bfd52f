//! Headless BRAWL harness.
//!
//! `brawl-harness [definitions.json] [config.json]` runs one arena fight at a
//! fixed frame rate and logs what the host would see. Without arguments it
//! uses the bundled arena data and the default config. Set `RUST_LOG=debug`
//! for per-hit output.

mod host;

use std::fs;

use anyhow::{Context, Result};
use glam::DVec2;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

use brawl_core::commands::HostCommand;
use brawl_core::config::SimConfig;
use brawl_core::definitions::DefinitionRegistry;
use brawl_core::enums::Faction;
use brawl_core::events::SimEvent;
use brawl_core::state::{EntityView, FrameSnapshot};
use brawl_core::types::{EntityId, Position};
use brawl_sim::SimulationEngine;

use crate::host::ProjectileField;

const BUNDLED_DEFINITIONS: &str = include_str!("../data/arena.json");
const PLAYER_CHARACTER: &str = "BRAWLER";
/// Enemy type and spawn point.
const WAVE: [(&str, f64, f64); 4] = [
    ("zombie", 260.0, 0.0),
    ("zombie", -220.0, 140.0),
    ("skeleton_archer", 0.0, -380.0),
    ("brute", 300.0, 260.0),
];
const MAX_FRAMES: u64 = 60 * 90;
/// The player stops closing in at this distance.
const ENGAGE_DISTANCE: f64 = 45.0;

#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    xp: f64,
    damage_dealt: f64,
    damage_taken: f64,
    projectiles: u32,
}

impl Tally {
    fn record(&mut self, event: &SimEvent, player: EntityId) {
        match event {
            SimEvent::DamageTaken {
                target,
                amount,
                source,
                ..
            } => {
                if *target == player {
                    self.damage_taken += amount;
                } else if *source == Some(player) {
                    self.damage_dealt += amount;
                }
            }
            SimEvent::Died {
                killer: Some(killer),
                xp_value,
                ..
            } if *killer == player => {
                self.kills += 1;
                self.xp += xp_value;
            }
            SimEvent::ProjectileSpawned(_) => self.projectiles += 1,
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let definitions = match args.next() {
        Some(path) => {
            let json = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            DefinitionRegistry::from_json(&json)
                .with_context(|| format!("loading definitions from {path}"))?
        }
        None => DefinitionRegistry::from_json(BUNDLED_DEFINITIONS)
            .context("loading bundled definitions")?,
    };
    let config = match args.next() {
        Some(path) => {
            let json = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            SimConfig::from_json(&json).with_context(|| format!("loading config from {path}"))?
        }
        None => SimConfig::default(),
    };

    info!(
        seed = config.seed,
        frame_ms = config.frame_ms,
        attacks = definitions.attack_count(),
        "starting arena"
    );
    let frame_ms = config.frame_ms;
    let mut engine = SimulationEngine::new(config, definitions);
    let player = engine.spawn_player(PLAYER_CHARACTER, Position::new(0.0, 0.0));
    for (kind, x, y) in WAVE {
        engine.spawn_enemy(kind, Position::new(x, y));
    }

    let mut field = ProjectileField::default();
    let mut tally = Tally::default();
    let mut last = engine.snapshot();

    for _ in 0..MAX_FRAMES {
        let snapshot = engine.frame(frame_ms);
        for event in &snapshot.events {
            tally.record(event, player);
            log_event(event);
            if let SimEvent::ProjectileSpawned(spawn) = event {
                field.launch(spawn.clone());
            }
        }
        engine.queue_commands(field.step(&snapshot, frame_ms));

        let Some(hero) = snapshot.entity(player).filter(|e| e.alive) else {
            info!(frame = snapshot.time.frame, "player fell");
            last = snapshot;
            break;
        };
        if !snapshot
            .entities
            .iter()
            .any(|e| e.alive && e.faction == Faction::Enemy)
        {
            info!(frame = snapshot.time.frame, "arena cleared");
            last = snapshot;
            break;
        }
        engine.queue_command(HostCommand::SetMoveInput {
            entity: player,
            direction: steer(hero, &snapshot),
        });
        last = snapshot;
    }

    info!(
        elapsed_ms = last.time.now_ms,
        kills = tally.kills,
        xp = tally.xp,
        damage_dealt = tally.damage_dealt,
        damage_taken = tally.damage_taken,
        projectiles = tally.projectiles,
        in_flight = field.in_flight(),
        "fight over"
    );
    Ok(())
}

/// Walk toward the nearest live enemy until within striking distance.
fn steer(hero: &EntityView, snapshot: &FrameSnapshot) -> DVec2 {
    snapshot
        .entities
        .iter()
        .filter(|e| e.alive && e.faction == Faction::Enemy)
        .map(|e| (e.position.distance(hero.position), e.position))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .filter(|(distance, _)| *distance > ENGAGE_DISTANCE)
        .map_or(DVec2::ZERO, |(_, target)| target - hero.position)
}

fn log_event(event: &SimEvent) {
    match event {
        SimEvent::Died {
            entity,
            killer,
            xp_value,
        } => info!(%entity, ?killer, xp_value, "died"),
        SimEvent::DamageTaken {
            target,
            amount,
            remaining,
            source,
        } => debug!(%target, amount, remaining, ?source, "hit"),
        SimEvent::StateChanged { entity, from, to } => debug!(%entity, ?from, ?to, "behavior"),
        SimEvent::EffectApplied {
            entity,
            effect_id,
            stacks,
        } => debug!(%entity, %effect_id, stacks, "effect applied"),
        SimEvent::EffectRemoved { entity, effect_id } => {
            debug!(%entity, %effect_id, "effect removed")
        }
        other => trace!(?other, "event"),
    }
}

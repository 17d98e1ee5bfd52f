//! Stand-in for the host's projectile physics: flies spawned projectiles in
//! straight lines and reports hits back as commands.

use glam::DVec2;

use brawl_core::commands::HostCommand;
use brawl_core::events::ProjectileSpawn;
use brawl_core::state::{EntityView, FrameSnapshot};

/// Collision radius of an unscaled projectile, px.
const HIT_RADIUS: f64 = 16.0;

struct Flight {
    spawn: ProjectileSpawn,
    position: DVec2,
    age_ms: f64,
}

#[derive(Default)]
pub struct ProjectileField {
    flights: Vec<Flight>,
}

impl ProjectileField {
    pub fn launch(&mut self, spawn: ProjectileSpawn) {
        self.flights.push(Flight {
            position: spawn.origin,
            spawn,
            age_ms: 0.0,
        });
    }

    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }

    /// Advance every projectile by `delta_ms` and return the hits.
    ///
    /// A projectile stops at the first live opponent it touches. Area
    /// projectiles also hit every opponent within their radius of the impact.
    pub fn step(&mut self, snapshot: &FrameSnapshot, delta_ms: f64) -> Vec<HostCommand> {
        let mut hits = Vec::new();
        self.flights.retain_mut(|flight| {
            flight.age_ms += delta_ms;
            if flight.age_ms > flight.spawn.lifespan_ms {
                return false;
            }
            flight.position += flight.spawn.direction * flight.spawn.speed * delta_ms / 1000.0;

            let opponents = || {
                snapshot
                    .entities
                    .iter()
                    .filter(|e| e.alive && e.faction != flight.spawn.faction)
            };
            let reach = HIT_RADIUS * flight.spawn.scale;
            let Some(struck) = opponents().find(|e| e.position.distance(flight.position) <= reach)
            else {
                return true;
            };

            let radius = flight.spawn.area_radius.unwrap_or(0.0);
            let caught: Vec<&EntityView> = opponents()
                .filter(|e| e.id == struck.id || e.position.distance(flight.position) <= radius)
                .collect();
            for victim in caught {
                hits.push(HostCommand::ProjectileHit {
                    target: victim.id,
                    damage: flight.spawn.damage,
                    source: Some(flight.spawn.shooter),
                    on_hit: flight.spawn.on_hit.clone(),
                    effect_duration_scale: flight.spawn.effect_duration_scale,
                });
            }
            false
        });
        hits
    }
}

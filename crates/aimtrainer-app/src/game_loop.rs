//! Fixed-step headless loop with a scripted shooter standing in for player input.

use anyhow::Result;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use aimtrainer_core::commands::{ShotResult, TrainerCommand};
use aimtrainer_core::constants::DT;
use aimtrainer_core::enums::{HitZoneKind, SessionPhase, TargetState};
use aimtrainer_core::state::SessionSnapshot;
use aimtrainer_sim::hit_zone::{HitZone, TargetTemplate};
use aimtrainer_sim::TrainingEngine;

#[derive(Debug, Clone, Copy)]
pub struct BotSettings {
    /// Chance that a shot connects, 0..=1.
    pub accuracy: f64,
    /// Share of connecting shots that land on the head, 0..=1.
    pub headshot_rate: f64,
    /// Seconds between shots.
    pub fire_interval: f64,
}

/// Resolves shots the way a ray caster would, with seeded imperfection.
pub struct Bot {
    rng: ChaCha8Rng,
    settings: BotSettings,
    cooldown: f64,
    zones: Vec<HitZone>,
}

impl Bot {
    pub fn new(seed: u64, settings: BotSettings, template: Option<&TargetTemplate>) -> Self {
        let settings = BotSettings {
            accuracy: settings.accuracy.clamp(0.0, 1.0),
            headshot_rate: settings.headshot_rate.clamp(0.0, 1.0),
            fire_interval: settings.fire_interval.max(DT),
        };
        Self {
            // Separate stream so the bot never perturbs target placement.
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            settings,
            cooldown: 0.0,
            zones: template.map(|t| t.hit_zones.clone()).unwrap_or_default(),
        }
    }

    /// Shot to fire this frame, if any.
    pub fn next_shot(&mut self, snapshot: &SessionSnapshot, dt: f64) -> Option<ShotResult> {
        if snapshot.phase != SessionPhase::Active {
            return None;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return None;
        }
        let target = snapshot
            .targets
            .iter()
            .find(|t| t.state == TargetState::Active)?;
        self.cooldown = self.settings.fire_interval;

        if !self.rng.gen_bool(self.settings.accuracy) {
            return Some(ShotResult::Miss);
        }
        let zone = if self.rng.gen_bool(self.settings.headshot_rate) {
            HitZoneKind::Head
        } else {
            HitZoneKind::Body
        };
        let point = match self.zones.iter().find(|z| z.kind() == zone) {
            Some(hit_zone) => {
                let spread = hit_zone.radius * 0.5;
                let jitter = Vec3::new(
                    self.rng.gen_range(-1.0..=1.0),
                    self.rng.gen_range(-1.0..=1.0),
                    0.0,
                ) * spread;
                hit_zone.world_center(target.position) + jitter
            }
            None => target.position,
        };
        Some(ShotResult::Hit {
            target: target.id,
            zone,
            point,
        })
    }
}

/// Run one session to its end or until `max_ticks`, returning the last snapshot.
///
/// With `trace` set every snapshot goes to stdout as one JSON line.
pub fn run(
    engine: &mut TrainingEngine,
    bot: &mut Bot,
    start: TrainerCommand,
    max_ticks: u64,
    trace: bool,
) -> Result<SessionSnapshot> {
    engine.queue_command(start);
    let mut last = engine.snapshot();

    for tick in 0..max_ticks {
        if let Some(shot) = bot.next_shot(&last, DT) {
            engine.queue_command(TrainerCommand::Fire { shot });
        }
        last = engine.tick(DT);
        if trace {
            println!("{}", serde_json::to_string(&last)?);
        }
        if last.phase == SessionPhase::Ended {
            tracing::info!(tick, "session finished");
            return Ok(last);
        }
    }

    tracing::warn!(max_ticks, phase = ?last.phase, "tick budget exhausted, ending session");
    engine.end_session();
    Ok(engine.snapshot())
}

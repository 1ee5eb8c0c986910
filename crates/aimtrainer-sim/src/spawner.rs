//! Target spawner: owns the target pool and decides when and where targets appear.
//!
//! Continuous mode spawns one target every `spawn_interval` while below
//! `max_active_targets`. Elimination mode spawns its whole set in one burst
//! on session start and then stays quiet until reconfigured.

use glam::{Quat, Vec3};
use rand_chacha::ChaCha8Rng;

use aimtrainer_core::config::{ModeConfiguration, SpawnerSettings};
use aimtrainer_core::constants::MIN_OBSERVER_DISTANCE;
use aimtrainer_core::error::ConfigError;
use aimtrainer_core::events::GameEvent;
use aimtrainer_core::state::TargetView;
use aimtrainer_core::types::TargetId;

use crate::event_bus::EventBus;
use crate::hit_zone::TargetTemplate;
use crate::pool::ObjectPool;
use crate::spawn_zone::{pick_weighted, symmetric, SpawnZone, SpawnZoneId};
use crate::target::{SpawnContext, Target};

#[derive(Debug, Clone, Copy)]
struct EliminationPlan {
    count: u32,
    strafing: bool,
    /// Place targets on the fixed spawn points before sampling.
    use_fixed_points: bool,
    spawned: bool,
}

/// Per-target overrides pushed by a standard (non-elimination) mode.
#[derive(Debug, Clone, Copy)]
struct TargetOverrides {
    strafing: bool,
    /// `None` = targets never time out.
    lifetime: Option<f64>,
}

pub struct TargetSpawner {
    settings: SpawnerSettings,
    template: Option<TargetTemplate>,
    pool: Option<ObjectPool<Target>>,
    zones: Vec<(SpawnZoneId, SpawnZone)>,
    next_zone_id: u32,
    fixed_spawn_points: Vec<Vec3>,
    observer: Option<Vec3>,
    spawning: bool,
    paused: bool,
    /// Seconds until the next continuous spawn is allowed.
    spawn_cooldown: f64,
    elimination: Option<EliminationPlan>,
    mode: Option<ModeConfiguration>,
    overrides: Option<TargetOverrides>,
}

impl TargetSpawner {
    /// Create an uninitialized spawner.
    pub fn new(settings: SpawnerSettings) -> Self {
        Self {
            settings,
            template: None,
            pool: None,
            zones: Vec::new(),
            next_zone_id: 0,
            fixed_spawn_points: Vec::new(),
            observer: None,
            spawning: false,
            paused: false,
            spawn_cooldown: 0.0,
            elimination: None,
            mode: None,
            overrides: None,
        }
    }

    /// Build the pool from `template`. On error nothing changes.
    pub fn initialize(&mut self, template: TargetTemplate) -> Result<(), ConfigError> {
        let behavior = match template.behavior() {
            Ok(behavior) => behavior.clone(),
            Err(err) => {
                tracing::error!(%err, "spawner initialization failed");
                return Err(err);
            }
        };
        self.pool = Some(ObjectPool::with_capacity(
            Target::new(behavior),
            self.settings.pool_size,
        ));
        tracing::debug!(template = %template.name, pool_size = self.settings.pool_size, "target pool built");
        self.template = Some(template);
        Ok(())
    }

    /// Whether a template and pool are in place.
    pub fn is_initialized(&self) -> bool {
        self.pool.is_some()
    }

    // --- Zones and placement inputs ---

    /// Add a weighted zone for continuous placement.
    pub fn register_spawn_zone(&mut self, zone: SpawnZone) -> SpawnZoneId {
        let id = SpawnZoneId(self.next_zone_id);
        self.next_zone_id += 1;
        self.zones.push((id, zone));
        id
    }

    /// Remove a zone. `false` for an unknown id.
    pub fn unregister_spawn_zone(&mut self, id: SpawnZoneId) -> bool {
        let before = self.zones.len();
        self.zones.retain(|(zid, _)| *zid != id);
        self.zones.len() != before
    }

    /// Number of registered spawn zones.
    pub fn spawn_zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Points used, in order, for elimination placement.
    pub fn set_fixed_spawn_points(&mut self, points: Vec<Vec3>) {
        self.fixed_spawn_points = points;
    }

    /// Point targets face and keep their distance from.
    pub fn set_observer_position(&mut self, observer: Option<Vec3>) {
        self.observer = observer;
    }

    // --- Settings ---

    /// Seconds between continuous spawns. Non-positive values are ignored.
    pub fn set_spawn_interval(&mut self, seconds: f64) {
        if seconds.is_nan() || seconds <= 0.0 {
            tracing::warn!(seconds, "ignoring non-positive spawn interval");
            return;
        }
        self.settings.spawn_interval = seconds;
    }

    /// Cap on simultaneously leased targets.
    pub fn set_max_active_targets(&mut self, count: usize) {
        self.settings.max_active_targets = count;
    }

    /// Current spawner settings, including mode overrides.
    pub fn settings(&self) -> &SpawnerSettings {
        &self.settings
    }

    // --- Mode configuration ---

    /// Switch to one-shot elimination spawning for the next session start.
    pub fn configure_for_elimination(&mut self, count: u32, strafing: bool) {
        if count == 0 {
            tracing::warn!("elimination target count of 0 clamped to 1");
        }
        self.elimination = Some(EliminationPlan {
            count: count.max(1),
            strafing,
            use_fixed_points: true,
            spawned: false,
        });
        self.overrides = None;
        self.mode = None;
    }

    /// Apply a mode preset. Elimination modes plan a burst instead.
    pub fn configure_with_mode(&mut self, config: &ModeConfiguration) {
        if config.is_elimination_mode() {
            self.configure_for_elimination(config.target_count, config.targets_strafe);
            if let Some(plan) = self.elimination.as_mut() {
                plan.use_fixed_points = config.use_fixed_spawn_points;
            }
        } else {
            self.elimination = None;
            self.set_spawn_interval(config.spawn_interval);
            self.settings.max_active_targets = config.max_active_targets;
            self.overrides = Some(TargetOverrides {
                strafing: config.targets_strafe,
                lifetime: config.targets_have_lifetime.then_some(config.target_lifetime),
            });
        }
        self.mode = Some(config.clone());
    }

    /// Drop elimination and mode overrides.
    pub fn reset_to_standard_mode(&mut self) {
        self.elimination = None;
        self.mode = None;
        self.overrides = None;
    }

    /// Whether an elimination burst is configured.
    pub fn is_elimination_mode(&self) -> bool {
        self.elimination.is_some()
    }

    /// Mode applied by the last `configure_with_mode`.
    pub fn current_mode(&self) -> Option<&ModeConfiguration> {
        self.mode.as_ref()
    }

    /// Whether continuous spawning is running and unpaused.
    pub fn is_spawning(&self) -> bool {
        self.spawning && !self.paused
    }

    // --- Session lifecycle ---

    /// React to a session lifecycle notification.
    pub fn handle_session_event(
        &mut self,
        event: &GameEvent,
        rng: &mut ChaCha8Rng,
        bus: &mut EventBus,
        now: f64,
    ) {
        match event {
            GameEvent::SessionStart => self.start_spawning(rng, bus, now),
            GameEvent::SessionEnd => self.stop_spawning(bus, now),
            GameEvent::SessionPause => self.paused = true,
            GameEvent::SessionResume => self.paused = false,
            _ => {}
        }
    }

    fn start_spawning(&mut self, rng: &mut ChaCha8Rng, bus: &mut EventBus, now: f64) {
        self.paused = false;
        self.spawn_cooldown = 0.0;
        match self.elimination {
            Some(plan) if !plan.spawned => {
                self.spawn_elimination_burst(plan, rng, bus, now);
                self.elimination = Some(EliminationPlan {
                    spawned: true,
                    ..plan
                });
                self.spawning = false;
            }
            Some(_) => self.spawning = false,
            None => self.spawning = true,
        }
    }

    fn stop_spawning(&mut self, bus: &mut EventBus, now: f64) {
        self.spawning = false;
        self.paused = false;
        if let Some(plan) = self.elimination.as_mut() {
            plan.spawned = false;
        }
        if let Some(pool) = self.pool.as_mut() {
            pool.release_all(&mut SpawnContext { bus, now });
        }
    }

    // --- Per tick ---

    /// Tick live targets, recycle the ones that asked to leave, then run
    /// the continuous spawn clock.
    pub fn tick(&mut self, dt: f64, now: f64, rng: &mut ChaCha8Rng, bus: &mut EventBus) {
        let Some(pool) = self.pool.as_mut() else {
            return;
        };

        let mut finished = Vec::new();
        for id in pool.active_ids() {
            if let Some(target) = pool.get_mut(id) {
                if target.tick(dt, rng, bus) {
                    finished.push(id);
                }
            }
        }
        for id in finished {
            pool.release(id, &mut SpawnContext { bus: &mut *bus, now });
        }

        if !self.is_spawning() {
            return;
        }
        self.spawn_cooldown -= dt;
        if self.spawn_cooldown <= 0.0 && self.active_count() < self.settings.max_active_targets {
            self.spawn_target(rng, bus, now);
            self.spawn_cooldown = self.settings.spawn_interval;
        }
    }

    /// Spawn one continuous-mode target.
    pub fn spawn_target(&mut self, rng: &mut ChaCha8Rng, bus: &mut EventBus, now: f64) -> Option<TargetId> {
        let (position, bounds) = match pick_weighted(self.zones.iter().map(|(_, z)| z), rng) {
            Some(i) => {
                let zone = &self.zones[i].1;
                (zone.random_point(rng), Some(zone.bounds()))
            }
            None => (self.default_spawn_position(rng), None),
        };
        let rotation = self.spawn_rotation(position);
        let observer = self.observer;
        let overrides = self.overrides;

        let pool = self.pool.as_mut()?;
        let id = pool.acquire(&mut SpawnContext { bus, now });
        let target = pool.get_mut(id)?;
        target.place(position, rotation);
        if let Some(bounds) = bounds {
            target.set_strafe_bounds(bounds);
        }
        if let Some(overrides) = overrides {
            target.set_strafing_override(overrides.strafing);
            match overrides.lifetime {
                Some(seconds) => target.set_lifetime(seconds),
                None => target.set_infinite_lifetime(true),
            }
        }
        target.initialize_strafe(observer, rng);
        tracing::debug!(id = %id, ?position, zoned = bounds.is_some(), "target spawned");
        Some(id)
    }

    fn spawn_elimination_burst(
        &mut self,
        plan: EliminationPlan,
        rng: &mut ChaCha8Rng,
        bus: &mut EventBus,
        now: f64,
    ) {
        let count = plan.count as usize;
        let strafing = plan.strafing;
        let fixed_points = if plan.use_fixed_points {
            self.fixed_spawn_points.clone()
        } else {
            Vec::new()
        };
        let Some(pool) = self.pool.as_mut() else {
            tracing::warn!("elimination burst skipped: spawner not initialized");
            return;
        };
        // Grow up front so the burst never evicts its own targets.
        pool.ensure_capacity(count);

        for i in 0..count {
            let position = match fixed_points.get(i) {
                Some(&point) => point,
                None => self.default_spawn_position(rng),
            };
            let rotation = self.spawn_rotation(position);
            let observer = self.observer;
            let Some(pool) = self.pool.as_mut() else {
                return;
            };
            let id = pool.acquire(&mut SpawnContext { bus: &mut *bus, now });
            if let Some(target) = pool.get_mut(id) {
                target.place(position, rotation);
                target.set_infinite_lifetime(true);
                target.set_strafing_override(strafing);
                if strafing {
                    target.initialize_strafe(observer, rng);
                }
            }
        }
        tracing::info!(
            count,
            fixed = count.min(fixed_points.len()),
            "elimination targets spawned"
        );
    }

    /// Random point in the fallback box, pulled into the allowed distance band
    /// around the observer.
    fn default_spawn_position(&self, rng: &mut ChaCha8Rng) -> Vec3 {
        let half = self.settings.spawn_area_size.abs() * 0.5;
        let center = self.settings.spawn_area_center;
        let point = Vec3::new(
            center.x + symmetric(rng, half.x),
            center.y,
            center.z + symmetric(rng, half.z),
        );

        let Some(observer) = self.observer else {
            return point;
        };
        let offset = point - observer;
        let distance = offset.length();
        let direction = if distance > MIN_OBSERVER_DISTANCE {
            offset / distance
        } else {
            Vec3::Z
        };
        let clamped = distance
            .max(self.settings.min_spawn_distance)
            .min(self.settings.max_spawn_distance);
        if clamped == distance {
            point
        } else {
            observer + direction * clamped
        }
    }

    /// Yaw that points the target's +Z away from the observer, so its front faces them.
    fn spawn_rotation(&self, position: Vec3) -> Quat {
        let Some(observer) = self.observer else {
            return Quat::IDENTITY;
        };
        let mut away = position - observer;
        away.y = 0.0;
        if away.length() > MIN_OBSERVER_DISTANCE {
            Quat::from_rotation_y(away.x.atan2(away.z))
        } else {
            Quat::IDENTITY
        }
    }

    // --- Targets ---

    /// Put a target back in the pool. Stale handles are ignored.
    pub fn return_target(&mut self, id: TargetId, bus: &mut EventBus, now: f64) -> bool {
        match self.pool.as_mut() {
            Some(pool) => pool.release(id, &mut SpawnContext { bus, now }),
            None => false,
        }
    }

    /// Look up a live lease.
    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.pool.as_ref()?.get(id)
    }

    /// Mutable lookup of a live lease.
    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut Target> {
        self.pool.as_mut()?.get_mut(id)
    }

    /// Number of leased targets.
    pub fn active_count(&self) -> usize {
        self.pool.as_ref().map_or(0, |p| p.active_count())
    }

    /// Leased target handles in acquisition order.
    pub fn active_ids(&self) -> Vec<TargetId> {
        self.pool.as_ref().map_or_else(Vec::new, |p| p.active_ids())
    }

    /// Snapshot view of every leased target.
    pub fn views(&self) -> Vec<TargetView> {
        self.pool.as_ref().map_or_else(Vec::new, |p| {
            p.iter_active().map(|(id, t)| t.view(id)).collect()
        })
    }

    /// The backing pool, once initialized.
    pub fn pool(&self) -> Option<&ObjectPool<Target>> {
        self.pool.as_ref()
    }

    /// The template the pool was built from.
    pub fn template(&self) -> Option<&TargetTemplate> {
        self.template.as_ref()
    }
}

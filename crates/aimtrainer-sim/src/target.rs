//! Target entity: health, lifetime, and strafing for one pooled instance.
//!
//! `Inactive -> Active -> (Hit | TimedOut) -> Inactive`. A target never
//! returns itself to the pool; `tick` and `apply_hit` report a return
//! request and the spawner acts on it.

use glam::{Quat, Vec3};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use aimtrainer_core::config::TargetConfig;
use aimtrainer_core::constants::{DIRECTION_CHANGE_JITTER, MIN_OBSERVER_DISTANCE, STRAFE_BOUNDS_MARGIN};
use aimtrainer_core::enums::TargetState;
use aimtrainer_core::events::GameEvent;
use aimtrainer_core::state::TargetView;
use aimtrainer_core::stats::Statistics;
use aimtrainer_core::types::{StrafeBounds, TargetId};

use crate::event_bus::EventBus;
use crate::pool::Poolable;

/// Context threaded through pool hooks.
pub struct SpawnContext<'a> {
    pub bus: &'a mut EventBus,
    /// Scaled session clock, used as the spawn timestamp.
    pub now: f64,
}

/// Result of a hit on a live target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    /// This hit registered the kill.
    pub killed: bool,
    /// Kill count after this hit.
    pub targets_hit: u32,
    /// The target wants to go back to the pool now.
    pub despawn_requested: bool,
}

#[derive(Debug, Clone)]
pub struct Target {
    config: TargetConfig,
    id: Option<TargetId>,
    state: TargetState,
    position: Vec3,
    rotation: Quat,
    health: i32,
    spawn_time: f64,
    remaining_lifetime: f64,
    infinite_lifetime: bool,
    has_registered_hit: bool,
    /// Countdown to the pool return after a kill, when a despawn delay is set.
    despawn_countdown: Option<f64>,

    // --- Strafing ---
    strafing_override: Option<bool>,
    spawn_position: Vec3,
    strafe_axis: Vec3,
    strafe_direction: i8,
    strafe_offset: f32,
    strafe_bounds: Option<StrafeBounds>,
    direction_change_timer: f64,
}

impl Target {
    /// Create a pooled target in the inactive state.
    pub fn new(config: TargetConfig) -> Self {
        Self {
            remaining_lifetime: config.lifetime,
            health: config.max_health,
            config,
            id: None,
            state: TargetState::Inactive,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            spawn_time: 0.0,
            infinite_lifetime: false,
            has_registered_hit: false,
            despawn_countdown: None,
            strafing_override: None,
            spawn_position: Vec3::ZERO,
            strafe_axis: Vec3::X,
            strafe_direction: 1,
            strafe_offset: 0.0,
            strafe_bounds: None,
            direction_change_timer: 0.0,
        }
    }

    /// Advance one tick. Returns `true` when the target should go back to the pool.
    pub fn tick(&mut self, dt: f64, rng: &mut ChaCha8Rng, bus: &mut EventBus) -> bool {
        if self.state == TargetState::Hit {
            return match self.despawn_countdown.as_mut() {
                Some(remaining) => {
                    *remaining -= dt;
                    *remaining <= 0.0
                }
                None => false,
            };
        }
        if self.state != TargetState::Active {
            return false;
        }

        if !self.infinite_lifetime {
            self.remaining_lifetime -= dt;
            if self.remaining_lifetime <= 0.0 && !self.has_registered_hit {
                self.state = TargetState::TimedOut;
                if let Some(target) = self.id {
                    bus.emit(GameEvent::TargetMissed { target });
                }
                return true;
            }
        }

        if self.is_strafing() {
            self.update_strafe(dt, rng);
        }
        false
    }

    fn update_strafe(&mut self, dt: f64, rng: &mut ChaCha8Rng) {
        self.direction_change_timer -= dt;
        if self.direction_change_timer <= 0.0 {
            if rng.gen::<f64>() < 0.5 + self.config.direction_change_randomness {
                self.strafe_direction = -self.strafe_direction;
            }
            let jitter = rng.gen_range(-DIRECTION_CHANGE_JITTER..=DIRECTION_CHANGE_JITTER);
            self.direction_change_timer = (self.config.direction_change_interval + jitter).max(0.0);
        }

        self.strafe_offset += self.config.strafe_speed * self.strafe_direction as f32 * dt as f32;

        let (lo, hi) = match self.strafe_bounds {
            Some(bounds) => {
                let inset = bounds.shrunk(STRAFE_BOUNDS_MARGIN);
                // A spawn inside the edge margin strafes along the nearest inset line.
                if !inset.contains(self.spawn_position) {
                    self.spawn_position = inset.clamp(self.spawn_position);
                }
                inset.offset_range(self.spawn_position, self.strafe_axis)
            }
            None => {
                let d = self.config.strafe_distance.abs();
                (-d, d)
            }
        };
        if self.strafe_offset > hi {
            self.strafe_offset = hi;
            self.strafe_direction = -1;
        } else if self.strafe_offset < lo {
            self.strafe_offset = lo;
            self.strafe_direction = 1;
        }

        let mut position = self.spawn_position + self.strafe_axis * self.strafe_offset;
        position.y = self.spawn_position.y;
        self.position = position;
    }

    /// Apply one shot. `None` if the target isn't live.
    ///
    /// Statistics are updated before `TargetHit` goes out, and the returned
    /// kill count lets the caller decide on session completion directly.
    pub fn apply_hit(
        &mut self,
        is_headshot: bool,
        now: f64,
        stats: &mut Statistics,
        bus: &mut EventBus,
    ) -> Option<HitOutcome> {
        if self.state != TargetState::Active {
            return None;
        }

        let damage = if is_headshot {
            self.config.headshot_damage
        } else {
            self.config.bodyshot_damage
        };
        self.health -= damage;

        let mut killed = false;
        if self.health <= 0 && !self.has_registered_hit {
            self.has_registered_hit = true;
            killed = true;
            stats.register_target_hit(now - self.spawn_time);
        }

        if let Some(target) = self.id {
            bus.emit(GameEvent::TargetHit { target, is_headshot });
        }

        let mut despawn_requested = false;
        if killed && self.config.despawn_on_hit {
            self.state = TargetState::Hit;
            if self.config.despawn_delay > 0.0 {
                self.despawn_countdown = Some(self.config.despawn_delay);
            } else {
                despawn_requested = true;
            }
        }

        Some(HitOutcome {
            killed,
            targets_hit: stats.targets_hit,
            despawn_requested,
        })
    }

    /// Set up strafing from the current position. Call after placement,
    /// before the first tick.
    pub fn initialize_strafe(&mut self, observer: Option<Vec3>, rng: &mut ChaCha8Rng) {
        self.spawn_position = self.position;
        self.strafe_offset = 0.0;
        self.strafe_axis = observer
            .and_then(|observer| {
                let mut to_observer = observer - self.position;
                to_observer.y = 0.0;
                (to_observer.length() > MIN_OBSERVER_DISTANCE)
                    .then(|| Vec3::Y.cross(to_observer.normalize()).normalize())
            })
            .unwrap_or(Vec3::X);
        self.strafe_direction = if rng.gen_bool(0.5) { 1 } else { -1 };
        self.direction_change_timer = self.config.direction_change_interval;
    }

    // --- Runtime configuration ---

    /// Disable or re-enable the lifetime countdown.
    pub fn set_infinite_lifetime(&mut self, infinite: bool) {
        self.infinite_lifetime = infinite;
        if infinite {
            self.remaining_lifetime = f64::INFINITY;
        }
    }

    /// Lifetime for the current lease only; the next spawn uses the template's.
    pub fn set_lifetime(&mut self, seconds: f64) {
        self.infinite_lifetime = false;
        self.remaining_lifetime = seconds;
    }

    /// Override the template's strafing flag until the next spawn.
    pub fn set_strafing_override(&mut self, enabled: bool) {
        self.strafing_override = Some(enabled);
    }

    /// Fall back to the config strafing flag.
    pub fn clear_strafing_override(&mut self) {
        self.strafing_override = None;
    }

    /// Confine strafing to a rectangle.
    pub fn set_strafe_bounds(&mut self, bounds: StrafeBounds) {
        self.strafe_bounds = Some(bounds);
    }

    /// Place the target. Only meaningful before `initialize_strafe`.
    pub fn place(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.spawn_position = position;
        self.rotation = rotation;
    }

    // --- Queries ---

    /// Handle of the current lease.
    pub fn id(&self) -> Option<TargetId> {
        self.id
    }

    /// Get the lifecycle state.
    pub fn state(&self) -> TargetState {
        self.state
    }

    /// Whether the target can still be hit.
    pub fn is_active(&self) -> bool {
        self.state == TargetState::Active
    }

    /// Current world position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current world rotation.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Position strafing oscillates around.
    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    /// Remaining health.
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Whether this lease already counted a kill.
    pub fn has_registered_hit(&self) -> bool {
        self.has_registered_hit
    }

    /// Whether the lifetime countdown is disabled.
    pub fn has_infinite_lifetime(&self) -> bool {
        self.infinite_lifetime
    }

    /// Seconds until timeout.
    pub fn remaining_lifetime(&self) -> f64 {
        self.remaining_lifetime
    }

    /// Simulation time of the last spawn.
    pub fn spawn_time(&self) -> f64 {
        self.spawn_time
    }

    /// Whether the target moves this lease.
    pub fn is_strafing(&self) -> bool {
        self.strafing_override.unwrap_or(self.config.enable_strafing)
    }

    /// Unit axis the target strafes along.
    pub fn strafe_axis(&self) -> Vec3 {
        self.strafe_axis
    }

    /// Current strafe direction, -1 or 1.
    pub fn strafe_direction(&self) -> i8 {
        self.strafe_direction
    }

    /// Signed offset from the spawn position along the axis.
    pub fn strafe_offset(&self) -> f32 {
        self.strafe_offset
    }

    /// Rectangle confining the strafe, if any.
    pub fn strafe_bounds(&self) -> Option<StrafeBounds> {
        self.strafe_bounds
    }

    /// Get the target config.
    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    /// Snapshot view under the given handle.
    pub fn view(&self, id: TargetId) -> TargetView {
        TargetView {
            id,
            state: self.state,
            position: self.position,
            rotation: self.rotation,
            health: self.health,
            max_health: self.config.max_health,
            strafe_direction: self.strafe_direction,
        }
    }
}

impl Poolable<SpawnContext<'_>> for Target {
    fn on_spawn(&mut self, id: TargetId, ctx: &mut SpawnContext<'_>) {
        self.id = Some(id);
        self.state = TargetState::Active;
        self.health = self.config.max_health;
        self.spawn_time = ctx.now;
        self.remaining_lifetime = self.config.lifetime;
        self.infinite_lifetime = false;
        self.has_registered_hit = false;
        self.despawn_countdown = None;
        self.strafing_override = None;
        self.strafe_bounds = None;
        self.strafe_axis = Vec3::X;
        self.strafe_offset = 0.0;
        ctx.bus.emit(GameEvent::TargetSpawned { target: id });
    }

    fn on_despawn(&mut self, id: TargetId, ctx: &mut SpawnContext<'_>) {
        self.state = TargetState::Inactive;
        self.despawn_countdown = None;
        ctx.bus.emit(GameEvent::TargetDespawned { target: id });
    }
}

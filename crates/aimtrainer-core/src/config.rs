//! Configuration values handed to the engine by the settings store.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial JSON
//! document only overrides the keys it names.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{TimerType, TrainingMode};
use crate::error::ConfigError;

/// Session timing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Whole seconds on the pre-session countdown.
    pub countdown_seconds: u32,
    /// Timed-mode session length (seconds).
    pub session_duration: f64,
    /// Kills required to finish an elimination session.
    pub elimination_target_count: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            countdown_seconds: COUNTDOWN_SECONDS,
            session_duration: DEFAULT_SESSION_DURATION,
            elimination_target_count: DEFAULT_ELIMINATION_TARGET_COUNT,
        }
    }
}

/// Spawner tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerSettings {
    pub pool_size: usize,
    pub spawn_interval: f64,
    pub max_active_targets: usize,
    /// Center of the fallback spawn box used when no zones are registered.
    pub spawn_area_center: Vec3,
    /// Full size of the fallback spawn box.
    pub spawn_area_size: Vec3,
    pub min_spawn_distance: f32,
    pub max_spawn_distance: f32,
}

impl Default for SpawnerSettings {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            max_active_targets: DEFAULT_MAX_ACTIVE_TARGETS,
            spawn_area_center: Vec3::ZERO,
            spawn_area_size: Vec3::new(10.0, 3.0, 10.0),
            min_spawn_distance: DEFAULT_MIN_SPAWN_DISTANCE,
            max_spawn_distance: DEFAULT_MAX_SPAWN_DISTANCE,
        }
    }
}

/// Per-target behavior baked into a target template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Seconds before an unkilled target counts as missed.
    pub lifetime: f64,
    pub despawn_on_hit: bool,
    /// Seconds a killed target lingers before returning to the pool. 0 = immediately.
    pub despawn_delay: f64,
    pub max_health: i32,
    pub headshot_damage: i32,
    pub bodyshot_damage: i32,
    pub enable_strafing: bool,
    pub strafe_speed: f32,
    pub strafe_distance: f32,
    pub direction_change_interval: f64,
    pub direction_change_randomness: f64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            lifetime: DEFAULT_TARGET_LIFETIME,
            despawn_on_hit: true,
            despawn_delay: 0.0,
            max_health: DEFAULT_MAX_HEALTH,
            headshot_damage: DEFAULT_HEADSHOT_DAMAGE,
            bodyshot_damage: DEFAULT_BODYSHOT_DAMAGE,
            enable_strafing: true,
            strafe_speed: DEFAULT_STRAFE_SPEED,
            strafe_distance: DEFAULT_STRAFE_DISTANCE,
            direction_change_interval: DEFAULT_DIRECTION_CHANGE_INTERVAL,
            direction_change_randomness: DEFAULT_DIRECTION_CHANGE_RANDOMNESS,
        }
    }
}

/// A weighted spawn region as stored in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnZoneConfig {
    pub center: Vec3,
    pub size: Vec3,
    pub weight: f32,
    /// Fixed y coordinate of every point sampled from this zone.
    pub spawn_height: f32,
}

impl Default for SpawnZoneConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec3::new(4.0, 2.0, 4.0),
            weight: 1.0,
            spawn_height: 0.0,
        }
    }
}

/// Defines how one training mode behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfiguration {
    pub mode: TrainingMode,
    pub display_name: String,
    pub description: String,
    pub timer_type: TimerType,
    pub default_duration: f64,
    pub use_fixed_spawn_points: bool,
    pub target_count: u32,
    pub spawn_interval: f64,
    pub max_active_targets: usize,
    pub targets_strafe: bool,
    pub targets_have_lifetime: bool,
    pub target_lifetime: f64,
    /// End when every target is eliminated.
    pub end_on_all_targets_killed: bool,
}

impl Default for ModeConfiguration {
    fn default() -> Self {
        Self {
            mode: TrainingMode::Flick,
            display_name: String::new(),
            description: String::new(),
            timer_type: TimerType::Countdown,
            default_duration: DEFAULT_SESSION_DURATION,
            use_fixed_spawn_points: false,
            target_count: 10,
            spawn_interval: DEFAULT_SPAWN_INTERVAL,
            max_active_targets: DEFAULT_MAX_ACTIVE_TARGETS,
            targets_strafe: true,
            targets_have_lifetime: true,
            target_lifetime: DEFAULT_TARGET_LIFETIME,
            end_on_all_targets_killed: false,
        }
    }
}

impl ModeConfiguration {
    /// Count-up timer that ends when every target is down.
    pub fn is_elimination_mode(&self) -> bool {
        self.timer_type == TimerType::Countup && self.end_on_all_targets_killed
    }

    /// Built-in configuration for each menu entry.
    pub fn preset(mode: TrainingMode) -> Self {
        let base = Self {
            mode,
            ..Self::default()
        };
        match mode {
            TrainingMode::Flick => Self {
                display_name: "Flick".into(),
                description: "Static targets, one at a time".into(),
                targets_strafe: false,
                ..base
            },
            TrainingMode::Tracking => Self {
                display_name: "Tracking".into(),
                description: "Strafing targets that stay up longer".into(),
                targets_strafe: true,
                target_lifetime: 5.0,
                ..base
            },
            TrainingMode::Speed => Self {
                display_name: "Speed".into(),
                description: "Short-lived targets in quick succession".into(),
                spawn_interval: 0.5,
                max_active_targets: 3,
                targets_strafe: false,
                target_lifetime: 1.5,
                ..base
            },
            TrainingMode::Headshot => Self {
                display_name: "Headshot".into(),
                description: "Strafing targets; aim for the head".into(),
                targets_strafe: true,
                ..base
            },
            TrainingMode::Elimination => Self {
                display_name: "Elimination".into(),
                description: "Clear every target as fast as possible".into(),
                timer_type: TimerType::Countup,
                use_fixed_spawn_points: true,
                target_count: DEFAULT_ELIMINATION_TARGET_COUNT,
                targets_strafe: false,
                targets_have_lifetime: false,
                end_on_all_targets_killed: true,
                ..base
            },
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// RNG seed. Same seed + same inputs = same session.
    pub seed: u64,
    pub session: SessionSettings,
    pub spawner: SpawnerSettings,
    pub target: TargetConfig,
    pub spawn_zones: Vec<SpawnZoneConfig>,
    /// Preferred positions for the elimination burst.
    pub fixed_spawn_points: Vec<Vec3>,
    pub observer_position: Option<Vec3>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            session: SessionSettings::default(),
            spawner: SpawnerSettings::default(),
            target: TargetConfig::default(),
            spawn_zones: Vec::new(),
            fixed_spawn_points: Vec::new(),
            observer_position: Some(Vec3::ZERO),
        }
    }
}

impl TrainerConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("session.session_duration", self.session.session_duration)?;
        positive("spawner.spawn_interval", self.spawner.spawn_interval)?;
        positive("target.lifetime", self.target.lifetime)?;
        positive("target.max_health", self.target.max_health as f64)?;
        positive(
            "target.direction_change_interval",
            self.target.direction_change_interval,
        )?;
        if self.spawner.min_spawn_distance > self.spawner.max_spawn_distance {
            return Err(ConfigError::InvalidSpawnDistance {
                min: self.spawner.min_spawn_distance,
                max: self.spawner.max_spawn_distance,
            });
        }
        if let Some(zone) = self.spawn_zones.iter().find(|z| z.weight < 0.0) {
            return Err(ConfigError::NegativeZoneWeight { weight: zone.weight });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

//! Weighted rectangular spawn regions.

use glam::Vec3;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use aimtrainer_core::config::SpawnZoneConfig;
use aimtrainer_core::error::ConfigError;
use aimtrainer_core::types::StrafeBounds;

/// Handle to a zone registered with the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnZoneId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnZone {
    center: Vec3,
    size: Vec3,
    weight: f32,
    spawn_height: f32,
}

impl SpawnZone {
    pub fn new(center: Vec3, size: Vec3, weight: f32, spawn_height: f32) -> Result<Self, ConfigError> {
        if weight.is_nan() || weight < 0.0 {
            return Err(ConfigError::NegativeZoneWeight { weight });
        }
        Ok(Self {
            center,
            size: size.abs(),
            weight,
            spawn_height,
        })
    }

    pub fn from_config(config: &SpawnZoneConfig) -> Result<Self, ConfigError> {
        Self::new(config.center, config.size, config.weight, config.spawn_height)
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Horizontal footprint, used to constrain strafing.
    pub fn bounds(&self) -> StrafeBounds {
        StrafeBounds::from_center_size(self.center, self.size)
    }

    /// Uniform point inside the footprint at the zone's fixed height.
    pub fn random_point(&self, rng: &mut ChaCha8Rng) -> Vec3 {
        let half = self.size * 0.5;
        Vec3::new(
            self.center.x + symmetric(rng, half.x),
            self.spawn_height,
            self.center.z + symmetric(rng, half.z),
        )
    }
}

/// Uniform sample in `[-half, half]`, tolerating a zero extent.
pub(crate) fn symmetric(rng: &mut ChaCha8Rng, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..=half)
    } else {
        0.0
    }
}

/// Cumulative-weight walk over `zones`, skipping zero weights.
///
/// Returns `None` when no zone has a positive weight.
pub fn pick_weighted<'a, I>(zones: I, rng: &mut ChaCha8Rng) -> Option<usize>
where
    I: IntoIterator<Item = &'a SpawnZone>,
    I::IntoIter: Clone,
{
    let zones = zones.into_iter();
    let total: f32 = zones.clone().map(|z| z.weight).sum();
    if total.is_nan() || total <= 0.0 {
        return None;
    }
    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, zone) in zones.enumerate() {
        if zone.weight <= 0.0 {
            continue;
        }
        cumulative += zone.weight;
        last_positive = Some(i);
        if roll < cumulative {
            return Some(i);
        }
    }
    // Float rounding can leave `roll` a hair above the final sum.
    last_positive
}

//! Fundamental geometric and simulation types.
//!
//! World space is y-up: the strafe plane and spawn zones live on x/z.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Handle to a pooled target slot.
///
/// The generation is bumped every time the slot is returned to the pool,
/// so a handle held past its lease no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId {
    pub index: u32,
    pub generation: u32,
}

impl TargetId {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}g{}", self.index, self.generation)
    }
}

/// Axis-aligned rectangle on the horizontal plane, used to constrain strafing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrafeBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl StrafeBounds {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: max_x.max(min_x),
            min_z: min_z.min(max_z),
            max_z: max_z.max(min_z),
        }
    }

    /// Build from a box center and full size (y is ignored).
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(
            center.x - half.x,
            center.x + half.x,
            center.z - half.z,
            center.z + half.z,
        )
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min_x + self.max_x) * 0.5,
            0.0,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.z >= self.min_z && point.z <= self.max_z
    }

    /// Shrink every edge inward by `margin`, collapsing to the center if too small.
    pub fn shrunk(&self, margin: f32) -> Self {
        let c = self.center();
        let min_x = (self.min_x + margin).min(c.x);
        let max_x = (self.max_x - margin).max(c.x);
        let min_z = (self.min_z + margin).min(c.z);
        let max_z = (self.max_z - margin).max(c.z);
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// Nearest point inside the rectangle. `y` is left untouched.
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min_x, self.max_x),
            point.y,
            point.z.clamp(self.min_z, self.max_z),
        )
    }

    /// Range of offsets `t` for which `origin + axis * t` stays inside the rectangle.
    ///
    /// Returns `(0.0, 0.0)` when the origin itself lies outside; callers clamp
    /// the origin in first.
    pub fn offset_range(&self, origin: Vec3, axis: Vec3) -> (f32, f32) {
        if !self.contains(origin) {
            return (0.0, 0.0);
        }
        let mut lo = f32::NEG_INFINITY;
        let mut hi = f32::INFINITY;
        for (o, a, min, max) in [
            (origin.x, axis.x, self.min_x, self.max_x),
            (origin.z, axis.z, self.min_z, self.max_z),
        ] {
            if a.abs() <= f32::EPSILON {
                continue;
            }
            let t0 = (min - o) / a;
            let t1 = (max - o) / a;
            lo = lo.max(t0.min(t1));
            hi = hi.min(t0.max(t1));
        }
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return (0.0, 0.0);
        }
        (lo, hi)
    }
}

/// Engine clock. Advances only by scaled time, so it freezes while paused.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Number of engine ticks processed.
    pub tick: u64,
    /// Scaled elapsed time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    pub fn advance(&mut self, scaled_dt: f64) {
        self.tick += 1;
        self.elapsed_secs += scaled_dt.max(0.0);
    }
}

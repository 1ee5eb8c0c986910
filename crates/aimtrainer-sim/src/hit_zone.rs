//! Hit volumes and target templates.
//!
//! A template describes one kind of target: its behavior config plus the
//! hit volumes a shooting collaborator resolves rays against. Whether a
//! volume is a head is fixed at construction.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use aimtrainer_core::config::TargetConfig;
use aimtrainer_core::enums::HitZoneKind;
use aimtrainer_core::error::ConfigError;

/// One spherical hit volume, positioned relative to the target origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitZone {
    kind: HitZoneKind,
    pub offset: Vec3,
    pub radius: f32,
}

impl HitZone {
    pub fn new(is_head: bool, offset: Vec3, radius: f32) -> Self {
        let kind = if is_head {
            HitZoneKind::Head
        } else {
            HitZoneKind::Body
        };
        Self {
            kind,
            offset,
            radius: radius.max(0.0),
        }
    }

    /// Standard head volume on a 1.8 m humanoid.
    pub fn head() -> Self {
        Self::new(true, Vec3::new(0.0, 1.6, 0.0), 0.15)
    }

    /// Standard torso volume on a 1.8 m humanoid.
    pub fn body() -> Self {
        Self::new(false, Vec3::new(0.0, 1.1, 0.0), 0.35)
    }

    pub fn kind(&self) -> HitZoneKind {
        self.kind
    }

    pub fn is_head(&self) -> bool {
        self.kind.is_head()
    }

    /// Damage this volume deals under `config`.
    pub fn damage(&self, config: &TargetConfig) -> i32 {
        match self.kind {
            HitZoneKind::Head => config.headshot_damage,
            HitZoneKind::Body => config.bodyshot_damage,
        }
    }

    /// World-space center for a target standing at `origin`.
    pub fn world_center(&self, origin: Vec3) -> Vec3 {
        origin + self.offset
    }
}

/// Everything the spawner needs to build its pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetTemplate {
    pub name: String,
    /// `None` marks a template with no target behavior attached.
    pub target: Option<TargetConfig>,
    pub hit_zones: Vec<HitZone>,
}

impl TargetTemplate {
    /// Humanoid with a head and a body volume.
    pub fn humanoid(name: impl Into<String>, config: TargetConfig) -> Self {
        Self {
            name: name.into(),
            target: Some(config),
            hit_zones: vec![HitZone::head(), HitZone::body()],
        }
    }

    /// The target behavior, or the configuration error for a bare template.
    pub fn behavior(&self) -> Result<&TargetConfig, ConfigError> {
        self.target
            .as_ref()
            .ok_or_else(|| ConfigError::MissingTargetBehavior {
                template: self.name.clone(),
            })
    }

    pub fn zone(&self, kind: HitZoneKind) -> Option<&HitZone> {
        self.hit_zones.iter().find(|z| z.kind == kind)
    }
}

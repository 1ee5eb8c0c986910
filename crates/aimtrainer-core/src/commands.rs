//! Commands pushed into the engine by input and menu collaborators.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::ModeConfiguration;
use crate::enums::HitZoneKind;
use crate::types::TargetId;

/// Outcome of a ray cast already resolved by the shooting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShotResult {
    /// The ray struck nothing shootable.
    Miss,
    /// The ray struck a hit volume belonging to `target`.
    Hit {
        target: TargetId,
        zone: HitZoneKind,
        point: Vec3,
    },
}

/// All possible external requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrainerCommand {
    // --- Session control ---
    /// Start a timed session with the configured duration.
    StartTimed,
    /// Start an elimination session; `None` uses the configured count.
    StartElimination { target_count: Option<u32> },
    /// Start with a full mode configuration (also reconfigures the spawner).
    StartWithConfiguration { config: ModeConfiguration },
    Pause,
    Resume,
    TogglePause,
    EndSession,
    /// Leave the results screen and return to idle.
    ReturnToMenu,

    // --- Input ---
    Fire { shot: ShotResult },
    SetObserverPosition { position: Vec3 },

    // --- Persisted settings ---
    SetSessionDuration { seconds: f64 },
    SetEliminationTargetCount { count: u32 },
    SetSpawnInterval { seconds: f64 },
    SetMaxActiveTargets { count: usize },
}

//! Notifications emitted by the engine for UI, audio, and the engine itself.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::SessionPhase;
use crate::types::TargetId;

/// Everything that travels over the notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    // --- Session ---
    SessionStart,
    SessionEnd,
    SessionPause,
    SessionResume,
    /// Whole seconds left on the pre-session countdown.
    CountdownTick { seconds_remaining: u32 },
    CountdownComplete,
    /// Emitted on every session phase transition.
    PhaseChanged { phase: SessionPhase },

    // --- Targets ---
    TargetSpawned { target: TargetId },
    /// Emitted once per damaging hit, kill or not.
    TargetHit { target: TargetId, is_headshot: bool },
    /// Lifetime ran out before the target was killed.
    TargetMissed { target: TargetId },
    TargetDespawned { target: TargetId },

    // --- Shooting ---
    ShotFired,
    ShotHit { position: Vec3, is_headshot: bool },
    ShotMissed,

    // --- Results ---
    AllTargetsEliminated,
    StatsUpdated,
}

impl GameEvent {
    /// Session-lifecycle notifications the spawner reacts to.
    pub fn is_session_lifecycle(&self) -> bool {
        matches!(
            self,
            GameEvent::SessionStart
                | GameEvent::SessionEnd
                | GameEvent::SessionPause
                | GameEvent::SessionResume
        )
    }
}

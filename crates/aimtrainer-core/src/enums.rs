//! Enumeration types used throughout the trainer.

use serde::{Deserialize, Serialize};

/// Session phase (top-level state).
///
/// Transitions are strictly sequential:
/// `Idle -> Countdown -> Active -> {Paused <-> Active} -> Ended -> Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Idle,
    Countdown,
    Active,
    Paused,
    Ended,
}

impl SessionPhase {
    /// Whether a session is in flight (start requests are ignored).
    pub fn is_running(self) -> bool {
        matches!(
            self,
            SessionPhase::Countdown | SessionPhase::Active | SessionPhase::Paused
        )
    }
}

/// How the session timer behaves and how the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// Timer counts down from the session duration; ends at zero.
    #[default]
    Timed,
    /// Timer counts up; ends when the kill target is reached.
    Elimination,
}

/// Training drill selected from the menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingMode {
    #[default]
    Flick,
    Tracking,
    Speed,
    Headshot,
    Elimination,
}

/// Timer direction carried by a mode configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerType {
    /// Time counts down from the duration to 0.
    #[default]
    Countdown,
    /// Time counts up from 0 (stopwatch).
    Countup,
}

/// Target lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetState {
    /// Sitting in the pool's free list.
    #[default]
    Inactive,
    /// Live and shootable.
    Active,
    /// Killed; waiting out its despawn delay before returning to the pool.
    Hit,
    /// Lifetime expired without a kill.
    TimedOut,
}

/// Which hit volume a shot resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitZoneKind {
    Head,
    Body,
}

impl HitZoneKind {
    pub fn is_head(self) -> bool {
        self == HitZoneKind::Head
    }
}

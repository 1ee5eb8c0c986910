//! Session snapshot: the complete visible state handed to UI after each tick.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::enums::{SessionMode, SessionPhase, TargetState};
use crate::events::GameEvent;
use crate::stats::StatsReport;
use crate::types::{SimTime, TargetId};

/// Complete engine state after one tick. Doubles as the results report once
/// the phase is `Ended`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub time: SimTime,
    pub phase: SessionPhase,
    pub mode: SessionMode,
    /// Seconds left on the pre-session countdown.
    pub countdown_remaining: f64,
    /// Remaining time (timed) or elapsed stopwatch time (elimination).
    pub session_timer: f64,
    pub time_scale: f64,
    pub stats: StatsReport,
    pub targets: Vec<TargetView>,
    /// Notifications emitted since the previous snapshot, in order.
    pub events: Vec<GameEvent>,
}

/// A live target as seen by the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetView {
    pub id: TargetId,
    pub state: TargetState,
    pub position: Vec3,
    pub rotation: Quat,
    pub health: i32,
    pub max_health: i32,
    /// +1 strafing along the axis, -1 against it.
    pub strafe_direction: i8,
}

//! Session state machine: phases, timers, and statistics for one session.
//!
//! `Idle -> Countdown -> Active -> {Paused <-> Active} -> Ended -> Idle`.
//! Out-of-order requests are ignored and return `false`.

use aimtrainer_core::config::{ModeConfiguration, SessionSettings};
use aimtrainer_core::constants::{MAX_SESSION_DURATION, MIN_SESSION_DURATION};
use aimtrainer_core::enums::{SessionMode, SessionPhase};
use aimtrainer_core::events::GameEvent;
use aimtrainer_core::stats::Statistics;

use crate::event_bus::EventBus;

pub struct SessionStateMachine {
    settings: SessionSettings,
    phase: SessionPhase,
    mode: SessionMode,
    countdown_remaining: f64,
    /// Remaining time (timed) or stopwatch (elimination).
    timer: f64,
    time_scale: f64,
    stats: Statistics,
    mode_config: Option<ModeConfiguration>,
}

impl SessionStateMachine {
    /// Create an idle session.
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            phase: SessionPhase::Idle,
            mode: SessionMode::Timed,
            countdown_remaining: 0.0,
            timer: 0.0,
            time_scale: 1.0,
            stats: Statistics::new(),
            mode_config: None,
        }
    }

    // --- Starting ---

    /// Start a timed session.
    pub fn start_countdown(&mut self, bus: &mut EventBus) -> bool {
        if self.reject_start() {
            return false;
        }
        self.mode = SessionMode::Timed;
        self.mode_config = None;
        self.stats.reset();
        self.stats.is_elimination_mode = false;
        self.enter_countdown(bus);
        true
    }

    /// Start an elimination session. `None` or `Some(0)` uses the configured count.
    pub fn start_elimination_countdown(&mut self, target_count: Option<u32>, bus: &mut EventBus) -> bool {
        if self.reject_start() {
            return false;
        }
        self.mode = SessionMode::Elimination;
        self.mode_config = None;
        self.stats.reset();
        self.stats.is_elimination_mode = true;
        self.stats.total_targets_to_eliminate = target_count
            .filter(|&n| n > 0)
            .unwrap_or(self.settings.elimination_target_count);
        self.enter_countdown(bus);
        true
    }

    /// Start the countdown for a mode preset.
    pub fn start_with_configuration(&mut self, config: ModeConfiguration, bus: &mut EventBus) -> bool {
        if self.reject_start() {
            return false;
        }
        let started = if config.is_elimination_mode() {
            self.start_elimination_countdown(Some(config.target_count), bus)
        } else {
            self.set_session_duration(config.default_duration);
            self.start_countdown(bus)
        };
        self.mode_config = Some(config);
        started
    }

    fn reject_start(&self) -> bool {
        if self.phase.is_running() {
            tracing::debug!(phase = ?self.phase, "start ignored: session already running");
            true
        } else {
            false
        }
    }

    fn enter_countdown(&mut self, bus: &mut EventBus) {
        self.countdown_remaining = self.settings.countdown_seconds as f64;
        self.timer = 0.0;
        self.time_scale = 1.0;
        self.set_phase(SessionPhase::Countdown, bus);
        bus.emit(GameEvent::CountdownTick {
            seconds_remaining: self.settings.countdown_seconds,
        });
    }

    // --- Per tick ---

    /// Advance by one frame of unscaled `dt`.
    pub fn tick(&mut self, dt: f64, bus: &mut EventBus) {
        let dt = dt.max(0.0) * self.time_scale;
        match self.phase {
            SessionPhase::Countdown => self.tick_countdown(dt, bus),
            SessionPhase::Active => self.tick_active(dt, bus),
            SessionPhase::Idle | SessionPhase::Paused | SessionPhase::Ended => {}
        }
    }

    fn tick_countdown(&mut self, dt: f64, bus: &mut EventBus) {
        let previous = self.countdown_remaining.ceil() as i64;
        self.countdown_remaining -= dt;
        let current = self.countdown_remaining.ceil() as i64;

        // Every whole second crossed this frame, so long frames skip nothing.
        for second in (current.max(1)..previous).rev() {
            bus.emit(GameEvent::CountdownTick {
                seconds_remaining: second as u32,
            });
        }

        if self.countdown_remaining <= 0.0 {
            self.countdown_remaining = 0.0;
            self.timer = match self.mode {
                SessionMode::Timed => self.settings.session_duration,
                SessionMode::Elimination => 0.0,
            };
            bus.emit(GameEvent::CountdownComplete);
            self.set_phase(SessionPhase::Active, bus);
            bus.emit(GameEvent::SessionStart);
            tracing::info!(mode = ?self.mode, timer = self.timer, "session started");
        }
    }

    fn tick_active(&mut self, dt: f64, bus: &mut EventBus) {
        self.stats.add_session_time(dt);
        match self.mode {
            SessionMode::Timed => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.timer = 0.0;
                    self.end_session(bus);
                }
            }
            SessionMode::Elimination => self.timer += dt,
        }
    }

    // --- Pause / end ---

    /// Freeze an active session.
    pub fn pause(&mut self, bus: &mut EventBus) -> bool {
        if self.phase != SessionPhase::Active {
            tracing::debug!(phase = ?self.phase, "pause ignored");
            return false;
        }
        self.time_scale = 0.0;
        self.set_phase(SessionPhase::Paused, bus);
        bus.emit(GameEvent::SessionPause);
        true
    }

    /// Unfreeze a paused session.
    pub fn resume(&mut self, bus: &mut EventBus) -> bool {
        if self.phase != SessionPhase::Paused {
            tracing::debug!(phase = ?self.phase, "resume ignored");
            return false;
        }
        self.time_scale = 1.0;
        self.set_phase(SessionPhase::Active, bus);
        bus.emit(GameEvent::SessionResume);
        true
    }

    /// Pause when active, resume when paused.
    pub fn toggle_pause(&mut self, bus: &mut EventBus) -> bool {
        match self.phase {
            SessionPhase::Active => self.pause(bus),
            SessionPhase::Paused => self.resume(bus),
            _ => {
                tracing::debug!(phase = ?self.phase, "toggle pause ignored");
                false
            }
        }
    }

    /// End the session. Idempotent; only an active or paused session ends.
    pub fn end_session(&mut self, bus: &mut EventBus) -> bool {
        if !matches!(self.phase, SessionPhase::Active | SessionPhase::Paused) {
            tracing::debug!(phase = ?self.phase, "end ignored");
            return false;
        }
        if self.mode == SessionMode::Elimination {
            self.stats.record_completion_time(self.timer);
        }
        self.stats.freeze();
        self.time_scale = 0.0;
        self.set_phase(SessionPhase::Ended, bus);
        bus.emit(GameEvent::SessionEnd);
        tracing::info!(
            mode = ?self.mode,
            shots = self.stats.total_shots,
            kills = self.stats.targets_hit,
            accuracy = self.stats.accuracy(),
            completion_time = self.stats.completion_time,
            "session ended"
        );
        true
    }

    /// Called with the kill count returned by a hit. Ends an elimination
    /// session the first time the count reaches the goal.
    pub fn notify_targets_hit(&mut self, targets_hit: u32, bus: &mut EventBus) -> bool {
        if self.mode != SessionMode::Elimination || self.phase != SessionPhase::Active {
            return false;
        }
        if targets_hit < self.stats.total_targets_to_eliminate {
            return false;
        }
        self.stats.record_completion_time(self.timer);
        bus.emit(GameEvent::AllTargetsEliminated);
        self.end_session(bus)
    }

    /// Leave the results screen.
    pub fn return_to_idle(&mut self, bus: &mut EventBus) -> bool {
        if self.phase != SessionPhase::Ended {
            tracing::debug!(phase = ?self.phase, "return to idle ignored");
            return false;
        }
        self.time_scale = 1.0;
        self.set_phase(SessionPhase::Idle, bus);
        true
    }

    fn set_phase(&mut self, phase: SessionPhase, bus: &mut EventBus) {
        tracing::debug!(from = ?self.phase, to = ?phase, "phase change");
        self.phase = phase;
        bus.emit(GameEvent::PhaseChanged { phase });
    }

    // --- Statistics routing ---

    /// Update statistics from a routed notification.
    pub fn handle_event(&mut self, event: &GameEvent, bus: &mut EventBus) {
        match event {
            GameEvent::TargetSpawned { .. } => self.stats.register_target_spawned(),
            GameEvent::TargetMissed { .. } => self.stats.register_target_missed(),
            GameEvent::ShotHit { is_headshot, .. } => self.stats.register_shot(true, *is_headshot),
            GameEvent::ShotMissed => self.stats.register_shot(false, false),
            _ => return,
        }
        bus.emit(GameEvent::StatsUpdated);
    }

    // --- Settings ---

    /// Timed-session length, clamped to the allowed range.
    pub fn set_session_duration(&mut self, seconds: f64) {
        if seconds.is_nan() {
            tracing::warn!("ignoring NaN session duration");
            return;
        }
        let clamped = seconds.clamp(MIN_SESSION_DURATION, MAX_SESSION_DURATION);
        if clamped != seconds {
            tracing::warn!(seconds, clamped, "session duration clamped");
        }
        self.settings.session_duration = clamped;
    }

    /// Fallback kill goal. Never below 1.
    pub fn set_elimination_target_count(&mut self, count: u32) {
        if count == 0 {
            tracing::warn!("elimination target count of 0 clamped to 1");
        }
        self.settings.elimination_target_count = count.max(1);
    }

    // --- Queries ---

    /// Get the current session phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Get the mode of the current or last session.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Seconds left (timed) or elapsed (elimination).
    pub fn timer(&self) -> f64 {
        self.timer
    }

    /// Seconds left in the pre-session countdown.
    pub fn countdown_remaining(&self) -> f64 {
        self.countdown_remaining
    }

    /// Simulation time scale. 0 while paused or ended.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Statistics of the current or last session.
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Mutable statistics, for shot and kill routing.
    pub fn stats_mut(&mut self) -> &mut Statistics {
        &mut self.stats
    }

    /// Current session settings.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Mode configuration the session was started with, if any.
    pub fn mode_config(&self) -> Option<&ModeConfiguration> {
        self.mode_config.as_ref()
    }

    /// Whether the session is `Active` or `Paused`.
    pub fn is_session_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }
}

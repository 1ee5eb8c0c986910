//! Training engine: the composition root.
//!
//! `TrainingEngine` owns the event bus, the session state machine, and the
//! target spawner, processes queued commands, and produces
//! `SessionSnapshot`s. Completely headless, so sessions replay exactly
//! from a seed and a command script.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use aimtrainer_core::commands::{ShotResult, TrainerCommand};
use aimtrainer_core::config::{ModeConfiguration, TrainerConfig};
use aimtrainer_core::enums::SessionPhase;
use aimtrainer_core::error::ConfigError;
use aimtrainer_core::events::GameEvent;
use aimtrainer_core::state::SessionSnapshot;
use aimtrainer_core::stats::Statistics;
use aimtrainer_core::types::SimTime;

use crate::event_bus::{EventBus, SubscriptionId};
use crate::hit_zone::TargetTemplate;
use crate::session::SessionStateMachine;
use crate::spawn_zone::SpawnZone;
use crate::spawner::TargetSpawner;
use crate::target::HitOutcome;

pub struct TrainingEngine {
    time: SimTime,
    rng: ChaCha8Rng,
    bus: EventBus,
    session: SessionStateMachine,
    spawner: TargetSpawner,
    command_queue: VecDeque<TrainerCommand>,
}

impl TrainingEngine {
    /// Engine with the standard humanoid target built from `config.target`.
    pub fn new(config: TrainerConfig) -> Self {
        let template = TargetTemplate::humanoid("humanoid", config.target.clone());
        Self::build(config, template)
    }

    /// Engine with a custom target template.
    pub fn with_template(config: TrainerConfig, template: TargetTemplate) -> Result<Self, ConfigError> {
        template.behavior()?;
        Ok(Self::build(config, template))
    }

    fn build(config: TrainerConfig, template: TargetTemplate) -> Self {
        let mut spawner = TargetSpawner::new(config.spawner.clone());
        if spawner.initialize(template).is_err() {
            tracing::warn!("engine running without a target pool");
        }
        for zone in &config.spawn_zones {
            match SpawnZone::from_config(zone) {
                Ok(zone) => {
                    spawner.register_spawn_zone(zone);
                }
                Err(err) => tracing::error!(%err, "spawn zone skipped"),
            }
        }
        spawner.set_fixed_spawn_points(config.fixed_spawn_points.clone());
        spawner.set_observer_position(config.observer_position);

        Self {
            time: SimTime::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            bus: EventBus::new(),
            session: SessionStateMachine::new(config.session),
            spawner,
            command_queue: VecDeque::new(),
        }
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: TrainerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue several commands in order.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = TrainerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance by one frame of `dt` seconds and return the resulting snapshot.
    pub fn tick(&mut self, dt: f64) -> SessionSnapshot {
        self.process_commands();

        let scaled_dt = dt.max(0.0) * self.session.time_scale();
        self.session.tick(dt, &mut self.bus);
        self.route_events();

        self.time.advance(scaled_dt);
        let now = self.time.elapsed_secs;
        self.spawner
            .tick(scaled_dt, now, &mut self.rng, &mut self.bus);
        self.route_events();

        self.snapshot()
    }

    /// Build a snapshot, draining notifications emitted since the last one.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        SessionSnapshot {
            time: self.time,
            phase: self.session.phase(),
            mode: self.session.mode(),
            countdown_remaining: self.session.countdown_remaining(),
            session_timer: self.session.timer(),
            time_scale: self.session.time_scale(),
            stats: self.session.stats().report(),
            targets: self.spawner.views(),
            events: self.bus.take_emitted(),
        }
    }

    /// Deliver queued notifications to the session and spawner until quiet.
    fn route_events(&mut self) {
        let now = self.time.elapsed_secs;
        while let Some(event) = self.bus.pop_pending() {
            self.session.handle_event(&event, &mut self.bus);
            if event.is_session_lifecycle() {
                self.spawner
                    .handle_session_event(&event, &mut self.rng, &mut self.bus, now);
            }
        }
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: TrainerCommand) {
        match command {
            TrainerCommand::StartTimed => {
                self.start_timed();
            }
            TrainerCommand::StartElimination { target_count } => {
                self.start_elimination(target_count);
            }
            TrainerCommand::StartWithConfiguration { config } => {
                self.start_with_configuration(config);
            }
            TrainerCommand::Pause => {
                self.pause();
            }
            TrainerCommand::Resume => {
                self.resume();
            }
            TrainerCommand::TogglePause => {
                self.session.toggle_pause(&mut self.bus);
                self.route_events();
            }
            TrainerCommand::EndSession => {
                self.end_session();
            }
            TrainerCommand::ReturnToMenu => {
                self.return_to_menu();
            }
            TrainerCommand::Fire { shot } => {
                self.fire(shot);
            }
            TrainerCommand::SetObserverPosition { position } => {
                self.spawner.set_observer_position(Some(position));
            }
            TrainerCommand::SetSessionDuration { seconds } => {
                self.session.set_session_duration(seconds);
            }
            TrainerCommand::SetEliminationTargetCount { count } => {
                self.session.set_elimination_target_count(count);
            }
            TrainerCommand::SetSpawnInterval { seconds } => {
                self.spawner.set_spawn_interval(seconds);
            }
            TrainerCommand::SetMaxActiveTargets { count } => {
                self.spawner.set_max_active_targets(count);
            }
        }
    }

    // --- Session control ---

    /// Start a timed session with continuous spawning.
    pub fn start_timed(&mut self) -> bool {
        if self.session.phase().is_running() {
            tracing::debug!("start ignored: session already running");
            return false;
        }
        self.spawner.reset_to_standard_mode();
        let started = self.session.start_countdown(&mut self.bus);
        self.route_events();
        started
    }

    /// Start an elimination session. `None` uses the configured kill goal.
    pub fn start_elimination(&mut self, target_count: Option<u32>) -> bool {
        if self.session.phase().is_running() {
            tracing::debug!("start ignored: session already running");
            return false;
        }
        let count = self.resolve_elimination_count(target_count);
        self.spawner.configure_for_elimination(count, false);
        let started = self
            .session
            .start_elimination_countdown(Some(count), &mut self.bus);
        self.route_events();
        started
    }

    /// Start a session from a mode preset.
    pub fn start_with_configuration(&mut self, mut config: ModeConfiguration) -> bool {
        if self.session.phase().is_running() {
            tracing::debug!("start ignored: session already running");
            return false;
        }
        if config.is_elimination_mode() {
            config.target_count = self.resolve_elimination_count(Some(config.target_count));
        }
        self.spawner.configure_with_mode(&config);
        let started = self.session.start_with_configuration(config, &mut self.bus);
        self.route_events();
        started
    }

    /// One kill goal shared by the spawner's burst and the session. `None`
    /// or 0 falls back to the configured count; never below 1.
    fn resolve_elimination_count(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|&n| n > 0)
            .unwrap_or(self.session.settings().elimination_target_count)
            .max(1)
    }

    /// Pause an active session.
    pub fn pause(&mut self) -> bool {
        let paused = self.session.pause(&mut self.bus);
        self.route_events();
        paused
    }

    /// Resume a paused session.
    pub fn resume(&mut self) -> bool {
        let resumed = self.session.resume(&mut self.bus);
        self.route_events();
        resumed
    }

    /// End the running session and freeze its results.
    pub fn end_session(&mut self) -> bool {
        let ended = self.session.end_session(&mut self.bus);
        self.route_events();
        ended
    }

    /// Leave the results screen for idle.
    pub fn return_to_menu(&mut self) -> bool {
        let returned = self.session.return_to_idle(&mut self.bus);
        self.route_events();
        returned
    }

    // --- Shooting ---

    /// Apply a shot already resolved by the shooting collaborator.
    ///
    /// Shot counters update before the hit lands, so a killing shot is
    /// counted even when it ends the session. The kill count returned by
    /// the target drives elimination completion directly. A hit on a target
    /// that is gone or already down counts as a miss.
    pub fn fire(&mut self, shot: ShotResult) -> Option<HitOutcome> {
        if self.session.phase() != SessionPhase::Active {
            tracing::debug!(phase = ?self.session.phase(), "shot ignored");
            return None;
        }
        let now = self.time.elapsed_secs;
        self.bus.emit(GameEvent::ShotFired);

        let (target, is_headshot, point) = match shot {
            ShotResult::Hit { target, zone, point }
                if self.spawner.target(target).is_some_and(|t| t.is_active()) =>
            {
                (target, zone.is_head(), point)
            }
            _ => {
                self.bus.emit(GameEvent::ShotMissed);
                self.route_events();
                return None;
            }
        };

        self.bus.emit(GameEvent::ShotHit {
            position: point,
            is_headshot,
        });
        self.route_events();

        let outcome = match self.spawner.target_mut(target) {
            Some(t) => t.apply_hit(is_headshot, now, self.session.stats_mut(), &mut self.bus),
            None => None,
        };
        if let Some(outcome) = outcome {
            if outcome.despawn_requested {
                self.spawner.return_target(target, &mut self.bus, now);
            }
            if outcome.killed {
                self.session
                    .notify_targets_hit(outcome.targets_hit, &mut self.bus);
            }
        }
        self.route_events();
        outcome
    }

    // --- Settings ---

    /// Forwarded to the session. Clamped there.
    pub fn set_session_duration(&mut self, seconds: f64) {
        self.session.set_session_duration(seconds);
    }

    /// Kill goal used when a start passes none.
    pub fn set_elimination_target_count(&mut self, count: u32) {
        self.session.set_elimination_target_count(count);
    }

    /// Seconds between continuous spawns.
    pub fn set_spawn_interval(&mut self, seconds: f64) {
        self.spawner.set_spawn_interval(seconds);
    }

    /// Cap on simultaneously leased targets.
    pub fn set_max_active_targets(&mut self, count: usize) {
        self.spawner.set_max_active_targets(count);
    }

    // --- Notifications ---

    /// Register an event listener.
    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    /// Remove a listener. `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // --- Queries ---

    /// Get the current session phase.
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Get the simulation clock.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Statistics of the current or last session.
    pub fn stats(&self) -> &Statistics {
        self.session.stats()
    }

    /// Read access to the session state machine.
    pub fn session(&self) -> &SessionStateMachine {
        &self.session
    }

    /// Read access to the spawner.
    pub fn spawner(&self) -> &TargetSpawner {
        &self.spawner
    }

    /// Mutable access to the spawner.
    pub fn spawner_mut(&mut self) -> &mut TargetSpawner {
        &mut self.spawner
    }
}

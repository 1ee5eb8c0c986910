//! Statistics aggregator for one training session.
//!
//! Plain counters plus derived metrics. Derived values are 0 whenever
//! their denominator is 0. Once frozen (session ended) every `register_*`
//! call is ignored until the next `reset`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_shots: u32,
    pub hits: u32,
    pub misses: u32,
    pub headshots: u32,
    pub bodyshots: u32,
    pub targets_spawned: u32,
    pub targets_hit: u32,
    pub targets_missed: u32,
    /// Active-phase seconds accumulated this session.
    pub session_duration: f64,
    /// Sum of spawn-to-kill times (seconds).
    pub total_reaction_time: f64,
    pub reaction_time_count: u32,

    // --- Elimination ---
    pub is_elimination_mode: bool,
    /// Stopwatch value when the last required target went down.
    pub completion_time: f64,
    pub total_targets_to_eliminate: u32,

    #[serde(skip)]
    frozen: bool,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter and unfreeze.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Make the counters read-only until the next `reset`.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn register_shot(&mut self, is_hit: bool, is_headshot: bool) {
        if self.frozen {
            return;
        }
        self.total_shots += 1;
        if is_hit {
            self.hits += 1;
            if is_headshot {
                self.headshots += 1;
            } else {
                self.bodyshots += 1;
            }
        } else {
            self.misses += 1;
        }
    }

    /// Record a kill and its reaction time. Returns the updated kill count.
    pub fn register_target_hit(&mut self, reaction_time: f64) -> u32 {
        if !self.frozen {
            self.targets_hit += 1;
            self.total_reaction_time += reaction_time.max(0.0);
            self.reaction_time_count += 1;
        }
        self.targets_hit
    }

    pub fn register_target_missed(&mut self) {
        if !self.frozen {
            self.targets_missed += 1;
        }
    }

    pub fn register_target_spawned(&mut self) {
        if !self.frozen {
            self.targets_spawned += 1;
        }
    }

    pub fn add_session_time(&mut self, dt: f64) {
        if !self.frozen {
            self.session_duration += dt.max(0.0);
        }
    }

    pub fn record_completion_time(&mut self, time: f64) {
        if !self.frozen {
            self.completion_time = time;
        }
    }

    // --- Derived ---

    /// Hits per shot, in percent.
    pub fn accuracy(&self) -> f64 {
        percent(self.hits, self.total_shots)
    }

    /// Headshots per hit, in percent.
    pub fn headshot_percentage(&self) -> f64 {
        percent(self.headshots, self.hits)
    }

    /// Mean spawn-to-kill time in seconds.
    pub fn average_reaction_time(&self) -> f64 {
        if self.reaction_time_count == 0 {
            0.0
        } else {
            self.total_reaction_time / self.reaction_time_count as f64
        }
    }

    pub fn average_reaction_time_ms(&self) -> f64 {
        self.average_reaction_time() * 1000.0
    }

    pub fn targets_per_minute(&self) -> f64 {
        if self.session_duration <= 0.0 {
            0.0
        } else {
            self.targets_hit as f64 / (self.session_duration / 60.0)
        }
    }

    /// Kills still needed in elimination mode (never negative).
    pub fn remaining_targets(&self) -> u32 {
        self.total_targets_to_eliminate.saturating_sub(self.targets_hit)
    }

    /// Serializable summary for the results screen.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            total_shots: self.total_shots,
            hits: self.hits,
            misses: self.misses,
            headshots: self.headshots,
            bodyshots: self.bodyshots,
            targets_spawned: self.targets_spawned,
            targets_hit: self.targets_hit,
            targets_missed: self.targets_missed,
            session_duration: self.session_duration,
            accuracy: self.accuracy(),
            headshot_percentage: self.headshot_percentage(),
            average_reaction_time_ms: self.average_reaction_time_ms(),
            targets_per_minute: self.targets_per_minute(),
            is_elimination_mode: self.is_elimination_mode,
            completion_time: self.completion_time,
            remaining_targets: self.remaining_targets(),
        }
    }
}

fn percent(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Flattened statistics with derived metrics precomputed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub total_shots: u32,
    pub hits: u32,
    pub misses: u32,
    pub headshots: u32,
    pub bodyshots: u32,
    pub targets_spawned: u32,
    pub targets_hit: u32,
    pub targets_missed: u32,
    pub session_duration: f64,
    pub accuracy: f64,
    pub headshot_percentage: f64,
    pub average_reaction_time_ms: f64,
    pub targets_per_minute: f64,
    pub is_elimination_mode: bool,
    pub completion_time: f64,
    pub remaining_targets: u32,
}

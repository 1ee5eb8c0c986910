//! Trainer constants and tuning parameters.

/// Engine tick rate used by the headless driver (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at the default tick rate.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Session ---

/// Length of the pre-session countdown (seconds).
pub const COUNTDOWN_SECONDS: u32 = 3;

/// Default timed-session length (seconds).
pub const DEFAULT_SESSION_DURATION: f64 = 60.0;

/// Default number of kills that ends an elimination session.
pub const DEFAULT_ELIMINATION_TARGET_COUNT: u32 = 20;

/// Bounds applied to persisted session durations (seconds).
pub const MIN_SESSION_DURATION: f64 = 1.0;
pub const MAX_SESSION_DURATION: f64 = 3600.0;

// --- Spawner ---

/// Targets created eagerly when the pool is built.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Seconds between continuous spawns.
pub const DEFAULT_SPAWN_INTERVAL: f64 = 1.0;

/// Concurrently live targets in continuous mode.
pub const DEFAULT_MAX_ACTIVE_TARGETS: usize = 1;

/// Closest a randomly placed target may be to the observer (meters).
pub const DEFAULT_MIN_SPAWN_DISTANCE: f32 = 5.0;

/// Farthest a randomly placed target may be from the observer (meters).
pub const DEFAULT_MAX_SPAWN_DISTANCE: f32 = 20.0;

// --- Target ---

/// Seconds a target stays up before counting as missed.
pub const DEFAULT_TARGET_LIFETIME: f64 = 3.0;

pub const DEFAULT_MAX_HEALTH: i32 = 3;

/// One headshot kills.
pub const DEFAULT_HEADSHOT_DAMAGE: i32 = 3;

/// Three body shots kill.
pub const DEFAULT_BODYSHOT_DAMAGE: i32 = 1;

/// Strafe speed (meters per second).
pub const DEFAULT_STRAFE_SPEED: f32 = 3.0;

/// Ping-pong half-range when no strafe bounds are supplied (meters).
pub const DEFAULT_STRAFE_DISTANCE: f32 = 2.0;

/// Nominal seconds between strafe direction rolls.
pub const DEFAULT_DIRECTION_CHANGE_INTERVAL: f64 = 0.8;

/// Added to the 50% base chance of flipping direction on each roll.
pub const DEFAULT_DIRECTION_CHANGE_RANDOMNESS: f64 = 0.3;

/// Uniform jitter applied to each direction-change interval (seconds).
pub const DIRECTION_CHANGE_JITTER: f64 = 0.2;

/// Inset from strafe bounds so targets never sit exactly on an edge (meters).
pub const STRAFE_BOUNDS_MARGIN: f32 = 0.1;

/// Horizontal distances below this are treated as "on top of the observer".
pub const MIN_OBSERVER_DISTANCE: f32 = 0.001;

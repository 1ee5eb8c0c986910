//! Headless training session engine.
//!
//! Owns the target pool, spawner, and session state machine, wires them
//! through an explicit event bus, and produces `SessionSnapshot`s for the
//! frontend.

pub mod engine;
pub mod event_bus;
pub mod hit_zone;
pub mod pool;
pub mod session;
pub mod spawn_zone;
pub mod spawner;
pub mod target;

pub use aimtrainer_core as core;
pub use engine::TrainingEngine;

#[cfg(test)]
mod tests;

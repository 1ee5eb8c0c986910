//! Core types and definitions for the aim trainer.
//!
//! This crate defines the vocabulary shared across the workspace:
//! session enums, events, commands, configuration, statistics,
//! snapshots, and constants. It contains no engine logic and performs no I/O.

pub mod commands;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod stats;
pub mod types;

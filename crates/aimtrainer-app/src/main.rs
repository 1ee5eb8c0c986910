//! Headless aim-trainer driver.
//!
//! Loads a JSON configuration, runs one session at a fixed 60 Hz step
//! with a scripted shooter, and prints the final snapshot as JSON.

mod game_loop;
mod telemetry;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use aimtrainer_core::commands::TrainerCommand;
use aimtrainer_core::config::{ModeConfiguration, TrainerConfig};
use aimtrainer_core::enums::TrainingMode;
use aimtrainer_sim::TrainingEngine;

use crate::game_loop::{Bot, BotSettings};

#[derive(Parser, Debug)]
#[command(name = "aimtrainer", about = "Run a headless aim-training session")]
struct Cli {
    /// JSON configuration file. Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Timed)]
    mode: ModeArg,

    /// Override the configured RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Timed-session length in seconds.
    #[arg(long)]
    duration: Option<f64>,

    /// Kills required to finish an elimination session.
    #[arg(long)]
    targets: Option<u32>,

    /// Stop after this many ticks even if the session is still running.
    #[arg(long, default_value_t = 60 * 60 * 10)]
    max_ticks: u64,

    /// Chance that a bot shot connects.
    #[arg(long, default_value_t = 0.7)]
    accuracy: f64,

    /// Share of connecting shots aimed at the head.
    #[arg(long, default_value_t = 0.3)]
    headshot_rate: f64,

    /// Seconds between bot shots.
    #[arg(long, default_value_t = 0.35)]
    fire_interval: f64,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print every snapshot as a JSON line.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Timed,
    Elimination,
    Flick,
    Tracking,
    Speed,
    Headshot,
}

impl ModeArg {
    fn start_command(self, targets: Option<u32>) -> TrainerCommand {
        let preset = |mode| TrainerCommand::StartWithConfiguration {
            config: ModeConfiguration::preset(mode),
        };
        match self {
            ModeArg::Timed => TrainerCommand::StartTimed,
            ModeArg::Elimination => TrainerCommand::StartElimination {
                target_count: targets,
            },
            ModeArg::Flick => preset(TrainingMode::Flick),
            ModeArg::Tracking => preset(TrainingMode::Tracking),
            ModeArg::Speed => preset(TrainingMode::Speed),
            ModeArg::Headshot => preset(TrainingMode::Headshot),
        }
    }
}

fn load_config(cli: &Cli) -> Result<TrainerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            TrainerConfig::from_json_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => TrainerConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(duration) = cli.duration {
        config.session.session_duration = duration;
    }
    if let Some(targets) = cli.targets {
        config.session.elimination_target_count = targets;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    let config = load_config(&cli)?;
    let seed = config.seed;
    tracing::info!(seed, mode = ?cli.mode, "starting session");

    let mut engine = TrainingEngine::new(config);
    let mut bot = Bot::new(
        seed,
        BotSettings {
            accuracy: cli.accuracy,
            headshot_rate: cli.headshot_rate,
            fire_interval: cli.fire_interval,
        },
        engine.spawner().template(),
    );

    let start = cli.mode.start_command(cli.targets);
    let last = game_loop::run(&mut engine, &mut bot, start, cli.max_ticks, cli.trace)?;
    println!("{}", serde_json::to_string_pretty(&last)?);
    Ok(())
}

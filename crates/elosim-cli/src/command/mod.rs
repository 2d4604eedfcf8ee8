use std::{path::PathBuf, time::Duration};

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use elosim_model::EngineOptions;
use elosim_rating::{ProcessRatingEngine, process::DEFAULT_ENGINE_PATH};
use elosim_simulation::{DEFAULT_SEED, MATCH_COUNT, ScalePolicy, player_pool::PLAYER_COUNT};

use crate::{config::SimulationParams, util};

use self::{dump::DumpArg, optimize::OptimizeArg, simulate::SimulateArg};

mod dump;
mod optimize;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the rating engine once with the base options and compare its output
    Simulate(#[clap(flatten)] SimulateArg),
    /// Tune the engine options with an evolutionary search
    Optimize(#[clap(flatten)] OptimizeArg),
    /// Print the generated players and match history as JSON
    Dump(#[clap(flatten)] DumpArg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum ScalePolicyArg {
    #[default]
    AlwaysEven,
    RollThresholds,
}

impl From<ScalePolicyArg> for ScalePolicy {
    fn from(arg: ScalePolicyArg) -> Self {
        match arg {
            ScalePolicyArg::AlwaysEven => ScalePolicy::AlwaysEven,
            ScalePolicyArg::RollThresholds => ScalePolicy::ROLL_THRESHOLDS,
        }
    }
}

/// Arguments determining the synthetic players and match history.
#[derive(Debug, Clone, clap::Args)]
struct SimulationArg {
    /// Seed of the player and match generation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Number of simulated players
    #[arg(long, default_value_t = PLAYER_COUNT)]
    players: usize,
    /// Number of generated matches
    #[arg(long, default_value_t = MATCH_COUNT)]
    matches: usize,
    /// How generated matches are labeled
    #[arg(long, value_enum, default_value_t)]
    scale_policy: ScalePolicyArg,
}

impl SimulationArg {
    fn params(&self) -> SimulationParams {
        SimulationParams {
            seed: self.seed,
            player_count: self.players,
            match_count: self.matches,
            scale_policy: self.scale_policy.into(),
            start_time: Utc::now(),
            ..SimulationParams::default()
        }
    }
}

/// Arguments selecting and configuring the rating engine.
#[derive(Debug, Clone, clap::Args)]
struct EngineArg {
    /// Rating engine executable
    #[arg(long, default_value = DEFAULT_ENGINE_PATH)]
    engine: PathBuf,
    /// Kill the engine if a single evaluation takes longer than this
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Base engine options (JSON, options-file format)
    #[arg(long)]
    options_file: Option<PathBuf>,
}

impl EngineArg {
    fn engine(&self) -> ProcessRatingEngine {
        let engine = ProcessRatingEngine::new(&self.engine);
        match self.timeout_secs {
            Some(secs) => engine.with_timeout(Duration::from_secs(secs)),
            None => engine,
        }
    }

    fn base_options(&self) -> anyhow::Result<EngineOptions> {
        match &self.options_file {
            Some(path) => util::read_options_file(path),
            None => Ok(EngineOptions::default()),
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Simulate(SimulateArg::default())) {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Optimize(arg) => optimize::run(&arg)?,
        Mode::Dump(arg) => dump::run(&arg)?,
    }
    Ok(())
}

impl Default for SimulationArg {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            players: PLAYER_COUNT,
            matches: MATCH_COUNT,
            scale_policy: ScalePolicyArg::default(),
        }
    }
}

impl Default for EngineArg {
    fn default() -> Self {
        Self {
            engine: PathBuf::from(DEFAULT_ENGINE_PATH),
            timeout_secs: None,
            options_file: None,
        }
    }
}

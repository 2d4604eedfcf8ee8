use std::{num::NonZeroUsize, ops::RangeInclusive, thread};

use chrono::{DateTime, Utc};
use elosim_evaluator::fitness::FitnessSpec;
use elosim_model::{MatchHistory, PlayerPool};
use elosim_simulation::{
    DEFAULT_SEED, MATCH_COUNT, MatchHistoryGenerator, ScalePolicy, player_pool, seeded_rng,
};
use elosim_training::genome::{FailurePolicy, MUTATION_SIGMA};
use log::info;

pub const MAX_EPOCHS: usize = 10;
pub const EPOCH_SURVIVORS: usize = 10;
pub const EPOCH_OFFSPRING: usize = 40;

/// Everything that determines the synthetic data of a run.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub seed: u64,
    pub player_count: usize,
    pub elo_range: RangeInclusive<i64>,
    pub match_count: usize,
    pub scale_policy: ScalePolicy,
    pub start_time: DateTime<Utc>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            player_count: player_pool::PLAYER_COUNT,
            elo_range: player_pool::ELO_MIN..=player_pool::ELO_MAX,
            match_count: MATCH_COUNT,
            scale_policy: ScalePolicy::default(),
            start_time: Utc::now(),
        }
    }
}

/// Ground truth and the history generated from it.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub pool: PlayerPool,
    pub history: MatchHistory,
}

impl SimulationParams {
    pub fn simulate(&self) -> anyhow::Result<Simulation> {
        let mut rng = seeded_rng(self.seed);
        let pool = player_pool::generate(&mut rng, self.player_count, self.elo_range.clone());
        let history = MatchHistoryGenerator::new(&pool)?
            .with_start_time(self.start_time)
            .with_scale_policy(self.scale_policy)
            .generate(self.match_count, &mut rng);
        info!(
            "generated {} matches for {} players (seed {})",
            history.len(),
            pool.len(),
            self.seed
        );
        Ok(Simulation { pool, history })
    }
}

#[derive(Debug, Clone)]
pub struct OptimizerParams {
    pub epochs: usize,
    pub survivors: usize,
    pub offspring: usize,
    pub sigma: f64,
    pub workers: NonZeroUsize,
    pub fitness: FitnessSpec,
    pub failure_policy: FailurePolicy,
}

impl Default for OptimizerParams {
    fn default() -> Self {
        Self {
            epochs: MAX_EPOCHS,
            survivors: EPOCH_SURVIVORS,
            offspring: EPOCH_OFFSPRING,
            sigma: MUTATION_SIGMA,
            workers: default_workers(),
            fitness: FitnessSpec::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

pub fn default_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

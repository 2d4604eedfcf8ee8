use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{Context as _, ensure};
use elosim_evaluator::{
    fitness::{FitnessMetric, FitnessSpec},
    history_evaluator::HistoryEvaluator,
};
use elosim_model::EngineOptions;
use elosim_rating::RatingEngine;
use elosim_stats::descriptive::DescriptiveStats;
use elosim_training::{
    genetic::{EvolutionOptimizer, FitnessVector, Population, Specimen},
    genome::{self, FailurePolicy, MUTATION_SIGMA},
};
use log::info;
use rand::RngCore;

use crate::{
    config::{EPOCH_OFFSPRING, EPOCH_SURVIVORS, MAX_EPOCHS, OptimizerParams, default_workers},
    util,
    view::table::{OptionsView, TableView},
};

use super::{EngineArg, SimulationArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct OptimizeArg {
    #[clap(flatten)]
    pub(crate) simulation: SimulationArg,
    #[clap(flatten)]
    pub(crate) engine: EngineArg,
    /// Number of epochs to run
    #[arg(long, default_value_t = MAX_EPOCHS)]
    epochs: usize,
    /// Specimens kept after each epoch
    #[arg(long, default_value_t = EPOCH_SURVIVORS)]
    survivors: usize,
    /// Offspring produced per epoch
    #[arg(long, default_value_t = EPOCH_OFFSPRING)]
    offspring: usize,
    /// Standard deviation of the Gaussian mutation
    #[arg(long, default_value_t = MUTATION_SIGMA)]
    sigma: f64,
    /// Concurrent engine runs [default: available parallelism]
    #[arg(long)]
    workers: Option<NonZeroUsize>,
    /// Fitness metrics in priority order [default: average-diff-normalized]
    #[arg(long, value_delimiter = ',')]
    fitness: Vec<FitnessMetric>,
    /// Score failed engine runs as worst instead of aborting
    #[arg(long)]
    penalize_failures: bool,
    /// Save the best options to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

impl OptimizeArg {
    pub(crate) fn params(&self) -> OptimizerParams {
        OptimizerParams {
            epochs: self.epochs,
            survivors: self.survivors,
            offspring: self.offspring,
            sigma: self.sigma,
            workers: self.workers.unwrap_or_else(default_workers),
            fitness: FitnessSpec::new(self.fitness.clone()),
            failure_policy: if self.penalize_failures {
                FailurePolicy::Penalize
            } else {
                FailurePolicy::Abort
            },
        }
    }
}

pub(crate) fn run(arg: &OptimizeArg) -> anyhow::Result<()> {
    let params = arg.params();
    ensure!(params.survivors > 0, "--survivors must be at least 1");
    ensure!(
        params.sigma.is_finite() && params.sigma >= 0.0,
        "--sigma must be a non-negative number"
    );

    let base = arg.engine.base_options()?;
    let sim = arg.simulation.params().simulate()?;
    let rating_engine = arg.engine.engine();
    let evaluator = HistoryEvaluator::new(&sim.pool, &sim.history, &rating_engine);

    let initial = evaluator
        .compare(&base)
        .context("Failed to evaluate the base options")?;
    eprintln!("Initial output:");
    eprint!("{}", TableView(&initial));
    eprintln!();

    let fitness_len = params.fitness.metrics().len();
    let evaluate = |genes: &[f64]| {
        let options = genome::to_options(genes, &base);
        let result = evaluator
            .fitness(&options, &params.fitness)
            .map(FitnessVector::from);
        params.failure_policy.apply(result, fitness_len)
    };
    let sigma = params.sigma;
    let mutate =
        |genes: Vec<f64>, rng: &mut dyn RngCore| genome::mutate_probabilities(genes, sigma, rng);
    let reproduce =
        |a: &[f64], b: &[f64], rng: &mut dyn RngCore| genome::uniform_crossover(a, b, rng);
    let optimizer = EvolutionOptimizer::new(
        evaluate,
        mutate,
        reproduce,
        params.survivors,
        params.offspring,
    )
    .with_workers(params.workers);
    info!(
        "optimizing {:?} with {optimizer:?}",
        params.fitness.metrics()
    );

    let mut population = Population::new(vec![Specimen::new(
        genome::to_genes(&base),
        params.fitness.fitness(&initial).into(),
    )]);

    let mut rng = rand::rng();
    for epoch in 0..params.epochs {
        population = optimizer.run_epoch(&population, &mut rng)?;
        eprintln!("EPOCH #{}", epoch + 1);
        print_population(&population);
        if let Some(best) = population.best() {
            info!("epoch {}: best fitness {}", epoch + 1, best.fitness());
        }
    }

    println!();
    println!("========================================");
    println!("======== Results =======================");
    println!("========================================");
    println!();
    for specimen in population.specimens().iter().rev() {
        let options = genome::to_options(specimen.genes(), &base);
        print_result(&evaluator, &options);
    }

    let best = population
        .best()
        .map_or(base, |s| genome::to_options(s.genes(), &base));
    if let Some(path) = &arg.output {
        util::write_json(&best, Some(path.as_path()))?;
        eprintln!("Best options saved to {}", path.display());
        eprintln!("  {best}");
    }

    Ok(())
}

fn print_population(population: &Population) {
    eprintln!("  Specimens:");
    for (i, specimen) in population.specimens().iter().enumerate() {
        eprintln!(
            "  {i:2}: {:.4?} => {}",
            specimen.genes(),
            specimen.fitness()
        );
    }

    let gene_stats = population.compute_gene_stats();
    let column = |f: fn(&DescriptiveStats) -> f64| {
        gene_stats
            .iter()
            .map(|s| s.as_ref().map_or(f64::NAN, f))
            .collect::<Vec<_>>()
    };
    eprintln!("  Gene Stats:");
    eprintln!("    Min:  {:.4?}", column(|s| s.min));
    eprintln!("    Max:  {:.4?}", column(|s| s.max));
    eprintln!("    Mean: {:.4?}", column(|s| s.mean));

    if let Some(stats) = population.compute_fitness_stats() {
        eprintln!("  Fitness Stats: {stats}");
    }
    eprintln!();
}

fn print_result<E>(evaluator: &HistoryEvaluator<'_, E>, options: &EngineOptions)
where
    E: RatingEngine,
{
    println!("Options:");
    print!("{}", OptionsView(options));
    println!();
    match evaluator.compare(options) {
        Ok(table) => print!("{}", TableView(&table)),
        Err(e) => println!("{e}"),
    }
    println!();
}

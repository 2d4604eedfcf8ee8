//! Elitist evolutionary search over real-valued gene vectors.
//!
//! The optimizer knows nothing about what the genes mean. It is built from three
//! injected functions:
//!
//! - `evaluate: &[f64] -> Result<FitnessVector, E>` scores one candidate,
//! - `mutate: (Vec<f64>, rng) -> Vec<f64>` perturbs a candidate,
//! - `reproduce: (&[f64], &[f64], rng) -> Vec<f64>` combines two parents,
//!
//! plus the number of survivors `k` kept after each epoch and the number of
//! offspring produced per epoch.
//!
//! # Epoch
//!
//! 1. **Offspring** - each offspring is a copy of the only member when the
//!    population has exactly one, otherwise the child of two distinct parents
//!    picked uniformly at random. Every offspring is then mutated.
//! 2. **Evaluation** - offspring are scored concurrently on a bounded pool of
//!    worker threads. This is the only parallel step.
//! 3. **Selection** - offspring and the previous population are pooled, sorted
//!    ascending by fitness and truncated to `k`.
//!
//! Each step completes before the next starts, and nothing overlaps between
//! epochs. Because parents compete with their children, the best fitness never
//! gets worse from one epoch to the next.
//!
//! # Fitness
//!
//! A [`FitnessVector`] is compared lexicographically with [`f64::total_cmp`];
//! lower is better. A failing evaluation can be scored as [`FitnessVector::worst`]
//! (all `+inf`) by the caller instead of propagating the error.
//!
//! # Determinism
//!
//! Given deterministic `evaluate`, `mutate` and `reproduce` and a seeded RNG,
//! an epoch is deterministic: evaluation results are reassembled in offspring
//! order before selection, whatever order the workers finish in.

use std::{
    cmp::Ordering,
    error::Error,
    fmt,
    num::NonZeroUsize,
    panic,
    sync::atomic::{self, AtomicUsize},
    thread,
};

use elosim_stats::descriptive::DescriptiveStats;
use log::debug;
use rand::{Rng, RngCore, seq::IndexedRandom as _};

/// Ordered tuple of error metrics, compared lexicographically. Lower is better.
#[derive(Debug, Clone, Default)]
pub struct FitnessVector(Vec<f64>);

impl FitnessVector {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// A fitness worse than any finite one, with `len` components.
    #[must_use]
    pub fn worst(len: usize) -> Self {
        Self(vec![f64::INFINITY; len])
    }

    /// The most significant component.
    #[must_use]
    pub fn primary(&self) -> Option<f64> {
        self.0.first().copied()
    }
}

impl From<Vec<f64>> for FitnessVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl PartialEq for FitnessVector {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FitnessVector {}

impl PartialOrd for FitnessVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FitnessVector {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(&other.0) {
            match a.total_cmp(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl fmt::Display for FitnessVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value:.3}")?;
        }
        f.write_str(")")
    }
}

/// One evaluated candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Specimen {
    genes: Vec<f64>,
    fitness: FitnessVector,
}

impl Specimen {
    #[must_use]
    pub fn new(genes: Vec<f64>, fitness: FitnessVector) -> Self {
        Self { genes, fitness }
    }

    #[must_use]
    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    #[must_use]
    pub fn fitness(&self) -> &FitnessVector {
        &self.fitness
    }
}

/// Evaluated specimens sorted by fitness, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    specimens: Vec<Specimen>,
}

impl Population {
    /// Sorts `specimens` by fitness. Ties keep their input order.
    #[must_use]
    pub fn new(mut specimens: Vec<Specimen>) -> Self {
        specimens.sort_by(|a, b| a.fitness.cmp(&b.fitness));
        Self { specimens }
    }

    #[must_use]
    pub fn specimens(&self) -> &[Specimen] {
        &self.specimens
    }

    #[must_use]
    pub fn best(&self) -> Option<&Specimen> {
        self.specimens.first()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specimens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specimens.is_empty()
    }

    /// Statistics of each gene across the population.
    ///
    /// Returns one entry per gene of the best specimen; `None` entries stand for
    /// genes with no finite value.
    #[must_use]
    pub fn compute_gene_stats(&self) -> Vec<Option<DescriptiveStats>> {
        let gene_count = self.best().map_or(0, |s| s.genes.len());
        (0..gene_count)
            .map(|i| {
                let values = self.specimens.iter().filter_map(|s| s.genes.get(i).copied());
                DescriptiveStats::new(values)
            })
            .collect()
    }

    /// Statistics of the primary fitness component. Penalized (`+inf`) specimens
    /// are counted in [`DescriptiveStats::non_finite`].
    #[must_use]
    pub fn compute_fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.specimens.iter().filter_map(|s| s.fitness.primary()))
    }
}

/// A candidate whose evaluation failed.
#[derive(Debug)]
pub struct SpecimenError<E> {
    pub genes: Vec<f64>,
    pub source: E,
}

impl<E> fmt::Display for SpecimenError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evaluation failed for genes {:.4?}", self.genes)
    }
}

impl<E> Error for SpecimenError<E>
where
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Elitist evolutionary optimizer. See the [module documentation](self).
pub struct EvolutionOptimizer<Ev, Mu, Re> {
    evaluate: Ev,
    mutate: Mu,
    reproduce: Re,
    survivors: usize,
    offspring_count: usize,
    workers: NonZeroUsize,
}

impl<Ev, Mu, Re> fmt::Debug for EvolutionOptimizer<Ev, Mu, Re> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvolutionOptimizer")
            .field("survivors", &self.survivors)
            .field("offspring_count", &self.offspring_count)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl<Ev, Mu, Re> EvolutionOptimizer<Ev, Mu, Re>
where
    Mu: Fn(Vec<f64>, &mut dyn RngCore) -> Vec<f64>,
    Re: Fn(&[f64], &[f64], &mut dyn RngCore) -> Vec<f64>,
{
    /// Creates an optimizer keeping `survivors` specimens and producing
    /// `offspring_count` offspring per epoch, evaluated on a single worker.
    ///
    /// # Panics
    ///
    /// Panics if `survivors` is zero.
    pub fn new(
        evaluate: Ev,
        mutate: Mu,
        reproduce: Re,
        survivors: usize,
        offspring_count: usize,
    ) -> Self {
        assert!(survivors > 0, "at least one survivor is required");
        Self {
            evaluate,
            mutate,
            reproduce,
            survivors,
            offspring_count,
            workers: NonZeroUsize::MIN,
        }
    }

    /// Maximum number of concurrent evaluations.
    #[must_use]
    pub fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = workers;
        self
    }

    /// Evaluates the seed candidates and keeps the best `k` of them.
    pub fn initial_population<E>(
        &self,
        candidates: Vec<Vec<f64>>,
    ) -> Result<Population, SpecimenError<E>>
    where
        Ev: Fn(&[f64]) -> Result<FitnessVector, E> + Sync,
        E: Send,
    {
        let mut population = Population::new(self.evaluate_all(candidates)?);
        population.specimens.truncate(self.survivors);
        Ok(population)
    }

    /// Runs one generate, evaluate, select cycle.
    ///
    /// An empty population stays empty.
    pub fn run_epoch<E, R>(
        &self,
        population: &Population,
        rng: &mut R,
    ) -> Result<Population, SpecimenError<E>>
    where
        Ev: Fn(&[f64]) -> Result<FitnessVector, E> + Sync,
        E: Send,
        R: Rng,
    {
        let offspring = self.breed(population, rng);
        let evaluated = self.evaluate_all(offspring)?;

        let mut pooled = evaluated;
        pooled.extend(population.specimens.iter().cloned());
        let mut next = Population::new(pooled);
        next.specimens.truncate(self.survivors);
        Ok(next)
    }

    fn breed<R>(&self, population: &Population, rng: &mut R) -> Vec<Vec<f64>>
    where
        R: Rng,
    {
        let members = population.specimens();
        if members.is_empty() {
            return vec![];
        }
        (0..self.offspring_count)
            .map(|_| {
                let child = if let [only] = members {
                    only.genes.clone()
                } else {
                    let mut parents = members.choose_multiple(rng, 2);
                    let (Some(a), Some(b)) = (parents.next(), parents.next()) else {
                        unreachable!("population has at least two members");
                    };
                    (self.reproduce)(&a.genes, &b.genes, rng)
                };
                (self.mutate)(child, rng)
            })
            .collect()
    }

    /// Scores `candidates` on at most `workers` threads. The result is in
    /// candidate order; the first failure in that order is returned.
    fn evaluate_all<E>(
        &self,
        candidates: Vec<Vec<f64>>,
    ) -> Result<Vec<Specimen>, SpecimenError<E>>
    where
        Ev: Fn(&[f64]) -> Result<FitnessVector, E> + Sync,
        E: Send,
    {
        let evaluate = &self.evaluate;
        let next = AtomicUsize::new(0);
        let worker_count = self.workers.get().min(candidates.len());
        debug!(
            "evaluating {} candidates on {worker_count} workers",
            candidates.len()
        );

        let finished = thread::scope(|s| {
            let handles = (0..worker_count)
                .map(|_| {
                    s.spawn(|| {
                        let mut done = vec![];
                        loop {
                            let i = next.fetch_add(1, atomic::Ordering::Relaxed);
                            let Some(genes) = candidates.get(i) else {
                                break;
                            };
                            done.push((i, evaluate(genes)));
                        }
                        done
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|p| panic::resume_unwind(p)))
                .collect::<Vec<_>>()
        });

        let mut results = candidates.iter().map(|_| None).collect::<Vec<_>>();
        for (i, result) in finished {
            results[i] = Some(result);
        }
        candidates
            .into_iter()
            .zip(results)
            .map(|(genes, result)| {
                match result.expect("every candidate is claimed by a worker") {
                    Ok(fitness) => Ok(Specimen::new(genes, fitness)),
                    Err(source) => Err(SpecimenError { genes, source }),
                }
            })
            .collect()
    }
}

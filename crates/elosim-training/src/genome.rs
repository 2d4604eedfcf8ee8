//! Engine options as a gene vector, and the operators the optimizer applies to it.
//!
//! Only the three target probabilities are searched. The genes are, in order:
//!
//! | index | field                                |
//! |-------|--------------------------------------|
//! | 0     | `even_match_target_probability`      |
//! | 1     | `advantage_match_target_probability` |
//! | 2     | `pwnage_match_target_probability`    |
//!
//! The integer fields are taken from a base [`EngineOptions`] and never change.

use elosim_model::{EngineOptions, PROBABILITY_RANGE};
use log::warn;
use rand::Rng;
use rand_distr::{Distribution as _, Normal};

use crate::genetic::FitnessVector;

/// Standard deviation of the Gaussian perturbation applied to each gene.
pub const MUTATION_SIGMA: f64 = 0.1;

pub const GENE_COUNT: usize = 3;

#[must_use]
pub fn to_genes(options: &EngineOptions) -> Vec<f64> {
    vec![
        options.even_match_target_probability,
        options.advantage_match_target_probability,
        options.pwnage_match_target_probability,
    ]
}

/// Rebuilds options from `genes`, keeping every other field of `base`.
///
/// # Panics
///
/// Panics if `genes` does not have exactly [`GENE_COUNT`] elements.
#[must_use]
pub fn to_options(genes: &[f64], base: &EngineOptions) -> EngineOptions {
    let &[even, advantage, pwnage] = genes else {
        panic!("expected {GENE_COUNT} genes, got {}", genes.len());
    };
    EngineOptions {
        even_match_target_probability: even,
        advantage_match_target_probability: advantage,
        pwnage_match_target_probability: pwnage,
        ..*base
    }
}

/// Picks each gene from `a` or `b` with equal probability.
///
/// ```
/// use elosim_training::genome;
///
/// let child = genome::uniform_crossover(&[0.5, 0.5], &[0.9, 0.9], &mut rand::rng());
/// assert!(child.iter().all(|g| *g == 0.5 || *g == 0.9));
/// ```
pub fn uniform_crossover<R>(a: &[f64], b: &[f64], rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| if rng.random_bool(0.5) { *x } else { *y })
        .collect()
}

/// Adds `N(0, sigma)` noise to every gene and clamps it to [`PROBABILITY_RANGE`].
///
/// # Panics
///
/// Panics if `sigma` is negative or not finite.
pub fn mutate_probabilities<R>(mut genes: Vec<f64>, sigma: f64, rng: &mut R) -> Vec<f64>
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).expect("sigma must be finite and non-negative");
    for g in &mut genes {
        *g = (*g + normal.sample(rng)).clamp(*PROBABILITY_RANGE.start(), *PROBABILITY_RANGE.end());
    }
    genes
}

/// What to do when a candidate cannot be evaluated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the error and stop the run.
    #[default]
    Abort,
    /// Log a warning and score the candidate as [`FitnessVector::worst`].
    Penalize,
}

impl FailurePolicy {
    /// Applies the policy to one evaluation result. `len` is the number of
    /// fitness components a penalized candidate gets.
    pub fn apply<E>(self, result: Result<FitnessVector, E>, len: usize) -> Result<FitnessVector, E>
    where
        E: std::fmt::Display,
    {
        match (self, result) {
            (Self::Penalize, Err(e)) => {
                warn!("penalizing failed evaluation: {e}");
                Ok(FitnessVector::worst(len))
            }
            (_, result) => result,
        }
    }
}

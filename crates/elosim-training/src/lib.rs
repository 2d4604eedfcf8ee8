//! Evolutionary tuning of rating engine options.
//!
//! # How Tuning Works
//!
//! 1. **Seed** - the base options are evaluated and form the first population
//! 2. **Offspring** - parents are combined gene by gene and mutated
//! 3. **Evaluation** - every offspring runs the rating engine on the same history
//! 4. **Selection** - offspring compete with their parents; the best `k` survive
//! 5. **Repeat** - for a fixed number of epochs
//!
//! # Architecture
//!
//! ```text
//! EvolutionOptimizer (genetic)
//!     ↓ searches
//! Gene vectors (genome: the three target probabilities)
//!     ↓ converted to
//! EngineOptions
//!     ↓ scored by
//! HistoryEvaluator (elosim-evaluator)
//!     ↓ produces
//! FitnessVector
//!     ↓ guides
//! Selection
//! ```
//!
//! [`genetic`] is domain-agnostic: it only sees `Vec<f64>` genes and the three
//! injected functions. [`genome`] holds everything that knows those genes are
//! engine probabilities.
//!
//! # Randomness
//!
//! Parent selection and mutation use whatever RNG the caller passes. The
//! `optimize` command uses an OS-seeded RNG, so search paths differ between runs
//! even when the match history is identical.

pub mod genetic;
pub mod genome;

//! Scoring of rating engine output against ground truth.
//!
//! This crate turns "what the engine computed" into "how wrong was it":
//!
//! ```text
//! EngineOptions
//!     ↓ evaluated by
//! RatingEngine (elosim-rating)
//!     ↓ computed ratings
//! ComparisonTable (true vs computed, ranks, normalized values)
//!     ↓ reduced by
//! FitnessSpec (selected metrics)
//!     ↓ produces
//! Fitness vector (lower is better)
//! ```
//!
//! - [`comparison`] - per-player rows, ranking and aggregate error metrics
//! - [`fitness`] - which metrics form the fitness vector
//! - [`history_evaluator`] - the fitness function used by the optimizer

pub mod comparison;
pub mod fitness;
pub mod history_evaluator;

//! Client side of the external rating engine.
//!
//! The rating engine computes Elo ratings from a match history. This crate treats
//! it as a black box behind the [`RatingEngine`] capability:
//!
//! - [`ProcessRatingEngine`] runs the engine executable once per evaluation,
//!   writing the history JSON to its standard input and passing the options file
//!   path as `--options-file <path>`.
//! - [`InMemoryRatingEngine`] computes ratings with a closure, for exercising the
//!   comparison and optimizer logic without the real engine.
//!
//! # Output contract
//!
//! The engine prints one `<name> <elo>` record per line. Lines with any other
//! shape are ignored (see [`output::parse_engine_output`]). A non-zero exit
//! status makes the whole output untrusted.
//!
//! # Failure handling
//!
//! Clients never retry. Every failure is reported as a [`RatingEngineError`] and
//! the caller decides whether it aborts the run.

use std::{collections::HashMap, fmt, io, path::PathBuf, process::ExitStatus, time::Duration};

use elosim_model::{EngineOptions, MatchHistory};

pub use self::{in_memory::InMemoryRatingEngine, process::ProcessRatingEngine};

pub mod in_memory;
pub mod output;
pub mod process;

/// Computed Elo per player name.
pub type Ratings = HashMap<String, i64>;

/// Capability to compute ratings from a match history.
pub trait RatingEngine: fmt::Debug + Send + Sync {
    /// Computes ratings for the players appearing in `history`.
    ///
    /// Players absent from the result have no computed rating; that alone is not
    /// an error.
    fn evaluate(
        &self,
        history: &MatchHistory,
        options: &EngineOptions,
    ) -> Result<Ratings, RatingEngineError>;
}

impl<T> RatingEngine for &T
where
    T: RatingEngine + ?Sized,
{
    fn evaluate(
        &self,
        history: &MatchHistory,
        options: &EngineOptions,
    ) -> Result<Ratings, RatingEngineError> {
        (**self).evaluate(history, options)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RatingEngineError {
    #[display("rating engine executable not found: {}", path.display())]
    NotFound { path: PathBuf, source: io::Error },
    #[display("failed to start rating engine {}: {source}", path.display())]
    Spawn { path: PathBuf, source: io::Error },
    #[display("rating engine exited with {status}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    Execution {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    #[display("rating engine did not finish within {timeout:?}")]
    Timeout { timeout: Duration },
    #[display("rating engine produced no output")]
    EmptyOutput,
    #[display("failed to serialize rating engine input: {source}")]
    Serialize { source: serde_json::Error },
    #[display("I/O error while {action}: {source}")]
    Io {
        action: &'static str,
        source: io::Error,
    },
}

impl RatingEngineError {
    /// Returns `true` if the engine could not even be started.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

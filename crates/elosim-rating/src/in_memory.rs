use std::fmt;

use elosim_model::{EngineOptions, MatchHistory};

use crate::{RatingEngine, RatingEngineError, Ratings};

/// Rating engine computing ratings in-process with a closure.
///
/// ```
/// use elosim_model::{EngineOptions, MatchHistory};
/// use elosim_rating::{InMemoryRatingEngine, RatingEngine as _, Ratings};
///
/// let engine = InMemoryRatingEngine::new(|_: &MatchHistory, _: &EngineOptions| {
///     Ok(Ratings::from([("Player-1".to_owned(), 1532)]))
/// });
/// let ratings = engine
///     .evaluate(&MatchHistory::new("DotA 2"), &EngineOptions::default())
///     .unwrap();
/// assert_eq!(ratings["Player-1"], 1532);
/// ```
pub struct InMemoryRatingEngine<F> {
    compute: F,
}

impl<F> fmt::Debug for InMemoryRatingEngine<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRatingEngine").finish_non_exhaustive()
    }
}

impl<F> InMemoryRatingEngine<F>
where
    F: Fn(&MatchHistory, &EngineOptions) -> Result<Ratings, RatingEngineError> + Send + Sync,
{
    pub fn new(compute: F) -> Self {
        Self { compute }
    }
}

/// An engine that always answers with `ratings`, whatever the input.
#[must_use]
pub fn fixed(ratings: Ratings) -> impl RatingEngine {
    InMemoryRatingEngine::new(move |_: &MatchHistory, _: &EngineOptions| Ok(ratings.clone()))
}

impl<F> RatingEngine for InMemoryRatingEngine<F>
where
    F: Fn(&MatchHistory, &EngineOptions) -> Result<Ratings, RatingEngineError> + Send + Sync,
{
    fn evaluate(
        &self,
        history: &MatchHistory,
        options: &EngineOptions,
    ) -> Result<Ratings, RatingEngineError> {
        (self.compute)(history, options)
    }
}

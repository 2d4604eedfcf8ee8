//! Evaluation of engine options against one fixed match history.

use elosim_model::{EngineOptions, MatchHistory, PlayerPool};
use elosim_rating::{RatingEngine, RatingEngineError};
use log::debug;

use crate::{comparison::ComparisonTable, fitness::FitnessSpec};

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("failed to evaluate options {options}: {source}")]
pub struct EvaluationError {
    pub options: EngineOptions,
    pub source: RatingEngineError,
}

/// Scores engine options by running the engine on a fixed history.
///
/// The pool and history are shared read-only, so one evaluator can serve many
/// concurrent evaluations.
#[derive(Debug)]
pub struct HistoryEvaluator<'a, E> {
    pool: &'a PlayerPool,
    history: &'a MatchHistory,
    engine: &'a E,
}

impl<E> Clone for HistoryEvaluator<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for HistoryEvaluator<'_, E> {}

impl<'a, E> HistoryEvaluator<'a, E>
where
    E: RatingEngine,
{
    #[must_use]
    pub fn new(pool: &'a PlayerPool, history: &'a MatchHistory, engine: &'a E) -> Self {
        Self {
            pool,
            history,
            engine,
        }
    }

    /// Runs the engine with `options` and compares its output with the pool.
    pub fn compare(&self, options: &EngineOptions) -> Result<ComparisonTable, EvaluationError> {
        debug!("evaluating {options}");
        let ratings = self
            .engine
            .evaluate(self.history, options)
            .map_err(|source| EvaluationError {
                options: *options,
                source,
            })?;
        Ok(ComparisonTable::build(self.pool, &ratings))
    }

    /// Fitness vector of `options` under `spec`. Lower is better.
    pub fn fitness(
        &self,
        options: &EngineOptions,
        spec: &FitnessSpec,
    ) -> Result<Vec<f64>, EvaluationError> {
        let table = self.compare(options)?;
        Ok(spec.fitness(&table))
    }
}

#[cfg(test)]
mod tests {
    use elosim_model::Player;
    use elosim_rating::{InMemoryRatingEngine, Ratings};

    use super::*;

    fn pool() -> PlayerPool {
        PlayerPool::new(vec![
            Player::new("A", 1000),
            Player::new("B", 2000),
            Player::new("C", 3000),
        ])
        .unwrap()
    }

    /// Spreads ratings around 2000 proportionally to the even-match probability.
    fn spread_engine() -> impl RatingEngine {
        InMemoryRatingEngine::new(|_: &MatchHistory, options: &EngineOptions| {
            #[expect(clippy::cast_possible_truncation)]
            let step = (options.even_match_target_probability * 1000.0).round() as i64;
            Ok(Ratings::from([
                ("A".to_owned(), 2000 - step),
                ("B".to_owned(), 2000),
                ("C".to_owned(), 2000 + step),
            ]))
        })
    }

    #[test]
    fn compare_builds_table_from_engine_output() {
        let pool = pool();
        let history = MatchHistory::new("test");
        let engine = spread_engine();
        let evaluator = HistoryEvaluator::new(&pool, &history, &engine);

        let options = EngineOptions {
            even_match_target_probability: 1.0,
            ..EngineOptions::default()
        };
        let table = evaluator.compare(&options).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.average_diff().abs() < f64::EPSILON);
        assert!(table.mae_of_ranks().abs() < f64::EPSILON);
    }

    #[test]
    fn better_options_have_lower_fitness() {
        let pool = pool();
        let history = MatchHistory::new("test");
        let engine = spread_engine();
        let evaluator = HistoryEvaluator::new(&pool, &history, &engine);
        let spec = FitnessSpec::default();

        let exact = EngineOptions {
            even_match_target_probability: 1.0,
            ..EngineOptions::default()
        };
        let compressed = EngineOptions {
            even_match_target_probability: 0.5,
            ..EngineOptions::default()
        };
        let exact = evaluator.fitness(&exact, &spec).unwrap();
        let compressed = evaluator.fitness(&compressed, &spec).unwrap();
        assert_eq!(exact, [0.0]);
        assert!(compressed[0] > exact[0]);
    }

    #[test]
    fn engine_failure_names_the_options() {
        let pool = pool();
        let history = MatchHistory::new("test");
        let engine = InMemoryRatingEngine::new(|_: &MatchHistory, _: &EngineOptions| {
            Err(RatingEngineError::EmptyOutput)
        });
        let evaluator = HistoryEvaluator::new(&pool, &history, &engine);

        let err = evaluator.compare(&EngineOptions::default()).unwrap_err();
        assert!(matches!(err.source, RatingEngineError::EmptyOutput));
        assert!(err.to_string().contains("evenMatchTargetProbability: 0.7500"));
    }
}

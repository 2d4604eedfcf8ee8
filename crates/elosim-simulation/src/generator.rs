//! Match history generation from a pairwise win-probability model.
//!
//! Every round shuffles the pool, splits the first `2 * floor(N / 2)` names into two
//! equal teams, sums each team's true Elo and lets team 1 win with the logistic Elo
//! probability
//!
//! ```text
//! P1 = 1 / (1 + 10^((elo2 - elo1) / 400))
//! ```
//!
//! A single uniform roll `r` decides the match: team 1 wins iff `r < P1`.
//!
//! Per round the RNG is consumed in a fixed order (shuffle, roll, duration) so the
//! produced history depends only on the RNG state.

use chrono::{DateTime, TimeDelta, Utc};
use elosim_model::{
    DEFAULT_GAME, MatchEntry, MatchHistory, MatchMetadata, MatchOutcomeScale, PlayerPool,
};
use log::debug;
use rand::{Rng, seq::SliceRandom as _};

/// Default number of generated matches.
pub const MATCH_COUNT: usize = 200;

/// Inclusive range of generated match durations, in seconds (30 to 60 minutes).
pub const DURATION_SECS: std::ops::RangeInclusive<u32> = 1800..=3600;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("at least 2 players are required to form a match, got {player_count}")]
pub struct InsufficientPlayersError {
    pub player_count: usize,
}

/// Probability that a team with summed Elo `elo1` beats a team with summed Elo `elo2`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn win_probability(elo1: i64, elo2: i64) -> f64 {
    1.0 / (1.0 + 10f64.powf((elo2 - elo1) as f64 / 400.0))
}

/// Decides which [`MatchOutcomeScale`] a generated match is labeled with.
///
/// Neither policy draws additional random numbers, so switching policies never
/// changes who wins a generated match.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum ScalePolicy {
    /// Every match is labeled [`MatchOutcomeScale::Even`].
    #[default]
    AlwaysEven,
    /// Only a favored winner (win probability above 0.5) can score a larger win:
    /// `Advantage` when its winner-relative roll is below `advantage`, `Pwnage`
    /// when it is below `pwnage`.
    RollThresholds { advantage: f64, pwnage: f64 },
}

impl ScalePolicy {
    /// Thresholds used by historical versions of the generator.
    pub const ROLL_THRESHOLDS: Self = Self::RollThresholds {
        advantage: 0.2,
        pwnage: 0.1,
    };

    #[must_use]
    pub fn scale(self, prob_winner_wins: f64, winner_roll: f64) -> MatchOutcomeScale {
        match self {
            Self::AlwaysEven => MatchOutcomeScale::Even,
            Self::RollThresholds { advantage, pwnage } => {
                if prob_winner_wins <= 0.5 {
                    MatchOutcomeScale::Even
                } else if winner_roll < pwnage {
                    MatchOutcomeScale::Pwnage
                } else if winner_roll < advantage {
                    MatchOutcomeScale::Advantage
                } else {
                    MatchOutcomeScale::Even
                }
            }
        }
    }
}

/// Produces synthetic match histories for a fixed player pool.
#[derive(Debug, Clone)]
pub struct MatchHistoryGenerator<'a> {
    pool: &'a PlayerPool,
    start_time: DateTime<Utc>,
    scale_policy: ScalePolicy,
}

impl<'a> MatchHistoryGenerator<'a> {
    /// Creates a generator starting at the current time.
    ///
    /// Fails if the pool can never form a match.
    pub fn new(pool: &'a PlayerPool) -> Result<Self, InsufficientPlayersError> {
        if pool.len() < 2 {
            return Err(InsufficientPlayersError {
                player_count: pool.len(),
            });
        }
        Ok(Self {
            pool,
            start_time: Utc::now(),
            scale_policy: ScalePolicy::default(),
        })
    }

    /// Sets the timestamp of the first entry. Later entries follow one hour apart.
    #[must_use]
    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    #[must_use]
    pub fn with_scale_policy(mut self, scale_policy: ScalePolicy) -> Self {
        self.scale_policy = scale_policy;
        self
    }

    /// Generates exactly `match_count` entries.
    ///
    /// Rounds that cannot form two non-empty teams are skipped and do not count.
    pub fn generate<R>(&self, match_count: usize, rng: &mut R) -> MatchHistory
    where
        R: Rng + ?Sized,
    {
        let mut names = self.pool.names().map(str::to_owned).collect::<Vec<_>>();
        let mut history = MatchHistory::new(DEFAULT_GAME);
        history.entries.reserve(match_count);
        let mut timestamp = self.start_time;

        while history.len() < match_count {
            names.shuffle(rng);
            let Some(entry) = self.play_round(&names, timestamp, rng) else {
                continue;
            };
            history.entries.push(entry);
            timestamp += TimeDelta::hours(1);
        }

        debug!(
            "Generated {} matches for {} players",
            history.len(),
            self.pool.len()
        );
        history
    }

    fn play_round<R>(
        &self,
        shuffled: &[String],
        timestamp: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<MatchEntry>
    where
        R: Rng + ?Sized,
    {
        let team_size = shuffled.len() / 2;
        if team_size < 1 {
            return None;
        }
        let (team1, rest) = shuffled.split_at(team_size);
        let team2 = &rest[..team_size];

        let team1_elo = self.team_elo(team1);
        let team2_elo = self.team_elo(team2);
        let prob_team1_wins = win_probability(team1_elo, team2_elo);

        let roll = rng.random::<f64>();
        let (winner, loser, prob_winner_wins, winner_roll, winner_elo, loser_elo) =
            if roll < prob_team1_wins {
                (team1, team2, prob_team1_wins, roll, team1_elo, team2_elo)
            } else {
                (
                    team2,
                    team1,
                    1.0 - prob_team1_wins,
                    1.0 - roll,
                    team2_elo,
                    team1_elo,
                )
            };

        Some(MatchEntry {
            timestamp,
            winner: winner.to_vec(),
            loser: loser.to_vec(),
            scale: self.scale_policy.scale(prob_winner_wins, winner_roll),
            duration: rng.random_range(DURATION_SECS),
            metadata: Some(MatchMetadata {
                roll,
                prob_winner_wins,
                winner_elo,
                loser_elo,
                winner_roll,
            }),
        })
    }

    fn team_elo(&self, team: &[String]) -> i64 {
        team.iter()
            .filter_map(|name| self.pool.get(name))
            .map(|p| p.true_elo)
            .sum()
    }
}

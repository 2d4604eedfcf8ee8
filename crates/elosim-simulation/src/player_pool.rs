use std::ops::RangeInclusive;

use elosim_model::{Player, PlayerPool};
use rand::Rng;

/// Default number of simulated players.
pub const PLAYER_COUNT: usize = 10;
/// Lowest true Elo a generated player can have.
pub const ELO_MIN: i64 = 500;
/// Highest true Elo a generated player can have.
pub const ELO_MAX: i64 = 4000;

/// Generates `count` players named `Player-1 ..= Player-{count}`.
///
/// Each true Elo is drawn uniformly from `elo_range` (inclusive).
pub fn generate<R>(rng: &mut R, count: usize, elo_range: RangeInclusive<i64>) -> PlayerPool
where
    R: Rng + ?Sized,
{
    let players = (0..count)
        .map(|i| {
            Player::new(
                format!("Player-{}", i + 1),
                rng.random_range(elo_range.clone()),
            )
        })
        .collect();
    PlayerPool::new(players).expect("generated player names are unique")
}

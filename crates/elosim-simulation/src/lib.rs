//! Synthetic population and match history generation.
//!
//! The simulation phase of a run is fully reproducible: a single seeded
//! [`Pcg32`](rand_pcg::Pcg32) drives first the player pool and then the match
//! history, so `(seed, player count, match count, start time)` determines every
//! byte the rating engine will later see.
//!
//! ```
//! use chrono::{TimeZone as _, Utc};
//! use elosim_simulation::{MatchHistoryGenerator, player_pool, seeded_rng};
//!
//! let mut rng = seeded_rng(42);
//! let pool = player_pool::generate(&mut rng, 10, 500..=4000);
//! let history = MatchHistoryGenerator::new(&pool)
//!     .unwrap()
//!     .with_start_time(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
//!     .generate(200, &mut rng);
//! assert_eq!(history.len(), 200);
//! ```

use rand::SeedableRng as _;
use rand_pcg::Pcg32;

pub use self::generator::*;

pub mod generator;
pub mod player_pool;

/// Default seed of the simulation phase.
pub const DEFAULT_SEED: u64 = 42;

/// Creates the deterministic RNG used for the simulation phase.
#[must_use]
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

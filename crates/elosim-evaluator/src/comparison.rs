//! Comparison of computed ratings against true ratings.
//!
//! # Ranking
//!
//! Ranks are dense `1..=N` positions, 1 being the highest rating. They come from
//! two independent stable sorts, descending by real Elo and then descending by
//! calculated Elo:
//!
//! - rows enter the table in pool order, so real-rank ties keep pool order;
//! - the calculated sort starts from real-rank order, so calculated-rank ties go
//!   to the player with the better real rank.
//!
//! After ranking, rows are kept in real-rank order. [`ComparisonTable::mae_of_deltas`]
//! depends on this order.
//!
//! # Normalization
//!
//! Each axis is shifted so that its minimum becomes 0, which compares the spread of
//! ratings independently of their absolute offset.
//!
//! # Metrics
//!
//! | metric                      | definition                                           |
//! |-----------------------------|------------------------------------------------------|
//! | `average_diff`              | mean `abs(calculated - real)`                        |
//! | `average_diff_normalized`   | mean `abs(calculated_norm - real_norm)`              |
//! | `mae_of_ranks`              | mean `abs(real_rank - calculated_rank)`              |
//! | `mae_of_deltas`             | mean `abs` difference of successive `-elo` deltas    |
//!
//! All metrics are 0 for an empty table; `mae_of_deltas` is also 0 for a single row.
//!
//! Differences are computed in `i128` and normalized values are `u64`, so any pair
//! of `i64` ratings is representable.

use elosim_model::PlayerPool;
use elosim_rating::Ratings;
use log::warn;
use serde::Serialize;

/// One player's true and computed rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub player_name: String,
    pub real_elo: i64,
    pub calculated_elo: i64,
    pub real_rank: usize,
    pub calculated_rank: usize,
    pub real_elo_normalized: u64,
    pub calculated_elo_normalized: u64,
}

impl Row {
    fn unranked(player_name: String, real_elo: i64, calculated_elo: i64) -> Self {
        Self {
            player_name,
            real_elo,
            calculated_elo,
            real_rank: 0,
            calculated_rank: 0,
            real_elo_normalized: 0,
            calculated_elo_normalized: 0,
        }
    }

    #[must_use]
    pub fn diff(&self) -> i128 {
        i128::from(self.calculated_elo) - i128::from(self.real_elo)
    }

    #[must_use]
    pub fn diff_normalized(&self) -> i128 {
        i128::from(self.calculated_elo_normalized) - i128::from(self.real_elo_normalized)
    }
}

/// Ranked comparison of true and computed ratings.
///
/// Built once per evaluation and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonTable {
    rows: Vec<Row>,
    missing: Vec<String>,
}

impl ComparisonTable {
    /// Compares the pool's true ratings with `computed`.
    ///
    /// Players without a computed rating are excluded from the table; their names
    /// are kept in [`Self::missing`].
    #[must_use]
    pub fn build(pool: &PlayerPool, computed: &Ratings) -> Self {
        let mut missing = vec![];
        let rows = pool
            .players()
            .iter()
            .filter_map(|player| {
                if let Some(&calculated) = computed.get(&player.name) {
                    Some((player.name.clone(), player.true_elo, calculated))
                } else {
                    warn!(
                        "no computed rating for {}, excluding it from the comparison",
                        player.name
                    );
                    missing.push(player.name.clone());
                    None
                }
            })
            .collect::<Vec<_>>();
        let mut table = Self::from_ratings(rows);
        table.missing = missing;
        table
    }

    /// Builds a table from `(name, real_elo, calculated_elo)` triples, in that order.
    #[must_use]
    pub fn from_ratings<I, S>(ratings: I) -> Self
    where
        I: IntoIterator<Item = (S, i64, i64)>,
        S: Into<String>,
    {
        let mut rows = ratings
            .into_iter()
            .map(|(name, real, calculated)| Row::unranked(name.into(), real, calculated))
            .collect::<Vec<_>>();
        rank_rows(&mut rows);
        Self {
            rows,
            missing: vec![],
        }
    }

    /// Rows in real-rank order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Pool players that had no computed rating.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn average_diff(&self) -> f64 {
        mean(self.rows.iter().map(|row| row.diff().unsigned_abs()))
    }

    #[must_use]
    pub fn average_diff_normalized(&self) -> f64 {
        mean(self.rows.iter().map(|row| row.diff_normalized().unsigned_abs()))
    }

    #[must_use]
    pub fn mae_of_ranks(&self) -> f64 {
        mean(
            self.rows
                .iter()
                .map(|row| row.real_rank.abs_diff(row.calculated_rank) as u128),
        )
    }

    /// How well the spacing between neighbours (in real-rank order) is reproduced.
    #[must_use]
    pub fn mae_of_deltas(&self) -> f64 {
        let real = deltas(self.rows.iter().map(|row| -i128::from(row.real_elo)));
        let calculated = deltas(self.rows.iter().map(|row| -i128::from(row.calculated_elo)));
        mean(
            real.iter()
                .zip(&calculated)
                .map(|(r, c)| (r - c).unsigned_abs()),
        )
    }
}

fn rank_rows(rows: &mut [Row]) {
    rows.sort_by(|a, b| b.real_elo.cmp(&a.real_elo));
    for (i, row) in rows.iter_mut().enumerate() {
        row.real_rank = i + 1;
    }

    rows.sort_by(|a, b| b.calculated_elo.cmp(&a.calculated_elo));
    for (i, row) in rows.iter_mut().enumerate() {
        row.calculated_rank = i + 1;
    }

    let min_real = rows.iter().map(|row| row.real_elo).min().unwrap_or_default();
    let min_calculated = rows
        .iter()
        .map(|row| row.calculated_elo)
        .min()
        .unwrap_or_default();
    for row in rows.iter_mut() {
        row.real_elo_normalized = row.real_elo.abs_diff(min_real);
        row.calculated_elo_normalized = row.calculated_elo.abs_diff(min_calculated);
    }

    rows.sort_by_key(|row| row.real_rank);
}

fn deltas<I>(values: I) -> Vec<i128>
where
    I: IntoIterator<Item = i128>,
{
    let values = values.into_iter().collect::<Vec<_>>();
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

#[expect(clippy::cast_precision_loss)]
fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = u128>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0_u128, 0_usize), |(sum, count), v| (sum.saturating_add(v), count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use elosim_model::Player;

    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    fn is_permutation(ranks: impl Iterator<Item = usize>, n: usize) -> bool {
        let mut ranks = ranks.collect::<Vec<_>>();
        ranks.sort_unstable();
        ranks == (1..=n).collect::<Vec<_>>()
    }

    #[test]
    fn ranks_and_normalization() {
        let table = ComparisonTable::from_ratings([
            ("A", 1000, 1100),
            ("B", 3000, 2500),
            ("C", 2000, 2700),
        ]);
        let names = table
            .rows()
            .iter()
            .map(|r| r.player_name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["B", "C", "A"]);

        let b = &table.rows()[0];
        assert_eq!((b.real_rank, b.calculated_rank), (1, 2));
        assert_eq!((b.real_elo_normalized, b.calculated_elo_normalized), (2000, 1400));
        let c = &table.rows()[1];
        assert_eq!((c.real_rank, c.calculated_rank), (2, 1));
        let a = &table.rows()[2];
        assert_eq!((a.real_elo_normalized, a.calculated_elo_normalized), (0, 0));

        assert!(is_permutation(table.rows().iter().map(|r| r.real_rank), 3));
        assert!(is_permutation(table.rows().iter().map(|r| r.calculated_rank), 3));
    }

    #[test]
    fn metrics() {
        let table = ComparisonTable::from_ratings([
            ("A", 1000, 1100),
            ("B", 3000, 2500),
            ("C", 2000, 2700),
        ]);
        // diffs: B -500, C +700, A +100
        assert_close(table.average_diff(), 1300.0 / 3.0);
        // normalized diffs: B 1400-2000, C 1600-1000, A 0-0
        assert_close(table.average_diff_normalized(), 1200.0 / 3.0);
        // rank diffs: B 1-2, C 2-1, A 3-3
        assert_close(table.mae_of_ranks(), 2.0 / 3.0);
        // real -elo: -3000, -2000, -1000 => deltas 1000, 1000
        // calc -elo: -2500, -2700, -1100 => deltas -200, 1600
        assert_close(table.mae_of_deltas(), (1200.0 + 600.0) / 2.0);
    }

    #[test]
    fn perfect_reconstruction() {
        let table =
            ComparisonTable::from_ratings([("A", 1200, 1200), ("B", 900, 900), ("C", 2100, 2100)]);
        assert_close(table.average_diff(), 0.0);
        assert_close(table.average_diff_normalized(), 0.0);
        assert_close(table.mae_of_ranks(), 0.0);
        assert_close(table.mae_of_deltas(), 0.0);
    }

    #[test]
    fn constant_offset_only_affects_absolute_diff() {
        let table =
            ComparisonTable::from_ratings([("A", 1200, 1300), ("B", 900, 1000), ("C", 2100, 2200)]);
        assert_close(table.average_diff(), 100.0);
        assert_close(table.average_diff_normalized(), 0.0);
        assert_close(table.mae_of_ranks(), 0.0);
        assert_close(table.mae_of_deltas(), 0.0);
    }

    #[test]
    fn ties_are_broken_by_entry_then_real_rank() {
        let table = ComparisonTable::from_ratings([
            ("A", 1500, 1000),
            ("B", 1500, 1000),
            ("C", 1000, 1000),
        ]);
        let ranks = table
            .rows()
            .iter()
            .map(|r| (r.player_name.as_str(), r.real_rank, r.calculated_rank))
            .collect::<Vec<_>>();
        assert_eq!(ranks, [("A", 1, 1), ("B", 2, 2), ("C", 3, 3)]);
    }

    #[test]
    fn empty_and_single_row_tables() {
        let empty = ComparisonTable::from_ratings(Vec::<(String, i64, i64)>::new());
        assert!(empty.is_empty());
        assert_close(empty.average_diff(), 0.0);
        assert_close(empty.average_diff_normalized(), 0.0);
        assert_close(empty.mae_of_ranks(), 0.0);
        assert_close(empty.mae_of_deltas(), 0.0);

        let single = ComparisonTable::from_ratings([("A", 1500, 1400)]);
        assert_close(single.average_diff(), 100.0);
        assert_close(single.mae_of_deltas(), 0.0);
        assert_eq!(single.rows()[0].real_elo_normalized, 0);
        assert_eq!(single.rows()[0].calculated_elo_normalized, 0);
    }

    #[test]
    #[expect(clippy::cast_precision_loss)]
    fn extreme_calculated_ratings() {
        let table = ComparisonTable::from_ratings([
            ("A", 1000, i64::MIN),
            ("B", 2000, 1500),
            ("C", 3000, i64::MAX),
        ]);
        let c = &table.rows()[0];
        assert_eq!(c.calculated_elo_normalized, u64::MAX);
        assert_eq!(c.diff(), i128::from(i64::MAX) - 3000);
        let a = &table.rows()[2];
        assert_eq!(a.calculated_elo_normalized, 0);
        assert_eq!(a.diff(), i128::from(i64::MIN) - 1000);

        assert!(table.average_diff().is_finite());
        assert!(table.average_diff_normalized() > 0.0);
        assert_close(table.mae_of_ranks(), 0.0);
        // real -elo: -3000, -2000, -1000 => deltas 1000, 1000
        // calc -elo: -MAX, -1500, MAX+1 => deltas MAX-1500, MAX+1501
        let expected = (2 * i128::from(i64::MAX) - 1999) as f64 / 2.0;
        assert_close(table.mae_of_deltas() / expected, 1.0);
    }

    #[test]
    fn build_excludes_players_without_result() {
        let pool = PlayerPool::new(vec![
            Player::new("A", 1000),
            Player::new("B", 1000),
            Player::new("C", 2000),
            Player::new("D", 2000),
        ])
        .unwrap();
        let computed = Ratings::from([
            ("A".to_owned(), 900),
            ("C".to_owned(), 2100),
            ("D".to_owned(), 1900),
            ("Stranger".to_owned(), 5000),
        ]);
        let table = ComparisonTable::build(&pool, &computed);
        assert_eq!(table.len(), 3);
        assert_eq!(table.missing(), ["B"]);
        assert!(table.rows().iter().all(|r| r.player_name != "Stranger"));
        assert!(is_permutation(table.rows().iter().map(|r| r.real_rank), 3));
        assert_eq!(
            table.rows().iter().map(|r| r.real_elo_normalized).min(),
            Some(0)
        );
        assert_eq!(
            table.rows().iter().map(|r| r.calculated_elo_normalized).min(),
            Some(0)
        );
    }
}

//! Selection of the metrics that form a fitness vector.

use std::{fmt, str::FromStr};

use crate::comparison::ComparisonTable;

/// One scalar error metric of a [`ComparisonTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitnessMetric {
    AverageDiff,
    AverageDiffNormalized,
    MaeOfRanks,
    MaeOfDeltas,
}

impl FitnessMetric {
    pub const ALL: [Self; 4] = [
        Self::AverageDiff,
        Self::AverageDiffNormalized,
        Self::MaeOfRanks,
        Self::MaeOfDeltas,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AverageDiff => "average-diff",
            Self::AverageDiffNormalized => "average-diff-normalized",
            Self::MaeOfRanks => "mae-of-ranks",
            Self::MaeOfDeltas => "mae-of-deltas",
        }
    }

    #[must_use]
    pub fn measure(self, table: &ComparisonTable) -> f64 {
        match self {
            Self::AverageDiff => table.average_diff(),
            Self::AverageDiffNormalized => table.average_diff_normalized(),
            Self::MaeOfRanks => table.mae_of_ranks(),
            Self::MaeOfDeltas => table.mae_of_deltas(),
        }
    }
}

impl fmt::Display for FitnessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown fitness metric '{name}' (expected one of: average-diff, average-diff-normalized, mae-of-ranks, mae-of-deltas)")]
pub struct ParseFitnessMetricError {
    pub name: String,
}

impl FromStr for FitnessMetric {
    type Err = ParseFitnessMetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFitnessMetricError { name: s.to_owned() })
    }
}

/// Ordered list of metrics compared lexicographically, lower is better.
///
/// The default is `[average-diff-normalized]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitnessSpec {
    metrics: Vec<FitnessMetric>,
}

impl Default for FitnessSpec {
    fn default() -> Self {
        Self {
            metrics: vec![FitnessMetric::AverageDiffNormalized],
        }
    }
}

impl FitnessSpec {
    /// Uses `metrics` in the given priority order. An empty list selects the default.
    #[must_use]
    pub fn new(metrics: Vec<FitnessMetric>) -> Self {
        if metrics.is_empty() {
            Self::default()
        } else {
            Self { metrics }
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &[FitnessMetric] {
        &self.metrics
    }

    #[must_use]
    pub fn fitness(&self, table: &ComparisonTable) -> Vec<f64> {
        self.metrics.iter().map(|m| m.measure(table)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_metric_names() {
        assert_eq!(
            "mae-of-ranks".parse::<FitnessMetric>().unwrap(),
            FitnessMetric::MaeOfRanks
        );
        assert_eq!(
            " Average-Diff ".parse::<FitnessMetric>().unwrap(),
            FitnessMetric::AverageDiff
        );
        for metric in FitnessMetric::ALL {
            assert_eq!(metric.to_string().parse::<FitnessMetric>().unwrap(), metric);
        }
        assert!("rmse".parse::<FitnessMetric>().is_err());
    }

    #[test]
    fn fitness_follows_metric_order() {
        let table = ComparisonTable::from_ratings([("A", 1000, 1200), ("B", 2000, 1900)]);
        let spec = FitnessSpec::new(vec![FitnessMetric::MaeOfRanks, FitnessMetric::AverageDiff]);
        assert_eq!(spec.fitness(&table), [0.0, 150.0]);
    }

    #[test]
    fn empty_spec_falls_back_to_default() {
        assert_eq!(FitnessSpec::new(vec![]), FitnessSpec::default());
        assert_eq!(
            FitnessSpec::default().metrics(),
            [FitnessMetric::AverageDiffNormalized]
        );
    }
}

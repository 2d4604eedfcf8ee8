use std::fmt;

/// Descriptive statistics of a set of `f64` values.
///
/// Non-finite values are excluded before anything is computed, so a population
/// containing penalized (`+inf`) members still gets a meaningful summary. The
/// number of excluded values is kept in [`DescriptiveStats::non_finite`].
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub non_finite: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Upper median for even-sized inputs.
    pub median: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes statistics from unsorted values.
    ///
    /// Returns `None` if there is no finite value.
    ///
    /// ```
    /// # use elosim_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, f64::INFINITY, 1.0]).unwrap();
    /// assert_eq!(stats.count, 3);
    /// assert_eq!(stats.non_finite, 1);
    /// assert_eq!(stats.max, 5.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut non_finite = 0;
        let mut finite = values
            .into_iter()
            .filter(|v| {
                let keep = v.is_finite();
                non_finite += usize::from(!keep);
                keep
            })
            .collect::<Vec<_>>();
        finite.sort_by(f64::total_cmp);
        let mut stats = Self::from_sorted(&finite)?;
        stats.non_finite = non_finite;
        Some(stats)
    }

    /// Computes statistics from finite values sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = sorted_values[count / 2];
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            non_finite: 0,
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

impl fmt::Display for DescriptiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={:.2} median={:.2} mean={:.2} max={:.2} sd={:.2}",
            self.min, self.median, self.mean, self.max, self.std_dev
        )?;
        if self.non_finite > 0 {
            write!(f, " ({} failed)", self.non_finite)?;
        }
        Ok(())
    }
}

//! Summary statistics used to report optimizer progress.
//!
//! ```
//! use elosim_stats::descriptive::DescriptiveStats;
//!
//! let values = [3.0, 1.0, 2.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.median, 2.0);
//! ```

pub mod descriptive;

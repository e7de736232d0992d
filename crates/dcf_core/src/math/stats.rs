//! Summary statistics for simulated distributions.

use serde::{Deserialize, Serialize};

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Percentile of an ascending slice, `q` in `[0, 1]`.
///
/// Interpolates linearly between the closest ranks, so `q = 0.5` of an
/// even-length slice is the average of the two middle values. Returns NaN
/// for an empty slice.
///
/// # Examples
///
/// ```
/// use dcf_core::math::stats::percentile;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile(&sorted, 0.5), 2.5);
/// assert_eq!(percentile(&sorted, 1.0), 4.0);
/// ```
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Location and spread of a sample distribution.
///
/// # Examples
///
/// ```
/// use dcf_core::math::DistributionSummary;
///
/// let summary = DistributionSummary::from_samples(&[3.0, 1.0, 2.0]).unwrap();
/// assert_eq!(summary.count, 3);
/// assert_eq!(summary.mean, 2.0);
/// assert_eq!(summary.median, 2.0);
/// assert_eq!(summary.min, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator; zero for one sample).
    pub std_dev: f64,
    /// Smallest sample.
    pub min: f64,
    /// 5th percentile.
    pub p05: f64,
    /// 25th percentile.
    pub p25: f64,
    /// 50th percentile.
    pub median: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 95th percentile.
    pub p95: f64,
    /// Largest sample.
    pub max: f64,
}

impl DistributionSummary {
    /// Summarises the samples, or `None` if there are none.
    ///
    /// NaN samples sort last and propagate into the mean.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = mean(&sorted);
        let std_dev = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            std_dev,
            min: sorted[0],
            p05: percentile(&sorted, 0.05),
            p25: percentile(&sorted, 0.25),
            median: percentile(&sorted, 0.5),
            p75: percentile(&sorted, 0.75),
            p95: percentile(&sorted, 0.95),
            max: sorted[count - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty() {
        assert!(DistributionSummary::from_samples(&[]).is_none());
        assert!(percentile(&[], 0.5).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_single_sample() {
        let summary = DistributionSummary::from_samples(&[7.0]).unwrap();
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.p05, 7.0);
        assert_eq!(summary.p95, 7.0);
    }

    #[test]
    fn test_percentiles_interpolate() {
        let values: Vec<f64> = (1..=5).map(f64::from).collect();
        let summary = DistributionSummary::from_samples(&values).unwrap();
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.p25, 2.0);
        assert_eq!(summary.p75, 4.0);
        assert_relative_eq!(summary.p05, 1.2, epsilon = 1e-12);
        assert_relative_eq!(summary.p95, 4.8, epsilon = 1e-12);
        assert_relative_eq!(summary.std_dev, 2.5_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_unsorted_input() {
        let summary = DistributionSummary::from_samples(&[10.0, -2.0, 4.0, 0.0]).unwrap();
        assert_eq!(summary.min, -2.0);
        assert_eq!(summary.max, 10.0);
        assert_eq!(summary.median, 2.0);
        assert_eq!(summary.mean, 3.0);
    }
}

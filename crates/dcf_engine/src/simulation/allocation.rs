//! Per-scenario sample counts.
//!
//! Every scenario but the last receives `floor(probability * n_samples)`
//! samples; the last absorbs the remainder so the total is exactly
//! `n_samples`. Scenario order therefore decides which scenario soaks up
//! rounding error.

use std::ops::Range;

use dcf_core::types::{ConfigError, Scenario};
use serde::{Deserialize, Serialize};

/// Ordered sample counts, one per scenario.
///
/// Sample rows are laid out scenario by scenario in input order; row `i`
/// of every driver matrix and of the share vector belongs to the scenario
/// whose [`range`](Self::range) contains `i`.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::Scenario;
/// use dcf_engine::simulation::SampleAllocation;
///
/// let scenarios = vec![
///     Scenario::builder(0.75, 1.0).build().unwrap(),
///     Scenario::builder(0.25, 1.0).build().unwrap(),
/// ];
/// let allocation = SampleAllocation::new(&scenarios, 10_001).unwrap();
///
/// assert_eq!(allocation.counts(), &[7_500, 2_501]);
/// assert_eq!(allocation.total(), 10_001);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleAllocation {
    counts: Vec<usize>,
}

impl SampleAllocation {
    /// Allocates `n_samples` across `scenarios`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NoScenarios` for an empty scenario list
    /// - `ConfigError::AllocationOverflow` if the leading scenarios' floors
    ///   already exceed `n_samples` (probabilities summing well above one)
    pub fn new(scenarios: &[Scenario], n_samples: usize) -> Result<Self, ConfigError> {
        let (_, leading) = scenarios.split_last().ok_or(ConfigError::NoScenarios)?;

        let mut counts: Vec<usize> = leading
            .iter()
            .map(|s| (s.probability() * n_samples as f64).floor() as usize)
            .collect();

        let requested: usize = counts.iter().sum();
        if requested > n_samples {
            return Err(ConfigError::AllocationOverflow {
                requested,
                available: n_samples,
            });
        }
        counts.push(n_samples - requested);

        Ok(Self { counts })
    }

    /// Sample count per scenario, in scenario order.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total sample count (always the requested `n_samples`).
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Number of scenarios.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Always `false`: an allocation covers at least one scenario.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Row range owned by scenario `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn range(&self, index: usize) -> Range<usize> {
        let start: usize = self.counts[..index].iter().sum();
        start..start + self.counts[index]
    }

    /// Row ranges of all scenarios, in order.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.counts
            .iter()
            .map(|&count| {
                let range = start..start + count;
                start += count;
                range
            })
            .collect()
    }

    /// Scenario index owning sample `row`, or `None` past the end.
    pub fn scenario_index(&self, row: usize) -> Option<usize> {
        let mut end = 0;
        for (index, &count) in self.counts.iter().enumerate() {
            end += count;
            if row < end {
                return Some(index);
            }
        }
        None
    }

    /// Repeats `per_scenario[k]` exactly `counts[k]` times, in order.
    ///
    /// # Errors
    ///
    /// `ConfigError::LengthMismatch` if `per_scenario` does not have one
    /// entry per scenario.
    pub fn expand<T: Clone>(&self, per_scenario: &[T]) -> Result<Vec<T>, ConfigError> {
        if per_scenario.len() != self.counts.len() {
            return Err(ConfigError::LengthMismatch {
                expected: self.counts.len(),
                actual: per_scenario.len(),
            });
        }
        let mut expanded = Vec::with_capacity(self.total());
        for (value, &count) in per_scenario.iter().zip(&self.counts) {
            expanded.extend(std::iter::repeat(value.clone()).take(count));
        }
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenarios(probabilities: &[f64]) -> Vec<Scenario> {
        probabilities
            .iter()
            .map(|&p| Scenario::builder(p, 1.0).build().unwrap())
            .collect()
    }

    #[test]
    fn test_single_scenario_takes_everything() {
        let allocation = SampleAllocation::new(&scenarios(&[0.3]), 1_000).unwrap();
        assert_eq!(allocation.counts(), &[1_000]);
    }

    #[test]
    fn test_last_absorbs_remainder() {
        let allocation = SampleAllocation::new(&scenarios(&[0.333, 0.333, 0.334]), 10).unwrap();
        assert_eq!(allocation.counts(), &[3, 3, 4]);
        assert_eq!(allocation.total(), 10);
    }

    #[test]
    fn test_order_sensitivity() {
        let forward = SampleAllocation::new(&scenarios(&[0.75, 0.25]), 10_001).unwrap();
        let reversed = SampleAllocation::new(&scenarios(&[0.25, 0.75]), 10_001).unwrap();

        assert_eq!(forward.counts(), &[7_500, 2_501]);
        assert_eq!(reversed.counts(), &[2_500, 7_501]);
        assert_eq!(forward.total(), reversed.total());
    }

    #[test]
    fn test_overflow_rejected() {
        let err = SampleAllocation::new(&scenarios(&[0.8, 0.8, 0.1]), 100).unwrap_err();
        assert_eq!(
            err,
            ConfigError::AllocationOverflow {
                requested: 160,
                available: 100
            }
        );
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            SampleAllocation::new(&[], 100).unwrap_err(),
            ConfigError::NoScenarios
        );
    }

    #[test]
    fn test_last_may_receive_nothing() {
        let allocation = SampleAllocation::new(&scenarios(&[1.0, 0.5]), 10).unwrap();
        assert_eq!(allocation.counts(), &[10, 0]);
        assert_eq!(allocation.range(1), 10..10);
    }

    #[test]
    fn test_ranges_and_lookup() {
        let allocation = SampleAllocation::new(&scenarios(&[0.2, 0.5, 0.3]), 10).unwrap();
        assert_eq!(allocation.ranges(), vec![0..2, 2..7, 7..10]);
        assert_eq!(allocation.range(1), 2..7);
        assert_eq!(allocation.scenario_index(0), Some(0));
        assert_eq!(allocation.scenario_index(2), Some(1));
        assert_eq!(allocation.scenario_index(9), Some(2));
        assert_eq!(allocation.scenario_index(10), None);
    }

    #[test]
    fn test_serialises_as_plain_list() {
        let allocation = SampleAllocation::new(&scenarios(&[0.75, 0.25]), 10_001).unwrap();
        let json = serde_json::to_value(&allocation).unwrap();
        assert_eq!(json, serde_json::json!([7_500, 2_501]));

        let back: SampleAllocation = serde_json::from_value(json).unwrap();
        assert_eq!(back, allocation);
    }

    #[test]
    fn test_expand() {
        let allocation = SampleAllocation::new(&scenarios(&[0.5, 0.5]), 4).unwrap();
        assert_eq!(
            allocation.expand(&["a", "b"]).unwrap(),
            vec!["a", "a", "b", "b"]
        );
        assert!(allocation.expand(&["a"]).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(300))]

            #[test]
            fn test_total_is_exact_and_order_invariant(
                weights in prop::collection::vec(0.01f64..1.0, 1..6),
                n_samples in 1usize..50_000
            ) {
                let sum: f64 = weights.iter().sum();
                let probabilities: Vec<f64> = weights.iter().map(|w| w / sum).collect();
                let mut reversed = probabilities.clone();
                reversed.reverse();

                let forward = SampleAllocation::new(&scenarios(&probabilities), n_samples).unwrap();
                let backward = SampleAllocation::new(&scenarios(&reversed), n_samples).unwrap();

                prop_assert_eq!(forward.total(), n_samples);
                prop_assert_eq!(backward.total(), n_samples);
                prop_assert_eq!(forward.len(), probabilities.len());
            }
        }
    }
}

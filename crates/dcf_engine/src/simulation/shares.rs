//! Share value translator.
//!
//! Each sample is divided by the share count of the scenario it was drawn
//! from, so the share vector is laid out in the same scenario order as the
//! driver matrices.

use dcf_core::types::{ConfigError, NumericalError, Scenario, ValuationResult};

use super::allocation::SampleAllocation;

/// Per-sample share counts: each scenario's `shares` repeated for its
/// allocated sample count, in scenario order.
///
/// # Errors
///
/// `ConfigError::LengthMismatch` if the allocation does not cover the
/// scenario list.
pub fn share_vector(
    scenarios: &[Scenario],
    allocation: &SampleAllocation,
) -> Result<Vec<f64>, ConfigError> {
    let shares: Vec<f64> = scenarios.iter().map(Scenario::shares).collect();
    allocation.expand(&shares)
}

/// `company_value[i] / shares[i]` per sample.
///
/// # Errors
///
/// - `ConfigError::LengthMismatch` if the vectors differ in length
/// - `NumericalError::NonPositiveShareCount` naming the first sample whose
///   share count is zero, negative or non-finite
pub fn fair_value_per_share(company_values: &[f64], shares: &[f64]) -> ValuationResult<Vec<f64>> {
    if company_values.len() != shares.len() {
        return Err(ConfigError::LengthMismatch {
            expected: company_values.len(),
            actual: shares.len(),
        }
        .into());
    }
    if let Some((index, &value)) = shares
        .iter()
        .enumerate()
        .find(|&(_, &s)| !(s.is_finite() && s > 0.0))
    {
        return Err(NumericalError::NonPositiveShareCount { index, value }.into());
    }

    Ok(company_values
        .iter()
        .zip(shares)
        .map(|(value, count)| value / count)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcf_core::types::ValuationError;

    #[test]
    fn test_share_vector_follows_allocation() {
        let scenarios = vec![
            Scenario::builder(0.6, 1_000.0).build().unwrap(),
            Scenario::builder(0.4, 2_500.0).build().unwrap(),
        ];
        let allocation = SampleAllocation::new(&scenarios, 5).unwrap();

        let shares = share_vector(&scenarios, &allocation).unwrap();
        assert_eq!(shares, vec![1_000.0, 1_000.0, 1_000.0, 2_500.0, 2_500.0]);
    }

    #[test]
    fn test_fair_value_per_share() {
        let fv = fair_value_per_share(&[1_000.0, 5_000.0], &[10.0, 20.0]).unwrap();
        assert_eq!(fv, vec![100.0, 250.0]);
    }

    #[test]
    fn test_non_positive_share_rejected() {
        let err = fair_value_per_share(&[1.0, 2.0, 3.0], &[1.0, 0.0, -1.0]).unwrap_err();
        assert_eq!(
            err,
            ValuationError::Numerical(NumericalError::NonPositiveShareCount {
                index: 1,
                value: 0.0
            })
        );
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(matches!(
            fair_value_per_share(&[1.0, 2.0], &[1.0]),
            Err(ValuationError::Config(ConfigError::LengthMismatch { .. }))
        ));
    }
}

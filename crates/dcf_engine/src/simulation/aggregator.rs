//! Driver aggregator: one driver across all weighted scenarios.

use dcf_core::math::DriverMatrix;
use dcf_core::types::{
    ConfigError, CurrentFinancials, Driver, Scenario, ValuationError, ValuationResult,
};
use tracing::debug;

use super::allocation::SampleAllocation;
use super::sampler::simulate_driver;
use crate::rng::EngineRng;

/// Simulates `driver` for every scenario and stacks the results.
///
/// Scenarios are visited in input order, each sampled with its allocated
/// sample count, and their matrices are concatenated along the sample axis
/// in that same order. The combined matrix has shape
/// `(allocation.total(), n_periods)`.
///
/// # Errors
///
/// - `ConfigError::MissingCurrentValue` if `current` lacks the driver
/// - `ConfigError::MissingDriverEstimate` naming the first scenario that
///   lacks the driver; checked for every scenario before any sampling
/// - `ConfigError::LengthMismatch` if the allocation does not cover the
///   scenario list
/// - `ValuationError::Sampling` wrapping a numerical failure of the
///   sampler, with the scenario and driver identified
pub fn aggregate_driver(
    driver: Driver,
    current: &CurrentFinancials,
    scenarios: &[Scenario],
    allocation: &SampleAllocation,
    n_periods: usize,
    rng: &mut EngineRng,
) -> ValuationResult<DriverMatrix> {
    let start = current.get(driver)?;

    if allocation.len() != scenarios.len() {
        return Err(ConfigError::LengthMismatch {
            expected: scenarios.len(),
            actual: allocation.len(),
        }
        .into());
    }

    let estimates = scenarios
        .iter()
        .enumerate()
        .map(|(ordinal, scenario)| scenario.estimate(driver, ordinal))
        .collect::<Result<Vec<_>, _>>()?;

    let mut blocks = Vec::with_capacity(scenarios.len());
    for (ordinal, ((scenario, estimate), &samples)) in scenarios
        .iter()
        .zip(&estimates)
        .zip(allocation.counts())
        .enumerate()
    {
        let block = simulate_driver(
            estimate.estimate,
            estimate.uncertainty,
            start,
            samples,
            n_periods,
            rng,
        )
        .map_err(|err| match err {
            ValuationError::Numerical(source) => ValuationError::Sampling {
                driver: driver.to_string(),
                scenario: scenario.label(ordinal),
                source,
            },
            other => other,
        })?;

        debug!(
            driver = %driver,
            scenario = %scenario.label(ordinal),
            samples,
            "sampled scenario block"
        );
        blocks.push(block);
    }

    Ok(DriverMatrix::vstack(&blocks, n_periods)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcf_core::types::NumericalError;

    fn revenue_scenarios() -> Vec<Scenario> {
        vec![
            Scenario::builder(0.8, 100.0)
                .name("steady")
                .estimate(Driver::Revenue, 20.0, 0.0)
                .build()
                .unwrap(),
            Scenario::builder(0.2, 100.0)
                .estimate(Driver::Revenue, 30.0, 0.0)
                .build()
                .unwrap(),
        ]
    }

    #[test]
    fn test_shape_and_scenario_order() {
        let current = CurrentFinancials::new().with(Driver::Revenue, 10.0);
        let scenarios = revenue_scenarios();
        let allocation = SampleAllocation::new(&scenarios, 10).unwrap();
        let mut rng = EngineRng::from_seed(42);

        let m = aggregate_driver(Driver::Revenue, &current, &scenarios, &allocation, 5, &mut rng)
            .unwrap();

        assert_eq!(m.shape(), (10, 5));
        // Zero uncertainty: the last period hits each scenario's estimate.
        for row in allocation.range(0) {
            assert!((m.get(row, 4).unwrap() - 20.0).abs() < 1e-9);
        }
        for row in allocation.range(1) {
            assert!((m.get(row, 4).unwrap() - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_current_value() {
        let current = CurrentFinancials::new();
        let scenarios = revenue_scenarios();
        let allocation = SampleAllocation::new(&scenarios, 10).unwrap();
        let mut rng = EngineRng::from_seed(42);

        let err = aggregate_driver(Driver::Revenue, &current, &scenarios, &allocation, 5, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            ValuationError::Config(ConfigError::MissingCurrentValue { .. })
        ));
    }

    #[test]
    fn test_missing_estimate_names_scenario() {
        let current = CurrentFinancials::new().with(Driver::GrossMargin, 0.05);
        let scenarios = revenue_scenarios();
        let allocation = SampleAllocation::new(&scenarios, 10).unwrap();
        let mut rng = EngineRng::from_seed(42);

        let err = aggregate_driver(
            Driver::GrossMargin,
            &current,
            &scenarios,
            &allocation,
            5,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValuationError::Config(ConfigError::MissingDriverEstimate {
                scenario: "steady".to_string(),
                driver: "gross_margin".to_string(),
            })
        );
    }

    #[test]
    fn test_sampling_error_names_scenario() {
        let current = CurrentFinancials::new().with(Driver::Revenue, 10.0);
        let scenarios = vec![
            Scenario::builder(0.5, 1.0)
                .estimate(Driver::Revenue, 20.0, 0.0)
                .build()
                .unwrap(),
            Scenario::builder(0.5, 1.0)
                .estimate(Driver::Revenue, -20.0, 0.0)
                .build()
                .unwrap(),
        ];
        let allocation = SampleAllocation::new(&scenarios, 10).unwrap();
        let mut rng = EngineRng::from_seed(42);

        let err = aggregate_driver(Driver::Revenue, &current, &scenarios, &allocation, 4, &mut rng)
            .unwrap_err();
        match err {
            ValuationError::Sampling {
                driver,
                scenario,
                source,
            } => {
                assert_eq!(driver, "revenue");
                assert_eq!(scenario, "scenario_1");
                assert!(matches!(source, NumericalError::NonRealGrowth { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_current_reported_with_context() {
        let current = CurrentFinancials::new().with(Driver::Revenue, 0.0);
        let scenarios = revenue_scenarios();
        let allocation = SampleAllocation::new(&scenarios, 10).unwrap();
        let mut rng = EngineRng::from_seed(42);

        let err = aggregate_driver(Driver::Revenue, &current, &scenarios, &allocation, 5, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            ValuationError::Sampling {
                source: NumericalError::ZeroCurrentValue,
                ..
            }
        ));
    }
}

//! Scenario sampler: one driver, one scenario.
//!
//! Draws the driver's end-of-horizon value, converts each draw into the
//! compound growth rate that reaches it from the current value, and lays
//! out the compounded trajectory per sample.

use dcf_core::math::{cagr, compound, DriverMatrix};
use dcf_core::types::{ConfigError, NumericalError, ValuationResult};

use crate::rng::EngineRng;

/// Simulates one driver for `samples` draws over `n_periods`.
///
/// Row `i` is the trajectory of draw `i`; column `t` (zero-based) holds
/// `current * (1 + cagr_i)^(t + 1)`. There is no period-zero column, so the
/// first column is already one period of growth away from `current`.
///
/// # Arguments
///
/// * `estimate` - Target value after `n_periods`
/// * `uncertainty` - Standard deviation of the target (zero is allowed)
/// * `current` - Known present value; must be non-zero
/// * `samples` - Number of draws (zero yields a `(0, n_periods)` matrix)
/// * `n_periods` - Forecast horizon, at least one
/// * `rng` - Random source, advanced by `samples` normal variates
///
/// # Errors
///
/// Every draw is converted to a growth rate before the matrix is built,
/// so nothing is materialised when one of these fires:
/// - `ConfigError::InvalidParameter` if `n_periods == 0`
/// - `ConfigError::InvalidUncertainty` for a negative or non-finite
///   `uncertainty`
/// - `NumericalError::ZeroCurrentValue` if `current == 0`
/// - `NumericalError::NonRealGrowth` if a draw has the opposite sign of
///   `current` and `n_periods` is even
///
/// # Examples
///
/// ```rust
/// use dcf_engine::rng::EngineRng;
/// use dcf_engine::simulation::simulate_driver;
///
/// let mut rng = EngineRng::from_seed(42);
/// let revenue = simulate_driver(3500.0, 200.0, 2200.0, 1_000, 5, &mut rng).unwrap();
///
/// assert_eq!(revenue.shape(), (1_000, 5));
/// ```
pub fn simulate_driver(
    estimate: f64,
    uncertainty: f64,
    current: f64,
    samples: usize,
    n_periods: usize,
    rng: &mut EngineRng,
) -> ValuationResult<DriverMatrix> {
    if n_periods == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "n_periods",
            value: "must be at least 1".to_string(),
        }
        .into());
    }
    if !uncertainty.is_finite() || uncertainty < 0.0 {
        return Err(ConfigError::InvalidUncertainty {
            driver: "<sampler>".to_string(),
            value: uncertainty,
        }
        .into());
    }
    if current == 0.0 {
        return Err(NumericalError::ZeroCurrentValue.into());
    }

    let mut draws = vec![0.0; samples];
    rng.fill_gaussian(&mut draws, estimate, uncertainty);

    let rates = draws
        .iter()
        .map(|&drawn| cagr(current, drawn, n_periods))
        .collect::<Result<Vec<f64>, NumericalError>>()?;

    let mut data = Vec::with_capacity(samples * n_periods);
    for rate in rates {
        data.extend((1..=n_periods).map(|t| compound(current, rate, t)));
    }

    Ok(DriverMatrix::from_vec(samples, n_periods, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dcf_core::types::ValuationError;

    #[test]
    fn test_shape() {
        let mut rng = EngineRng::from_seed(1);
        let m = simulate_driver(20.0, 2.0, 10.0, 250, 5, &mut rng).unwrap();
        assert_eq!(m.shape(), (250, 5));
        assert!(m.is_finite());
    }

    #[test]
    fn test_zero_uncertainty_is_deterministic() {
        let (estimate, current, periods) = (3500.0, 2200.0, 5);
        let mut rng = EngineRng::from_seed(3);
        let m = simulate_driver(estimate, 0.0, current, 8, periods, &mut rng).unwrap();

        let rate = (estimate / current).powf(1.0 / periods as f64) - 1.0;
        let expected: Vec<f64> = (1..=periods)
            .map(|t| current * (1.0 + rate).powi(t as i32))
            .collect();

        for row in m.iter_rows() {
            assert_eq!(row, expected.as_slice());
        }
    }

    #[test]
    fn test_first_column_is_one_period_of_growth() {
        let mut rng = EngineRng::from_seed(3);
        let m = simulate_driver(400.0, 0.0, 100.0, 1, 2, &mut rng).unwrap();
        // sqrt(4) = 2: first period doubles, second quadruples.
        assert_relative_eq!(m.get(0, 0).unwrap(), 200.0, max_relative = 1e-12);
        assert_relative_eq!(m.get(0, 1).unwrap(), 400.0, max_relative = 1e-12);
    }

    #[test]
    fn test_round_trip_reaches_estimate() {
        let mut rng = EngineRng::from_seed(11);
        let m = simulate_driver(0.35, 0.0, 0.2, 1, 7, &mut rng).unwrap();
        assert_relative_eq!(m.get(0, 6).unwrap(), 0.35, max_relative = 1e-9);
    }

    #[test]
    fn test_last_column_matches_draws() {
        // The final period reproduces each normal draw.
        let mut rng = EngineRng::from_seed(5);
        let m = simulate_driver(3500.0, 200.0, 2200.0, 100, 5, &mut rng).unwrap();

        let mut replay = EngineRng::from_seed(5);
        let mut draws = vec![0.0; 100];
        replay.fill_gaussian(&mut draws, 3500.0, 200.0);

        for (value, drawn) in m.last_column().into_iter().zip(draws) {
            assert_relative_eq!(value, drawn, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_matrix() {
        let mut a = EngineRng::from_seed(77);
        let mut b = EngineRng::from_seed(77);
        let m1 = simulate_driver(1.0, 0.1, 0.8, 50, 4, &mut a).unwrap();
        let m2 = simulate_driver(1.0, 0.1, 0.8, 50, 4, &mut b).unwrap();
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_zero_samples() {
        let mut rng = EngineRng::from_seed(0);
        let m = simulate_driver(1.0, 0.1, 1.0, 0, 3, &mut rng).unwrap();
        assert_eq!(m.shape(), (0, 3));
    }

    #[test]
    fn test_zero_current_rejected() {
        let mut rng = EngineRng::from_seed(0);
        let err = simulate_driver(10.0, 1.0, 0.0, 10, 5, &mut rng).unwrap_err();
        assert_eq!(
            err,
            ValuationError::Numerical(NumericalError::ZeroCurrentValue)
        );
    }

    #[test]
    fn test_sign_flip_with_even_periods_rejected() {
        let mut rng = EngineRng::from_seed(0);
        let err = simulate_driver(-50.0, 0.0, 100.0, 3, 4, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::Numerical(NumericalError::NonRealGrowth { periods: 4, .. })
        ));
    }

    #[test]
    fn test_negative_current_and_estimate() {
        let mut rng = EngineRng::from_seed(0);
        let m = simulate_driver(-400.0, 0.0, -100.0, 2, 2, &mut rng).unwrap();
        assert_relative_eq!(m.get(1, 0).unwrap(), -200.0, max_relative = 1e-12);
        assert_relative_eq!(m.get(1, 1).unwrap(), -400.0, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_uncertainty_rejected() {
        let mut rng = EngineRng::from_seed(0);
        let err = simulate_driver(1.0, -0.5, 1.0, 3, 2, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ValuationError::Config(ConfigError::InvalidUncertainty { .. })
        ));
    }

    #[test]
    fn test_zero_periods_rejected() {
        let mut rng = EngineRng::from_seed(0);
        assert!(simulate_driver(1.0, 0.0, 1.0, 3, 0, &mut rng).is_err());
    }
}

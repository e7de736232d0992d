//! Discounting engine.
//!
//! Free cash flow is discounted period by period at `wacc`, the final
//! period is capitalised as a Gordon-growth perpetuity at `perpetual_rate`,
//! and the two are summed per sample into company value.

use dcf_core::math::DriverMatrix;
use dcf_core::types::{ConfigError, NumericalError, ValuationResult};

/// Discount factors `(1 + wacc)^t` for `t = 1..=n_periods`, repeated for
/// every sample.
///
/// # Examples
///
/// ```rust
/// use dcf_engine::simulation::discount_factors;
///
/// let df = discount_factors(2, 3, 0.1);
/// assert_eq!(df.shape(), (2, 3));
/// assert!((df.get(1, 1).unwrap() - 1.21).abs() < 1e-12);
/// ```
pub fn discount_factors(samples: usize, n_periods: usize, wacc: f64) -> DriverMatrix {
    let growth = 1.0 + wacc;
    DriverMatrix::from_fn(samples, n_periods, |_, t| growth.powi(t as i32 + 1))
}

/// `free_cashflow / discount_factor`, element-wise.
pub fn present_values(
    free_cashflow: &DriverMatrix,
    discount_factor: &DriverMatrix,
) -> Result<DriverMatrix, ConfigError> {
    free_cashflow.div(discount_factor)
}

/// Discounted perpetuity value per sample.
///
/// `fcf_last * (1 + perpetual_rate) / (wacc - perpetual_rate) / df_last`,
/// using each sample's final-period cash flow and discount factor.
///
/// # Errors
///
/// - `NumericalError::DiscountRateNotAbovePerpetualRate` unless
///   `wacc > perpetual_rate` (both finite)
/// - `ConfigError::ShapeMismatch` if the matrices differ in shape
/// - `ConfigError::InvalidParameter` for matrices without periods
pub fn terminal_values(
    free_cashflow: &DriverMatrix,
    discount_factor: &DriverMatrix,
    wacc: f64,
    perpetual_rate: f64,
) -> ValuationResult<Vec<f64>> {
    if !(wacc.is_finite() && perpetual_rate.is_finite() && wacc > perpetual_rate) {
        return Err(NumericalError::DiscountRateNotAbovePerpetualRate {
            wacc,
            perpetual_rate,
        }
        .into());
    }
    if free_cashflow.shape() != discount_factor.shape() {
        return Err(ConfigError::ShapeMismatch {
            expected: free_cashflow.shape(),
            actual: discount_factor.shape(),
        }
        .into());
    }
    if free_cashflow.cols() == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "n_periods",
            value: "must be at least 1".to_string(),
        }
        .into());
    }

    let multiple = (1.0 + perpetual_rate) / (wacc - perpetual_rate);
    Ok(free_cashflow
        .last_column()
        .into_iter()
        .zip(discount_factor.last_column())
        .map(|(fcf, df)| fcf * multiple / df)
        .collect())
}

/// Sum of discounted cash flows plus terminal value, per sample.
///
/// # Errors
///
/// `ConfigError::LengthMismatch` unless there is one terminal value per
/// row of `present_value`.
pub fn company_values(
    present_value: &DriverMatrix,
    terminal_value: &[f64],
) -> Result<Vec<f64>, ConfigError> {
    if present_value.rows() != terminal_value.len() {
        return Err(ConfigError::LengthMismatch {
            expected: present_value.rows(),
            actual: terminal_value.len(),
        });
    }
    Ok(present_value
        .row_sums()
        .into_iter()
        .zip(terminal_value)
        .map(|(pv, tv)| pv + tv)
        .collect())
}

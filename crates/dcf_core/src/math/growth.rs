//! Compound growth maths.
//!
//! [`cagr`] derives the constant per-period growth rate linking a start
//! value to an end value; [`compound`] applies it.
//!
//! # Sign handling
//!
//! The growth factor is the `periods`-th root of `end / start`. For a
//! non-negative ratio the root is always real. For a negative ratio a real
//! root exists only when `periods` is odd, in which case the sign-preserving
//! root is used and the simulated path alternates in sign. An even root of
//! a negative ratio is rejected as [`NumericalError::NonRealGrowth`].

use crate::types::NumericalError;

/// Compound annual growth rate from `start` to `end` over `periods`.
///
/// Computes `(end / start)^(1 / periods) - 1`.
///
/// # Errors
///
/// - `NumericalError::ZeroCurrentValue` if `start == 0`
/// - `NumericalError::ZeroPeriods` if `periods == 0`
/// - `NumericalError::NonFinite` if either value is NaN or infinite
/// - `NumericalError::NonRealGrowth` for a negative ratio and even `periods`
///
/// # Examples
///
/// ```
/// use dcf_core::math::growth::cagr;
///
/// // Doubling twice quadruples the value.
/// assert_eq!(cagr(1.0, 4.0, 2).unwrap(), 1.0);
/// ```
pub fn cagr(start: f64, end: f64, periods: usize) -> Result<f64, NumericalError> {
    if !start.is_finite() {
        return Err(NumericalError::NonFinite {
            what: "start value",
            value: start,
        });
    }
    if !end.is_finite() {
        return Err(NumericalError::NonFinite {
            what: "end value",
            value: end,
        });
    }
    if start == 0.0 {
        return Err(NumericalError::ZeroCurrentValue);
    }
    if periods == 0 {
        return Err(NumericalError::ZeroPeriods);
    }

    let ratio = end / start;
    let exponent = 1.0 / periods as f64;

    let factor = if ratio >= 0.0 {
        ratio.powf(exponent)
    } else if periods % 2 == 1 {
        -(-ratio).powf(exponent)
    } else {
        return Err(NumericalError::NonRealGrowth { ratio, periods });
    };

    Ok(factor - 1.0)
}

/// Value of `start` after compounding at `rate` for `period` periods.
///
/// # Examples
///
/// ```
/// use dcf_core::math::growth::compound;
///
/// assert!((compound(100.0, 0.1, 2) - 121.0).abs() < 1e-9);
/// ```
#[inline]
pub fn compound(start: f64, rate: f64, period: usize) -> f64 {
    start * (1.0 + rate).powi(period as i32)
}

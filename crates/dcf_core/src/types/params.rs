//! Scalar run parameters.
//!
//! Use [`RunParameters::builder`] to construct validated instances; the
//! terminal-value precondition `wacc > perpetual_rate` is enforced here,
//! before any simulation array exists.

use super::error::{ConfigError, NumericalError, ValuationError};

/// Maximum number of samples allowed per run.
pub const MAX_SAMPLES: usize = 10_000_000;

/// Maximum forecast horizon in periods.
pub const MAX_PERIODS: usize = 1_000;

/// Validated global parameters of a forecast run.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::RunParameters;
///
/// let params = RunParameters::builder()
///     .n_periods(5)
///     .n_samples(10_000)
///     .wacc(0.08)
///     .perpetual_rate(0.02)
///     .tax_rate(0.22)
///     .seed(42)
///     .build()
///     .expect("valid parameters");
///
/// assert_eq!(params.n_periods(), 5);
/// assert_eq!(params.seed(), Some(42));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RunParameters {
    n_periods: usize,
    n_samples: usize,
    wacc: f64,
    perpetual_rate: f64,
    tax_rate: f64,
    seed: Option<u64>,
}

impl RunParameters {
    /// Creates a new parameter builder.
    #[inline]
    pub fn builder() -> RunParametersBuilder {
        RunParametersBuilder::default()
    }

    /// Forecast horizon in periods.
    #[inline]
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Total number of simulated samples.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Weighted average cost of capital.
    #[inline]
    pub fn wacc(&self) -> f64 {
        self.wacc
    }

    /// Perpetual growth rate used by the terminal value.
    #[inline]
    pub fn perpetual_rate(&self) -> f64 {
        self.perpetual_rate
    }

    /// Tax rate applied to pre-tax income.
    #[inline]
    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    /// Optional seed for reproducibility.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns a copy with a different sample count, revalidated.
    pub fn with_n_samples(&self, n_samples: usize) -> Result<Self, ValuationError> {
        let params = Self {
            n_samples,
            ..self.clone()
        };
        params.validate()?;
        Ok(params)
    }

    /// Returns a copy with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self.clone()
        }
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidParameter` if `n_periods` or `n_samples` is out
    ///   of range, `tax_rate` is outside `[0, 1]`, or a rate is at or below
    ///   `-1`
    /// - `NumericalError::NonFinite` for a NaN or infinite rate
    /// - `NumericalError::DiscountRateNotAbovePerpetualRate` unless
    ///   `wacc > perpetual_rate`
    pub fn validate(&self) -> Result<(), ValuationError> {
        if self.n_periods == 0 || self.n_periods > MAX_PERIODS {
            return Err(ConfigError::InvalidParameter {
                name: "n_periods",
                value: format!("{} is outside [1, {}]", self.n_periods, MAX_PERIODS),
            }
            .into());
        }
        if self.n_samples == 0 || self.n_samples > MAX_SAMPLES {
            return Err(ConfigError::InvalidParameter {
                name: "n_samples",
                value: format!("{} is outside [1, {}]", self.n_samples, MAX_SAMPLES),
            }
            .into());
        }
        for (what, value) in [
            ("wacc", self.wacc),
            ("perpetual_rate", self.perpetual_rate),
            ("tax_rate", self.tax_rate),
        ] {
            if !value.is_finite() {
                return Err(NumericalError::NonFinite { what, value }.into());
            }
        }
        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(ConfigError::InvalidParameter {
                name: "tax_rate",
                value: format!("{} is outside [0, 1]", self.tax_rate),
            }
            .into());
        }
        // (1 + r)^t must stay positive for discounting and growth.
        for (name, value) in [("wacc", self.wacc), ("perpetual_rate", self.perpetual_rate)] {
            if value <= -1.0 {
                return Err(ConfigError::InvalidParameter {
                    name,
                    value: format!("{} must be greater than -1", value),
                }
                .into());
            }
        }
        if self.wacc <= self.perpetual_rate {
            return Err(NumericalError::DiscountRateNotAbovePerpetualRate {
                wacc: self.wacc,
                perpetual_rate: self.perpetual_rate,
            }
            .into());
        }
        Ok(())
    }
}

/// Builder for [`RunParameters`].
#[derive(Clone, Debug, Default)]
pub struct RunParametersBuilder {
    n_periods: Option<usize>,
    n_samples: Option<usize>,
    wacc: Option<f64>,
    perpetual_rate: Option<f64>,
    tax_rate: Option<f64>,
    seed: Option<u64>,
}

impl RunParametersBuilder {
    /// Sets the forecast horizon.
    #[inline]
    pub fn n_periods(mut self, n_periods: usize) -> Self {
        self.n_periods = Some(n_periods);
        self
    }

    /// Sets the total sample count.
    #[inline]
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = Some(n_samples);
        self
    }

    /// Sets the discount rate.
    #[inline]
    pub fn wacc(mut self, wacc: f64) -> Self {
        self.wacc = Some(wacc);
        self
    }

    /// Sets the perpetual growth rate.
    #[inline]
    pub fn perpetual_rate(mut self, perpetual_rate: f64) -> Self {
        self.perpetual_rate = Some(perpetual_rate);
        self
    }

    /// Sets the tax rate.
    #[inline]
    pub fn tax_rate(mut self, tax_rate: f64) -> Self {
        self.tax_rate = Some(tax_rate);
        self
    }

    /// Sets the seed.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds and validates the parameters.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidParameter` for any unset field, plus every
    /// error of [`RunParameters::validate`].
    pub fn build(self) -> Result<RunParameters, ValuationError> {
        fn required<T>(value: Option<T>, name: &'static str) -> Result<T, ConfigError> {
            value.ok_or(ConfigError::InvalidParameter {
                name,
                value: "must be specified".to_string(),
            })
        }

        let params = RunParameters {
            n_periods: required(self.n_periods, "n_periods")?,
            n_samples: required(self.n_samples, "n_samples")?,
            wacc: required(self.wacc, "wacc")?,
            perpetual_rate: required(self.perpetual_rate, "perpetual_rate")?,
            tax_rate: required(self.tax_rate, "tax_rate")?,
            seed: self.seed,
        };

        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RunParametersBuilder {
        RunParameters::builder()
            .n_periods(5)
            .n_samples(1_000)
            .wacc(0.08)
            .perpetual_rate(0.02)
            .tax_rate(0.22)
    }

    #[test]
    fn test_builder_valid() {
        let params = base().build().unwrap();
        assert_eq!(params.n_samples(), 1_000);
        assert_eq!(params.wacc(), 0.08);
        assert_eq!(params.perpetual_rate(), 0.02);
        assert_eq!(params.tax_rate(), 0.22);
        assert_eq!(params.seed(), None);
    }

    #[test]
    fn test_wacc_equal_to_perpetual_rate_rejected() {
        let result = base().wacc(0.05).perpetual_rate(0.05).build();
        assert!(matches!(
            result,
            Err(ValuationError::Numerical(
                NumericalError::DiscountRateNotAbovePerpetualRate { .. }
            ))
        ));
    }

    #[test]
    fn test_wacc_below_perpetual_rate_rejected() {
        let result = base().wacc(0.01).perpetual_rate(0.03).build();
        assert!(matches!(
            result,
            Err(ValuationError::Numerical(
                NumericalError::DiscountRateNotAbovePerpetualRate { .. }
            ))
        ));
    }

    #[test]
    fn test_rates_at_or_below_minus_one_rejected() {
        let result = base().wacc(-1.0).perpetual_rate(-1.5).build();
        assert!(matches!(
            result,
            Err(ValuationError::Config(ConfigError::InvalidParameter { name: "wacc", .. }))
        ));

        let result = base().wacc(0.05).perpetual_rate(-1.0).build();
        assert!(matches!(
            result,
            Err(ValuationError::Config(ConfigError::InvalidParameter {
                name: "perpetual_rate",
                ..
            }))
        ));

        assert!(base().wacc(-0.5).perpetual_rate(-0.9).build().is_ok());
    }

    #[test]
    fn test_zero_periods_rejected() {
        let result = base().n_periods(0).build();
        assert!(matches!(
            result,
            Err(ValuationError::Config(ConfigError::InvalidParameter {
                name: "n_periods",
                ..
            }))
        ));
    }

    #[test]
    fn test_zero_samples_rejected() {
        let result = base().n_samples(0).build();
        assert!(matches!(
            result,
            Err(ValuationError::Config(ConfigError::InvalidParameter {
                name: "n_samples",
                ..
            }))
        ));
    }

    #[test]
    fn test_tax_rate_range() {
        assert!(base().tax_rate(0.0).build().is_ok());
        assert!(base().tax_rate(1.0).build().is_ok());
        assert!(base().tax_rate(1.2).build().is_err());
        assert!(base().tax_rate(-0.1).build().is_err());
    }

    #[test]
    fn test_non_finite_rate_rejected() {
        let result = base().wacc(f64::NAN).build();
        assert!(matches!(
            result,
            Err(ValuationError::Numerical(NumericalError::NonFinite { what: "wacc", .. }))
        ));
    }

    #[test]
    fn test_missing_field() {
        let result = RunParameters::builder().n_periods(5).build();
        assert!(matches!(
            result,
            Err(ValuationError::Config(ConfigError::InvalidParameter {
                name: "n_samples",
                ..
            }))
        ));
    }

    #[test]
    fn test_with_overrides() {
        let params = base().build().unwrap();
        assert_eq!(params.with_seed(7).seed(), Some(7));
        assert_eq!(params.with_n_samples(50).unwrap().n_samples(), 50);
        assert!(params.with_n_samples(0).is_err());
    }
}

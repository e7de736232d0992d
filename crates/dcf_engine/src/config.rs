//! Valuation configuration files.
//!
//! A valuation is described by one TOML document:
//!
//! ```toml
//! [parameters]
//! n_periods = 5
//! n_samples = 10000
//! wacc = 0.08
//! perpetual_rate = 0.02
//! tax_rate = 0.22
//! seed = 42            # optional
//!
//! [current]
//! revenue = 2200
//! gross_margin = 0.2
//! # ... one value per driver
//!
//! [[scenarios]]
//! scenario_name = "base"   # optional
//! probability = 0.75
//! shares = 10000
//! revenue = 3500
//! revenue_uncertainty = 200
//! # ... one estimate/uncertainty pair per driver
//! ```
//!
//! `DCF_N_SAMPLES` and `DCF_SEED` override the file when set.

use std::collections::BTreeMap;
use std::path::Path;

use dcf_core::types::{
    ConfigError, CurrentFinancials, RunParameters, Scenario, ValuationResult,
};
use serde::Deserialize;
use tracing::debug;

use crate::simulation::ForecastRun;

/// Environment variable overriding `parameters.n_samples`.
pub const ENV_N_SAMPLES: &str = "DCF_N_SAMPLES";
/// Environment variable overriding `parameters.seed`.
pub const ENV_SEED: &str = "DCF_SEED";

/// `[parameters]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParametersSection {
    /// Forecast horizon in periods.
    pub n_periods: usize,
    /// Total Monte Carlo samples.
    pub n_samples: usize,
    /// Discount rate.
    pub wacc: f64,
    /// Perpetual growth rate of the terminal value.
    pub perpetual_rate: f64,
    /// Tax rate on pre-tax income.
    pub tax_rate: f64,
    /// Random seed.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// One `[[scenarios]]` table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioSection {
    /// Optional display name.
    #[serde(default)]
    pub scenario_name: Option<String>,
    /// `probability`, `shares` and the driver estimate/uncertainty keys.
    #[serde(flatten)]
    pub entries: BTreeMap<String, f64>,
}

/// A complete valuation request.
///
/// # Examples
///
/// ```rust
/// use dcf_engine::config::ValuationConfig;
///
/// let config = ValuationConfig::from_toml_str(
///     r#"
///     [parameters]
///     n_periods = 3
///     n_samples = 100
///     wacc = 0.08
///     perpetual_rate = 0.02
///     tax_rate = 0.2
///
///     [current]
///     revenue = 100
///
///     [[scenarios]]
///     probability = 1.0
///     shares = 10
///     revenue = 120
///     revenue_uncertainty = 5
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(config.parameters.n_samples, 100);
/// assert_eq!(config.scenarios().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValuationConfig {
    /// Scalar run parameters.
    pub parameters: ParametersSection,
    /// Present value per driver.
    pub current: BTreeMap<String, f64>,
    /// Scenarios in allocation order.
    #[serde(default)]
    pub scenarios: Vec<ScenarioSection>,
}

impl ValuationConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigError::FileError` if the document is not valid TOML or does
    /// not match the expected layout.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Loads a TOML file.
    ///
    /// # Errors
    ///
    /// `ConfigError::FileError` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        debug!(path = %path.display(), "loaded valuation config");
        Self::from_toml_str(&content)
    }

    /// Applies `DCF_N_SAMPLES` and `DCF_SEED` from the process environment.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidParameter` if a set variable does not parse.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidParameter` if a present value does not parse.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_N_SAMPLES) {
            let n_samples = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidParameter {
                    name: "n_samples",
                    value: format!("{} = '{}' is not a sample count", ENV_N_SAMPLES, raw),
                })?;
            self.parameters.n_samples = n_samples;
        }
        if let Some(raw) = lookup(ENV_SEED) {
            let seed = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidParameter {
                    name: "seed",
                    value: format!("{} = '{}' is not a u64 seed", ENV_SEED, raw),
                })?;
            self.parameters.seed = Some(seed);
        }
        Ok(())
    }

    /// Validated run parameters.
    ///
    /// # Errors
    ///
    /// Any [`RunParameters::validate`] failure.
    pub fn run_parameters(&self) -> ValuationResult<RunParameters> {
        let p = &self.parameters;
        let mut builder = RunParameters::builder()
            .n_periods(p.n_periods)
            .n_samples(p.n_samples)
            .wacc(p.wacc)
            .perpetual_rate(p.perpetual_rate)
            .tax_rate(p.tax_rate);
        if let Some(seed) = p.seed {
            builder = builder.seed(seed);
        }
        builder.build()
    }

    /// The `[current]` table as typed financials.
    ///
    /// # Errors
    ///
    /// `ConfigError::UnknownKey` for a key that is not a driver.
    pub fn current_financials(&self) -> Result<CurrentFinancials, ConfigError> {
        CurrentFinancials::from_entries(self.current.iter().map(|(k, &v)| (k.as_str(), v)))
    }

    /// The `[[scenarios]]` tables as typed scenarios, in file order.
    ///
    /// # Errors
    ///
    /// The first scenario construction error.
    pub fn scenarios(&self) -> Result<Vec<Scenario>, ConfigError> {
        self.scenarios
            .iter()
            .map(|section| {
                Scenario::from_entries(
                    section.scenario_name.as_deref(),
                    section.entries.iter().map(|(k, &v)| (k.as_str(), v)),
                )
            })
            .collect()
    }

    /// Builds a run ready to simulate.
    ///
    /// Parameters are validated first, so a discount rate at or below the
    /// perpetual rate is rejected before any input record is parsed.
    ///
    /// # Errors
    ///
    /// Any parameter, input record or allocation error.
    pub fn into_run(self) -> ValuationResult<ForecastRun> {
        let params = self.run_parameters()?;
        let current = self.current_financials()?;
        let scenarios = self.scenarios()?;
        ForecastRun::new(current, scenarios, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcf_core::types::{NumericalError, ValuationError};

    const MINIMAL: &str = r#"
        [parameters]
        n_periods = 2
        n_samples = 10
        wacc = 0.1
        perpetual_rate = 0.02
        tax_rate = 0.25

        [current]
        revenue = 100

        [[scenarios]]
        scenario_name = "only"
        probability = 1.0
        shares = 5
        revenue = 121
        revenue_uncertainty = 0
    "#;

    #[test]
    fn test_parse_minimal() {
        let config = ValuationConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.parameters.n_periods, 2);
        assert_eq!(config.parameters.seed, None);
        assert_eq!(config.current.get("revenue"), Some(&100.0));

        let scenarios = config.scenarios().unwrap();
        assert_eq!(scenarios[0].name(), Some("only"));
        assert_eq!(scenarios[0].shares(), 5.0);
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let content = MINIMAL.replace("tax_rate = 0.25", "tax_rate = 0.25\nbeta = 1.1");
        assert!(matches!(
            ValuationConfig::from_toml_str(&content),
            Err(ConfigError::FileError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = ValuationConfig::from_toml_str(MINIMAL).unwrap();
        config
            .apply_overrides(|key| match key {
                ENV_N_SAMPLES => Some("250".to_string()),
                ENV_SEED => Some(" 7 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.parameters.n_samples, 250);
        assert_eq!(config.parameters.seed, Some(7));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = ValuationConfig::from_toml_str(MINIMAL).unwrap();
        let err = config
            .apply_overrides(|key| (key == ENV_SEED).then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter { name: "seed", .. }
        ));
    }

    #[test]
    fn test_rate_inversion_rejected_before_records() {
        let content = MINIMAL
            .replace("wacc = 0.1", "wacc = 0.02")
            .replace("revenue = 100", "ebitda = 100");
        let err = ValuationConfig::from_toml_str(&content)
            .unwrap()
            .into_run()
            .unwrap_err();
        assert!(matches!(
            err,
            ValuationError::Numerical(NumericalError::DiscountRateNotAbovePerpetualRate { .. })
        ));
    }

    #[test]
    fn test_unknown_current_key_rejected() {
        let content = MINIMAL.replace("revenue = 100", "ebitda = 100");
        let err = ValuationConfig::from_toml_str(&content)
            .unwrap()
            .into_run()
            .unwrap_err();
        assert!(matches!(
            err,
            ValuationError::Config(ConfigError::UnknownKey { .. })
        ));
    }
}

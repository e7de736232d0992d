//! Input records: current financials and probability-weighted scenarios.

use std::collections::BTreeMap;

use super::driver::Driver;
use super::error::ConfigError;

/// Known present value of each driver.
///
/// Acts as the start value for every compound-growth derivation. Drivers
/// may be omitted; asking for a missing one is reported as a
/// configuration error at first use.
///
/// # Examples
/// ```
/// use dcf_core::types::{CurrentFinancials, Driver};
///
/// let current = CurrentFinancials::from_entries([("revenue", 2200.0), ("gross_margin", 0.2)])
///     .unwrap();
/// assert_eq!(current.get(Driver::Revenue).unwrap(), 2200.0);
/// assert!(current.get(Driver::EbitMargin).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurrentFinancials {
    values: BTreeMap<Driver, f64>,
}

impl CurrentFinancials {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the present value of a driver.
    ///
    /// Non-finite values are stored as given and rejected by
    /// [`get`](Self::get); use [`try_with`](Self::try_with) to fail early.
    pub fn with(mut self, driver: Driver, value: f64) -> Self {
        self.values.insert(driver, value);
        self
    }

    /// Sets the present value of a driver, rejecting NaN and infinity.
    pub fn try_with(self, driver: Driver, value: f64) -> Result<Self, ConfigError> {
        if !value.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "current",
                value: format!("{} = {}", driver, value),
            });
        }
        Ok(self.with(driver, value))
    }

    /// Builds the record from `(key, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownKey` for a key that is not a driver,
    /// `ConfigError::DuplicateKey` for a driver given twice (including both
    /// D&A spellings) and `ConfigError::InvalidParameter` for a non-finite
    /// value.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut current = Self::new();
        for (key, value) in entries {
            let key = key.as_ref();
            let driver = key.parse::<Driver>().map_err(|_| ConfigError::UnknownKey {
                context: "current financials".to_string(),
                key: key.to_string(),
            })?;
            if current.contains(driver) {
                return Err(ConfigError::DuplicateKey {
                    context: "current financials".to_string(),
                    key: key.to_string(),
                });
            }
            current = current.try_with(driver, value)?;
        }
        Ok(current)
    }

    /// Returns the present value of a driver.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingCurrentValue` if the driver was never set or
    /// holds a non-finite value.
    pub fn get(&self, driver: Driver) -> Result<f64, ConfigError> {
        match self.values.get(&driver) {
            Some(&value) if value.is_finite() => Ok(value),
            _ => Err(ConfigError::MissingCurrentValue {
                driver: driver.to_string(),
            }),
        }
    }

    /// Returns `true` if the driver has a present value.
    pub fn contains(&self, driver: Driver) -> bool {
        self.values.contains_key(&driver)
    }

    /// Iterates `(driver, value)` pairs in canonical driver order.
    pub fn iter(&self) -> impl Iterator<Item = (Driver, f64)> + '_ {
        self.values.iter().map(|(&d, &v)| (d, v))
    }
}

/// Target value of a driver at the end of the horizon and its standard
/// deviation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverEstimate {
    /// Expected value after `n_periods`.
    pub estimate: f64,
    /// Standard deviation of the estimate.
    pub uncertainty: f64,
}

impl DriverEstimate {
    /// Creates a validated estimate.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidUncertainty` if `uncertainty` is negative or
    /// non-finite, `ConfigError::InvalidParameter` if `estimate` is
    /// non-finite.
    pub fn new(driver: Driver, estimate: f64, uncertainty: f64) -> Result<Self, ConfigError> {
        if !estimate.is_finite() {
            return Err(ConfigError::InvalidParameter {
                name: "estimate",
                value: format!("{} = {}", driver, estimate),
            });
        }
        if !uncertainty.is_finite() || uncertainty < 0.0 {
            return Err(ConfigError::InvalidUncertainty {
                driver: driver.to_string(),
                value: uncertainty,
            });
        }
        Ok(Self {
            estimate,
            uncertainty,
        })
    }
}

/// A named, probability-weighted hypothesis about the future.
///
/// # Examples
/// ```
/// use dcf_core::types::{Driver, Scenario};
///
/// let scenario = Scenario::builder(0.75, 10_000.0)
///     .name("base")
///     .estimate(Driver::Revenue, 3500.0, 200.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(scenario.label(0), "base");
/// assert_eq!(scenario.estimate(Driver::Revenue, 0).unwrap().estimate, 3500.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    name: Option<String>,
    probability: f64,
    shares: f64,
    estimates: BTreeMap<Driver, DriverEstimate>,
}

impl Scenario {
    /// Starts building a scenario with the mandatory attributes.
    pub fn builder(probability: f64, shares: f64) -> ScenarioBuilder {
        ScenarioBuilder {
            name: None,
            probability,
            shares,
            estimates: Vec::new(),
        }
    }

    /// Builds a scenario from flat `(key, value)` pairs.
    ///
    /// Recognised keys are `probability`, `shares`, every driver key and
    /// every `{driver}_uncertainty` key. Each driver must come with both
    /// its estimate and its uncertainty.
    ///
    /// # Errors
    ///
    /// `ConfigError::UnknownKey` for unrecognised keys,
    /// `ConfigError::DuplicateKey` for a field given twice,
    /// `ConfigError::MissingKey` for a missing probability, shares, or half
    /// of an estimate/uncertainty pair, plus the validation errors of
    /// [`ScenarioBuilder::build`].
    pub fn from_entries<I, K>(name: Option<&str>, entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let context = format!("scenario '{}'", name.unwrap_or("<unnamed>"));
        let mut probability = None;
        let mut shares = None;
        let mut pairs: BTreeMap<Driver, (Option<f64>, Option<f64>)> = BTreeMap::new();

        for (key, value) in entries {
            let key = key.as_ref();
            let slot = match key {
                "probability" => &mut probability,
                "shares" => &mut shares,
                _ => match Driver::parse_estimate_key(key) {
                    Some((driver, true)) => &mut pairs.entry(driver).or_default().1,
                    Some((driver, false)) => &mut pairs.entry(driver).or_default().0,
                    None => {
                        return Err(ConfigError::UnknownKey {
                            context,
                            key: key.to_string(),
                        })
                    }
                },
            };
            if slot.replace(value).is_some() {
                return Err(ConfigError::DuplicateKey {
                    context,
                    key: key.to_string(),
                });
            }
        }

        let missing = |key: String| ConfigError::MissingKey {
            context: context.clone(),
            key,
        };
        let probability = probability.ok_or_else(|| missing("probability".to_string()))?;
        let shares = shares.ok_or_else(|| missing("shares".to_string()))?;

        let mut builder = Scenario::builder(probability, shares);
        if let Some(name) = name {
            builder = builder.name(name);
        }
        for (driver, pair) in pairs {
            match pair {
                (Some(estimate), Some(uncertainty)) => {
                    builder = builder.estimate(driver, estimate, uncertainty);
                }
                (None, _) => return Err(missing(driver.as_str().to_string())),
                (_, None) => return Err(missing(driver.uncertainty_key())),
            }
        }
        builder.build()
    }

    /// Returns the explicit name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the name, or `scenario_{ordinal}` for an unnamed scenario.
    pub fn label(&self, ordinal: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("scenario_{}", ordinal))
    }

    /// Returns the probability weight.
    #[inline]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Returns the share count under this scenario's capital structure.
    #[inline]
    pub fn shares(&self) -> f64 {
        self.shares
    }

    /// Returns the estimate for a driver.
    ///
    /// `ordinal` is the scenario's position in the run and only names the
    /// scenario in the error.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingDriverEstimate` if the scenario does not carry
    /// the driver.
    pub fn estimate(&self, driver: Driver, ordinal: usize) -> Result<DriverEstimate, ConfigError> {
        self.estimates
            .get(&driver)
            .copied()
            .ok_or_else(|| ConfigError::MissingDriverEstimate {
                scenario: self.label(ordinal),
                driver: driver.to_string(),
            })
    }

    /// Iterates the drivers this scenario carries.
    pub fn drivers(&self) -> impl Iterator<Item = Driver> + '_ {
        self.estimates.keys().copied()
    }
}

/// Builder for [`Scenario`].
#[derive(Clone, Debug)]
pub struct ScenarioBuilder {
    name: Option<String>,
    probability: f64,
    shares: f64,
    estimates: Vec<(Driver, f64, f64)>,
}

impl ScenarioBuilder {
    /// Sets the scenario name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds (or replaces) the estimate and uncertainty for a driver.
    pub fn estimate(mut self, driver: Driver, estimate: f64, uncertainty: f64) -> Self {
        self.estimates.push((driver, estimate, uncertainty));
        self
    }

    /// Validates and builds the scenario.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidProbability` unless `0 < probability <= 1`
    /// - `ConfigError::InvalidShares` unless `shares` is positive and finite
    /// - `ConfigError::InvalidUncertainty` for a negative or non-finite
    ///   standard deviation
    pub fn build(self) -> Result<Scenario, ConfigError> {
        let label = self.name.clone().unwrap_or_else(|| "<unnamed>".to_string());

        if !(self.probability > 0.0 && self.probability <= 1.0) {
            return Err(ConfigError::InvalidProbability {
                scenario: label,
                value: self.probability,
            });
        }
        if !(self.shares.is_finite() && self.shares > 0.0) {
            return Err(ConfigError::InvalidShares {
                scenario: label,
                value: self.shares,
            });
        }

        let mut estimates = BTreeMap::new();
        for (driver, estimate, uncertainty) in self.estimates {
            estimates.insert(driver, DriverEstimate::new(driver, estimate, uncertainty)?);
        }

        Ok(Scenario {
            name: self.name,
            probability: self.probability,
            shares: self.shares,
            estimates,
        })
    }
}

//! Financial drivers simulated by the engine.
//!
//! The set of drivers is closed: anything outside [`Driver::ALL`] is
//! rejected when an input record is parsed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// A primary-sampled financial driver.
///
/// Each scenario carries an `(estimate, uncertainty)` pair per driver and
/// the current financials carry its present value.
///
/// # Examples
/// ```
/// use dcf_core::types::Driver;
///
/// let driver: Driver = "gross_margin".parse().unwrap();
/// assert_eq!(driver, Driver::GrossMargin);
/// assert_eq!(driver.uncertainty_key(), "gross_margin_uncertainty");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// Top-line revenue.
    Revenue,
    /// Gross profit as a fraction of revenue.
    GrossMargin,
    /// EBIT as a fraction of revenue.
    EbitMargin,
    /// Interest expense.
    InterestExpense,
    /// Depreciation and amortisation.
    #[serde(rename = "deprication_amortization", alias = "depreciation_amortization")]
    DepreciationAmortization,
    /// Net working capital.
    NetWorkingCapital,
}

impl Driver {
    /// All drivers in canonical order.
    pub const ALL: [Driver; 6] = [
        Driver::Revenue,
        Driver::GrossMargin,
        Driver::EbitMargin,
        Driver::InterestExpense,
        Driver::DepreciationAmortization,
        Driver::NetWorkingCapital,
    ];

    /// Returns the record key for this driver.
    ///
    /// D&A keeps its historical `deprication_amortization` spelling so that
    /// existing input files stay readable.
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Revenue => "revenue",
            Driver::GrossMargin => "gross_margin",
            Driver::EbitMargin => "ebit_margin",
            Driver::InterestExpense => "interest_expense",
            Driver::DepreciationAmortization => "deprication_amortization",
            Driver::NetWorkingCapital => "net_working_capital",
        }
    }

    /// Returns the key carrying the standard deviation of this driver's
    /// estimate.
    pub fn uncertainty_key(&self) -> String {
        format!("{}_uncertainty", self.as_str())
    }

    /// Parses a key of the form `{driver}` or `{driver}_uncertainty`.
    ///
    /// Returns the driver and whether the key names the uncertainty, or
    /// `None` if the key is not driver-related.
    pub fn parse_estimate_key(key: &str) -> Option<(Driver, bool)> {
        match key.strip_suffix("_uncertainty") {
            Some(base) => base.parse().ok().map(|d| (d, true)),
            None => key.parse().ok().map(|d| (d, false)),
        }
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "revenue" => Ok(Driver::Revenue),
            "gross_margin" => Ok(Driver::GrossMargin),
            "ebit_margin" => Ok(Driver::EbitMargin),
            "interest_expense" => Ok(Driver::InterestExpense),
            "deprication_amortization" | "depreciation_amortization" => {
                Ok(Driver::DepreciationAmortization)
            }
            "net_working_capital" => Ok(Driver::NetWorkingCapital),
            other => Err(ConfigError::UnknownKey {
                context: "driver names".to_string(),
                key: other.to_string(),
            }),
        }
    }
}

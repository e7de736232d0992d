//! Results store scoped to one forecast run.
//!
//! Every computed driver matrix and derived metric is cached here under a
//! [`Metric`] key. The store fixes the run's `(samples, periods)` shape at
//! construction and rejects anything that does not fit it, so every matrix
//! it hands out shares the same row and column count.

use std::collections::BTreeMap;
use std::fmt;

use dcf_core::math::DriverMatrix;
use dcf_core::types::{ConfigError, Driver};
use serde::{Deserialize, Serialize};

/// Key of a cached quantity.
///
/// The six primary drivers come first, followed by the derived metrics in
/// dependency order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Simulated revenue.
    Revenue,
    /// Simulated gross margin.
    GrossMargin,
    /// Simulated EBIT margin.
    EbitMargin,
    /// Simulated interest expense.
    InterestExpense,
    /// Simulated depreciation and amortisation.
    #[serde(rename = "deprication_amortization", alias = "depreciation_amortization")]
    DepreciationAmortization,
    /// Simulated net working capital.
    NetWorkingCapital,
    /// Revenue × gross margin.
    GrossProfit,
    /// SG&A as a residual of gross profit, D&A and EBIT margin.
    SellingGeneralAdminExpense,
    /// After-tax income from the EBIT margin.
    NetIncome,
    /// Free cash flow with capex equal to D&A.
    FreeCashflow,
    /// `(1 + wacc)^t` per period.
    DiscountFactor,
    /// Discounted free cash flow.
    #[serde(rename = "npv")]
    PresentValue,
    /// Discounted perpetuity value per sample.
    TerminalValue,
    /// Sum of present values plus terminal value per sample.
    CompanyValue,
    /// Company value over the sample's share count.
    FairValuePerShare,
}

impl Metric {
    /// All metrics in dependency order.
    pub const ALL: [Metric; 15] = [
        Metric::Revenue,
        Metric::GrossMargin,
        Metric::EbitMargin,
        Metric::InterestExpense,
        Metric::DepreciationAmortization,
        Metric::NetWorkingCapital,
        Metric::GrossProfit,
        Metric::SellingGeneralAdminExpense,
        Metric::NetIncome,
        Metric::FreeCashflow,
        Metric::DiscountFactor,
        Metric::PresentValue,
        Metric::TerminalValue,
        Metric::CompanyValue,
        Metric::FairValuePerShare,
    ];

    /// Returns the results-mapping key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Revenue => Driver::Revenue.as_str(),
            Metric::GrossMargin => Driver::GrossMargin.as_str(),
            Metric::EbitMargin => Driver::EbitMargin.as_str(),
            Metric::InterestExpense => Driver::InterestExpense.as_str(),
            Metric::DepreciationAmortization => Driver::DepreciationAmortization.as_str(),
            Metric::NetWorkingCapital => Driver::NetWorkingCapital.as_str(),
            Metric::GrossProfit => "gross_profit",
            Metric::SellingGeneralAdminExpense => "selling_general_admin_expense",
            Metric::NetIncome => "net_income",
            Metric::FreeCashflow => "free_cashflow",
            Metric::DiscountFactor => "discount_factor",
            Metric::PresentValue => "npv",
            Metric::TerminalValue => "terminal_value",
            Metric::CompanyValue => "company_value",
            Metric::FairValuePerShare => "fair_value_per_share",
        }
    }

    /// The primary driver behind this metric, if it is one.
    pub fn driver(&self) -> Option<Driver> {
        match self {
            Metric::Revenue => Some(Driver::Revenue),
            Metric::GrossMargin => Some(Driver::GrossMargin),
            Metric::EbitMargin => Some(Driver::EbitMargin),
            Metric::InterestExpense => Some(Driver::InterestExpense),
            Metric::DepreciationAmortization => Some(Driver::DepreciationAmortization),
            Metric::NetWorkingCapital => Some(Driver::NetWorkingCapital),
            _ => None,
        }
    }

    /// Returns `true` for metrics stored as one value per sample.
    pub fn is_per_sample(&self) -> bool {
        matches!(
            self,
            Metric::TerminalValue | Metric::CompanyValue | Metric::FairValuePerShare
        )
    }
}

impl From<Driver> for Metric {
    fn from(driver: Driver) -> Self {
        match driver {
            Driver::Revenue => Metric::Revenue,
            Driver::GrossMargin => Metric::GrossMargin,
            Driver::EbitMargin => Metric::EbitMargin,
            Driver::InterestExpense => Metric::InterestExpense,
            Driver::DepreciationAmortization => Metric::DepreciationAmortization,
            Driver::NetWorkingCapital => Metric::NetWorkingCapital,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Metric {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(driver) = s.parse::<Driver>() {
            return Ok(driver.into());
        }
        Metric::ALL
            .iter()
            .find(|m| m.as_str() == s)
            .copied()
            .ok_or_else(|| ConfigError::UnknownKey {
                context: "results".to_string(),
                key: s.to_string(),
            })
    }
}

/// A cached quantity: per sample and period, or per sample only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// `(samples, periods)` matrix.
    Matrix(DriverMatrix),
    /// One value per sample.
    Vector(Vec<f64>),
}

impl MetricValue {
    /// Shape as `(rows, cols)`; a vector reports one column.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            MetricValue::Matrix(m) => m.shape(),
            MetricValue::Vector(v) => (v.len(), 1),
        }
    }

    /// Returns the matrix, if this is one.
    pub fn as_matrix(&self) -> Option<&DriverMatrix> {
        match self {
            MetricValue::Matrix(m) => Some(m),
            MetricValue::Vector(_) => None,
        }
    }

    /// Returns the vector, if this is one.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            MetricValue::Matrix(_) => None,
            MetricValue::Vector(v) => Some(v),
        }
    }
}

/// Insert-once cache of run results.
///
/// # Examples
///
/// ```rust
/// use dcf_core::math::DriverMatrix;
/// use dcf_engine::simulation::{Metric, MetricValue, ResultsStore};
///
/// let mut store = ResultsStore::new(2, 3);
/// store
///     .insert(Metric::Revenue, MetricValue::Matrix(DriverMatrix::zeros(2, 3)))
///     .unwrap();
///
/// assert!(store.contains(Metric::Revenue));
/// assert_eq!(store.matrix(Metric::Revenue).unwrap().shape(), (2, 3));
/// assert!(store.vector(Metric::Revenue).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsStore {
    rows: usize,
    cols: usize,
    entries: BTreeMap<Metric, MetricValue>,
}

impl ResultsStore {
    /// Creates an empty store for `rows` samples over `cols` periods.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: BTreeMap::new(),
        }
    }

    /// Returns the `(samples, periods)` shape every matrix must have.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Caches `value` under `metric` and returns the cached entry.
    ///
    /// A metric is computed once: if an entry already exists it is kept and
    /// `value` is dropped.
    ///
    /// # Errors
    ///
    /// `ConfigError::ShapeMismatch` if a matrix is not `(samples, periods)`
    /// or a vector is not one value per sample.
    pub fn insert(
        &mut self,
        metric: Metric,
        value: MetricValue,
    ) -> Result<&MetricValue, ConfigError> {
        let expected = match value {
            MetricValue::Matrix(_) => (self.rows, self.cols),
            MetricValue::Vector(_) => (self.rows, 1),
        };
        if value.shape() != expected {
            return Err(ConfigError::ShapeMismatch {
                expected,
                actual: value.shape(),
            });
        }
        Ok(self.entries.entry(metric).or_insert(value))
    }

    /// Returns `true` if `metric` has been computed.
    #[inline]
    pub fn contains(&self, metric: Metric) -> bool {
        self.entries.contains_key(&metric)
    }

    /// Returns the cached entry, if any.
    #[inline]
    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.entries.get(&metric)
    }

    /// Returns a cached matrix.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKey` if `metric` has not been computed
    /// - `ConfigError::ShapeMismatch` if it is stored as a vector
    pub fn matrix(&self, metric: Metric) -> Result<&DriverMatrix, ConfigError> {
        match self.lookup(metric)? {
            MetricValue::Matrix(m) => Ok(m),
            other => Err(ConfigError::ShapeMismatch {
                expected: (self.rows, self.cols),
                actual: other.shape(),
            }),
        }
    }

    /// Returns a cached per-sample vector.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingKey` if `metric` has not been computed
    /// - `ConfigError::ShapeMismatch` if it is stored as a matrix
    pub fn vector(&self, metric: Metric) -> Result<&[f64], ConfigError> {
        match self.lookup(metric)? {
            MetricValue::Vector(v) => Ok(v),
            other => Err(ConfigError::ShapeMismatch {
                expected: (self.rows, 1),
                actual: other.shape(),
            }),
        }
    }

    /// Computed metrics in dependency order.
    pub fn keys(&self) -> impl Iterator<Item = Metric> + '_ {
        self.entries.keys().copied()
    }

    /// Number of cached metrics.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been computed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the store, yielding its entries in dependency order.
    pub fn into_entries(self) -> impl Iterator<Item = (Metric, MetricValue)> {
        self.entries.into_iter()
    }

    fn lookup(&self, metric: Metric) -> Result<&MetricValue, ConfigError> {
        self.entries.get(&metric).ok_or_else(|| ConfigError::MissingKey {
            context: "results store".to_string(),
            key: metric.as_str().to_string(),
        })
    }
}

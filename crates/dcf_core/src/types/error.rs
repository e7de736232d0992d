//! Error types for structured error handling.
//!
//! This module provides:
//! - `ConfigError`: malformed inputs (unknown or missing keys, invalid
//!   probabilities, shape mismatches)
//! - `NumericalError`: numerical preconditions that would otherwise turn
//!   into silent infinities or NaNs
//! - `ValuationError`: the umbrella type returned by the valuation engine
//!
//! Every error is deterministic given the same inputs; nothing here is
//! retryable.

use thiserror::Error;

/// Configuration errors.
///
/// Raised at the point of first use, naming the offending scenario and/or
/// driver so the caller can fix the input.
///
/// # Examples
/// ```
/// use dcf_core::types::ConfigError;
///
/// let err = ConfigError::UnknownKey {
///     context: "current financials".to_string(),
///     key: "ebitda".to_string(),
/// };
/// assert_eq!(format!("{}", err), "Unknown key 'ebitda' in current financials");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Key not recognised as a driver or scenario attribute.
    #[error("Unknown key '{key}' in {context}")]
    UnknownKey {
        /// Where the key was found
        context: String,
        /// The unrecognised key
        key: String,
    },

    /// Required key absent from an input record.
    #[error("Missing key '{key}' in {context}")]
    MissingKey {
        /// Where the key was expected
        context: String,
        /// The missing key
        key: String,
    },

    /// The same field supplied twice, possibly under an alias.
    #[error("Duplicate key '{key}' in {context}")]
    DuplicateKey {
        /// Where the key was found
        context: String,
        /// The repeated key as written
        key: String,
    },

    /// Current financials carry no present value for the driver.
    #[error("Current financials have no value for driver '{driver}'")]
    MissingCurrentValue {
        /// Driver key
        driver: String,
    },

    /// Scenario carries no estimate/uncertainty pair for the driver.
    #[error("Scenario '{scenario}' has no '{driver}' estimate and uncertainty")]
    MissingDriverEstimate {
        /// Scenario label
        scenario: String,
        /// Driver key
        driver: String,
    },

    /// Probability outside (0, 1].
    #[error("Invalid probability {value} for scenario '{scenario}': must be in (0, 1]")]
    InvalidProbability {
        /// Scenario label
        scenario: String,
        /// Offending probability
        value: f64,
    },

    /// Share count not strictly positive and finite.
    #[error("Invalid share count {value} for scenario '{scenario}': must be positive")]
    InvalidShares {
        /// Scenario label
        scenario: String,
        /// Offending share count
        value: f64,
    },

    /// Negative or non-finite standard deviation.
    #[error("Invalid uncertainty {value} for driver '{driver}': must be finite and >= 0")]
    InvalidUncertainty {
        /// Driver key
        driver: String,
        /// Offending standard deviation
        value: f64,
    },

    /// Run parameter out of range.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Description of the invalid value
        value: String,
    },

    /// A run needs at least one scenario.
    #[error("At least one scenario is required")]
    NoScenarios,

    /// Floor allocations of the leading scenarios exceed the sample budget.
    #[error("Scenario allocations request {requested} samples but only {available} are available")]
    AllocationOverflow {
        /// Samples claimed by all but the last scenario
        requested: usize,
        /// Total sample budget
        available: usize,
    },

    /// Element-wise operation on matrices of different shapes.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Expected (rows, cols)
        expected: (usize, usize),
        /// Actual (rows, cols)
        actual: (usize, usize),
    },

    /// Per-sample vectors of different lengths.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Numerical precondition failures.
///
/// These are rejected before any matrix is materialised rather than
/// coerced into NaN or infinity.
///
/// # Examples
/// ```
/// use dcf_core::types::NumericalError;
///
/// let err = NumericalError::DiscountRateNotAbovePerpetualRate {
///     wacc: 0.05,
///     perpetual_rate: 0.05,
/// };
/// assert!(format!("{}", err).contains("must exceed"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericalError {
    /// Start value of a growth derivation is zero.
    #[error("Current value is zero: growth rate is undefined")]
    ZeroCurrentValue,

    /// Growth over zero periods.
    #[error("Growth rate needs at least one period")]
    ZeroPeriods,

    /// Negative ratio with an even root has no real growth rate.
    #[error("Ratio {ratio} over {periods} periods has no real growth rate")]
    NonRealGrowth {
        /// end / start
        ratio: f64,
        /// Number of compounding periods
        periods: usize,
    },

    /// Terminal value undefined or negative.
    #[error("WACC {wacc} must exceed perpetual growth rate {perpetual_rate}")]
    DiscountRateNotAbovePerpetualRate {
        /// Discount rate
        wacc: f64,
        /// Perpetual growth rate
        perpetual_rate: f64,
    },

    /// Share count at the given sample index is zero or negative.
    #[error("Share count {value} at sample {index} must be positive")]
    NonPositiveShareCount {
        /// Sample row
        index: usize,
        /// Offending share count
        value: f64,
    },

    /// Input that must be finite was NaN or infinite.
    #[error("Non-finite value for {what}: {value}")]
    NonFinite {
        /// Name of the quantity
        what: &'static str,
        /// Offending value
        value: f64,
    },
}

/// Umbrella error for valuation runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    /// Malformed input.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Violated numerical precondition.
    #[error(transparent)]
    Numerical(#[from] NumericalError),

    /// Numerical failure while sampling one scenario's driver.
    #[error("Sampling '{driver}' for scenario '{scenario}' failed: {source}")]
    Sampling {
        /// Driver key
        driver: String,
        /// Scenario label
        scenario: String,
        /// Underlying failure
        #[source]
        source: NumericalError,
    },
}

/// Result alias used throughout the valuation crates.
pub type ValuationResult<T> = Result<T, ValuationError>;

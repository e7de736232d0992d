//! Core types for Monte Carlo DCF valuation.
//!
//! This module provides:
//! - [`Driver`]: the closed set of simulated financial drivers
//! - [`CurrentFinancials`], [`Scenario`], [`DriverEstimate`]: input records
//! - [`RunParameters`]: validated scalar run parameters
//! - Error types: [`ConfigError`], [`NumericalError`], [`ValuationError`]

pub mod driver;
pub mod error;
pub mod financials;
pub mod params;

pub use driver::Driver;
pub use error::{ConfigError, NumericalError, ValuationError, ValuationResult};
pub use financials::{CurrentFinancials, DriverEstimate, Scenario, ScenarioBuilder};
pub use params::{RunParameters, RunParametersBuilder, MAX_PERIODS, MAX_SAMPLES};

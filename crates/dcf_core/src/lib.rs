//! # dcf_core: Foundation for Monte Carlo DCF Valuation
//!
//! ## Layer 1 (Foundation) Role
//!
//! dcf_core is the bottom layer of the valuation workspace, providing:
//! - The closed driver vocabulary (`types::driver`)
//! - Input records: current financials and weighted scenarios (`types::financials`)
//! - Validated run parameters (`types::params`)
//! - Error taxonomy: `ConfigError`, `NumericalError`, `ValuationError` (`types::error`)
//! - Growth-rate maths, the sample × period matrix and summary statistics (`math`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 depends on no other workspace crate and carries no randomness;
//! sampling lives in `dcf_engine`.
//!
//! ## Usage Examples
//!
//! ```rust
//! use dcf_core::math::cagr;
//! use dcf_core::types::{CurrentFinancials, Driver, Scenario};
//!
//! let current = CurrentFinancials::new().with(Driver::Revenue, 2200.0);
//! let scenario = Scenario::builder(1.0, 10_000.0)
//!     .estimate(Driver::Revenue, 3500.0, 200.0)
//!     .build()
//!     .unwrap();
//!
//! let start = current.get(Driver::Revenue).unwrap();
//! let target = scenario.estimate(Driver::Revenue, 0).unwrap().estimate;
//! let growth = cagr(start, target, 5).unwrap();
//! assert!(growth > 0.09 && growth < 0.1);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod types;

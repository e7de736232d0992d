//! # dcf_engine: Monte Carlo DCF Simulation (Layer 2)
//!
//! ## Layer 2 Role
//!
//! dcf_engine turns the inputs defined in `dcf_core` into a fair-value-per-
//! share distribution:
//! - Seeded random number generation (`rng`)
//! - Scenario sampling, sample allocation and driver aggregation
//!   (`simulation::{sampler, allocation, aggregator}`)
//! - Financial statements, discounting and share value translation
//!   (`simulation::{statements, discount, shares}`)
//! - Run orchestration over a memoising results store
//!   (`simulation::{run, store, results}`)
//! - TOML configuration (`config`) and logging setup (`logging`)
//!
//! ## Determinism
//!
//! A run is single-threaded. Each driver draws from its own generator
//! derived from the run seed, so the same seed and inputs reproduce every
//! value bit for bit regardless of the order metrics are requested in.
//! Independent runs share nothing and can execute in parallel.
//!
//! ## Usage Example
//!
//! ```rust
//! use dcf_core::types::{CurrentFinancials, Driver, RunParameters, Scenario};
//! use dcf_engine::simulation::ForecastRun;
//!
//! let current = CurrentFinancials::new()
//!     .with(Driver::Revenue, 2200.0)
//!     .with(Driver::GrossMargin, 0.2)
//!     .with(Driver::EbitMargin, 0.1)
//!     .with(Driver::InterestExpense, 100.0)
//!     .with(Driver::DepreciationAmortization, 200.0)
//!     .with(Driver::NetWorkingCapital, 100.0);
//!
//! let base = Scenario::builder(1.0, 10_000.0)
//!     .name("base")
//!     .estimate(Driver::Revenue, 3500.0, 200.0)
//!     .estimate(Driver::GrossMargin, 0.25, 0.05)
//!     .estimate(Driver::EbitMargin, 0.15, 0.02)
//!     .estimate(Driver::InterestExpense, 200.0, 10.0)
//!     .estimate(Driver::DepreciationAmortization, 200.0, 20.0)
//!     .estimate(Driver::NetWorkingCapital, 100.0, 0.0)
//!     .build()
//!     .unwrap();
//!
//! let params = RunParameters::builder()
//!     .n_periods(5)
//!     .n_samples(1_000)
//!     .wacc(0.08)
//!     .perpetual_rate(0.02)
//!     .tax_rate(0.22)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let results = ForecastRun::new(current, vec![base], params)
//!     .unwrap()
//!     .finalize()
//!     .unwrap();
//!
//! assert_eq!(results.fair_value_per_share().len(), 1_000);
//! assert!(results.expected_fair_value().is_finite());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod logging;
pub mod rng;
pub mod simulation;

//! Numerical building blocks.
//!
//! - [`growth`]: compound growth rate derivation
//! - [`matrix`]: dense sample × period matrix with shape-checked arithmetic
//! - [`stats`]: summary statistics of simulated distributions

pub mod growth;
pub mod matrix;
pub mod stats;

pub use growth::{cagr, compound};
pub use matrix::DriverMatrix;
pub use stats::DistributionSummary;

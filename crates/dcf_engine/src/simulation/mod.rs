//! Monte Carlo valuation pipeline.
//!
//! Stages, in dependency order:
//! - [`sampler`]: one driver for one scenario
//! - [`allocation`]: per-scenario sample counts
//! - [`aggregator`]: one driver across all scenarios
//! - [`statements`]: gross profit, SG&A, net income and free cash flow
//! - [`discount`]: discount factors, present and terminal values, company value
//! - [`shares`]: fair value per share
//!
//! [`ForecastRun`] wires the stages together over a memoising
//! [`ResultsStore`] and hands back [`ForecastResults`].

pub mod aggregator;
pub mod allocation;
pub mod discount;
pub mod results;
pub mod run;
pub mod sampler;
pub mod shares;
pub mod statements;
pub mod store;

pub use aggregator::aggregate_driver;
pub use allocation::SampleAllocation;
pub use discount::{company_values, discount_factors, present_values, terminal_values};
pub use results::{ForecastResults, ScenarioSummary};
pub use run::{ForecastRun, DEFAULT_SEED};
pub use sampler::simulate_driver;
pub use shares::{fair_value_per_share, share_vector};
pub use store::{Metric, MetricValue, ResultsStore};

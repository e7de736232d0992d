//! Finalised outputs of a forecast run.

use std::collections::BTreeMap;

use dcf_core::math::{stats, DistributionSummary, DriverMatrix};
use dcf_core::types::{ConfigError, RunParameters, ValuationResult};
use serde::Serialize;

use super::allocation::SampleAllocation;
use super::store::{Metric, MetricValue, ResultsStore};

/// Distribution of one metric within one scenario's samples.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioSummary {
    /// Scenario label.
    pub scenario: String,
    /// Samples allocated to the scenario.
    pub samples: usize,
    /// `None` when the scenario received no samples.
    pub summary: Option<DistributionSummary>,
}

/// Every metric of a finished run plus the sample attribution needed to
/// group them by scenario.
///
/// Serialises as a flat mapping: metrics appear under their results key
/// (`revenue`, `free_cashflow`, `fair_value_per_share`, ...) next to the
/// allocation and the per-sample `scenario_name` column.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastResults {
    n_periods: usize,
    n_samples: usize,
    seed: u64,
    samples: SampleAllocation,
    scenario_labels: Vec<String>,
    #[serde(rename = "scenario_name")]
    sample_labels: Vec<String>,
    #[serde(flatten)]
    metrics: BTreeMap<Metric, MetricValue>,
}

impl ForecastResults {
    pub(crate) fn new(
        params: RunParameters,
        seed: u64,
        allocation: SampleAllocation,
        scenario_labels: Vec<String>,
        sample_labels: Vec<String>,
        store: ResultsStore,
    ) -> Self {
        Self {
            n_periods: params.n_periods(),
            n_samples: params.n_samples(),
            seed,
            samples: allocation,
            scenario_labels,
            sample_labels,
            metrics: store.into_entries().collect(),
        }
    }

    /// Forecast horizon.
    #[inline]
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Total sample count.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Seed of the random stream the run drew from.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples per scenario.
    #[inline]
    pub fn allocation(&self) -> &SampleAllocation {
        &self.samples
    }

    /// Scenario labels in input order.
    #[inline]
    pub fn scenario_labels(&self) -> &[String] {
        &self.scenario_labels
    }

    /// Scenario label of every sample row.
    #[inline]
    pub fn sample_labels(&self) -> &[String] {
        &self.sample_labels
    }

    /// Computed metrics in dependency order.
    pub fn metrics(&self) -> impl Iterator<Item = (Metric, &MetricValue)> + '_ {
        self.metrics.iter().map(|(&m, v)| (m, v))
    }

    /// Returns a metric by value.
    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.metrics.get(&metric)
    }

    /// Returns a matrix metric by results key.
    ///
    /// # Errors
    ///
    /// - `ConfigError::UnknownKey` if `name` is not a metric
    /// - `ConfigError::ShapeMismatch` if the metric is per sample only
    pub fn matrix(&self, name: &str) -> ValuationResult<&DriverMatrix> {
        let metric: Metric = name.parse()?;
        match self.lookup(metric)? {
            MetricValue::Matrix(m) => Ok(m),
            other => Err(ConfigError::ShapeMismatch {
                expected: (self.n_samples, self.n_periods),
                actual: other.shape(),
            }
            .into()),
        }
    }

    /// Returns a per-sample metric by results key.
    ///
    /// # Errors
    ///
    /// - `ConfigError::UnknownKey` if `name` is not a metric
    /// - `ConfigError::ShapeMismatch` if the metric is a matrix
    pub fn vector(&self, name: &str) -> ValuationResult<&[f64]> {
        let metric: Metric = name.parse()?;
        match self.lookup(metric)? {
            MetricValue::Vector(v) => Ok(v),
            other => Err(ConfigError::ShapeMismatch {
                expected: (self.n_samples, 1),
                actual: other.shape(),
            }
            .into()),
        }
    }

    /// Fair value per share, one value per sample.
    pub fn fair_value_per_share(&self) -> &[f64] {
        self.per_sample(Metric::FairValuePerShare)
    }

    /// Company value, one value per sample.
    pub fn company_value(&self) -> &[f64] {
        self.per_sample(Metric::CompanyValue)
    }

    /// Mean fair value per share.
    ///
    /// Samples are already allocated in proportion to scenario
    /// probability, so the plain mean is the probability-weighted one.
    pub fn expected_fair_value(&self) -> f64 {
        stats::mean(self.fair_value_per_share())
    }

    /// Distribution of a metric across all samples.
    ///
    /// Per-sample metrics are summarised directly; matrix metrics are
    /// summarised over their final period.
    pub fn summary(&self, metric: Metric) -> Option<DistributionSummary> {
        DistributionSummary::from_samples(&self.final_values(metric)?)
    }

    /// Distribution of a metric within each scenario, in scenario order.
    ///
    /// Returns an empty list if the metric was not computed.
    pub fn scenario_summaries(&self, metric: Metric) -> Vec<ScenarioSummary> {
        let Some(values) = self.final_values(metric) else {
            return Vec::new();
        };
        self.scenario_labels
            .iter()
            .zip(self.samples.ranges())
            .map(|(label, range)| ScenarioSummary {
                scenario: label.clone(),
                samples: range.len(),
                summary: values
                    .get(range)
                    .and_then(DistributionSummary::from_samples),
            })
            .collect()
    }

    /// Mean trajectory of a matrix metric, one value per period.
    ///
    /// `None` for per-sample metrics and metrics not computed.
    pub fn period_means(&self, metric: Metric) -> Option<Vec<f64>> {
        self.metrics
            .get(&metric)
            .and_then(MetricValue::as_matrix)
            .map(DriverMatrix::column_means)
    }

    fn lookup(&self, metric: Metric) -> Result<&MetricValue, ConfigError> {
        self.metrics.get(&metric).ok_or_else(|| ConfigError::MissingKey {
            context: "forecast results".to_string(),
            key: metric.as_str().to_string(),
        })
    }

    fn per_sample(&self, metric: Metric) -> &[f64] {
        self.metrics
            .get(&metric)
            .and_then(MetricValue::as_vector)
            .unwrap_or_default()
    }

    fn final_values(&self, metric: Metric) -> Option<Vec<f64>> {
        match self.metrics.get(&metric)? {
            MetricValue::Matrix(m) => Some(m.last_column()),
            MetricValue::Vector(v) => Some(v.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::ForecastRun;
    use dcf_core::types::{CurrentFinancials, Driver, Scenario, ValuationError};

    fn results() -> ForecastResults {
        let mut current = CurrentFinancials::new();
        let mut cheap = Scenario::builder(0.5, 1_000.0).name("cheap");
        let mut dear = Scenario::builder(0.5, 500.0).name("dear");
        for driver in Driver::ALL {
            current = current.with(driver, 100.0);
            cheap = cheap.estimate(driver, 100.0, 0.0);
            dear = dear.estimate(driver, 100.0, 0.0);
        }
        let params = RunParameters::builder()
            .n_periods(3)
            .n_samples(10)
            .wacc(0.09)
            .perpetual_rate(0.01)
            .tax_rate(0.2)
            .build()
            .unwrap();

        ForecastRun::new(
            current,
            vec![cheap.build().unwrap(), dear.build().unwrap()],
            params,
        )
        .unwrap()
        .finalize()
        .unwrap()
    }

    #[test]
    fn test_all_metrics_present() {
        let results = results();
        let metrics: Vec<Metric> = results.metrics().map(|(m, _)| m).collect();
        assert_eq!(metrics, Metric::ALL.to_vec());
        assert_eq!(results.fair_value_per_share().len(), 10);
        assert_eq!(results.company_value().len(), 10);
        assert_eq!(results.seed(), 0);
    }

    #[test]
    fn test_lookup_by_name() {
        let results = results();
        assert_eq!(results.matrix("revenue").unwrap().shape(), (10, 3));
        assert_eq!(results.vector("company_value").unwrap().len(), 10);
        assert!(matches!(
            results.vector("revenue"),
            Err(ValuationError::Config(ConfigError::ShapeMismatch { .. }))
        ));
        assert!(matches!(
            results.matrix("ebitda"),
            Err(ValuationError::Config(ConfigError::UnknownKey { .. }))
        ));
    }

    #[test]
    fn test_scenario_attribution() {
        let results = results();
        assert_eq!(results.sample_labels()[4], "cheap");
        assert_eq!(results.sample_labels()[5], "dear");

        // Same company value, half the shares: twice the fair value.
        let groups = results.scenario_summaries(Metric::FairValuePerShare);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].scenario, "cheap");
        assert_eq!(groups[1].samples, 5);
        let cheap = groups[0].summary.unwrap().mean;
        let dear = groups[1].summary.unwrap().mean;
        assert!((dear / cheap - 2.0).abs() < 1e-9);

        let expected = (cheap + dear) / 2.0;
        assert!((results.expected_fair_value() - expected).abs() < 1e-9 * expected.abs());
    }

    #[test]
    fn test_summaries_and_period_means() {
        let results = results();
        let summary = results.summary(Metric::Revenue).unwrap();
        assert_eq!(summary.count, 10);
        assert!((summary.mean - 100.0).abs() < 1e-9);

        let means = results.period_means(Metric::FreeCashflow).unwrap();
        assert_eq!(means.len(), 3);
        assert!(results.period_means(Metric::CompanyValue).is_none());
    }
}

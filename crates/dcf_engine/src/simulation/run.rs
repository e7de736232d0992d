//! Forecast run: the aggregate root of one valuation.
//!
//! A [`ForecastRun`] owns its inputs, its random source and its results
//! store. Metrics are computed on first demand, prerequisites first, and
//! cached; asking for the same metric again returns the cached value.
//!
//! Each driver draws from its own stream derived from the run seed, so two
//! runs with the same seed and inputs are bit-for-bit identical whatever
//! order their metrics are demanded in.

use dcf_core::math::DriverMatrix;
use dcf_core::types::{
    ConfigError, CurrentFinancials, Driver, RunParameters, Scenario, ValuationResult,
};
use tracing::{debug, info};

use super::aggregator::aggregate_driver;
use super::allocation::SampleAllocation;
use super::discount::{company_values, discount_factors, present_values, terminal_values};
use super::results::ForecastResults;
use super::shares::{fair_value_per_share, share_vector};
use super::statements;
use super::store::{Metric, MetricValue, ResultsStore};
use crate::rng::EngineRng;

/// Seed used when the parameters carry none.
pub const DEFAULT_SEED: u64 = 0;

/// One Monte Carlo valuation.
///
/// # Examples
///
/// ```rust
/// use dcf_core::types::{CurrentFinancials, Driver, RunParameters, Scenario};
/// use dcf_engine::simulation::ForecastRun;
///
/// let mut current = CurrentFinancials::new();
/// let mut scenario = Scenario::builder(1.0, 1_000.0);
/// for driver in Driver::ALL {
///     current = current.with(driver, 100.0);
///     scenario = scenario.estimate(driver, 120.0, 0.0);
/// }
/// let params = RunParameters::builder()
///     .n_periods(3)
///     .n_samples(100)
///     .wacc(0.08)
///     .perpetual_rate(0.02)
///     .tax_rate(0.2)
///     .seed(7)
///     .build()
///     .unwrap();
///
/// let mut run = ForecastRun::new(current, vec![scenario.build().unwrap()], params).unwrap();
/// assert_eq!(run.fair_value_per_share().unwrap().len(), 100);
/// ```
#[derive(Debug)]
pub struct ForecastRun {
    current: CurrentFinancials,
    scenarios: Vec<Scenario>,
    params: RunParameters,
    allocation: SampleAllocation,
    labels: Vec<String>,
    rng: EngineRng,
    store: ResultsStore,
}

impl ForecastRun {
    /// Creates a run seeded from `params.seed()`, or [`DEFAULT_SEED`].
    ///
    /// # Errors
    ///
    /// See [`ForecastRun::with_rng`].
    pub fn new(
        current: CurrentFinancials,
        scenarios: Vec<Scenario>,
        params: RunParameters,
    ) -> ValuationResult<Self> {
        let rng = EngineRng::from_seed(params.seed().unwrap_or(DEFAULT_SEED));
        Self::with_rng(current, scenarios, params, rng)
    }

    /// Creates a run whose driver streams derive from `rng`'s seed.
    ///
    /// Nothing is simulated here; parameters are validated and samples are
    /// allocated to scenarios.
    ///
    /// # Errors
    ///
    /// - any [`RunParameters::validate`] failure, including
    ///   `wacc <= perpetual_rate`
    /// - `ConfigError::NoScenarios` for an empty scenario list
    /// - `ConfigError::AllocationOverflow` if the probabilities over-claim
    ///   the sample budget
    pub fn with_rng(
        current: CurrentFinancials,
        scenarios: Vec<Scenario>,
        params: RunParameters,
        rng: EngineRng,
    ) -> ValuationResult<Self> {
        params.validate()?;
        let allocation = SampleAllocation::new(&scenarios, params.n_samples())?;
        let labels: Vec<String> = scenarios
            .iter()
            .enumerate()
            .map(|(ordinal, scenario)| scenario.label(ordinal))
            .collect();

        info!(
            scenarios = scenarios.len(),
            n_samples = params.n_samples(),
            n_periods = params.n_periods(),
            wacc = params.wacc(),
            perpetual_rate = params.perpetual_rate(),
            seed = rng.seed(),
            "forecast run created"
        );
        for (label, samples) in labels.iter().zip(allocation.counts()) {
            debug!(scenario = %label, samples, "allocated samples");
        }

        let store = ResultsStore::new(params.n_samples(), params.n_periods());
        Ok(Self {
            current,
            scenarios,
            params,
            allocation,
            labels,
            rng,
            store,
        })
    }

    /// Run parameters.
    #[inline]
    pub fn params(&self) -> &RunParameters {
        &self.params
    }

    /// Current financials.
    #[inline]
    pub fn current(&self) -> &CurrentFinancials {
        &self.current
    }

    /// Scenarios in input order.
    #[inline]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Samples per scenario.
    #[inline]
    pub fn allocation(&self) -> &SampleAllocation {
        &self.allocation
    }

    /// Scenario labels in input order.
    #[inline]
    pub fn scenario_labels(&self) -> &[String] {
        &self.labels
    }

    /// Scenario label of every sample row.
    pub fn sample_labels(&self) -> Vec<&str> {
        let mut labels = Vec::with_capacity(self.allocation.total());
        for (label, &count) in self.labels.iter().zip(self.allocation.counts()) {
            labels.extend(std::iter::repeat(label.as_str()).take(count));
        }
        labels
    }

    /// Everything computed so far.
    #[inline]
    pub fn store(&self) -> &ResultsStore {
        &self.store
    }

    /// Simulated matrix of one driver across all scenarios.
    pub fn driver(&mut self, driver: Driver) -> ValuationResult<&DriverMatrix> {
        self.matrix(Metric::from(driver))
    }

    /// Revenue × gross margin.
    pub fn gross_profit(&mut self) -> ValuationResult<&DriverMatrix> {
        self.matrix(Metric::GrossProfit)
    }

    /// Gross profit less D&A less EBIT margin.
    pub fn selling_general_admin_expense(&mut self) -> ValuationResult<&DriverMatrix> {
        self.matrix(Metric::SellingGeneralAdminExpense)
    }

    /// After-tax income from the EBIT margin.
    pub fn net_income(&mut self) -> ValuationResult<&DriverMatrix> {
        self.matrix(Metric::NetIncome)
    }

    /// Free cash flow.
    pub fn free_cashflow(&mut self) -> ValuationResult<&DriverMatrix> {
        self.matrix(Metric::FreeCashflow)
    }

    /// `(1 + wacc)^t` per sample and period.
    pub fn discount_factor(&mut self) -> ValuationResult<&DriverMatrix> {
        self.matrix(Metric::DiscountFactor)
    }

    /// Discounted free cash flow.
    pub fn present_value(&mut self) -> ValuationResult<&DriverMatrix> {
        self.matrix(Metric::PresentValue)
    }

    /// Discounted perpetuity value per sample.
    pub fn terminal_value(&mut self) -> ValuationResult<&[f64]> {
        self.vector(Metric::TerminalValue)
    }

    /// Company value per sample.
    pub fn company_value(&mut self) -> ValuationResult<&[f64]> {
        self.vector(Metric::CompanyValue)
    }

    /// Fair value per share per sample.
    pub fn fair_value_per_share(&mut self) -> ValuationResult<&[f64]> {
        self.vector(Metric::FairValuePerShare)
    }

    /// Computes every metric in dependency order.
    ///
    /// # Errors
    ///
    /// The first error of any stage; metrics computed before it stay cached.
    pub fn compute_all(&mut self) -> ValuationResult<()> {
        for metric in Metric::ALL {
            self.ensure(metric)?;
        }
        Ok(())
    }

    /// Computes everything still missing and hands the results over.
    pub fn finalize(mut self) -> ValuationResult<ForecastResults> {
        self.compute_all()?;
        info!(metrics = self.store.len(), "forecast run finalised");
        let sample_labels = self
            .sample_labels()
            .into_iter()
            .map(str::to_owned)
            .collect();
        Ok(ForecastResults::new(
            self.params,
            self.rng.seed(),
            self.allocation,
            self.labels,
            sample_labels,
            self.store,
        ))
    }

    fn matrix(&mut self, metric: Metric) -> ValuationResult<&DriverMatrix> {
        self.ensure(metric)?;
        Ok(self.store.matrix(metric)?)
    }

    fn vector(&mut self, metric: Metric) -> ValuationResult<&[f64]> {
        self.ensure(metric)?;
        Ok(self.store.vector(metric)?)
    }

    fn ensure(&mut self, metric: Metric) -> ValuationResult<()> {
        if self.store.contains(metric) {
            return Ok(());
        }
        for &prerequisite in prerequisites(metric) {
            self.ensure(prerequisite)?;
        }
        let value = self.evaluate(metric)?;
        self.store.insert(metric, value)?;
        debug!(metric = %metric, "metric computed");
        Ok(())
    }

    fn evaluate(&mut self, metric: Metric) -> ValuationResult<MetricValue> {
        let value = match metric {
            Metric::Revenue => self.sample(Driver::Revenue)?,
            Metric::GrossMargin => self.sample(Driver::GrossMargin)?,
            Metric::EbitMargin => self.sample(Driver::EbitMargin)?,
            Metric::InterestExpense => self.sample(Driver::InterestExpense)?,
            Metric::DepreciationAmortization => self.sample(Driver::DepreciationAmortization)?,
            Metric::NetWorkingCapital => self.sample(Driver::NetWorkingCapital)?,
            Metric::GrossProfit => MetricValue::Matrix(statements::gross_profit(
                self.store.matrix(Metric::Revenue)?,
                self.store.matrix(Metric::GrossMargin)?,
            )?),
            Metric::SellingGeneralAdminExpense => {
                MetricValue::Matrix(statements::selling_general_admin_expense(
                    self.store.matrix(Metric::GrossProfit)?,
                    self.store.matrix(Metric::DepreciationAmortization)?,
                    self.store.matrix(Metric::EbitMargin)?,
                )?)
            }
            Metric::NetIncome => MetricValue::Matrix(statements::net_income(
                self.store.matrix(Metric::Revenue)?,
                self.store.matrix(Metric::EbitMargin)?,
                self.store.matrix(Metric::InterestExpense)?,
                self.params.tax_rate(),
            )?),
            Metric::FreeCashflow => MetricValue::Matrix(statements::free_cashflow(
                self.store.matrix(Metric::NetIncome)?,
                self.store.matrix(Metric::InterestExpense)?,
                self.store.matrix(Metric::DepreciationAmortization)?,
                self.store.matrix(Metric::NetWorkingCapital)?,
            )?),
            Metric::DiscountFactor => MetricValue::Matrix(discount_factors(
                self.params.n_samples(),
                self.params.n_periods(),
                self.params.wacc(),
            )),
            Metric::PresentValue => MetricValue::Matrix(present_values(
                self.store.matrix(Metric::FreeCashflow)?,
                self.store.matrix(Metric::DiscountFactor)?,
            )?),
            Metric::TerminalValue => MetricValue::Vector(terminal_values(
                self.store.matrix(Metric::FreeCashflow)?,
                self.store.matrix(Metric::DiscountFactor)?,
                self.params.wacc(),
                self.params.perpetual_rate(),
            )?),
            Metric::CompanyValue => MetricValue::Vector(company_values(
                self.store.matrix(Metric::PresentValue)?,
                self.store.vector(Metric::TerminalValue)?,
            )?),
            Metric::FairValuePerShare => {
                let shares = share_vector(&self.scenarios, &self.allocation)?;
                MetricValue::Vector(fair_value_per_share(
                    self.store.vector(Metric::CompanyValue)?,
                    &shares,
                )?)
            }
        };
        Ok(value)
    }

    fn sample(&self, driver: Driver) -> ValuationResult<MetricValue> {
        let mut rng = self.rng.stream(driver as u64);
        let matrix = aggregate_driver(
            driver,
            &self.current,
            &self.scenarios,
            &self.allocation,
            self.params.n_periods(),
            &mut rng,
        )?;
        if matrix.rows() != self.allocation.total() {
            return Err(ConfigError::LengthMismatch {
                expected: self.allocation.total(),
                actual: matrix.rows(),
            }
            .into());
        }
        Ok(MetricValue::Matrix(matrix))
    }
}

/// Metrics that must be cached before `metric` can be evaluated, in the
/// order they are demanded.
fn prerequisites(metric: Metric) -> &'static [Metric] {
    match metric {
        Metric::Revenue
        | Metric::GrossMargin
        | Metric::EbitMargin
        | Metric::InterestExpense
        | Metric::DepreciationAmortization
        | Metric::NetWorkingCapital
        | Metric::DiscountFactor => &[],
        Metric::GrossProfit => &[Metric::Revenue, Metric::GrossMargin],
        Metric::SellingGeneralAdminExpense => &[
            Metric::GrossProfit,
            Metric::EbitMargin,
            Metric::DepreciationAmortization,
        ],
        Metric::NetIncome => &[Metric::Revenue, Metric::EbitMargin, Metric::InterestExpense],
        Metric::FreeCashflow => &[
            Metric::NetIncome,
            Metric::InterestExpense,
            Metric::DepreciationAmortization,
            Metric::NetWorkingCapital,
        ],
        Metric::PresentValue => &[Metric::FreeCashflow, Metric::DiscountFactor],
        Metric::TerminalValue => &[Metric::FreeCashflow, Metric::DiscountFactor],
        Metric::CompanyValue => &[Metric::PresentValue, Metric::TerminalValue],
        Metric::FairValuePerShare => &[Metric::CompanyValue],
    }
}

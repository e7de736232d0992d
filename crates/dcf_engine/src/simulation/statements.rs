//! Financial statement builder.
//!
//! Element-wise identities over `(samples, periods)` matrices. Every
//! function fails with `ConfigError::ShapeMismatch` when its inputs differ
//! in shape; nothing is broadcast.
//!
//! SG&A is a residual (`gross_profit - D&A - ebit_margin`) while net income
//! is built from the EBIT margin directly. The two do not reconcile to a
//! single income statement and are kept as independent outputs.

use dcf_core::math::DriverMatrix;
use dcf_core::types::ConfigError;

/// `revenue * gross_margin`.
pub fn gross_profit(
    revenue: &DriverMatrix,
    gross_margin: &DriverMatrix,
) -> Result<DriverMatrix, ConfigError> {
    revenue.mul(gross_margin)
}

/// `gross_profit - dep_amort - ebit_margin`.
pub fn selling_general_admin_expense(
    gross_profit: &DriverMatrix,
    dep_amort: &DriverMatrix,
    ebit_margin: &DriverMatrix,
) -> Result<DriverMatrix, ConfigError> {
    gross_profit.sub(dep_amort)?.sub(ebit_margin)
}

/// `(revenue * ebit_margin - interest_expense) * (1 - tax_rate)`.
///
/// Tax is levied on pre-tax income as computed, so a loss produces a
/// negative tax.
pub fn net_income(
    revenue: &DriverMatrix,
    ebit_margin: &DriverMatrix,
    interest_expense: &DriverMatrix,
    tax_rate: f64,
) -> Result<DriverMatrix, ConfigError> {
    let pre_tax = revenue.mul(ebit_margin)?.sub(interest_expense)?;
    Ok(pre_tax.map(|income| income - income * tax_rate))
}

/// `net_income - interest_expense - dep_amort + nwc + capex`, with capex
/// taken equal to D&A in every period.
pub fn free_cashflow(
    net_income: &DriverMatrix,
    interest_expense: &DriverMatrix,
    dep_amort: &DriverMatrix,
    nwc: &DriverMatrix,
) -> Result<DriverMatrix, ConfigError> {
    let capex = dep_amort;
    net_income
        .sub(interest_expense)?
        .sub(dep_amort)?
        .add(nwc)?
        .add(capex)
}

use super::benefit::aggregate;
use super::charge::estimate_charge;
use super::child::{Child, ChildEntitlement, EntitlementError};
use super::income::{adjusted_net_income, IncomeError, IncomeInputs};
use super::uk::{TaxYearError, TaxYearRegistry};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error(transparent)]
    TaxYear(#[from] TaxYearError),
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),
    #[error(transparent)]
    Income(#[from] IncomeError),
    #[error("enter the date Child Benefit started for at least one child")]
    NoChildren,
}

/// Dates Child Benefit was received for one child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ChildInput {
    /// Date Child Benefit started (YYYY-MM-DD)
    #[schemars(with = "String")]
    pub start_date: NaiveDate,
    /// Date Child Benefit stopped (YYYY-MM-DD), omit if still receiving it
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub stop_date: Option<NaiveDate>,
}

/// Input root for a calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CalculationRequest {
    /// Starting calendar year of the tax year (e.g., 2012 for 2012 to 2013)
    pub tax_year: i32,
    /// Children in the order they were claimed for; the first gets the higher rate
    pub children: Vec<ChildInput>,
    /// Income estimate; omit to work out Child Benefit received only
    #[serde(default)]
    pub income: Option<IncomeInputs>,
}

/// Everything presentation needs to explain a calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculationResult {
    pub tax_year: i32,
    pub charge_period_start: NaiveDate,
    pub charge_period_end: NaiveDate,
    pub registration_deadline: NaiveDate,
    pub children: Vec<ChildEntitlement>,
    pub total_amount: Decimal,
    pub charge_period_amount: Decimal,
    /// `None` when no income was supplied
    pub adjusted_net_income: Option<Decimal>,
    /// `None` when no income was supplied
    pub charge: Option<Decimal>,
    pub charge_period_partial: bool,
    pub estimate_incomplete_year: bool,
    pub below_threshold: bool,
    pub no_entitlement_in_year: bool,
}

impl CalculationResult {
    pub fn income_supplied(&self) -> bool {
        self.adjusted_net_income.is_some()
    }
}

/// Runs calculations against a tax year registry
#[derive(Debug, Clone, Copy)]
pub struct Calculator<'a> {
    registry: &'a TaxYearRegistry,
}

impl<'a> Calculator<'a> {
    pub fn new(registry: &'a TaxYearRegistry) -> Self {
        Calculator { registry }
    }

    /// Calculate benefit received and, when income is supplied, the charge.
    /// `today` decides whether the selected year is still in progress.
    pub fn calculate(
        &self,
        request: &CalculationRequest,
        today: NaiveDate,
    ) -> Result<CalculationResult, CalculationError> {
        let tax_year = self.registry.lookup(request.tax_year)?;
        if request.children.is_empty() {
            return Err(CalculationError::NoChildren);
        }

        let children: Vec<Child> = request
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| Child::new(i + 1, c.start_date, c.stop_date))
            .collect();
        let totals = aggregate(&children, tax_year)?;
        let no_entitlement_in_year = totals.no_entitlement_in_year();

        let estimate = match &request.income {
            Some(income) => {
                let ani = adjusted_net_income(income)?;
                Some((ani, estimate_charge(totals.charge_period_amount, ani, tax_year)))
            }
            None => None,
        };

        log::info!(
            "Calculated {} for {} children: total {}, charge period {}, charge {:?}",
            tax_year,
            children.len(),
            totals.total_amount,
            totals.charge_period_amount,
            estimate.map(|(_, e)| e.charge)
        );

        Ok(CalculationResult {
            tax_year: tax_year.id,
            charge_period_start: tax_year.charge_period_start,
            charge_period_end: tax_year.charge_period_end(),
            registration_deadline: tax_year.registration_deadline,
            total_amount: totals.total_amount,
            charge_period_amount: totals.charge_period_amount,
            children: totals.children,
            adjusted_net_income: estimate.map(|(ani, _)| ani),
            charge: estimate.map(|(_, e)| e.charge),
            charge_period_partial: tax_year.charge_period_partial(),
            estimate_incomplete_year: estimate.is_some() && today <= tax_year.end_date,
            below_threshold: estimate.is_some_and(|(_, e)| e.below_threshold),
            no_entitlement_in_year,
        })
    }
}

/// Calculate against the built-in UK tax years
pub fn calculate(
    request: &CalculationRequest,
    today: NaiveDate,
) -> Result<CalculationResult, CalculationError> {
    Calculator::new(TaxYearRegistry::uk()).calculate(request, today)
}

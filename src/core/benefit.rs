use super::child::{entitlement, Child, ChildEntitlement, EntitlementError};
use super::uk::TaxYear;
use rust_decimal::Decimal;
use serde::Serialize;

/// Child Benefit received across all children in one tax year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenefitTotals {
    /// Per-child entitlements in rate-tier order
    pub children: Vec<ChildEntitlement>,
    pub total_amount: Decimal,
    /// Portion of the total received inside the year's charge period
    pub charge_period_amount: Decimal,
}

impl BenefitTotals {
    pub fn qualifying_weeks(&self) -> u32 {
        self.children.iter().map(|c| c.qualifying_weeks).sum()
    }

    /// No child received any Child Benefit in the selected year
    pub fn no_entitlement_in_year(&self) -> bool {
        self.children.iter().all(|c| c.qualifying_weeks == 0)
    }
}

/// Sum every child's entitlement for the tax year.
///
/// Children are taken in ordinal order, ties kept in input order.
pub fn aggregate(
    children: &[Child],
    tax_year: &TaxYear,
) -> Result<BenefitTotals, EntitlementError> {
    let mut ordered: Vec<&Child> = children.iter().collect();
    ordered.sort_by_key(|child| child.ordinal);

    let children = ordered
        .into_iter()
        .map(|child| entitlement(child, tax_year))
        .collect::<Result<Vec<_>, _>>()?;

    let total_amount = checked_total(children.iter().map(|c| c.amount), tax_year)?;
    let charge_period_amount =
        checked_total(children.iter().map(|c| c.charge_period_amount), tax_year)?;

    let totals = BenefitTotals {
        children,
        total_amount,
        charge_period_amount,
    };

    if totals.no_entitlement_in_year() {
        log::info!("No Child Benefit received in {}", tax_year);
    } else {
        log::debug!(
            "Benefit for {}: {} weeks, total {}, charge period {}",
            tax_year,
            totals.qualifying_weeks(),
            totals.total_amount,
            totals.charge_period_amount
        );
    }

    Ok(totals)
}

fn checked_total(
    mut amounts: impl Iterator<Item = Decimal>,
    tax_year: &TaxYear,
) -> Result<Decimal, EntitlementError> {
    amounts
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(EntitlementError::AmountOverflow(tax_year.id))
}

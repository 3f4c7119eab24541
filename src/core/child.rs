use super::uk::{monday_on_or_after, week_following, TaxYear};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntitlementError {
    #[error("child {ordinal}: stop date {stop_date} is before start date {start_date}")]
    InvalidChildWindow {
        ordinal: usize,
        start_date: NaiveDate,
        stop_date: NaiveDate,
    },
    #[error("Child Benefit for tax year {0} is too large to calculate")]
    AmountOverflow(i32),
}

/// A child Child Benefit was claimed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    /// Date Child Benefit started
    pub start_date: NaiveDate,
    /// Date Child Benefit stopped, `None` while still being received
    pub stop_date: Option<NaiveDate>,
    /// 1-based position among the claimant's children, sets the rate tier
    pub ordinal: usize,
}

impl Child {
    pub fn new(ordinal: usize, start_date: NaiveDate, stop_date: Option<NaiveDate>) -> Self {
        Child {
            start_date,
            stop_date,
            ordinal,
        }
    }

    fn validate(&self) -> Result<(), EntitlementError> {
        match self.stop_date {
            Some(stop_date) if stop_date < self.start_date => {
                Err(EntitlementError::InvalidChildWindow {
                    ordinal: self.ordinal,
                    start_date: self.start_date,
                    stop_date,
                })
            }
            _ => Ok(()),
        }
    }

    /// Number of payable Child Benefit weeks whose Monday falls in `[period_start, period_end]`.
    ///
    /// Payment begins with the week following the claim start, so a claim
    /// starting on a Monday does not count that Monday. A period starting on a
    /// Monday does count it.
    pub fn weeks_between(&self, period_start: NaiveDate, period_end: NaiveDate) -> u32 {
        let first = week_following(self.start_date).max(monday_on_or_after(period_start));
        let last = self
            .stop_date
            .map_or(period_end, |stop_date| stop_date.min(period_end));
        if first > last {
            return 0;
        }
        let weeks = (last - first).num_days() / 7 + 1;
        u32::try_from(weeks).unwrap_or(u32::MAX)
    }
}

/// Child Benefit due for one child in one tax year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildEntitlement {
    pub ordinal: usize,
    pub start_date: NaiveDate,
    pub stop_date: Option<NaiveDate>,
    pub weekly_rate: Decimal,
    pub qualifying_weeks: u32,
    pub amount: Decimal,
    /// Weeks falling inside the year's charge period
    pub charge_period_weeks: u32,
    pub charge_period_amount: Decimal,
}

/// Count the qualifying weeks for a child and price them at the child's rate tier
pub fn entitlement(
    child: &Child,
    tax_year: &TaxYear,
) -> Result<ChildEntitlement, EntitlementError> {
    child.validate()?;

    let weekly_rate = tax_year.weekly_rate(child.ordinal);
    let qualifying_weeks = child.weeks_between(tax_year.start_date, tax_year.end_date);
    let charge_period_weeks =
        child.weeks_between(tax_year.charge_period_start, tax_year.charge_period_end());

    log::debug!(
        "Child {} in {}: {} weeks ({} in charge period) at {}",
        child.ordinal,
        tax_year,
        qualifying_weeks,
        charge_period_weeks,
        weekly_rate
    );

    let amount = |weeks| {
        weekly_amount(weeks, weekly_rate).ok_or(EntitlementError::AmountOverflow(tax_year.id))
    };

    Ok(ChildEntitlement {
        ordinal: child.ordinal,
        start_date: child.start_date,
        stop_date: child.stop_date,
        weekly_rate,
        qualifying_weeks,
        amount: amount(qualifying_weeks)?,
        charge_period_weeks,
        charge_period_amount: amount(charge_period_weeks)?,
    })
}

fn weekly_amount(weeks: u32, rate: Decimal) -> Option<Decimal> {
    Decimal::from(weeks)
        .checked_mul(rate)
        .map(|amount| amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Gross-up for payments made net of basic-rate relief (100/80)
pub const BASIC_RATE_GROSS_UP: Decimal = dec!(1.25);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IncomeError {
    #[error("{field} must not be negative (got {amount})")]
    NegativeAmount { field: &'static str, amount: Decimal },
    #[error("{0} is too large to calculate")]
    Overflow(&'static str),
}

/// Itemised income and reliefs used to estimate adjusted net income.
/// Absent fields are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct IncomeInputs {
    /// Salary before tax
    #[serde(alias = "gross_income")]
    #[schemars(with = "f64")]
    pub salary: Decimal,
    /// Other taxable income, e.g. taxable benefits or self-employed profits
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    /// Taxable pensions received, including State Pension
    #[schemars(with = "f64")]
    pub pensions: Decimal,
    /// Savings, dividend and property income
    #[schemars(with = "f64")]
    pub non_employment_income: Decimal,
    /// Pension contributions taken from pay with basic-rate relief at source
    #[schemars(with = "f64")]
    pub pension_contributions_from_pay: Decimal,
    /// Retirement annuity contract payments
    #[schemars(with = "f64")]
    pub retirement_annuities: Decimal,
    /// Cycle to work salary sacrifice
    #[schemars(with = "f64")]
    pub cycle_scheme: Decimal,
    /// Childcare voucher salary sacrifice
    #[schemars(with = "f64")]
    pub childcare: Decimal,
    /// Gift Aid donations paid
    #[schemars(with = "f64")]
    pub gift_aid_donations: Decimal,
    /// Other pension contributions paid net of basic-rate relief
    #[schemars(with = "f64")]
    pub outgoing_pension_contributions: Decimal,
}

impl IncomeInputs {
    fn fields(&self) -> [(&'static str, Decimal); 10] {
        [
            ("salary", self.salary),
            ("other_income", self.other_income),
            ("pensions", self.pensions),
            ("non_employment_income", self.non_employment_income),
            ("pension_contributions_from_pay", self.pension_contributions_from_pay),
            ("retirement_annuities", self.retirement_annuities),
            ("cycle_scheme", self.cycle_scheme),
            ("childcare", self.childcare),
            ("gift_aid_donations", self.gift_aid_donations),
            ("outgoing_pension_contributions", self.outgoing_pension_contributions),
        ]
    }

    fn validate(&self) -> Result<(), IncomeError> {
        let negative = self
            .fields()
            .into_iter()
            .find(|(_, amount)| *amount < Decimal::ZERO);
        match negative {
            Some((field, amount)) => Err(IncomeError::NegativeAmount { field, amount }),
            None => Ok(()),
        }
    }

    pub fn taxable_income(&self) -> Result<Decimal, IncomeError> {
        checked_sum(
            "taxable income",
            [self.salary, self.other_income, self.pensions, self.non_employment_income],
        )
    }

    /// Deductions taken at face value
    pub fn deductions(&self) -> Result<Decimal, IncomeError> {
        checked_sum("deductions", [self.retirement_annuities, self.cycle_scheme, self.childcare])
    }

    /// Reliefs paid net of basic-rate tax, grossed up before deduction
    pub fn grossed_up_reliefs(&self) -> Result<Decimal, IncomeError> {
        let paid = checked_sum(
            "grossed-up reliefs",
            [
                self.pension_contributions_from_pay,
                self.gift_aid_donations,
                self.outgoing_pension_contributions,
            ],
        )?;
        paid.checked_mul(BASIC_RATE_GROSS_UP)
            .ok_or(IncomeError::Overflow("grossed-up reliefs"))
    }
}

fn checked_sum<const N: usize>(
    what: &'static str,
    amounts: [Decimal; N],
) -> Result<Decimal, IncomeError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
        .ok_or(IncomeError::Overflow(what))
}

/// Calculate adjusted net income, rounded to the nearest pound
pub fn adjusted_net_income(inputs: &IncomeInputs) -> Result<Decimal, IncomeError> {
    inputs.validate()?;

    let taxable = inputs.taxable_income()?;
    let deductions = inputs.deductions()?;
    let reliefs = inputs.grossed_up_reliefs()?;
    let ani = taxable
        .checked_sub(deductions)
        .and_then(|net| net.checked_sub(reliefs))
        .ok_or(IncomeError::Overflow("adjusted net income"))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    log::debug!(
        "Adjusted net income: taxable {} - deductions {} - grossed-up reliefs {} = {}",
        taxable,
        deductions,
        reliefs,
        ani
    );

    Ok(ani)
}

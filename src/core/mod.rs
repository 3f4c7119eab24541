pub mod benefit;
pub mod calculator;
pub mod charge;
pub mod child;
pub mod income;
pub mod uk;

// Flat public surface for domain types and functions.
pub use benefit::{aggregate, BenefitTotals};
pub use calculator::{
    calculate, CalculationError, CalculationRequest, CalculationResult, Calculator, ChildInput,
};
pub use charge::{estimate_charge, ChargeEstimate};
pub use child::{entitlement, Child, ChildEntitlement, EntitlementError};
pub use income::{adjusted_net_income, IncomeError, IncomeInputs, BASIC_RATE_GROSS_UP};
pub use uk::{
    monday_on_or_after, week_covering, week_following, TaxYear, TaxYearError, TaxYearRegistry,
};

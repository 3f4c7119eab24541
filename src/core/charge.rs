use super::uk::TaxYear;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Estimated High Income Child Benefit Charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChargeEstimate {
    /// Charge in whole pounds
    pub charge: Decimal,
    /// Percentage of the charge-period benefit being charged (0 to 100)
    pub percentage: Decimal,
    pub below_threshold: bool,
    /// The charge only covers part of the tax year
    pub partial_period: bool,
}

/// Apply the charge bands to the benefit received in the charge period.
///
/// 1% of the benefit is charged for every full 1% step of income between the
/// lower and upper thresholds (every £100 with the UK figures), rising to the
/// whole benefit at the upper threshold. The result is rounded down to whole
/// pounds.
pub fn estimate_charge(
    charge_period_amount: Decimal,
    ani: Decimal,
    tax_year: &TaxYear,
) -> ChargeEstimate {
    let partial_period = tax_year.charge_period_partial();
    let lower = tax_year.charge_lower_threshold;
    let upper = tax_year.charge_upper_threshold;

    if ani <= lower {
        return ChargeEstimate {
            charge: Decimal::ZERO,
            percentage: Decimal::ZERO,
            below_threshold: true,
            partial_period,
        };
    }

    // Thresholds are non-negative and ani is inside the band, so nothing here overflows
    let percentage = if ani >= upper {
        dec!(100)
    } else {
        ((ani - lower) / (upper - lower) * dec!(100)).floor()
    };

    let charge = (charge_period_amount * (percentage / dec!(100)))
        .floor()
        .max(Decimal::ZERO)
        .min(charge_period_amount);

    log::debug!(
        "Charge for {}: {}% of {} on income {} = {}",
        tax_year,
        percentage,
        charge_period_amount,
        ani,
        charge
    );

    ChargeEstimate {
        charge,
        percentage,
        below_threshold: false,
        partial_period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::uk::TaxYearRegistry;

    fn year(id: i32) -> &'static TaxYear {
        TaxYearRegistry::uk().lookup(id).unwrap()
    }

    #[test]
    fn no_charge_below_threshold() {
        let estimate = estimate_charge(dec!(263.90), dec!(45000), year(2013));
        assert_eq!(estimate.charge, Decimal::ZERO);
        assert!(estimate.below_threshold);
    }

    #[test]
    fn no_charge_at_threshold() {
        let estimate = estimate_charge(dec!(1055.60), dec!(50000), year(2013));
        assert_eq!(estimate.charge, Decimal::ZERO);
        assert!(estimate.below_threshold);
    }

    #[test]
    fn less_than_a_full_step_above_threshold() {
        let estimate = estimate_charge(dec!(1055.60), dec!(50099), year(2013));
        assert_eq!(estimate.charge, Decimal::ZERO);
        assert_eq!(estimate.percentage, Decimal::ZERO);
        assert!(!estimate.below_threshold);
    }

    #[test]
    fn half_charge_in_inaugural_year() {
        let estimate = estimate_charge(dec!(263.90), dec!(55000), year(2012));
        assert_eq!(estimate.percentage, dec!(50));
        assert_eq!(estimate.charge, dec!(131));
        assert!(estimate.partial_period);
    }

    #[test]
    fn half_charge_in_full_year() {
        let estimate = estimate_charge(dec!(1055.60), dec!(55000), year(2013));
        assert_eq!(estimate.charge, dec!(527));
        assert!(!estimate.partial_period);
    }

    #[test]
    fn small_percentage_rounds_down() {
        let estimate = estimate_charge(dec!(263.90), dec!(50325), year(2012));
        assert_eq!(estimate.percentage, dec!(3));
        assert_eq!(estimate.charge, dec!(7));
    }

    #[test]
    fn full_charge_above_upper_threshold() {
        for ani in [dec!(60000), dec!(120325)] {
            let estimate = estimate_charge(dec!(263.90), ani, year(2012));
            assert_eq!(estimate.percentage, dec!(100));
            assert_eq!(estimate.charge, dec!(263));
        }
    }

    #[test]
    fn whole_pound_benefit_is_charged_in_full() {
        let estimate = estimate_charge(dec!(1000), dec!(75000), year(2013));
        assert_eq!(estimate.charge, dec!(1000));
    }

    #[test]
    fn largest_income_charged_in_full() {
        let estimate = estimate_charge(dec!(1055.60), Decimal::MAX, year(2013));
        assert_eq!(estimate.percentage, dec!(100));
        assert_eq!(estimate.charge, dec!(1055));
    }

    #[test]
    fn largest_benefit_does_not_overflow() {
        let estimate = estimate_charge(Decimal::MAX, dec!(55000), year(2013));
        assert_eq!(estimate.percentage, dec!(50));
        assert!(estimate.charge > Decimal::MAX / dec!(3));
    }

    #[test]
    fn tiny_band_still_charges_by_step() {
        let tiny = TaxYear::new(2014, dec!(20.50), dec!(13.55))
            .unwrap()
            .with_thresholds(Decimal::ZERO, dec!(0.000000000000000000000000001));
        let estimate = estimate_charge(dec!(1066), dec!(0.0000000000000000000000000005), &tiny);
        assert_eq!(estimate.percentage, dec!(50));
        assert_eq!(estimate.charge, dec!(533));
    }

    #[test]
    fn zero_benefit_zero_charge() {
        let estimate = estimate_charge(Decimal::ZERO, dec!(75000), year(2013));
        assert_eq!(estimate.charge, Decimal::ZERO);
    }

    #[test]
    fn charge_is_deterministic() {
        let first = estimate_charge(dec!(438.10), dec!(57777), year(2012));
        let second = estimate_charge(dec!(438.10), dec!(57777), year(2012));
        assert_eq!(first, second);
    }

    #[test]
    fn custom_thresholds_scale_the_band() {
        let ty = TaxYear::new(2024, dec!(25.60), dec!(16.95))
            .unwrap()
            .with_thresholds(dec!(60000), dec!(80000));
        // 1% per £200 between £60,000 and £80,000
        let estimate = estimate_charge(dec!(1000), dec!(70000), &ty);
        assert_eq!(estimate.percentage, dec!(50));
        assert_eq!(estimate.charge, dec!(500));
    }
}

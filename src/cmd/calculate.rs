//! Calculate command - Child Benefit received and the tax charge for one tax year

use super::display::{format_date, format_day_month, format_gbp};
use super::{read_children_csv, read_income, read_request};
use chrono::NaiveDate;
use clap::Args;
use hicbc::core::{
    CalculationRequest, CalculationResult, Calculator, IncomeInputs, TaxYear, TaxYearRegistry,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// JSON calculation request (use "-" for stdin)
    #[arg(short, long, conflicts_with_all = ["year", "children", "income", "salary"])]
    input: Option<PathBuf>,

    /// Tax year to calculate (e.g., 2012 for 2012 to 2013)
    #[arg(short, long, requires = "children")]
    year: Option<i32>,

    /// CSV file of children with start_date,stop_date columns
    #[arg(short, long, requires = "year")]
    children: Option<PathBuf>,

    /// JSON file of income fields, to estimate the tax charge
    #[arg(long)]
    income: Option<PathBuf>,

    /// Salary before tax, to estimate the tax charge without an income file
    #[arg(long, conflicts_with = "income")]
    salary: Option<Decimal>,

    /// Date to treat as today (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

const NO_ENTITLEMENT: &str = "You haven't received any Child Benefit for the tax year selected. \
Check your Child Benefit dates or choose a different tax year.";

impl CalculateCommand {
    pub fn exec(&self, registry: &TaxYearRegistry) -> anyhow::Result<()> {
        let request = self.request()?;
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());

        let result = Calculator::new(registry).calculate(&request, today)?;
        let tax_year = registry.lookup(result.tax_year)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_result(&result, tax_year);
        }

        if result.no_entitlement_in_year {
            if !self.json {
                eprintln!("{}", NO_ENTITLEMENT);
            }
            std::process::exit(1);
        }
        Ok(())
    }

    fn request(&self) -> anyhow::Result<CalculationRequest> {
        if let Some(ref input) = self.input {
            return read_request(input);
        }
        let (Some(year), Some(children)) = (self.year, self.children.as_ref()) else {
            anyhow::bail!("Provide a request with --input, or --year and --children");
        };

        let income = match (&self.income, self.salary) {
            (Some(path), _) => Some(read_income(path)?),
            (None, Some(salary)) => Some(IncomeInputs {
                salary,
                ..Default::default()
            }),
            (None, None) => None,
        };

        Ok(CalculationRequest {
            tax_year: year,
            children: read_children_csv(children)?,
            income,
        })
    }
}

/// Row for the per-child table
#[derive(Debug, Clone, Tabled)]
struct ChildRow {
    #[tabled(rename = "Child")]
    ordinal: usize,
    #[tabled(rename = "Started")]
    start_date: String,
    #[tabled(rename = "Stopped")]
    stop_date: String,
    #[tabled(rename = "Weekly Rate")]
    weekly_rate: String,
    #[tabled(rename = "Weeks")]
    weeks: u32,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Charge Weeks")]
    charge_period_weeks: u32,
    #[tabled(rename = "Charge Amount")]
    charge_period_amount: String,
}

fn print_result(result: &CalculationResult, tax_year: &TaxYear) {
    let rows: Vec<ChildRow> = result
        .children
        .iter()
        .map(|c| ChildRow {
            ordinal: c.ordinal,
            start_date: c.start_date.format("%Y-%m-%d").to_string(),
            stop_date: c
                .stop_date
                .map_or("-".to_string(), |d| d.format("%Y-%m-%d").to_string()),
            weekly_rate: format_gbp(c.weekly_rate),
            weeks: c.qualifying_weeks,
            amount: format_gbp(c.amount),
            charge_period_weeks: c.charge_period_weeks,
            charge_period_amount: format_gbp(c.charge_period_amount),
        })
        .collect();

    println!();
    println!("CHILD BENEFIT TAX CALCULATOR ({})", tax_year);
    println!();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();

    let period = received_between(result);

    println!("Child Benefit received: {}", format_gbp(result.charge_period_amount));
    if result.charge_period_partial {
        println!("  Received between {}.", period);
        println!(
            "  Total for the whole tax year: {}",
            format_gbp(result.total_amount)
        );
    }
    println!(
        "  Use this figure in your {} Self Assessment tax return (if you fill one in).",
        tax_year
    );
    println!();

    let (Some(ani), Some(charge)) = (result.adjusted_net_income, result.charge) else {
        println!("To work out the tax charge, enter your income.");
        return;
    };

    println!("Tax charge to pay: {}", format_gbp(charge));
    if result.below_threshold {
        println!(
            "  There is no tax charge if your income is below {}.",
            format_gbp(no_charge_limit(tax_year)).trim_end_matches(".00")
        );
    } else if result.charge_period_partial {
        println!(
            "  The tax charge only applies to the Child Benefit received between {} and is based on your estimated adjusted net income of {}.",
            period,
            format_gbp(ani)
        );
        println!(
            "  Your result for the next tax year may be higher because the tax charge will apply to the whole tax year (and not just {}).",
            period.replacen(" and ", " to ", 1)
        );
    } else {
        println!(
            "  Based on your estimated adjusted net income of {}.",
            format_gbp(ani)
        );
    }
    if result.estimate_incomplete_year {
        println!(
            "  This is an estimate based on your adjusted net income of {} - your circumstances may change before the end of the tax year.",
            format_gbp(ani)
        );
    }
    if charge > Decimal::ZERO {
        println!(
            "  To pay the tax charge you must fill in a Self Assessment tax return each tax year; register by {}.",
            format_date(result.registration_deadline)
        );
    }
}

/// "7 January and 5 April 2013"
fn received_between(result: &CalculationResult) -> String {
    format!(
        "{} and {}",
        format_day_month(result.charge_period_start),
        format_date(result.charge_period_end)
    )
}

/// Highest income with no charge: one pound short of the first 1% step
fn no_charge_limit(tax_year: &TaxYear) -> Decimal {
    let step = (tax_year.charge_upper_threshold - tax_year.charge_lower_threshold) / dec!(100);
    tax_year.charge_lower_threshold + step - Decimal::ONE
}

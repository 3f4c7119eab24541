//! Years command - list the configured tax years and their rates

use super::display::{format_date, format_gbp};
use clap::Args;
use hicbc::core::{TaxYear, TaxYearRegistry};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct YearsCommand {
    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Tabled)]
struct YearRow {
    #[tabled(rename = "Year")]
    id: i32,
    #[tabled(rename = "Tax Year")]
    name: String,
    #[tabled(rename = "First Child")]
    first_child: String,
    #[tabled(rename = "Other Children")]
    other_child: String,
    #[tabled(rename = "Charge From")]
    charge_period_start: String,
    #[tabled(rename = "Thresholds")]
    thresholds: String,
}

impl From<&TaxYear> for YearRow {
    fn from(year: &TaxYear) -> Self {
        YearRow {
            id: year.id,
            name: year.display(),
            first_child: format_gbp(year.weekly_rate_first_child),
            other_child: format_gbp(year.weekly_rate_other_child),
            charge_period_start: format_date(year.charge_period_start),
            thresholds: format!(
                "{} - {}",
                format_gbp(year.charge_lower_threshold),
                format_gbp(year.charge_upper_threshold)
            ),
        }
    }
}

impl YearsCommand {
    pub fn exec(&self, registry: &TaxYearRegistry) -> anyhow::Result<()> {
        if self.json {
            let years: Vec<&TaxYear> = registry.available_years().collect();
            println!("{}", serde_json::to_string_pretty(&years)?);
            return Ok(());
        }

        let rows: Vec<YearRow> = registry.available_years().map(YearRow::from).collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        Ok(())
    }
}

//! Schema command - describe the files `calculate` reads

use super::ChildRecord;
use chrono::NaiveDate;
use clap::Args;
use hicbc::core::{CalculationRequest, IncomeInputs};
use schemars::schema_for;
use std::io;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which input to describe
    #[arg(value_enum, default_value = "request")]
    input: SchemaInput,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaInput {
    /// JSON Schema for `calculate --input`
    Request,
    /// JSON Schema for `calculate --income`
    Income,
    /// Sample `calculate --children` CSV: one row per child in claim order,
    /// dates as YYYY-MM-DD, stop_date left empty while still receiving it
    Children,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = match self.input {
            SchemaInput::Request => schema_for!(CalculationRequest),
            SchemaInput::Income => schema_for!(IncomeInputs),
            SchemaInput::Children => return write_sample_children(),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}

/// Header plus one row per child; the header comes from `ChildRecord`
fn write_sample_children() -> anyhow::Result<()> {
    let samples = [("2011-01-01", None), ("2012-02-05", Some("2013-03-01"))];

    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    for (start_date, stop_date) in samples {
        wtr.serialize(ChildRecord {
            start_date: start_date.parse()?,
            stop_date: stop_date.map(str::parse::<NaiveDate>).transpose()?,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

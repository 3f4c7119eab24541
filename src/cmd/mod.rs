pub mod calculate;
pub mod display;
pub mod schema;
pub mod years;

use anyhow::Context;
use hicbc::core::{CalculationRequest, ChildInput, IncomeInputs, TaxYearRegistry};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Built-in tax years, or the table in `path` when given
pub fn load_registry(path: Option<&Path>) -> anyhow::Result<TaxYearRegistry> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open tax year table {}", path.display()))?;
            let registry = TaxYearRegistry::from_json(BufReader::new(file))
                .with_context(|| format!("Failed to load tax year table {}", path.display()))?;
            log::info!("Loaded tax years from {}", path.display());
            Ok(registry)
        }
        None => Ok(TaxYearRegistry::uk().clone()),
    }
}

/// Read a JSON calculation request (or stdin with "-")
pub fn read_request(path: &Path) -> anyhow::Result<CalculationRequest> {
    let buffer = read_input(path)?;
    serde_json::from_slice(&buffer)
        .with_context(|| format!("Invalid calculation request in {}", path.display()))
}

/// Read children from CSV with `start_date,stop_date` columns
pub fn read_children_csv(path: &Path) -> anyhow::Result<Vec<ChildInput>> {
    let buffer = read_input(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(buffer.as_slice());
    let mut children = Vec::new();
    for (i, record) in rdr.deserialize::<ChildRecord>().enumerate() {
        let record = record.with_context(|| format!("Invalid child on row {}", i + 1))?;
        children.push(record.into());
    }
    log::debug!("Read {} children from {}", children.len(), path.display());
    Ok(children)
}

/// Read income fields from JSON
pub fn read_income(path: &Path) -> anyhow::Result<IncomeInputs> {
    let buffer = read_input(path)?;
    serde_json::from_slice(&buffer)
        .with_context(|| format!("Invalid income fields in {}", path.display()))
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if path.as_os_str() == "-" {
        io::stdin()
            .lock()
            .read_to_end(&mut buffer)
            .context("Failed to read stdin")?;
        anyhow::ensure!(
            !buffer.is_empty(),
            "Nothing on stdin. Pipe in the file or pass its path instead of \"-\"."
        );
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut buffer))
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(buffer)
}

/// One row of the children CSV; its field names are the header
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ChildRecord {
    pub start_date: chrono::NaiveDate,
    #[serde(default)]
    pub stop_date: Option<chrono::NaiveDate>,
}

impl From<ChildRecord> for ChildInput {
    fn from(record: ChildRecord) -> Self {
        ChildInput {
            start_date: record.start_date,
            stop_date: record.stop_date,
        }
    }
}

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::OnceLock;

/// Income at or below which no High Income Child Benefit Charge is due
pub const DEFAULT_LOWER_THRESHOLD: Decimal = dec!(50000);
/// Income at or above which the charge equals the whole benefit
pub const DEFAULT_UPPER_THRESHOLD: Decimal = dec!(60000);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaxYearError {
    #[error("unknown tax year: {0}")]
    UnknownTaxYear(i32),
    #[error("duplicate tax year: {0}")]
    DuplicateTaxYear(i32),
    #[error("tax year out of range: {0}")]
    OutOfRange(i32),
    #[error("charge period start {charge_period_start} is outside tax year {id}")]
    InvalidChargePeriod {
        id: i32,
        charge_period_start: NaiveDate,
    },
    #[error("charge thresholds for tax year {id} are invalid: {lower} to {upper}")]
    InvalidThresholds {
        id: i32,
        lower: Decimal,
        upper: Decimal,
    },
    #[error("negative weekly rate for tax year {0}")]
    NegativeRate(i32),
    #[error("invalid tax year table: {0}")]
    InvalidTable(String),
}

/// UK Tax Year (runs 6 April to 5 April) with its Child Benefit rates.
/// The id is the starting calendar year (e.g., 2012 = 2012 to 2013 tax year)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxYear {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weekly_rate_first_child: Decimal,
    pub weekly_rate_other_child: Decimal,
    /// First day the High Income Child Benefit Charge applies in this year
    pub charge_period_start: NaiveDate,
    pub charge_lower_threshold: Decimal,
    pub charge_upper_threshold: Decimal,
    /// Last day to register for Self Assessment to pay the charge
    pub registration_deadline: NaiveDate,
}

impl TaxYear {
    /// Create a tax year whose charge period covers the whole year
    pub fn new(
        id: i32,
        weekly_rate_first_child: Decimal,
        weekly_rate_other_child: Decimal,
    ) -> Result<Self, TaxYearError> {
        let date = |year, month, day| {
            NaiveDate::from_ymd_opt(year, month, day).ok_or(TaxYearError::OutOfRange(id))
        };
        let start_date = date(id, 4, 6)?;
        Ok(TaxYear {
            id,
            start_date,
            end_date: date(id + 1, 4, 5)?,
            weekly_rate_first_child,
            weekly_rate_other_child,
            charge_period_start: start_date,
            charge_lower_threshold: DEFAULT_LOWER_THRESHOLD,
            charge_upper_threshold: DEFAULT_UPPER_THRESHOLD,
            registration_deadline: date(id + 1, 10, 5)?,
        })
    }

    pub fn with_charge_period_start(mut self, charge_period_start: NaiveDate) -> Self {
        self.charge_period_start = charge_period_start;
        self
    }

    pub fn with_thresholds(mut self, lower: Decimal, upper: Decimal) -> Self {
        self.charge_lower_threshold = lower;
        self.charge_upper_threshold = upper;
        self
    }

    fn validate(&self) -> Result<(), TaxYearError> {
        if !self.contains(self.charge_period_start) {
            return Err(TaxYearError::InvalidChargePeriod {
                id: self.id,
                charge_period_start: self.charge_period_start,
            });
        }
        if self.charge_lower_threshold < Decimal::ZERO
            || self.charge_lower_threshold >= self.charge_upper_threshold
        {
            return Err(TaxYearError::InvalidThresholds {
                id: self.id,
                lower: self.charge_lower_threshold,
                upper: self.charge_upper_threshold,
            });
        }
        if self.weekly_rate_first_child.is_sign_negative()
            || self.weekly_rate_other_child.is_sign_negative()
        {
            return Err(TaxYearError::NegativeRate(self.id));
        }
        Ok(())
    }

    /// The charge period always ends with the tax year
    pub fn charge_period_end(&self) -> NaiveDate {
        self.end_date
    }

    /// True when the charge only applies to part of the year (2012 to 2013)
    pub fn charge_period_partial(&self) -> bool {
        self.charge_period_start > self.start_date
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Weekly rate for a child by 1-based position among the claimant's children
    pub fn weekly_rate(&self, ordinal: usize) -> Decimal {
        if ordinal <= 1 {
            self.weekly_rate_first_child
        } else {
            self.weekly_rate_other_child
        }
    }

    /// Display as "2012 to 2013" format
    pub fn display(&self) -> String {
        format!("{} to {}", self.id, self.id + 1)
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// The Monday strictly after `date`
pub fn week_following(date: NaiveDate) -> NaiveDate {
    let days = 7 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days)
}

/// The Monday to Sunday Child Benefit week containing `date`
pub fn week_covering(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (monday, monday + Duration::days(6))
}

/// `date` itself when it is a Monday, otherwise the following Monday
pub fn monday_on_or_after(date: NaiveDate) -> NaiveDate {
    let (monday, _) = week_covering(date);
    if monday == date {
        date
    } else {
        week_following(date)
    }
}

/// Immutable table of configured tax years, keyed by id
#[derive(Debug, Clone)]
pub struct TaxYearRegistry {
    years: BTreeMap<i32, TaxYear>,
}

impl TaxYearRegistry {
    pub fn new<I>(years: I) -> Result<Self, TaxYearError>
    where
        I: IntoIterator<Item = TaxYear>,
    {
        let mut table = BTreeMap::new();
        for year in years {
            year.validate()?;
            let id = year.id;
            if table.insert(id, year).is_some() {
                return Err(TaxYearError::DuplicateTaxYear(id));
            }
        }
        Ok(TaxYearRegistry { years: table })
    }

    /// Built-in UK table, initialised once per process
    pub fn uk() -> &'static TaxYearRegistry {
        static UK: OnceLock<TaxYearRegistry> = OnceLock::new();
        UK.get_or_init(|| {
            uk_tax_years()
                .and_then(TaxYearRegistry::new)
                .expect("built-in tax year table is valid")
        })
    }

    /// Load a table from JSON of the form `{ "tax_years": [ ... ] }`
    pub fn from_json<R: Read>(reader: R) -> Result<Self, TaxYearError> {
        let table: TaxYearTable =
            serde_json::from_reader(reader).map_err(|e| TaxYearError::InvalidTable(e.to_string()))?;
        let years = table
            .tax_years
            .into_iter()
            .map(TaxYearRow::into_tax_year)
            .collect::<Result<Vec<_>, _>>()?;
        TaxYearRegistry::new(years)
    }

    pub fn lookup(&self, id: i32) -> Result<&TaxYear, TaxYearError> {
        self.years.get(&id).ok_or(TaxYearError::UnknownTaxYear(id))
    }

    /// Configured years in ascending order
    pub fn available_years(&self) -> impl Iterator<Item = &TaxYear> {
        self.years.values()
    }

    /// The configured tax year `date` falls in, if any
    pub fn containing(&self, date: NaiveDate) -> Option<&TaxYear> {
        self.years.values().find(|year| year.contains(date))
    }
}

fn uk_tax_years() -> Result<Vec<TaxYear>, TaxYearError> {
    let charge_introduced =
        NaiveDate::from_ymd_opt(2013, 1, 7).ok_or(TaxYearError::OutOfRange(2012))?;
    Ok(vec![
        TaxYear::new(2012, dec!(20.30), dec!(13.40))?.with_charge_period_start(charge_introduced),
        TaxYear::new(2013, dec!(20.30), dec!(13.40))?,
    ])
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaxYearTable {
    tax_years: Vec<TaxYearRow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaxYearRow {
    id: i32,
    weekly_rate_first_child: Decimal,
    weekly_rate_other_child: Decimal,
    #[serde(default)]
    charge_period_start: Option<NaiveDate>,
    #[serde(default = "default_lower_threshold")]
    charge_lower_threshold: Decimal,
    #[serde(default = "default_upper_threshold")]
    charge_upper_threshold: Decimal,
}

impl TaxYearRow {
    fn into_tax_year(self) -> Result<TaxYear, TaxYearError> {
        let year = TaxYear::new(
            self.id,
            self.weekly_rate_first_child,
            self.weekly_rate_other_child,
        )?
        .with_thresholds(self.charge_lower_threshold, self.charge_upper_threshold);
        Ok(match self.charge_period_start {
            Some(start) => year.with_charge_period_start(start),
            None => year,
        })
    }
}

fn default_lower_threshold() -> Decimal {
    DEFAULT_LOWER_THRESHOLD
}

fn default_upper_threshold() -> Decimal {
    DEFAULT_UPPER_THRESHOLD
}

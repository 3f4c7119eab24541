use chrono::NaiveDate;
use rust_decimal::Decimal;

/// £1,055.60
pub fn format_gbp(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (whole, pence) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < Decimal::ZERO { "-" } else { "" };
    format!("{sign}£{grouped}.{pence}")
}

/// 7 January 2013
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// 7 January
pub fn format_day_month(date: NaiveDate) -> String {
    date.format("%-d %B").to_string()
}

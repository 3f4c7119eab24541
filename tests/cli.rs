//! E2E tests for the calculate, years and schema commands

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn hicbc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hicbc"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Decimal fields may serialize as strings or numbers
fn json_amount(value: &serde_json::Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

/// Test the inaugural year text output with a salary estimate
#[test]
fn calculate_inaugural_year() {
    let output = hicbc(&[
        "calculate",
        "-i",
        "tests/data/inaugural_year.json",
        "--today",
        "2014-09-01",
    ]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("2012 to 2013"));
    assert!(stdout.contains("Child Benefit received: £263.90"));
    assert!(stdout.contains("Received between 7 January and 5 April 2013."));
    assert!(stdout.contains("Tax charge to pay: £131.00"));
    assert!(stdout.contains("estimated adjusted net income of £55,000.00"));
    assert!(stdout.contains("Your result for the next tax year may be higher"));
    assert!(stdout.contains("5 October 2013"));
    assert!(!stdout.contains("This is an estimate"));
}

/// Test JSON output for the reference adjusted net income inputs
#[test]
fn calculate_reference_income_json() {
    let output = hicbc(&[
        "calculate",
        "-i",
        "tests/data/reference_income.json",
        "--today",
        "2014-09-01",
        "--json",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json_amount(&result["adjusted_net_income"]), "120325");
    assert_eq!(json_amount(&result["charge"]), "263");
    assert_eq!(json_amount(&result["charge_period_amount"]), "263.90");
    assert_eq!(result["charge_period_partial"], true);
    assert_eq!(result["below_threshold"], false);
    assert_eq!(result["charge_period_start"], "2013-01-07");
}

/// Test children from CSV with an income file below the threshold
#[test]
fn calculate_children_csv_below_threshold() {
    let output = hicbc(&[
        "calculate",
        "-y",
        "2013",
        "-c",
        "tests/data/children.csv",
        "--income",
        "tests/data/income.json",
        "--today",
        "2014-09-01",
    ]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("Child Benefit received: £1,752.40"));
    assert!(stdout.contains("£1,055.60"));
    assert!(stdout.contains("£696.80"));
    assert!(stdout.contains("Tax charge to pay: £0.00"));
    assert!(stdout.contains("There is no tax charge if your income is below £50,099."));
    assert!(!stdout.contains("Received between"));
}

/// Test the warning shown while the tax year is still running
#[test]
fn calculate_incomplete_year() {
    let output = hicbc(&[
        "calculate",
        "-y",
        "2013",
        "-c",
        "tests/data/children.csv",
        "--salary",
        "55000",
        "--today",
        "2013-09-01",
    ]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains(
        "This is an estimate based on your adjusted net income of £55,000.00 - your circumstances may change before the end of the tax year."
    ));
}

/// Test the prompt shown when no income is supplied
#[test]
fn calculate_without_income() {
    let output = hicbc(&["calculate", "-y", "2013", "-c", "tests/data/children.csv"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("To work out the tax charge, enter your income."));
    assert!(!stdout.contains("Tax charge to pay"));
}

/// Test reading the request from stdin
#[test]
fn calculate_from_stdin() {
    let request = std::fs::read("tests/data/inaugural_year.json").unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_hicbc"))
        .args(["calculate", "-i", "-", "--json", "--today", "2014-09-01"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");
    child.stdin.take().unwrap().write_all(&request).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json_amount(&result["charge"]), "131");
}

/// Test that a year with no Child Benefit fails with guidance
#[test]
fn calculate_no_entitlement() {
    let output = hicbc(&["calculate", "-i", "tests/data/no_entitlement.json"]);

    assert!(!output.status.success());
    assert!(stderr(&output)
        .contains("You haven't received any Child Benefit for the tax year selected."));
}

/// Test that an unconfigured tax year is rejected
#[test]
fn calculate_unknown_tax_year() {
    let output = hicbc(&[
        "calculate",
        "-y",
        "2020",
        "-c",
        "tests/data/children.csv",
    ]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown tax year: 2020"));
}

/// Test that a calculation needs an input
#[test]
fn calculate_requires_input() {
    let output = hicbc(&["calculate"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--input"));
}

/// Test listing the built-in tax years
#[test]
fn years_builtin() {
    let output = hicbc(&["years"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("2012 to 2013"));
    assert!(stdout.contains("2013 to 2014"));
    assert!(stdout.contains("7 January 2013"));
    assert!(stdout.contains("£20.30"));
}

/// Test a tax year table loaded from a file
#[test]
fn years_from_file() {
    let output = hicbc(&["years", "--tax-years", "tests/data/tax_years.json", "--json"]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let years: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = years
        .as_array()
        .unwrap()
        .iter()
        .map(|y| y["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2012, 2013, 2014]);
}

/// Test calculating with a year only present in a loaded table
#[test]
fn calculate_with_loaded_table() {
    let output = hicbc(&[
        "--tax-years",
        "tests/data/tax_years.json",
        "calculate",
        "-y",
        "2014",
        "-c",
        "tests/data/children.csv",
        "--json",
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json_amount(&result["children"][0]["amount"]), "1066.00");
}

/// Test the schema command
#[test]
fn schema_inputs() {
    let output = hicbc(&["schema"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let request = stdout(&output);
    assert!(request.contains("\"tax_year\""));
    assert!(request.contains("\"children\""));

    let output = hicbc(&["schema", "income"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("gift_aid_donations"));
}

/// Test that the sample children CSV is accepted by calculate
#[test]
fn schema_children_round_trips_through_calculate() {
    let output = hicbc(&["schema", "children"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    let sample = stdout(&output);
    assert_eq!(sample.lines().next(), Some("start_date,stop_date"));
    assert_eq!(sample.lines().nth(1), Some("2011-01-01,"));

    let mut child = Command::new(env!("CARGO_BIN_EXE_hicbc"))
        .args(["calculate", "-y", "2012", "-c", "-", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");
    child.stdin.take().unwrap().write_all(sample.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "Command failed: {:?}", output);
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["children"].as_array().unwrap().len(), 2);
}

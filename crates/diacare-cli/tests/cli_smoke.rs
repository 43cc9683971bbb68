//! CLI binary smoke tests using assert_cmd.
//!
//! These tests run the compiled `diacare` binary end-to-end against a small
//! dataset in a temporary directory.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DATASET: &str = "\
HbA1c_level,Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age,Outcome
5.0,0,90,70,20,80,22,0.3,25,0
5.1,1,92,72,21,82,23,0.3,27,0
5.2,0,95,68,19,79,22,0.4,30,0
5.0,2,88,71,20,81,24,0.2,35,0
7.5,0,200,80,30,150,33,0.8,55,2
7.8,1,210,82,32,160,34,0.9,60,2
7.6,0,205,79,31,155,35,0.7,58,2
7.9,3,215,85,33,170,36,0.8,62,2
";

const UPLOAD: &str = "\
Parameter,Value
HbA1c Level,7.7
Glucose,208
BloodPressure,81
SkinThickness,31
Insulin,158
BMI,34
Genetic Correlation,0.8
Pregnancies,1
Age,59
";

fn cmd() -> Command {
    Command::cargo_bin("diacare").unwrap()
}

/// A command wired to files inside `dir`.
fn cmd_in(dir: &Path) -> Command {
    let mut c = cmd();
    c.arg("--dataset")
        .arg(dir.join("diabetes.csv"))
        .arg("--user-store")
        .arg(dir.join("users.json"))
        .arg("--session")
        .arg(dir.join("session.json"))
        .arg("--output-dir")
        .arg(dir.join("reports"));
    c
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("diabetes.csv"), DATASET).unwrap();
    dir
}

fn signup_and_login(dir: &Path) {
    cmd_in(dir)
        .args([
            "user",
            "signup",
            "--name",
            "Jane Doe",
            "--username",
            "Jane",
            "--password",
            "s3cret",
            "--confirm-password",
            "s3cret",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Account created for 'jane'"));
    cmd_in(dir)
        .args(["user", "login", "JANE", "--password", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, Jane Doe!"));
}

const HIGH_RISK_ARGS: [&str; 19] = [
    "predict",
    "--hba1c",
    "7.7",
    "--glucose",
    "208",
    "--blood-pressure",
    "81",
    "--skin-thickness",
    "31",
    "--insulin",
    "158",
    "--bmi",
    "34",
    "--pedigree",
    "0.8",
    "--pregnancies",
    "1",
    "--age",
    "59",
];

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("predict"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("diacare"));
}

#[test]
fn nonexistent_config_errors() {
    cmd()
        .args(["--config", "/nonexistent/diacare.json", "data", "summary"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// Session-gated commands
// ---------------------------------------------------------------------------

#[test]
fn predict_requires_login() {
    let dir = workspace();
    cmd_in(dir.path())
        .args(HIGH_RISK_ARGS)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn predict_then_report() {
    let dir = workspace();
    signup_and_login(dir.path());

    cmd_in(dir.path())
        .args(HIGH_RISK_ARGS)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The person has a high risk of diabetes type 2",
        ))
        .stdout(predicate::str::contains("The model used has an accuracy of 100.00%"));

    let date_before = chrono::Local::now().format("Date: %Y-%m-%d").to_string();
    cmd_in(dir.path())
        .args(["report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane_Doe_diabetes_report.html"));

    let html =
        std::fs::read_to_string(dir.path().join("reports/Jane_Doe_diabetes_report.html")).unwrap();
    assert!(html.contains("User Name: Jane Doe"));
    let date_after = chrono::Local::now().format("Date: %Y-%m-%d").to_string();
    assert!(html.contains(&date_before) || html.contains(&date_after));
    let csv =
        std::fs::read_to_string(dir.path().join("reports/Jane_Doe_diabetes_data.csv")).unwrap();
    assert!(csv.starts_with("Feature,Value"));
}

#[test]
fn report_without_prediction_errors() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .args(["report", "--name", "Someone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No prediction in this session"));
}

#[test]
fn predict_json_output() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .args(HIGH_RISK_ARGS)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"class_code\": 2"));
}

#[test]
fn logout_ends_the_session() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .args(["user", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out 'jane'"));
    cmd_in(dir.path())
        .args(["user", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
    cmd_in(dir.path()).args(HIGH_RISK_ARGS).assert().failure();
}

#[test]
fn login_reads_password_from_stdin() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path()).args(["user", "logout"]).assert().success();
    cmd_in(dir.path())
        .args(["user", "login", "jane"])
        .write_stdin("s3cret\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, Jane Doe!"));
}

#[test]
fn wrong_password_fails() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .args(["user", "login", "jane", "--password", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Username/password incorrect"));
}

// ---------------------------------------------------------------------------
// Dataset, model and upload commands
// ---------------------------------------------------------------------------

#[test]
fn dataset_commands_require_login() {
    let dir = workspace();
    let upload = dir.path().join("patient.csv");
    std::fs::write(&upload, UPLOAD).unwrap();
    for args in [vec!["data", "summary"], vec!["model"]] {
        cmd_in(dir.path())
            .args(args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not logged in"));
    }
    cmd_in(dir.path())
        .arg("assess")
        .arg(&upload)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn data_summary_lists_columns() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .args(["data", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HbA1c_level"))
        .stdout(predicate::str::contains("Outcome distribution"));
}

#[test]
fn data_column_unknown_errors() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .args(["data", "column", "Cholesterol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown column"));
}

#[test]
fn model_prints_tree_and_importances() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .arg("model")
        .assert()
        .success()
        .stdout(predicate::str::contains("|--- "))
        .stdout(predicate::str::contains("Feature importances"));
}

#[test]
fn assess_high_risk_upload() {
    let dir = workspace();
    signup_and_login(dir.path());
    let upload = dir.path().join("patient.csv");
    std::fs::write(&upload, UPLOAD).unwrap();
    cmd_in(dir.path())
        .arg("assess")
        .arg(&upload)
        .assert()
        .success()
        .stdout(predicate::str::contains("Disease type: High risk of diabetes type 2"))
        .stdout(predicate::str::contains("Glucose: 208"))
        .stdout(predicate::str::contains("Prediction confidence: 100.00%"));
}

#[test]
fn assess_missing_file_errors() {
    let dir = workspace();
    signup_and_login(dir.path());
    cmd_in(dir.path())
        .args(["assess", "/nonexistent/patient.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist"));
}

//! Integration tests for the fmeda CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an fmeda command isolated from the user's global config
fn fmeda(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fmeda").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("FMEDA_FORMAT")
        .env_remove("FMEDA_LIFETIME")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fmeda(&tmp).arg("init").assert().success();
    tmp
}

/// Lifetime 100000h, C1 1000 FIT linked to SF1, FM 600 SPF 90%, FM 400 MPF 50%
fn setup_worked_example() -> TempDir {
    let tmp = setup_workspace();
    fmeda(&tmp)
        .args(["project", "new", "--name", "Brake ECU", "--lifetime", "100000", "--yes"])
        .assert()
        .success();
    fmeda(&tmp)
        .args(["sf", "new", "--id", "SF1", "-l", "ASIL B"])
        .assert()
        .success();
    fmeda(&tmp)
        .args(["cmp", "new", "--id", "C1", "--rate", "1000", "--safety-related", "--sf", "SF1"])
        .assert()
        .success();
    fmeda(&tmp)
        .args(["fm", "new", "-c", "C1", "-d", "stuck", "-r", "600", "--spf", "--spf-dc", "90"])
        .assert()
        .success();
    fmeda(&tmp)
        .args(["fm", "new", "-c", "C1", "-d", "drift", "-r", "400", "--mpf", "--mpf-dc", "50"])
        .assert()
        .success();
    tmp
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    fmeda(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SPFM"));
}

#[test]
fn test_command_outside_workspace_fails() {
    let tmp = TempDir::new().unwrap();
    fmeda(&tmp)
        .args(["sf", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("workspace"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();
    fmeda(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".fmeda").is_dir());
    assert!(tmp.path().join(".fmeda/config.yaml").is_file());
}

#[test]
fn test_init_twice_reports_existing() {
    let tmp = setup_workspace();
    fmeda(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

// ============================================================================
// Entity Commands
// ============================================================================

#[test]
fn test_entity_commands_before_project_fail() {
    let tmp = setup_workspace();
    fmeda(&tmp)
        .args(["sf", "new", "--id", "SF1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No project"));
}

#[test]
fn test_cmp_with_unknown_sf_fails() {
    let tmp = setup_worked_example();
    fmeda(&tmp)
        .args(["cmp", "new", "--id", "C2", "--sf", "SF9"])
        .assert()
        .failure();
}

#[test]
fn test_blank_external_ids_are_rejected() {
    let tmp = setup_worked_example();
    fmeda(&tmp)
        .args(["sf", "new", "--id", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be blank"));
    fmeda(&tmp)
        .args(["cmp", "edit", "C1", "--id", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be blank"));

    // C1 keeps its id and link
    fmeda(&tmp)
        .args(["cmp", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("C1"))
        .stdout(predicate::str::contains("SF1"));
}

#[test]
fn test_cmp_list_shows_links() {
    let tmp = setup_worked_example();
    fmeda(&tmp)
        .args(["cmp", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("C1"))
        .stdout(predicate::str::contains("SF1"));
}

#[test]
fn test_fm_list_json() {
    let tmp = setup_worked_example();
    let output = fmeda(&tmp).args(["fm", "list", "-f", "json"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let fms = value.as_array().unwrap();
    assert_eq!(fms.len(), 2);
    assert_eq!(fms[0]["description"], "stuck");
    assert_eq!(fms[0]["is_SPF"], true);
}

#[test]
fn test_cmp_delete_cascades_failure_modes() {
    let tmp = setup_worked_example();
    fmeda(&tmp).args(["cmp", "delete", "C1"]).assert().success();
    fmeda(&tmp)
        .args(["fm", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn test_calc_reports_worked_example() {
    let tmp = setup_worked_example();
    fmeda(&tmp)
        .arg("calc")
        .assert()
        .success()
        .stdout(predicate::str::contains("94.00%"))
        .stdout(predicate::str::contains("78.72%"))
        .stdout(predicate::str::contains("6.40e-8"));
}

#[test]
fn test_results_marks_stale_after_edit() {
    let tmp = setup_worked_example();
    fmeda(&tmp).arg("calc").assert().success();
    fmeda(&tmp)
        .arg("results")
        .assert()
        .success()
        .stdout(predicate::str::contains("stale").not());

    fmeda(&tmp)
        .args(["fm", "edit", "1", "--spf-dc", "99"])
        .assert()
        .success();
    fmeda(&tmp)
        .arg("results")
        .assert()
        .success()
        .stdout(predicate::str::contains("stale"))
        .stdout(predicate::str::contains("94.00%"));

    fmeda(&tmp)
        .arg("calc")
        .assert()
        .success()
        .stdout(predicate::str::contains("99.40%"));
}

#[test]
fn test_report_to_file() {
    let tmp = setup_worked_example();
    fmeda(&tmp)
        .args(["report", "-o", "report.md"])
        .assert()
        .success();

    let report = fs::read_to_string(tmp.path().join("report.md")).unwrap();
    assert!(report.contains("# FMEDA Report: Brake ECU"));
    assert!(report.contains("94.00%"));
}

// ============================================================================
// CSV Exchange
// ============================================================================

#[test]
fn test_export_import_round_trip() {
    let tmp = setup_worked_example();
    fmeda(&tmp)
        .args(["export", "-o", "project.csv"])
        .assert()
        .success();

    let csv = fs::read_to_string(tmp.path().join("project.csv")).unwrap();
    assert!(csv.starts_with("section,"));
    assert!(csv.contains("Brake ECU"));

    fmeda(&tmp).args(["clear", "--yes"]).assert().success();
    fmeda(&tmp)
        .args(["import", "project.csv", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 safety function(s), 1 component(s), 2 failure mode(s)"));

    fmeda(&tmp)
        .arg("results")
        .assert()
        .success()
        .stdout(predicate::str::contains("94.00%"));
}

#[test]
fn test_export_without_metrics() {
    let tmp = setup_worked_example();
    fmeda(&tmp)
        .args(["export", "--no-metrics"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SPFM").not())
        .stdout(predicate::str::contains("C1"));
}

#[test]
fn test_import_without_project_row_keeps_data() {
    let tmp = setup_worked_example();
    fs::write(
        tmp.path().join("broken.csv"),
        "section,ID,Description\nsf,SF9,orphan\n",
    )
    .unwrap();

    fmeda(&tmp)
        .args(["import", "broken.csv", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project row"));

    fmeda(&tmp)
        .args(["sf", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SF1"));
}

#[test]
fn test_clear_empties_workspace() {
    let tmp = setup_worked_example();
    fmeda(&tmp).args(["clear", "--yes"]).assert().success();
    fmeda(&tmp)
        .args(["project", "list", "-f", "id"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

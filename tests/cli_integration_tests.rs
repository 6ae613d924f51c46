//! CLI integration tests
//!
//! Tests the `tabula` binary directly using assert_cmd.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tabula::excel::{ExcelExporter, ExportOptions};
use tempfile::TempDir;

fn tabula() -> Command {
    Command::cargo_bin("tabula").unwrap()
}

fn people_workbook(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("people.xlsx");
    ExcelExporter::new(ExportOptions::new())
        .export_file(&common::people(), &path)
        .unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// column
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_column_index_to_letters() {
    tabula()
        .args(["column", "115"])
        .assert()
        .success()
        .stdout(predicate::str::contains("115 → DL"));
}

#[test]
fn test_column_letters_to_index() {
    tabula()
        .args(["column", "acm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ACM → 766"));
}

#[test]
fn test_column_rejects_mixed_input() {
    tabula().args(["column", "B7"]).assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// sheets / dump
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sheets_lists_names() {
    let dir = TempDir::new().unwrap();
    let path = people_workbook(&dir);
    tabula()
        .arg("sheets")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("People"));
}

#[test]
fn test_dump_json() {
    let dir = TempDir::new().unwrap();
    let path = people_workbook(&dir);
    tabula()
        .arg("dump")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Name\": \"Ann\""))
        .stdout(predicate::str::contains("陈静"));
}

#[test]
fn test_dump_yaml_with_config_and_overrides() {
    let dir = TempDir::new().unwrap();
    let path = people_workbook(&dir);
    let config = dir.path().join("cfg.yaml");
    std::fs::write(&config, "import:\n  sheet_name: Missing\n").unwrap();

    tabula()
        .arg("dump")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing"));

    tabula()
        .arg("dump")
        .arg(&path)
        .args(["--config"])
        .arg(&config)
        .args(["--sheet", "People", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: Ann"));
}

#[test]
fn test_dump_missing_file_fails() {
    tabula()
        .args(["dump", "/definitely/not/here.xlsx"])
        .assert()
        .failure();
}

//! CLI E2E tests for report commands, exit codes and config inspection.
//!
//! Validates:
//! - JSON reports carry the envelope (schema_version, run_id, config hash)
//! - Missing columns and missing input exit with the input-error code
//! - `outliers` and `abnormal` exit 1 when buckets are flagged
//! - CSV and summary formats
//! - `config presets`, `config schema`, `config validate`
//!
//! Every command runs with an empty config home so a user config on the
//! host cannot leak into the results.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

// ============================================================================
// Helpers
// ============================================================================

const HEADER: &str =
    "CHAMBERID,TOOLID,RECIPEID,OPERATION,PRODUCT,CHAMBER_CODE,SIN,GLASSID,step_name,TSTAMP,NF3_total_Flow,pressure";

fn nf3(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("nf3-core");
    cmd.timeout(Duration::from_secs(60))
        .env("XDG_CONFIG_HOME", home)
        .env_remove("NF3_CONFIG")
        .env_remove("NF3_INPUT")
        .env_remove("NF3_LOG");
    cmd
}

fn row(chamber: &str, recipe: &str, step: &str, glass: &str, tstamp: &str, flow: &str) -> String {
    format!("{chamber},T1,{recipe},1100,PRD1,{chamber}A,S01,{glass},{step},{tstamp},{flow},1.5")
}

/// Nine quiet days for C1, a spike on day ten, plus a row the default step
/// filter drops.
fn spike_fixture(dir: &TempDir) -> PathBuf {
    let mut lines = vec![HEADER.to_string()];
    for day in 1..=9 {
        lines.push(row(
            "C1",
            "RPSC_BP_01",
            "CLN1",
            &format!("G{day}"),
            &format!("202403{:02}08", day),
            "100",
        ));
    }
    lines.push(row("C1", "RPSC_BP_01", "CLN1", "G10", "2024031008", "10000"));
    lines.push(row("C2", "AS_DEP", "DEP1", "G11", "2024031008", "555"));
    let path = dir.path().join("flow.csv");
    fs::write(&path, lines.join("\n") + "\n").expect("write fixture");
    path
}

fn flat_fixture(dir: &TempDir) -> PathBuf {
    let mut lines = vec![HEADER.to_string()];
    for day in 1..=6 {
        lines.push(row(
            "C1",
            "RPSC_PFA_01",
            "CLN2",
            &format!("G{day}"),
            &format!("202404{:02}10", day),
            "50",
        ));
    }
    let path = dir.path().join("flat.csv");
    fs::write(&path, lines.join("\n") + "\n").expect("write fixture");
    path
}

fn json_stdout(cmd: &mut Command, code: i32) -> Value {
    let output = cmd.assert().code(code).get_output().stdout.clone();
    serde_json::from_slice(&output).expect("parse JSON")
}

// ============================================================================
// Report commands
// ============================================================================

#[test]
fn summary_json_has_envelope_and_counts() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    let json = json_stdout(
        nf3(dir.path()).args(["--input", input.to_str().unwrap(), "summary"]),
        0,
    );

    assert_eq!(json["command"], "summary");
    assert!(json["schema_version"].is_string());
    assert!(json["run_id"].is_string());
    assert_eq!(json["config"]["source"]["kind"], "defaults");
    assert_eq!(json["config"]["config_hash"].as_str().unwrap().len(), 64);

    let data = &json["data"];
    assert_eq!(data["ingest"]["rows"], 11);
    assert_eq!(data["filter"]["kept"], 10);
    assert_eq!(data["filter"]["dropped"], 1);
    assert_eq!(data["first_date"], "2024-03-01");
    assert_eq!(data["last_date"], "2024-03-10");
    assert_eq!(data["unit"], "kg_per_second");
}

#[test]
fn unit_override_changes_report_unit() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    let json = json_stdout(
        nf3(dir.path()).args(["--input", input.to_str().unwrap(), "--unit", "sccm", "summary"]),
        0,
    );
    assert_eq!(json["data"]["unit"], "sccm");
    assert_eq!(json["data"]["total_flow"].as_f64().unwrap(), 10_900.0);
}

#[test]
fn input_from_environment() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    nf3(dir.path())
        .env("NF3_INPUT", &input)
        .args(["summary"])
        .assert()
        .success();
}

#[test]
fn outliers_exit_one_when_flagged() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    let json = json_stdout(
        nf3(dir.path()).args(["--input", input.to_str().unwrap(), "outliers"]),
        1,
    );
    let rows = json["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    let flagged: Vec<&Value> = rows.iter().filter(|r| r["outlier"] == true).collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["bucket"]["label"], "2024-03-10");
}

#[test]
fn outliers_by_dimension_flags_category_cells() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    let json = json_stdout(
        nf3(dir.path()).args([
            "--input",
            input.to_str().unwrap(),
            "outliers",
            "--dimension",
            "chamber",
        ]),
        1,
    );
    assert_eq!(json["data"]["dimension"], "chamber");
    let rows = json["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    let flagged: Vec<&Value> = rows.iter().filter(|r| r["outlier"] == true).collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["category"], "C1");
    assert_eq!(flagged[0]["bucket"]["label"], "2024-03-10");
}

#[test]
fn outliers_by_dimension_clean_on_flat_series() {
    let dir = tempdir().unwrap();
    let input = flat_fixture(&dir);
    nf3(dir.path())
        .args(["--input", input.to_str().unwrap(), "outliers", "-d", "chamber"])
        .assert()
        .code(0);
}

#[test]
fn abnormal_flags_spike_over_preceding_mean() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    let json = json_stdout(
        nf3(dir.path()).args(["--input", input.to_str().unwrap(), "abnormal"]),
        1,
    );
    let rows = json["data"]["rows"].as_array().unwrap();
    let last = rows.last().unwrap();
    assert_eq!(last["abnormal"], true);
    assert!((last["times"].as_f64().unwrap() - 100.0).abs() < 1e-6);
}

#[test]
fn flat_series_is_clean() {
    let dir = tempdir().unwrap();
    let input = flat_fixture(&dir);
    nf3(dir.path())
        .args(["--input", input.to_str().unwrap(), "outliers"])
        .assert()
        .code(0);
    nf3(dir.path())
        .args(["--input", input.to_str().unwrap(), "abnormal"])
        .assert()
        .code(0);
}

#[test]
fn tree_parents_sum_children() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    let json = json_stdout(
        nf3(dir.path()).args([
            "--input",
            input.to_str().unwrap(),
            "--unit",
            "sccm",
            "tree",
            "--dims",
            "layer,chamber",
        ]),
        0,
    );
    let root = &json["data"];
    assert_eq!(root["value"].as_f64().unwrap(), 10_900.0);
    let layers = root["children"].as_array().unwrap();
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0]["name"], "BP");
}

#[test]
fn changes_for_missing_date_is_analysis_error() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    nf3(dir.path())
        .args(["--input", input.to_str().unwrap(), "changes", "--date", "2023-01-01"])
        .assert()
        .code(12)
        .stderr(predicate::str::contains("no data"));
}

#[test]
fn csv_format_writes_header_row() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    nf3(dir.path())
        .args(["--input", input.to_str().unwrap(), "--format", "csv", "outliers"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("bucket,value,outlier"));
}

#[test]
fn summary_format_is_human_readable() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    nf3(dir.path())
        .args(["--input", input.to_str().unwrap(), "--format", "summary", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("11 rows read, 10 kept after filters"));
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn missing_column_exits_input_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nosin.csv");
    fs::write(
        &path,
        "CHAMBERID,TOOLID,RECIPEID,OPERATION,PRODUCT,CHAMBER_CODE,GLASSID,step_name,TSTAMP,NF3_total_Flow\n\
         C1,T1,RPSC_BP,1100,P,C1A,G1,CLN1,2024030108,10\n",
    )
    .unwrap();
    nf3(dir.path())
        .args(["--input", path.to_str().unwrap(), "summary"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("SIN"));
}

#[test]
fn header_only_input_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, format!("{HEADER}\n")).unwrap();
    nf3(dir.path())
        .args(["--input", path.to_str().unwrap(), "summary"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("no data rows"));
}

#[test]
fn no_input_is_input_error() {
    let dir = tempdir().unwrap();
    nf3(dir.path())
        .args(["summary"])
        .assert()
        .code(11)
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn missing_input_file_is_io_error() {
    let dir = tempdir().unwrap();
    nf3(dir.path())
        .args(["--input", "/nonexistent/flow.csv", "summary"])
        .assert()
        .code(13);
}

#[test]
fn invalid_config_file_exits_config_error() {
    let dir = tempdir().unwrap();
    let input = spike_fixture(&dir);
    let cfg = dir.path().join("bad.json");
    fs::write(&cfg, r#"{"rolling_windows": [], "top_n": 0}"#).unwrap();
    nf3(dir.path())
        .args([
            "--input",
            input.to_str().unwrap(),
            "--config",
            cfg.to_str().unwrap(),
            "summary",
        ])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("top_n"));
}

// ============================================================================
// Config commands
// ============================================================================

#[test]
fn config_presets_lists_all() {
    let dir = tempdir().unwrap();
    let json = json_stdout(nf3(dir.path()).args(["config", "presets"]), 0);
    let names: Vec<&str> = json["presets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["basics", "dashboard", "ratios", "all-steps"]);
}

#[test]
fn config_show_reflects_preset() {
    let dir = tempdir().unwrap();
    let json = json_stdout(
        nf3(dir.path()).args(["--preset", "dashboard", "config", "show"]),
        0,
    );
    assert_eq!(json["config"]["source"]["kind"], "preset");
    assert_eq!(json["config"]["config"]["unit"], "kg_per_day");
}

#[test]
fn config_file_in_config_home_is_discovered() {
    let dir = tempdir().unwrap();
    let nf3_dir = dir.path().join("nf3");
    fs::create_dir_all(&nf3_dir).unwrap();
    fs::write(nf3_dir.join("config.toml"), "granularity = \"month\"\n").unwrap();
    let json = json_stdout(nf3(dir.path()).args(["config", "show"]), 0);
    assert_eq!(json["config"]["source"]["kind"], "file");
    assert_eq!(json["config"]["config"]["granularity"], "month");
}

#[test]
fn config_schema_describes_fields() {
    let dir = tempdir().unwrap();
    let json = json_stdout(nf3(dir.path()).args(["config", "schema"]), 0);
    let props = json["properties"].as_object().expect("properties");
    assert!(props.contains_key("unit"));
    assert!(props.contains_key("hierarchy"));
    assert!(props.contains_key("abnormal"));
}

#[test]
fn config_validate_reports_each_problem() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.json");
    fs::write(&cfg, r#"{"top_n": 0, "recent_days": 0}"#).unwrap();
    let json = json_stdout(
        nf3(dir.path()).args(["config", "validate", cfg.to_str().unwrap()]),
        10,
    );
    assert_eq!(json["valid"], false);
    assert_eq!(json["errors"].as_array().unwrap().len(), 2);
}

#[test]
fn completions_generate_script() {
    let dir = tempdir().unwrap();
    nf3(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nf3-core"));
}

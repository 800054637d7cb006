//! Integration tests for the resolve-config CLI
//!
//! These tests run the actual binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the binary to test
fn resolve_cmd() -> Command {
    let mut cmd = Command::cargo_bin("resolve-config").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("JOBCONF_LOCAL_ROOT")
        .env_remove("JOBCONF_LOCAL_PREFIX");
    cmd
}

const CONFIG_JSON: &str = r#"{
  "name": "muncie",
  "type": "ras-unsteady",
  "attributes": { "geom": "01", "plan": "04" },
  "inputs": [{
    "name": "ras_model_files",
    "store-name": "s3primary",
    "paths": { "x-file": "proj_{ATTR:geom}/model_{ENV:PROJ_ROOT}.x{ATTR:plan}" }
  }],
  "outputs": [{
    "name": "ras_results",
    "store-name": "s3primary",
    "paths": { "hdf-output": "results/Muncie.p{ATTR:plan}.hdf" }
  }],
  "stores": [{ "name": "s3primary", "store-type": "S3", "params": { "root": "ffrd-bucket" } }]
}"#;

fn write_config(dir: &TempDir, file: &str, content: &str) -> String {
    let path = dir.path().join(file);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_help_flag() {
    resolve_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ATTR: and ENV:"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("local-paths"));
}

#[test]
fn test_plan_requires_direction() {
    resolve_cmd()
        .args(["plan", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--download"));
}

// ============================================================================
// resolve
// ============================================================================

#[test]
fn test_resolve_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args(["resolve", config.as_str()])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success()
        .stdout(predicate::str::contains("proj_01/model_/data.x04"))
        .stdout(predicate::str::contains(r#""store_root":"ffrd-bucket""#))
        .stdout(predicate::str::contains(r#""store_type":"S3""#));
}

#[test]
fn test_resolve_inline_json_pretty() {
    let inline = r#"{"name":"j","type":"t","attributes":{"a":"x"},"inputs":[],"outputs":[],"stores":[],"note":"v-{ATTR:a}"}"#;

    resolve_cmd()
        .args(["resolve", inline, "--pretty"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"note\": \"v-x\""))
        .stdout(predicate::str::contains("\n  \"name\": \"j\""));
}

#[test]
fn test_resolve_yaml_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        "job.yaml",
        r#"
name: yaml-job
type: sim
attributes:
  plan: "07"
inputs: []
outputs:
  - name: results
    store-name: local
    paths:
      hdf-output: "out/plan.p{ATTR:plan}.hdf"
stores:
  - name: local
    store-type: FS
    params:
      root: /data/runs
"#,
    );

    resolve_cmd()
        .args(["resolve", config.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("out/plan.p07.hdf"))
        .stdout(predicate::str::contains(r#""store_type":"FILESYSTEM""#));
}

#[test]
fn test_resolve_reports_every_missing_reference() {
    let inline = r#"{"name":"j","type":"t","attributes":{},"inputs":[{"name":"m","store_name":"s","paths":{"field1":"{ATTR:a}","field2":"{ATTR:b}"}}],"outputs":[],"stores":[{"name":"s","store_type":"S3","params":{"root":"bucket"}}]}"#;

    resolve_cmd()
        .args(["resolve", inline])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JOBCONF-020"))
        .stderr(predicate::str::contains("Missing ATTR references"))
        .stderr(predicate::str::contains("ATTR:a at config.inputs[0].paths.field1"))
        .stderr(predicate::str::contains("ATTR:b at config.inputs[0].paths.field2"));
}

#[test]
fn test_missing_env_without_variable_set() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args(["resolve", config.as_str()])
        .env_remove("PROJ_ROOT")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing ENV references"))
        .stderr(predicate::str::contains("PROJ_ROOT"));
}

#[test]
fn test_unknown_store_json_error() {
    let inline = r#"{"name":"j","type":"t","attributes":{},"inputs":[],"outputs":[{"name":"results","store_name":"unknown","paths":{}}],"stores":[{"name":"s3primary","store_type":"S3","params":{"root":"bucket"}}]}"#;

    resolve_cmd()
        .args(["--format", "json", "resolve", inline])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""code":"JOBCONF-011""#))
        .stderr(predicate::str::contains(r#""stage":"bind""#))
        .stderr(predicate::str::contains("unknown"));
}

#[test]
fn test_invalid_json_fails() {
    resolve_cmd()
        .args(["resolve", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_summary() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args(["validate", config.as_str()])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration 'muncie' is valid"))
        .stdout(predicate::str::contains("Inputs: 1"))
        .stdout(predicate::str::contains("Stores: 1"));
}

// ============================================================================
// local-paths / plan
// ============================================================================

#[test]
fn test_local_paths_for_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args([
            "local-paths",
            config.as_str(),
            "--output",
            "ras_results",
            "--local-root",
            "/mnt/output",
            "--prefix",
            "run42",
        ])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"hdf_output":"/mnt/output/run42/Muncie.p04.hdf"}"#,
        ));
}

#[test]
fn test_local_root_from_environment() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args(["local-paths", config.as_str(), "--output", "ras_results"])
        .env("PROJ_ROOT", "/data")
        .env("JOBCONF_LOCAL_ROOT", "/scratch")
        .assert()
        .success()
        .stdout(predicate::str::contains("/scratch/Muncie.p04.hdf"));
}

#[test]
fn test_local_paths_unknown_item() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args(["local-paths", config.as_str(), "--input", "missing"])
        .env("PROJ_ROOT", "/data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JOBCONF-031"));
}

#[test]
fn test_download_plan() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args(["plan", config.as_str(), "--download", "ras_model_files", "--local-root", "/mnt"])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""source":"s3://ffrd-bucket/proj_01/model_/data.x04""#,
        ))
        .stdout(predicate::str::contains(
            r#""destination":"/mnt/proj_01/model_/data.x04""#,
        ));
}

#[test]
fn test_upload_plan_check_detects_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);
    let local_root = dir.path().to_str().unwrap();

    resolve_cmd()
        .args([
            "plan",
            config.as_str(),
            "--upload",
            "ras_results",
            "--check",
            "--local-root",
            local_root,
        ])
        .env("PROJ_ROOT", "/data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JOBCONF-030"));

    fs::write(dir.path().join("Muncie.p04.hdf"), b"hdf").unwrap();

    resolve_cmd()
        .args([
            "plan",
            config.as_str(),
            "--upload",
            "ras_results",
            "--check",
            "--local-root",
            local_root,
        ])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""destination":"s3://ffrd-bucket/results/Muncie.p04.hdf""#,
        ));
}

#[test]
fn test_settings_file_sets_local_root() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);
    let settings = write_config(&dir, "settings.toml", "local_root = \"/work\"\n");

    resolve_cmd()
        .args(["--settings", settings.as_str(), "local-paths", config.as_str(), "--output", "ras_results"])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success()
        .stdout(predicate::str::contains("/work/Muncie.p04.hdf"));
}

#[test]
fn test_download_plan_check_verifies_destinations() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);
    let local_root = dir.path().join("work");
    let local_root = local_root.to_str().unwrap();

    resolve_cmd()
        .args([
            "plan",
            config.as_str(),
            "--download",
            "ras_model_files",
            "--check",
            "--local-root",
            local_root,
        ])
        .env("PROJ_ROOT", "/data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JOBCONF-030"))
        .stderr(predicate::str::contains("x_file"));

    let landed = dir.path().join("work/proj_01/model_/data.x04");
    fs::create_dir_all(landed.parent().unwrap()).unwrap();
    fs::write(&landed, b"geometry").unwrap();

    resolve_cmd()
        .args([
            "plan",
            config.as_str(),
            "--download",
            "ras_model_files",
            "--check",
            "--local-root",
            local_root,
        ])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success();
}

#[test]
fn test_copy_plan_targets_destination_dir() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "job.json", CONFIG_JSON);

    resolve_cmd()
        .args([
            "plan",
            config.as_str(),
            "--upload",
            "ras_results",
            "--copy-to",
            "/shared/results",
            "--local-root",
            "/mnt/output",
        ])
        .env("PROJ_ROOT", "/data")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""source":"/mnt/output/Muncie.p04.hdf""#))
        .stdout(predicate::str::contains(
            r#""destination":"/shared/results/Muncie.p04.hdf""#,
        ));
}

#[test]
fn test_copy_to_requires_upload() {
    resolve_cmd()
        .args(["plan", "{}", "--download", "m", "--copy-to", "/tmp/x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--upload"));
}

#[test]
fn test_colliding_keys_are_rejected() {
    let inline = r#"{"name":"j","type":"t","stores":[{"name":"s","store-type":"S3","store_type":"FS","params":{"root":"b"}}]}"#;

    resolve_cmd()
        .args(["resolve", inline])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JOBCONF-001"))
        .stderr(predicate::str::contains("config.stores[0]"));
}

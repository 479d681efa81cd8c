mod common;

use std::process::Command;

use common::sample_csv;

const BIN: &str = env!("CARGO_BIN_EXE_law-overlay");

#[test]
fn validate_exits_zero_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");

    let out = Command::new(BIN)
        .args(["validate", "--csv"])
        .arg(sample_csv())
        .arg("--report")
        .arg(&report)
        .env_remove("LAW_OVERLAY_CONFIG")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(v["failed"], 0);
    assert!(v["total"].as_u64().unwrap() >= 29);
    assert!(v["results"][0]["linesCount"].as_u64().unwrap() >= 2);
}

#[test]
fn validate_exits_one_on_flat_bars() {
    let dir = tempfile::tempdir().unwrap();
    // zero range: no golden-zone band, so every law misses its box
    let csv = dir.path().join("flat.csv");
    std::fs::write(
        &csv,
        "Date,Time,Open,High,Low,Close\n2024.01.02,00:00,5,5,5,5\n2024.01.02,01:00,5,5,5,5\n",
    )
    .unwrap();

    let out = Command::new(BIN)
        .args(["validate", "--csv"])
        .arg(&csv)
        .arg("--report")
        .arg(dir.path().join("r.json"))
        .env_remove("LAW_OVERLAY_CONFIG")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn mapping_subcommand_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("mapping.json");
    let status = Command::new(BIN)
        .args(["mapping", "--out"])
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());
    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(v["law_7"]["mode"], "direct");
}

#[test]
fn plan_subcommand_rejects_unknown_law() {
    let out = Command::new(BIN)
        .args(["plan", "--law", "law_999", "--csv"])
        .arg(sample_csv())
        .env_remove("LAW_OVERLAY_CONFIG")
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("law_999"));
}

#[test]
fn plan_subcommand_prints_merged_overlay() {
    let out = Command::new(BIN)
        .args(["plan", "--law", "law_2", "--law", "law_3", "--csv"])
        .arg(sample_csv())
        .env_remove("LAW_OVERLAY_CONFIG")
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(v["laws"]["law_2"].is_object());
    assert!(!v["baseline"]["lines"].as_array().unwrap().is_empty());
}

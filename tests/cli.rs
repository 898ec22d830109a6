//! Runs the `cache_sim` binary against small traces.

use std::{fs, io::Write, process::Command};

use pretty_assertions::assert_eq;
use serde_json::Value;

fn write_trace(dir: &tempfile::TempDir, addrs: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("trace.txt");
    let mut file = fs::File::create(&path).unwrap();
    for addr in addrs {
        writeln!(file, "{}", addr).unwrap();
    }
    path
}

fn sim() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cache_sim"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn compares_caches_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, &["0", "16", "0x20", "0", "48"]);
    let out = dir.path().join("stats.json");
    let config = r#"{"caches": [
        {"name": "two-way", "cache_size": 64, "block_size": 16, "associativity": 2, "policy": "LRU"},
        {"name": "direct", "cacheSize": 32, "blockSize": 16, "associativity": 1, "replacementPolicy": "FIFO"}
    ]}"#;

    let status = sim()
        .arg("--config")
        .arg(config)
        .arg("-t")
        .arg(&trace)
        .arg("--json")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let reports: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0]["name"], "two-way");
    assert_eq!(reports[0]["policy"], "LRU");
    assert_eq!(reports[0]["hits"], 1);
    assert_eq!(reports[0]["misses"], 4);
    assert_eq!(reports[0]["geometry"]["n_sets"], 2);

    // Direct mapped with two sets: 0 and 32 keep evicting each other
    assert_eq!(reports[1]["name"], "direct");
    assert_eq!(reports[1]["hits"], 0);
    assert_eq!(reports[1]["misses"], 5);
    assert_eq!(reports[1]["evictions"], 3);
}

#[test]
fn warmup_clears_stats() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, &["0", "64", "0", "64", "0"]);

    let output = sim()
        .args(["--cache-size", "128", "--block-size", "64", "--assoc", "2"])
        .args(["-w", "2", "-t"])
        .arg(&trace)
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["accesses"], 3);
    assert_eq!(reports[0]["hits"], 3);
    assert_eq!(reports[0]["hit_rate"], 1.0);
}

#[test]
fn warmup_spanning_whole_trace_leaves_nothing_measured() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, &["0", "64"]);

    let output = sim()
        .args(["--cache-size", "128", "--block-size", "64"])
        .args(["-w", "2", "-t"])
        .arg(&trace)
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["accesses"], 0);
    assert_eq!(reports[0]["misses"], 0);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("before the"), "unexpected warning: {}", stderr);
}

#[test]
fn warmup_then_limit() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, &["0", "64", "0", "128", "0", "64"]);

    let output = sim()
        .args(["--cache-size", "256", "--block-size", "64"])
        .args(["-w", "2", "-n", "2", "-t"])
        .arg(&trace)
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["accesses"], 2);
    assert_eq!(reports[0]["hits"], 1);
    assert_eq!(reports[0]["misses"], 1);
}

#[test]
fn access_limit_stops_early() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, &["0", "64", "128", "192", "256"]);

    let output = sim()
        .args(["--cache-size", "256", "--block-size", "64", "--policy", "fifo"])
        .args(["-n", "3", "-t"])
        .arg(&trace)
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["accesses"], 3);
    assert_eq!(reports[0]["policy"], "FIFO");
}

#[test]
fn bad_trace_line_fails() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, &["0", "-8"]);

    let status = sim()
        .args(["--cache-size", "64", "--block-size", "16", "-t"])
        .arg(&trace)
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn bad_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let trace = write_trace(&dir, &["0"]);

    for (size, block, policy) in [("64", "17", "LRU"), ("64", "16", "MRU")] {
        let status = sim()
            .args(["--cache-size", size, "--block-size", block, "--policy", policy])
            .arg("-t")
            .arg(&trace)
            .status()
            .unwrap();
        assert!(!status.success());
    }
}

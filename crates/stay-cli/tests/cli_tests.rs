//! Integration tests for the `stay` CLI binary.
//!
//! These use `assert_cmd` and `predicates` to run the gaps, check and
//! occupancy subcommands against a JSON snapshot fixture, via both `-i` and
//! stdin.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn snapshot_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/snapshot.json")
}

fn invalid_status_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid_status.json")
}

fn snapshot_json() -> String {
    std::fs::read_to_string(snapshot_path()).expect("snapshot.json fixture must exist")
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let output = Command::cargo_bin("stay")
        .unwrap()
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "stay {:?} failed", args);
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// gaps
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn gaps_from_file() {
    let json = run_json(&[
        "gaps",
        "-i",
        snapshot_path(),
        "--from",
        "2025-01-01",
        "--to",
        "2025-01-31",
    ]);

    let gaps = json["gaps"].as_array().unwrap();
    assert_eq!(gaps.len(), 3);
    assert_eq!(gaps[0]["start"], "2025-01-01T15:00:00Z");
    assert_eq!(gaps[0]["end"], "2025-01-10T15:00:00Z");
    assert_eq!(gaps[0]["nights"], 9);
    assert_eq!(gaps[1]["nights"], 5);
    assert_eq!(gaps[2]["nights"], 6);
    assert_eq!(json["total_nights"], 20);
}

#[test]
fn gaps_from_stdin() {
    Command::cargo_bin("stay")
        .unwrap()
        .args(["gaps", "--from", "2025-01-01", "--to", "2025-01-31"])
        .write_stdin(snapshot_json())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gaps\""));
}

#[test]
fn gaps_buffer_override_and_min_nights() {
    let json = run_json(&[
        "gaps",
        "-i",
        snapshot_path(),
        "--from",
        "2025-01-01",
        "--to",
        "2025-01-31",
        "--buffer-days",
        "2",
        "--min-nights",
        "2",
    ]);

    let gaps = json["gaps"].as_array().unwrap();
    assert_eq!(gaps.len(), 2);
    assert_eq!(gaps[0]["end"], "2025-01-08T15:00:00Z");
    assert_eq!(gaps[1]["start"], "2025-01-27T15:00:00Z");
}

#[test]
fn gaps_display_adds_readable_range() {
    Command::cargo_bin("stay")
        .unwrap()
        .args([
            "gaps",
            "-i",
            snapshot_path(),
            "--from",
            "2025-01-01",
            "--to",
            "2025-01-31",
            "--display",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 Jan 2025 - 10 Jan 2025"));
}

#[test]
fn gaps_inverted_window_fails() {
    Command::cargo_bin("stay")
        .unwrap()
        .args([
            "gaps",
            "-i",
            snapshot_path(),
            "--from",
            "2025-01-31",
            "--to",
            "2025-01-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid range"));
}

#[test]
fn gaps_malformed_date_fails() {
    Command::cargo_bin("stay")
        .unwrap()
        .args([
            "gaps",
            "-i",
            snapshot_path(),
            "--from",
            "01/01/2025",
            "--to",
            "2025-01-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --from"));
}

// ─────────────────────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn check_rejects_oversell() {
    let json = run_json(&[
        "check",
        "-i",
        snapshot_path(),
        "--start",
        "2025-01-05",
        "--end",
        "2025-01-12",
        "--bedrooms",
        "2",
    ]);

    assert_eq!(json["admitted"], false);
    assert_eq!(json["bedrooms_in_use_at_peak"], 5);
    assert_eq!(json["available_bedrooms"], 1);
    assert_eq!(json["reason"]["kind"], "exceeded");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("capacity exceeded"));
}

#[test]
fn check_admits_between_stays() {
    let json = run_json(&[
        "check",
        "-i",
        snapshot_path(),
        "--start",
        "2025-01-15",
        "--end",
        "2025-01-20",
        "--bedrooms",
        "4",
    ]);

    assert_eq!(json["admitted"], true);
    assert_eq!(json["overlapping_bookings"], 0);
    assert_eq!(
        json["message"],
        "4 bedroom(s) available for 15 Jan 2025 - 20 Jan 2025"
    );
}

#[test]
fn check_max_bedrooms_override() {
    let json = run_json(&[
        "check",
        "-i",
        snapshot_path(),
        "--start",
        "2025-01-05",
        "--end",
        "2025-01-12",
        "--bedrooms",
        "2",
        "--max-bedrooms",
        "6",
    ]);

    assert_eq!(json["admitted"], true);
}

#[test]
fn check_zero_bedrooms_fails() {
    Command::cargo_bin("stay")
        .unwrap()
        .args([
            "check",
            "-i",
            snapshot_path(),
            "--start",
            "2025-01-05",
            "--end",
            "2025-01-08",
            "--bedrooms",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid candidate stay"));
}

// ─────────────────────────────────────────────────────────────────────────────
// occupancy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn occupancy_at_date() {
    let json = run_json(&["occupancy", "-i", snapshot_path(), "--at", "2025-01-12"]);

    assert_eq!(json["bedrooms_in_use"], 3);
    assert_eq!(json["available_bedrooms"], 1);
    assert_eq!(json["active_bookings"], 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors and output
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unknown_status_fails() {
    Command::cargo_bin("stay")
        .unwrap()
        .args([
            "occupancy",
            "-i",
            invalid_status_path(),
            "--at",
            "2025-01-12",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown booking status: WAITLISTED"));
}

#[test]
fn missing_input_file_fails() {
    Command::cargo_bin("stay")
        .unwrap()
        .args(["occupancy", "-i", "/nonexistent/snapshot.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn unknown_timezone_fails() {
    Command::cargo_bin("stay")
        .unwrap()
        .args([
            "occupancy",
            "-i",
            snapshot_path(),
            "--timezone",
            "Mars/Olympus",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid house settings"));
}

#[test]
fn output_file_written() {
    let dir = std::env::temp_dir().join(format!("stay-cli-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let out = dir.join("gaps.json");

    Command::cargo_bin("stay")
        .unwrap()
        .args([
            "gaps",
            "-i",
            snapshot_path(),
            "--from",
            "2025-01-01",
            "--to",
            "2025-01-31",
            "--pretty",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["gaps"].as_array().unwrap().len(), 3);
    std::fs::remove_dir_all(&dir).ok();
}

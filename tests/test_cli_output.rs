//! End-to-end CLI runs that never reach the real provider

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::net::TcpListener;
use tempfile::TempDir;

fn gatewatch(temp: &TempDir) -> Command {
    let config_path = temp.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    let mut cmd = Command::cargo_bin("gatewatch").unwrap();
    cmd.env_remove("GATEWATCH_SERVICE_KEY")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_path);
    cmd
}

/// Base URL on a local port with nothing listening
fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[test]
fn test_links_print_one_url_per_family() {
    let temp = TempDir::new().unwrap();
    gatewatch(&temp)
        .args(["--key", "abc%2Bdef", "--links"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[odp]"))
        .stdout(predicate::str::contains("[standard]"))
        .stdout(predicate::str::contains("[dsodp]"))
        .stdout(predicate::str::contains("serviceKey=abc%2Bdef&type=json&terminalId=P01&numOfRows=5&pageNo=1"));
}

#[test]
fn test_links_with_raw_key() {
    let temp = TempDir::new().unwrap();
    gatewatch(&temp)
        .args(["--key", "abc+def", "--raw-key", "--links", "--family", "standard"])
        .assert()
        .success()
        .stdout(predicate::str::contains("getPassengerDepartures?serviceKey=abc+def&"))
        .stdout(predicate::str::contains("[odp]").not());
}

#[test]
fn test_key_from_environment() {
    let temp = TempDir::new().unwrap();
    gatewatch(&temp)
        .env("GATEWATCH_SERVICE_KEY", "envkey")
        .args(["--links", "--family", "odp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("serviceKey=envkey&"));
}

#[test]
fn test_unreachable_provider_reports_diagnostics_json() {
    let temp = TempDir::new().unwrap();
    let output = gatewatch(&temp)
        .args(["--key", "abc", "--family", "odp", "-t", "T1", "--timeout", "2", "--json"])
        .arg("--base-url")
        .arg(dead_base_url())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 0);
    assert_eq!(json["diagnostics"].as_array().unwrap().len(), 1);
    assert_eq!(json["diagnostics"][0]["kind"], "transport");
    assert_eq!(json["diagnostics"][0]["terminal"], "T1");
    assert_eq!(json["summary"]["calls"], 1);
}

#[test]
fn test_unreachable_provider_human_output() {
    let temp = TempDir::new().unwrap();
    gatewatch(&temp)
        .args(["--key", "abc", "--family", "odp", "-t", "T2", "--timeout", "2"])
        .arg("--base-url")
        .arg(dead_base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("No flights found."))
        .stdout(predicate::str::contains("Diagnostics:"))
        .stdout(predicate::str::contains("[odp] T2 departure: transport error"));
}

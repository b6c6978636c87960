//! Runs the `fcn` binary on networks and configuration files written to disk

use fcn_network::blueprints;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn fcn(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fcn"))
        .args(args)
        .output()
        .expect("failed to run fcn")
}

#[test]
fn test_exact_on_network_file() {
    let dir = TempDir::new().unwrap();
    let network = dir.path().join("maj.json");
    fs::write(&network, blueprints::maj1_network().to_json().unwrap()).unwrap();

    let output = fcn(&["exact", "--network", network.to_str().unwrap(), "--scheme", "RES"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[i] num. gates  = 1"), "{}", stdout);
    assert!(stdout.contains("[i] DRVs        = 0"), "{}", stdout);
    assert!(stdout.contains("[i] throughput    = 1/1"), "{}", stdout);
    assert!(stdout.contains("equivalent to 'maj'"), "{}", stdout);
}

#[test]
fn test_exact_with_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("flow.toml");
    fs::write(
        &config,
        r#"
        [exact]
        scheme = "USE"
        border_io = true

        [drv]
        acyclic_data_flow = true
        "#,
    )
    .unwrap();

    let output = fcn(&[
        "exact",
        "--benchmark",
        "and_or",
        "--config",
        config.to_str().unwrap(),
        "--clock-numbers",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[i] DRVs        = 0"), "{}", stdout);
}

#[test]
fn test_impossible_request_fails() {
    let output = fcn(&["exact", "--benchmark", "maj1", "--scheme", "2DDWave"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Physical design failed"), "{}", stderr);

    let output = fcn(&["exact", "--benchmark", "half_adder", "--timeout", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_listings() {
    let output = fcn(&["schemes"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["2DDWave", "USE", "RES", "Open"] {
        assert!(stdout.contains(name), "{} missing from\n{}", name, stdout);
    }

    let output = fcn(&["benchmarks"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), blueprints::BENCHMARKS.len());
}

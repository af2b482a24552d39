//! Integration tests for the `nimbra` CLI binary.
//!
//! Reservation workflow steps that never reach the element run against a
//! temp store. Interface selection and circuit listing run against a
//! wiremock gateway.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Unreachable gateway; only used by commands that never send anything.
const OFFLINE_GATEWAY: &str = "http://127.0.0.1:9";

/// Build a [`Command`] for the `nimbra` binary with env isolation.
///
/// Clears all `NIMBRA_*` env vars and points the config file into `dir`
/// so tests never touch the user's real configuration.
fn nimbra_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nimbra");
    cmd.env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("XDG_DATA_HOME", dir)
        .env("NIMBRA_CONFIG", dir.join("config.toml"))
        .env_remove("NIMBRA_PROFILE")
        .env_remove("NIMBRA_GATEWAY")
        .env_remove("NIMBRA_ELEMENT")
        .env_remove("NIMBRA_TOKEN")
        .env_remove("NIMBRA_STORE")
        .env_remove("NIMBRA_OUTPUT")
        .env_remove("NIMBRA_INSECURE")
        .env_remove("NIMBRA_TIMEOUT")
        .env_remove("NIMBRA_LOG");
    cmd
}

/// `nimbra` with an offline gateway and a store inside `dir`.
fn offline_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = nimbra_cmd(dir);
    cmd.args(["--gateway", OFFLINE_GATEWAY, "--color", "never", "--store"])
        .arg(dir.join("reservations.json"));
    cmd
}

/// `nimbra` against a mock gateway, with a store inside `dir`.
fn gateway_cmd(dir: &Path, uri: &str) -> assert_cmd::Command {
    let mut cmd = nimbra_cmd(dir);
    cmd.args(["--gateway", uri, "--element", "vision", "--color", "never"])
        .arg("--store")
        .arg(dir.join("reservations.json"));
    cmd
}

fn table(rows: &Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": rows }))
}

fn ets_row(id: &str, node: &str, circuit_name: &str) -> Value {
    let mut row = vec![json!(""); 24];
    row[0] = json!(id);
    row[21] = json!(node);
    row[23] = json!(circuit_name);
    Value::Array(row)
}

/// Gateway whose catalog holds codec ports on nodeA/nodeB and two
/// Ethernet ports, with no live circuits.
async fn catalog_gateway() -> MockServer {
    let server = MockServer::start().await;
    let tables = [
        (
            1600,
            json!([
                ["nodeA_x-2", "nodeA", "j2kEnc,jxse"],
                ["nodeB_x-5", "nodeB", "j2kDec,jxsd"]
            ]),
        ),
        (1800, json!([])),
        (
            1900,
            json!([
                ets_row("nodeA_eth1", "nodeA", "1_nodeA"),
                ets_row("nodeB_eth2", "nodeB", "2_nodeB")
            ]),
        ),
        (2200, json!([])),
    ];
    for (pid, rows) in tables {
        Mock::given(method("GET"))
            .and(path(format!("/api/elements/vision/tables/{pid}")))
            .respond_with(table(&rows))
            .mount(&server)
            .await;
    }
    server
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Create a draft and return its id.
fn create_draft(dir: &Path, circuit_type: &str, start: &str, end: &str) -> String {
    let output = offline_cmd(dir)
        .args(["-o", "json", "reservations", "create", "--type", circuit_type])
        .args(["--start", start, "--end", end])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    json_stdout(&output)["id"].as_str().unwrap().to_owned()
}

fn show(dir: &Path, id: &str) -> Value {
    let output = offline_cmd(dir)
        .args(["-o", "json", "reservations", "show", id])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    json_stdout(&output)
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = nimbra_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    nimbra_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Nimbra Vision")
            .and(predicate::str::contains("reservations"))
            .and(predicate::str::contains("circuits"))
            .and(predicate::str::contains("interfaces")),
    );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    nimbra_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nimbra"));
}

#[test]
fn test_completions_zsh() {
    let dir = tempfile::tempdir().unwrap();
    nimbra_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let dir = tempfile::tempdir().unwrap();
    nimbra_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_env() {
    let dir = tempfile::tempdir().unwrap();
    nimbra_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_reads_profile() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        r#"
default_profile = "lab"

[profiles.lab]
gateway = "https://gateway.lab.example"
element = "Vision Lab"
insecure = true
retry_attempts = 5
"#,
    )
    .unwrap();

    let output = nimbra_cmd(dir.path())
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let view = json_stdout(&output);
    assert_eq!(view["profile"], "lab");
    assert_eq!(view["element"], "Vision Lab");
    assert_eq!(view["tls"], "insecure");
    assert_eq!(view["retry_attempts"], 5);
    assert_eq!(view["retry_interval_secs"], 1);
}

#[test]
fn test_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    let output = nimbra_cmd(dir.path())
        .args(["--profile", "missing", "circuits", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("missing"));
}

#[test]
fn test_no_gateway_configured() {
    let dir = tempfile::tempdir().unwrap();
    let output = nimbra_cmd(dir.path())
        .args(["circuits", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("No gateway configured"));
}

// ── Offline helpers ─────────────────────────────────────────────────

#[test]
fn test_translate_interface_ids() {
    let dir = tempfile::tempdir().unwrap();
    nimbra_cmd(dir.path())
        .args(["interfaces", "translate", "ets", "nodeA_eth3"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3_nodeA\n"));

    let output = nimbra_cmd(dir.path())
        .args(["interfaces", "translate", "ets", "nodeA-eth1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_malformed_reservation_id() {
    let dir = tempfile::tempdir().unwrap();
    let output = offline_cmd(dir.path())
        .args(["reservations", "show", "not-a-uuid"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Reservation workflow against a temp store ───────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_draft_select_reject() {
    let server = catalog_gateway().await;
    let uri = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let id = create_draft(dir.path(), "j2k", "2099-01-01T10:00:00Z", "2099-01-01T12:00:00Z");
    assert_eq!(show(dir.path(), &id)["status"], "draft");

    gateway_cmd(dir.path(), &uri)
        .args(["reservations", "select", &id])
        .args(["--source", "nodeA_x-2", "--destination", "nodeB_x-5"])
        .args(["--source-node", "nodeA", "--destination-node", "nodeB"])
        .assert()
        .success();
    let waiting = show(dir.path(), &id);
    assert_eq!(waiting["status"], "waiting-for-approval");
    assert_eq!(waiting["source_interface"], "nodeA_x-2");

    offline_cmd(dir.path())
        .args(["reservations", "reject", &id])
        .assert()
        .success();
    assert_eq!(show(dir.path(), &id)["status"], "rejected");

    offline_cmd(dir.path())
        .args(["-o", "plain", "reservations", "list", "--status", "rejected"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_selection_outside_catalog_is_refused() {
    let server = catalog_gateway().await;
    let uri = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let id = create_draft(dir.path(), "j2k", "2099-01-01T10:00:00Z", "2099-01-01T12:00:00Z");

    // nodeB_x-5 only decodes.
    let output = gateway_cmd(dir.path(), &uri)
        .args(["reservations", "select", &id])
        .args(["--source", "nodeB_x-5", "--destination", "nodeA_x-2"])
        .args(["--source-node", "nodeB", "--destination-node", "nodeA"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("nodeB_x-5"));
    assert_eq!(show(dir.path(), &id)["status"], "draft");
}

#[test]
fn test_same_node_selection_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_draft(dir.path(), "j2k", "2099-01-01T10:00:00Z", "2099-01-01T12:00:00Z");

    let output = offline_cmd(dir.path())
        .args(["reservations", "select", &id])
        .args(["--source", "nodeA_x-2", "--destination", "nodeA_x-5"])
        .args(["--source-node", "nodeA", "--destination-node", "nodeA"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(show(dir.path(), &id)["status"], "draft");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_approval_rejects_without_request() {
    let server = catalog_gateway().await;
    let uri = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let id = create_draft(dir.path(), "e-line", "2020-01-01T10:00:00Z", "2020-01-01T12:00:00Z");

    gateway_cmd(dir.path(), &uri)
        .args(["reservations", "action", &id, r#"["Select Interfaces"]"#])
        .args(["--source", "nodeA_eth1", "--destination", "nodeB_eth2"])
        .args(["--source-node", "nodeA", "--destination-node", "nodeB"])
        .assert()
        .success();

    let output = offline_cmd(dir.path())
        .args(["reservations", "approve", &id])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert_eq!(show(dir.path(), &id)["status"], "rejected");
}

#[test]
fn test_get_and_set_field() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_draft(dir.path(), "jxs", "2099-01-01T10:00:00Z", "2099-01-01T12:00:00Z");

    offline_cmd(dir.path())
        .args(["reservations", "set-field", &id, "Circuit Notes", "studio feed"])
        .assert()
        .success();
    offline_cmd(dir.path())
        .args(["reservations", "get-field", &id, "Circuit Notes"])
        .assert()
        .success()
        .stdout(predicate::str::diff("studio feed\n"));
}

// ── Gateway-backed ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_circuits_list_from_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/elements/vision/tables/1800"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                ["1", "shared-1", "j2k", "", "", "", "", "", "3_nodeA", "7_nodeB", "50", "vaJ2k", "", ""]
            ]
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        nimbra_cmd(dir.path())
            .args(["--gateway", &uri, "--element", "vision", "-o", "json"])
            .args(["circuits", "list"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let circuits = json_stdout(&output);
    assert_eq!(circuits[0]["key"], "1");
    assert_eq!(circuits[0]["shared_id"], "shared-1");
    assert_eq!(circuits[0]["source"], "3_nodeA");
}

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

// ff 01 | 1e 05 "hello" | 20-byte signature
const SIGNED_HELLO: &str = "/wEeBWhlbGxvAAECAwQFBgcICQoLDA0ODxAREhM=";
// ff 01 | 02 05, no signature
const UNSIGNED_FIVE: &str = "/wECBQ==";

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("viewstate"))
}

fn repo_root() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|p| p.parent())
        .expect("repo root")
        .to_path_buf()
}

fn sample_payload() -> std::path::PathBuf {
    repo_root()
        .join("tests")
        .join("golden")
        .join("page_sha256")
        .join("input.txt")
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_supports_decode_and_parse() {
    cmd().arg("decode").arg("--help").assert().success();
    cmd().arg("parse").arg("--help").assert().success();
}

#[test]
fn inline_text_outputs_json() {
    let assert = cmd()
        .arg("decode")
        .arg("--text")
        .arg(SIGNED_HELLO)
        .arg("--stdout")
        .assert()
        .success();
    let report = stdout_json(&assert);
    assert_eq!(report["signature"]["algorithm"], "hmac_sha1");
    assert_eq!(report["signature"]["length"], 20);
    assert_eq!(report["value"]["type"], "text");
    assert_eq!(report["value"]["value"], "hello");
}

#[test]
fn file_input_writes_report() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("decode")
        .arg(sample_payload())
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written").and(contains("hmac_sha256")));

    let json = std::fs::read_to_string(&report).expect("report written");
    let value: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["report_version"], 1);
    assert_eq!(value["value"]["type"], "pair");
}

#[test]
fn stdin_input_is_read_when_no_file_given() {
    let assert = cmd()
        .arg("decode")
        .arg("--stdout")
        .write_stdin(format!("{UNSIGNED_FIVE}\n"))
        .assert()
        .success();
    let report = stdout_json(&assert);
    assert_eq!(report["input"]["path"], "-");
    assert_eq!(report["value"]["value"], 5);
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.txt");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn invalid_base64_fails_with_hint() {
    cmd()
        .arg("decode")
        .arg("--text")
        .arg("%2FwECBQ%3D%3D")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("invalid base64").and(contains("hint:")));
}

#[test]
fn bad_preamble_fails() {
    // 01 ff 67 00
    cmd()
        .arg("decode")
        .arg("--text")
        .arg("Af9nAA==")
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("bad preamble"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg("--text")
        .arg(UNSIGNED_FIVE)
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    cmd()
        .arg("decode")
        .arg("--text")
        .arg(UNSIGNED_FIVE)
        .arg("--stdout")
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let report = temp.path().join("report.json");

    cmd()
        .arg("decode")
        .arg(sample_payload())
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicates::str::contains("OK:").not());
}

#[test]
fn strict_fails_when_signature_unrecognized() {
    cmd()
        .arg("decode")
        .arg("--text")
        .arg(UNSIGNED_FIVE)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("signature not recognized"));
}

#[test]
fn strict_passes_for_hmac_sha1() {
    cmd()
        .arg("decode")
        .arg("--text")
        .arg(SIGNED_HELLO)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();
}

#[test]
fn depth_limit_flag_is_applied() {
    cmd()
        .arg("decode")
        .arg(sample_payload())
        .arg("--stdout")
        .arg("--max-depth")
        .arg("2")
        .assert()
        .failure()
        .stderr(contains("depth limit").and(contains("--max-depth")));
}

#[test]
fn glob_matching_several_files_is_rejected() {
    let pattern = repo_root().join("tests").join("golden").join("*").join("input.txt");

    cmd()
        .arg("decode")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("multiple files match pattern"));
}

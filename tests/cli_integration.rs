// CLI integration tests for get/transcode flows and exit codes.
use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_keycodec");
    Command::new(exe)
}

fn run_with_stdin(args: &[&str], input: &[u8]) -> Output {
    let mut child = cmd()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input)
        .expect("write stdin");
    child.wait_with_output().expect("output")
}

fn parse_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("valid json")
}

fn error_kind(output: &Output) -> String {
    let err = parse_json(&output.stderr);
    err["error"]["kind"].as_str().expect("kind").to_string()
}

#[test]
fn get_lossy_ints_drops_bad_elements() {
    let output = run_with_stdin(
        &["get", "numbers", "--as", "int", "--lossy"],
        br#"{"numbers": [1, 2, "3", 4]}"#,
    );
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout), serde_json::json!([1, 2, 4]));
}

#[test]
fn get_nested_key_path() {
    let output = run_with_stdin(
        &["get", "user", "address", "zip", "--as", "string"],
        br#"{"user": {"address": {"zip": "02139"}}}"#,
    );
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout), Value::from("02139"));
}

#[test]
fn missing_key_exit_code_and_if_present() {
    let doc = br#"{"present": 1}"#;

    let output = run_with_stdin(&["get", "absent"], doc);
    assert_eq!(output.status.code().unwrap(), 3);
    let err = parse_json(&output.stderr);
    assert_eq!(err["error"]["kind"], "KeyNotFound");
    assert_eq!(err["error"]["key"], "absent");

    let output = run_with_stdin(&["get", "absent", "--if-present"], doc);
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout), Value::Null);
}

#[test]
fn type_mismatch_exit_code() {
    let output = run_with_stdin(&["get", "string", "--as", "string"], br#"{"string": 123}"#);
    assert_eq!(output.status.code().unwrap(), 4);
    assert_eq!(error_kind(&output), "TypeMismatch");
}

#[test]
fn date_pattern_parses_or_reports_corruption() {
    let doc = br#"{"born": "1990-07-04", "key": "notADate"}"#;

    let pattern = "[year]-[month]-[day]";
    let output = run_with_stdin(&["get", "born", "--date-pattern", pattern], doc);
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout), Value::from("1990-07-04T00:00:00Z"));

    let output = run_with_stdin(&["get", "key", "--date-pattern", pattern], doc);
    assert_eq!(output.status.code().unwrap(), 5);
    assert_eq!(error_kind(&output), "DataCorrupted");
}

#[test]
fn transcode_json_cbor_json_round_trip() {
    let doc = br#"{"name":"ada","tags":["x","y"],"n":3}"#;

    let to_cbor = run_with_stdin(&["transcode", "--to", "cbor"], doc);
    assert!(to_cbor.status.success());
    assert_ne!(to_cbor.stdout, doc.to_vec());

    let back = run_with_stdin(
        &["transcode", "--from", "cbor", "--to", "json"],
        &to_cbor.stdout,
    );
    assert!(back.status.success());
    let text = String::from_utf8(back.stdout).expect("utf8");
    assert_eq!(text.trim_end(), std::str::from_utf8(doc).expect("utf8"));
    assert!(text.ends_with('\n'));
}

#[test]
fn get_reads_input_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("doc.json");
    std::fs::write(&path, br#"{"a":[1,2]}"#).expect("write");

    let output = cmd()
        .args(["get", "a", "--input", path.to_str().unwrap()])
        .output()
        .expect("get");
    assert!(output.status.success());
    assert_eq!(parse_json(&output.stdout), serde_json::json!([1, 2]));
}

#[test]
fn malformed_input_is_decode_error() {
    let output = run_with_stdin(&["get", "a"], b"{\"a\":");
    assert_eq!(output.status.code().unwrap(), 8);
    assert_eq!(error_kind(&output), "Decode");
}

#[test]
fn usage_exit_code() {
    let output = cmd()
        .args(["transcode", "--to", "yaml"])
        .stdin(Stdio::null())
        .output()
        .expect("transcode");
    assert_eq!(output.status.code().unwrap(), 2);
}

#[test]
fn cbor_input_outside_json_model_is_type_mismatch() {
    // {"b": h'0102'}
    let doc = [0xa1, 0x61, b'b', 0x42, 0x01, 0x02];
    let output = run_with_stdin(&["transcode", "--from", "cbor"], &doc);
    assert_eq!(output.status.code().unwrap(), 4);
    assert_eq!(error_kind(&output), "TypeMismatch");

    let help = cmd()
        .args(["transcode", "--help"])
        .output()
        .expect("help");
    assert!(help.status.success());
    let text = String::from_utf8(help.stdout).expect("utf8");
    assert!(text.contains("CBOR input must be JSON-representable"));
}

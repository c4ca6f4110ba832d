// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! End-to-end `getvar` runs against the in-memory server.

mod common;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use uavar_opcua::OpcUaValue;

use common::{run_getvar, run_getvar_to, BrokenPipe, MockServer};

const URL: &str = "opc.tcp://localhost:4840";

fn out_file(dir: &TempDir) -> PathBuf {
    dir.path().join("getvar.out")
}

fn file_text(path: &PathBuf) -> String {
    String::from_utf8(fs::read(path).unwrap()).unwrap()
}

// =============================================================================
// Success
// =============================================================================

#[tokio::test]
async fn test_read_int32() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new().with_value(1, "the.answer", OpcUaValue::Int32(42));

    let outcome = run_getvar(
        &server,
        &["-o", out.to_str().unwrap(), URL, "1", "the.answer", "INT32"],
    )
    .await;

    assert_eq!(outcome.code, 0, "stderr: {}", outcome.stderr());
    assert_eq!(
        outcome.stdout(),
        "Reading the value of node (1, the.answer)...\nThe value is 42.\n"
    );
    assert_eq!(file_text(&out), "42\n");
    assert_eq!(server.connects(), 1);
    assert_eq!(server.disconnects(), 1);
}

#[tokio::test]
async fn test_read_uint_kinds_use_unsigned_value() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new()
        .with_value(2, "u16", OpcUaValue::UInt16(65535))
        .with_value(2, "u32", OpcUaValue::UInt32(4_000_000_000));

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "2", "u16", "UINT16"]).await;
    assert_eq!(outcome.code, 0);
    assert_eq!(file_text(&out), "65535\n");

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "2", "u32", "UINT32"]).await;
    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout().ends_with("The value is 4000000000.\n"));
    assert_eq!(file_text(&out), "4000000000\n");
}

#[tokio::test]
async fn test_read_bool_float_and_string() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new()
        .with_value(1, "flag", OpcUaValue::Boolean(true))
        .with_value(1, "level", OpcUaValue::Float(2.5))
        .with_value(1, "name", OpcUaValue::String(b"silo 3".to_vec()));

    let path = out.to_str().unwrap();
    assert_eq!(run_getvar(&server, &["-o", path, URL, "1", "flag", "BOOL"]).await.code, 0);
    assert_eq!(file_text(&out), "1\n");

    assert_eq!(run_getvar(&server, &["-o", path, URL, "1", "level", "FLOAT"]).await.code, 0);
    assert_eq!(file_text(&out), "2.500000\n");

    let outcome = run_getvar(&server, &["-o", path, URL, "1", "name", "STRING"]).await;
    assert_eq!(outcome.code, 0);
    assert!(outcome.stdout().ends_with("The value is silo 3.\n"));
    assert_eq!(file_text(&out), "silo 3\n");
}

#[tokio::test]
async fn test_output_file_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("uavar.toml");
    fs::write(&config, "[output]\nfile = \"from-config.out\"\n").unwrap();
    let server = MockServer::new().with_value(1, "n", OpcUaValue::Int16(-3));

    let outcome = run_getvar(&server, &["-c", config.to_str().unwrap(), URL, "1", "n", "INT16"]).await;

    assert_eq!(outcome.code, 0);
    assert_eq!(file_text(&dir.path().join("from-config.out")), "-3\n");
}

// =============================================================================
// No value
// =============================================================================

#[tokio::test]
async fn test_absent_node_writes_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new();

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "1", "missing", "INT32"]).await;

    assert_eq!(outcome.code, -6);
    assert!(outcome.stdout().ends_with("XXX-NO-VALUE\n"));
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
    assert_eq!(server.disconnects(), 1);
}

#[tokio::test]
async fn test_type_mismatch_reports_actual_type() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new().with_value(1, "n", OpcUaValue::Double(1.0));

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "1", "n", "INT32"]).await;

    assert_eq!(outcome.code, -6);
    assert_eq!(
        outcome.stdout(),
        "Reading the value of node (1, n)...\nActual type: Double.\nXXX-NO-VALUE\n"
    );
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
}

#[tokio::test]
async fn test_bad_status_is_no_value() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new()
        .with_value(1, "n", OpcUaValue::Int32(1))
        .reject_reads(0x801F_0000);

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "1", "n", "INT32"]).await;

    assert_eq!(outcome.code, -6);
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
}

// =============================================================================
// Usage and connection failures
// =============================================================================

#[tokio::test]
async fn test_wrong_operand_count() {
    let server = MockServer::new();

    let outcome = run_getvar(&server, &[URL, "1", "n"]).await;

    assert_eq!(outcome.code, -1);
    assert_eq!(
        outcome.stderr(),
        "getvar: wrong command line.\n\
         syntax: getvar <OPC-UA Server URL> <Name Space Index> <Node Id> <Type>\n"
    );
    assert_eq!(server.connects(), 0);
}

#[tokio::test]
async fn test_unopenable_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("no-such-dir").join("getvar.out");
    let server = MockServer::new();

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "1", "n", "INT32"]).await;

    assert_eq!(outcome.code, -2);
    assert!(outcome.stderr().starts_with("getvar: cannot open output file "));
    assert_eq!(server.connects(), 0);
}

#[tokio::test]
async fn test_bad_namespace_writes_sentinel_without_connecting() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new();

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "-2", "n", "INT32"]).await;

    assert_eq!(outcome.code, -4);
    assert_eq!(
        outcome.stderr(),
        "getvar: <Name Space Index> must be a positive integer and not -2.\n"
    );
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
    assert_eq!(server.connects(), 0);
}

#[tokio::test]
async fn test_unknown_type_writes_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new();

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "1", "n", "SBYTE"]).await;

    assert_eq!(outcome.code, -5);
    assert!(outcome.stderr().contains("<Type> can only be BOOL"));
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
    assert_eq!(server.connects(), 0);
}

#[tokio::test]
async fn test_connection_failure_writes_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new().refuse_connections();

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), URL, "1", "n", "INT32"]).await;

    assert_eq!(outcome.code, -3);
    assert_eq!(
        outcome.stderr(),
        format!("getvar: cannot connect to {}.\n", URL)
    );
    assert!(outcome.stdout().is_empty());
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
    assert_eq!(server.reads(), 0);
    assert_eq!(server.disconnects(), 0);
}

#[tokio::test]
async fn test_invalid_endpoint_is_connection_failure() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new();

    let outcome = run_getvar(&server, &["-o", out.to_str().unwrap(), "http://x", "1", "n", "INT32"]).await;

    assert_eq!(outcome.code, -3);
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
}

#[tokio::test]
async fn test_stdout_failure_writes_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let out = out_file(&dir);
    let server = MockServer::new().with_value(1, "the.answer", OpcUaValue::Int32(42));

    let code = run_getvar_to(
        &server,
        &["-o", out.to_str().unwrap(), URL, "1", "the.answer", "INT32"],
        &mut BrokenPipe,
    )
    .await;

    assert_eq!(code, -2);
    assert_eq!(file_text(&out), "XXX-NO-VALUE\n");
    assert_eq!(server.disconnects(), server.connects());
}

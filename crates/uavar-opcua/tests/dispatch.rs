// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Read/write dispatch tests against an in-memory transport.
//!
//! No server is needed; `MockTransport` keeps node values in a map keyed by
//! the `ns=<n>;s=<id>` form and records how often each service was called.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use uavar_opcua::client::{
    read_node, write_node, OpcUaTransport, OpcUaValue, OperationResult, ReadResult,
    SessionState, TypedValue, WriteResult,
};
use uavar_opcua::{NodeId, OpcUaConfig, OpcUaError, OpcUaResult, ValueKind};

// =============================================================================
// Mock Transport
// =============================================================================

/// Mock OPC UA transport for testing without a real server.
struct MockTransport {
    connected: AtomicBool,
    values: RwLock<HashMap<String, OpcUaValue>>,
    read_status: RwLock<Option<u32>>,
    value_status: RwLock<Option<u32>>,
    write_status: RwLock<Option<u32>>,
    fail_reads: AtomicBool,
    reads: AtomicU32,
    writes: AtomicU32,
    config: OpcUaConfig,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            values: RwLock::new(HashMap::new()),
            read_status: RwLock::new(None),
            value_status: RwLock::new(None),
            write_status: RwLock::new(None),
            fail_reads: AtomicBool::new(false),
            reads: AtomicU32::new(0),
            writes: AtomicU32::new(0),
            config: OpcUaConfig::new("opc.tcp://localhost:4840"),
        }
    }

    fn with_value(self, node_id: &NodeId, value: OpcUaValue) -> Self {
        self.values.write().unwrap().insert(node_id.to_string(), value);
        self
    }

    fn value(&self, node_id: &NodeId) -> Option<OpcUaValue> {
        self.values.read().unwrap().get(&node_id.to_string()).cloned()
    }
}

#[async_trait]
impl OpcUaTransport for MockTransport {
    async fn connect(&mut self) -> OpcUaResult<()> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) -> OpcUaResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn state(&self) -> SessionState {
        if self.is_connected() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    async fn read_value(&self, node_id: &NodeId) -> OpcUaResult<ReadResult> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(OpcUaError::read_failed(node_id.to_string(), "BadCommunicationError"));
        }
        if let Some(status) = *self.read_status.read().unwrap() {
            return Ok(ReadResult::bad(node_id.clone(), status));
        }
        match self.value(node_id) {
            Some(value) => {
                let mut result = ReadResult::good(node_id.clone(), value);
                if let Some(status) = *self.value_status.read().unwrap() {
                    result.status_code = status;
                }
                Ok(result)
            }
            None => Ok(ReadResult::bad(node_id.clone(), 0x8034_0000)),
        }
    }

    async fn write_value(&self, node_id: &NodeId, value: OpcUaValue) -> OpcUaResult<WriteResult> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.write_status.read().unwrap() {
            return Ok(WriteResult::rejected(node_id.clone(), status));
        }
        self.values.write().unwrap().insert(node_id.to_string(), value);
        Ok(WriteResult::accepted(node_id.clone()))
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

fn answer() -> NodeId {
    NodeId::new(1, "the.answer")
}

// =============================================================================
// Read
// =============================================================================

#[tokio::test]
async fn test_read_matching_int32() {
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::Int32(42));

    let result = read_node(&transport, &answer(), ValueKind::Int32).await;

    assert_eq!(result, OperationResult::Success(TypedValue::Int32(42)));
    assert_eq!(result.value().unwrap().to_string(), "42");
    assert_eq!(transport.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_read_unsigned_kinds_keep_their_value() {
    let node = NodeId::new(2, "counter");
    let transport = MockTransport::new().with_value(&node, OpcUaValue::UInt16(65535));
    let result = read_node(&transport, &node, ValueKind::UInt16).await;
    assert_eq!(result.value().unwrap().to_string(), "65535");

    let transport = MockTransport::new().with_value(&node, OpcUaValue::UInt32(u32::MAX));
    let result = read_node(&transport, &node, ValueKind::UInt32).await;
    assert_eq!(result.value().unwrap().to_string(), "4294967295");
}

#[tokio::test]
async fn test_read_string_is_byte_exact() {
    let payload = vec![b'a', 0xC3, 0xA9, b' ', b'z'];
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::String(payload.clone()));

    let result = read_node(&transport, &answer(), ValueKind::String).await;

    match result {
        OperationResult::Success(TypedValue::String(bytes)) => assert_eq!(bytes, payload),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_read_type_mismatch_reports_actual_type() {
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::Double(4.2));

    let result = read_node(&transport, &answer(), ValueKind::Int32).await;

    assert_eq!(
        result,
        OperationResult::TypeMismatch {
            actual: "Double".into()
        }
    );
}

#[tokio::test]
async fn test_read_array_of_requested_kind_is_no_value() {
    let transport = MockTransport::new().with_value(
        &answer(),
        OpcUaValue::Array {
            element_type: "Int32".into(),
            values: vec![OpcUaValue::Int32(1), OpcUaValue::Int32(2)],
        },
    );

    let result = read_node(&transport, &answer(), ValueKind::Int32).await;

    assert_eq!(result, OperationResult::NoValue);
}

#[tokio::test]
async fn test_read_absent_node_is_no_value() {
    let transport = MockTransport::new();
    assert_eq!(
        read_node(&transport, &answer(), ValueKind::Int32).await,
        OperationResult::NoValue
    );
}

#[tokio::test]
async fn test_read_uncertain_status_is_no_value() {
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::Int32(42));
    *transport.value_status.write().unwrap() = Some(0x4092_0000);

    let result = read_node(&transport, &answer(), ValueKind::Int32).await;

    assert_eq!(result, OperationResult::NoValue);
}

#[tokio::test]
async fn test_read_good_with_info_bits_is_value() {
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::Int32(42));
    *transport.value_status.write().unwrap() = Some(0x0000_0400);

    let result = read_node(&transport, &answer(), ValueKind::Int32).await;

    assert_eq!(result, OperationResult::Success(TypedValue::Int32(42)));
}

#[tokio::test]
async fn test_read_bad_status_is_no_value() {
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::Int32(1));
    *transport.read_status.write().unwrap() = Some(0x803A_0000);

    assert_eq!(
        read_node(&transport, &answer(), ValueKind::Int32).await,
        OperationResult::NoValue
    );
}

#[tokio::test]
async fn test_read_transport_error_is_no_value() {
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::Int32(1));
    transport.fail_reads.store(true, Ordering::SeqCst);

    assert_eq!(
        read_node(&transport, &answer(), ValueKind::Int32).await,
        OperationResult::NoValue
    );
}

#[tokio::test]
async fn test_read_null_is_no_value() {
    let transport = MockTransport::new().with_value(&answer(), OpcUaValue::Null);
    assert_eq!(
        read_node(&transport, &answer(), ValueKind::Boolean).await,
        OperationResult::NoValue
    );
}

// =============================================================================
// Write
// =============================================================================

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let transport = MockTransport::new();

    for (kind, literal) in [
        (ValueKind::Int32, "-17"),
        (ValueKind::Float, "2.5"),
        (ValueKind::Double, "0.125"),
        (ValueKind::String, "42"),
    ] {
        let value = kind.parse_literal(literal).unwrap();
        let written = write_node(&transport, &answer(), &value).await;
        assert_eq!(written, OperationResult::Success(value.clone()));

        let read = read_node(&transport, &answer(), kind).await;
        assert_eq!(read, OperationResult::Success(value));
    }
    assert_eq!(transport.writes.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_write_encodes_requested_kind() {
    let transport = MockTransport::new();
    let value = ValueKind::Byte.parse_literal("200").unwrap();

    write_node(&transport, &answer(), &value).await;

    assert_eq!(transport.value(&answer()), Some(OpcUaValue::Byte(200)));
}

#[tokio::test]
async fn test_write_rejected_is_attempted_once() {
    let transport = MockTransport::new();
    *transport.write_status.write().unwrap() = Some(0x803B_0000);

    let result = write_node(&transport, &answer(), &TypedValue::Boolean(true)).await;

    assert_eq!(
        result,
        OperationResult::WriteRejected {
            status: Some(0x803B_0000)
        }
    );
    assert_eq!(transport.writes.load(Ordering::SeqCst), 1);
    assert_eq!(transport.value(&answer()), None);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_connect_disconnect_state() {
    let mut transport = MockTransport::new();
    assert_eq!(transport.state(), SessionState::Closed);

    transport.connect().await.unwrap();
    assert!(transport.is_connected());

    transport.disconnect().await.unwrap();
    assert!(!transport.is_connected());
}

// =============================================================================
// Logging
// =============================================================================

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_reported_outcomes_log_below_warn() {
    let captured = Captured::default();
    let sink = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || sink.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let transport = MockTransport::new();
    assert_eq!(
        read_node(&transport, &answer(), ValueKind::Int32).await,
        OperationResult::NoValue
    );
    transport.fail_reads.store(true, Ordering::SeqCst);
    assert_eq!(
        read_node(&transport, &answer(), ValueKind::Int32).await,
        OperationResult::NoValue
    );
    *transport.write_status.write().unwrap() = Some(0x803B_0000);
    let written = write_node(&transport, &answer(), &TypedValue::Int32(1)).await;
    assert!(matches!(written, OperationResult::WriteRejected { .. }));

    assert!(captured.0.lock().unwrap().is_empty());
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The seam between the dispatcher and an OPC UA stack.
//!
//! [`read_node`](super::read_node) and [`write_node`](super::write_node) only
//! see [`OpcUaTransport`]. The `opcua`-backed implementation lives behind the
//! `real-transport` feature; tests plug in an in-memory one.

use std::fmt;

use async_trait::async_trait;

use crate::error::OpcUaResult;
use crate::types::{NodeId, ValueKind};

/// Status returned when the server answers without a usable result.
pub const STATUS_BAD: u32 = 0x8000_0000;

/// Both severity bits of an OPC UA status code are clear.
#[inline]
pub fn status_is_good(code: u32) -> bool {
    code & 0xC000_0000 == 0
}

// =============================================================================
// SessionState
// =============================================================================

/// Where a transport is in its single-session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No session.
    #[default]
    Closed,
    /// Discovery or activation in progress.
    Opening,
    /// Session active; service calls allowed.
    Open,
    /// The last `connect` failed.
    Lost,
}

impl SessionState {
    /// Service calls are allowed.
    #[inline]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Lost => "lost",
        })
    }
}

// =============================================================================
// Service results
// =============================================================================

/// What the server returned for one Value attribute read.
#[derive(Debug, Clone)]
pub struct ReadResult {
    /// Node that was read.
    pub node_id: NodeId,
    /// Payload; `None` when the server sent no value.
    pub value: Option<OpcUaValue>,
    /// OPC UA status code.
    pub status_code: u32,
}

impl ReadResult {
    /// Good read carrying `value`.
    pub fn good(node_id: NodeId, value: OpcUaValue) -> Self {
        Self {
            node_id,
            value: Some(value),
            status_code: 0,
        }
    }

    /// Read answered with `status_code` and no payload.
    pub fn bad(node_id: NodeId, status_code: u32) -> Self {
        Self {
            node_id,
            value: None,
            status_code,
        }
    }

    /// Status is Good.
    #[inline]
    pub fn is_good(&self) -> bool {
        status_is_good(self.status_code)
    }
}

/// Per-node status of one write.
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Node that was written.
    pub node_id: NodeId,
    /// OPC UA status code; zero when accepted.
    pub status_code: u32,
}

impl WriteResult {
    /// The server accepted the value.
    pub fn accepted(node_id: NodeId) -> Self {
        Self::rejected(node_id, 0)
    }

    /// The server answered with `status_code`.
    pub fn rejected(node_id: NodeId, status_code: u32) -> Self {
        Self {
            node_id,
            status_code,
        }
    }

    /// Status is Good.
    #[inline]
    pub fn is_good(&self) -> bool {
        status_is_good(self.status_code)
    }
}

// =============================================================================
// OpcUaValue
// =============================================================================

/// A variant as the server delivered it, reduced to what the tools handle.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OpcUaValue {
    /// Boolean.
    Boolean(bool),
    /// Signed byte.
    SByte(i8),
    /// Byte.
    Byte(u8),
    /// 16-bit signed.
    Int16(i16),
    /// 16-bit unsigned.
    UInt16(u16),
    /// 32-bit signed.
    Int32(i32),
    /// 32-bit unsigned.
    UInt32(u32),
    /// 64-bit signed.
    Int64(i64),
    /// 64-bit unsigned.
    UInt64(u64),
    /// Single precision.
    Float(f32),
    /// Double precision.
    Double(f64),
    /// Raw string bytes; not necessarily UTF-8.
    String(Vec<u8>),
    /// One-dimensional array.
    Array {
        /// OPC UA name of the element type.
        element_type: String,
        /// Elements in order.
        values: Vec<OpcUaValue>,
    },
    /// Any other built-in type, kept by name for diagnostics.
    Unsupported(String),
    /// Empty variant.
    #[default]
    Null,
}

impl OpcUaValue {
    /// Scalar kind, if the value is one of the twelve handled scalars.
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::SByte(_) => ValueKind::SByte,
            Self::Byte(_) => ValueKind::Byte,
            Self::Int16(_) => ValueKind::Int16,
            Self::UInt16(_) => ValueKind::UInt16,
            Self::Int32(_) => ValueKind::Int32,
            Self::UInt32(_) => ValueKind::UInt32,
            Self::Int64(_) => ValueKind::Int64,
            Self::UInt64(_) => ValueKind::UInt64,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::Array { .. } | Self::Unsupported(_) | Self::Null => return None,
        })
    }

    /// OPC UA type name; arrays report their element type.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Array { element_type, .. } => element_type,
            Self::Unsupported(name) => name,
            Self::Null => "Null",
            scalar => scalar.kind().map_or("Null", |kind| kind.name()),
        }
    }
}

impl fmt::Display for OpcUaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => fmt::Display::fmt(v, f),
            Self::SByte(v) => fmt::Display::fmt(v, f),
            Self::Byte(v) => fmt::Display::fmt(v, f),
            Self::Int16(v) => fmt::Display::fmt(v, f),
            Self::UInt16(v) => fmt::Display::fmt(v, f),
            Self::Int32(v) => fmt::Display::fmt(v, f),
            Self::UInt32(v) => fmt::Display::fmt(v, f),
            Self::Int64(v) => fmt::Display::fmt(v, f),
            Self::UInt64(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::Double(v) => fmt::Display::fmt(v, f),
            Self::String(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Self::Array {
                element_type,
                values,
            } => write!(f, "{element_type}[{}]", values.len()),
            Self::Unsupported(name) => write!(f, "<{name}>"),
            Self::Null => f.write_str("(null)"),
        }
    }
}

// =============================================================================
// OpcUaTransport
// =============================================================================

/// One client session against one endpoint.
///
/// The tools call `connect`, exactly one of `read_value` or `write_value`,
/// then `disconnect`.
#[async_trait]
pub trait OpcUaTransport: Send + Sync {
    /// Discovers endpoints, opens the secure channel and activates a session.
    ///
    /// # Errors
    ///
    /// A [`ConnectionError`](crate::error::ConnectionError) for any failure
    /// before the session is active.
    async fn connect(&mut self) -> OpcUaResult<()>;

    /// Closes the session; a no-op when none is open.
    async fn disconnect(&mut self) -> OpcUaResult<()>;

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// A session is open.
    fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Reads the Value attribute of `node_id`.
    async fn read_value(&self, node_id: &NodeId) -> OpcUaResult<ReadResult>;

    /// Writes `value` to the Value attribute of `node_id`.
    async fn write_value(&self, node_id: &NodeId, value: OpcUaValue) -> OpcUaResult<WriteResult>;

    /// Server URL, for log fields.
    fn endpoint(&self) -> &str;
}

// =============================================================================
// Tests
// =============================================================================

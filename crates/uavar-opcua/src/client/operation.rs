// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single-node read and write dispatch.
//!
//! Each function performs exactly one service call against an already
//! connected transport and folds every outcome into an [`OperationResult`].
//! Nothing is retried.

use std::fmt;

use tracing::{debug, instrument};

use crate::error::{ConversionError, OperationError, OpcUaError};
use crate::types::{NodeId, ValueKind};

use super::conversion::TypedValue;
use super::transport::OpcUaTransport;

// =============================================================================
// OperationResult
// =============================================================================

/// Terminal outcome of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult {
    /// The value read, or the value written.
    Success(TypedValue),

    /// The server returned no usable value.
    NoValue,

    /// The server value has a different type.
    TypeMismatch {
        /// OPC UA type name of the server value.
        actual: String,
    },

    /// The server did not accept the write.
    WriteRejected {
        /// Status code, if the server returned one.
        status: Option<u32>,
    },

    /// The write literal did not parse for the requested kind.
    ParseFailure,

    /// No session could be established.
    ConnectionFailure,

    /// A string buffer could not be allocated.
    ResourceExhausted,
}

impl OperationResult {
    /// Returns the value for a successful operation.
    pub fn value(&self) -> Option<&TypedValue> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::NoValue => "no_value",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::WriteRejected { .. } => "write_rejected",
            Self::ParseFailure => "parse_failure",
            Self::ConnectionFailure => "connection_failure",
            Self::ResourceExhausted => "resource_exhausted",
        }
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => write!(f, "success: {}", value),
            Self::TypeMismatch { actual } => write!(f, "type mismatch: actual type {}", actual),
            Self::WriteRejected { status: Some(code) } => write!(
                f,
                "write rejected: {}",
                OperationError::status_code_name(*code)
            ),
            other => f.write_str(other.name()),
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Reads `node_id` and decodes it as `kind`.
///
/// Only a Good status yields a value; Uncertain and Bad are no value.
#[instrument(skip(transport), fields(endpoint = transport.endpoint()))]
pub async fn read_node<T>(transport: &T, node_id: &NodeId, kind: ValueKind) -> OperationResult
where
    T: OpcUaTransport + ?Sized,
{
    let result = match transport.read_value(node_id).await {
        Ok(result) => result,
        Err(e) => {
            e.log_outcome("read");
            return OperationResult::NoValue;
        }
    };

    if !result.is_good() {
        OpcUaError::operation(OperationError::bad_status(
            node_id.to_string(),
            result.status_code,
        ))
        .log_outcome("read");
        return OperationResult::NoValue;
    }

    let Some(value) = result.value.as_ref() else {
        debug!(node = %node_id, "Read returned no payload");
        return OperationResult::NoValue;
    };

    match TypedValue::decode(kind, value) {
        Ok(decoded) => {
            debug!(node = %node_id, value = %decoded, "Read succeeded");
            OperationResult::Success(decoded)
        }
        Err(ConversionError::TypeMismatch { actual, .. }) => {
            debug!(node = %node_id, expected = kind.name(), actual = %actual, "Type mismatch");
            OperationResult::TypeMismatch { actual }
        }
        Err(e @ ConversionError::OutOfMemory { .. }) => {
            OpcUaError::conversion(e).log("read");
            OperationResult::ResourceExhausted
        }
        Err(e) => {
            debug!(node = %node_id, error = %e, "Value not usable");
            OperationResult::NoValue
        }
    }
}

/// Writes `value` to `node_id`.
#[instrument(skip(transport), fields(endpoint = transport.endpoint()))]
pub async fn write_node<T>(transport: &T, node_id: &NodeId, value: &TypedValue) -> OperationResult
where
    T: OpcUaTransport + ?Sized,
{
    match transport.write_value(node_id, value.encode()).await {
        Ok(result) if result.is_good() => {
            debug!(node = %node_id, value = %value, "Write succeeded");
            OperationResult::Success(value.clone())
        }
        Ok(result) => {
            OpcUaError::operation(OperationError::write_failed_with_status(
                node_id.to_string(),
                result.status_code,
            ))
            .log_outcome("write");
            OperationResult::WriteRejected {
                status: Some(result.status_code),
            }
        }
        Err(e) => {
            e.log_outcome("write");
            let status = match &e {
                OpcUaError::Operation(OperationError::WriteFailed { status_code, .. }) => {
                    *status_code
                }
                _ => None,
            };
            OperationResult::WriteRejected { status }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

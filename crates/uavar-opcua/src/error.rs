// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA error types with diagnostics.
//!
//! # Error Categories
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Endpoint discovery and session establishment
//! ├── Operation     - Read/write operation failures
//! ├── Conversion    - Value kind and literal conversion errors
//! └── Configuration - Invalid settings, node addresses and type tokens
//! ```
//!
//! # Examples
//!
//! ```
//! use uavar_opcua::error::{OpcUaError, ConnectionError, ErrorSeverity};
//!
//! let error = OpcUaError::connection(ConnectionError::refused(
//!     "opc.tcp://localhost:4840",
//!     "BadCommunicationError",
//! ));
//!
//! assert_eq!(error.category(), "connection");
//! assert_eq!(error.severity(), ErrorSeverity::Error);
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

/// Result type alias for OPC UA operations.
pub type OpcUaResult<T> = Result<T, OpcUaError>;

// =============================================================================
// OpcUaError - Main Error Type
// =============================================================================

/// The main error type for OPC UA operations.
#[derive(Debug, Error)]
pub enum OpcUaError {
    /// Connection-related errors.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Read/write operation errors.
    #[error("{0}")]
    Operation(#[from] OperationError),

    /// Data conversion errors.
    #[error("{0}")]
    Conversion(#[from] ConversionError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl OpcUaError {
    /// Wraps a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Wraps an operation error.
    #[inline]
    pub fn operation(error: OperationError) -> Self {
        Self::Operation(error)
    }

    /// Wraps a conversion error.
    #[inline]
    pub fn conversion(error: ConversionError) -> Self {
        Self::Conversion(error)
    }

    /// Wraps a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    /// A service call was made before `connect`.
    pub fn not_connected() -> Self {
        ConnectionError::NotConnected.into()
    }

    /// The read service call itself failed.
    pub fn read_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        OperationError::read_failed(node_id, message).into()
    }

    /// How serious this error is.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection(e) => e.severity(),
            Self::Operation(_) => ErrorSeverity::Warning,
            Self::Conversion(_) => ErrorSeverity::Error,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Category tag used in log events.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Operation(_) => "operation",
            Self::Conversion(_) => "conversion",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Structured `UA-XXYY` code.
    pub fn error_code(&self) -> ErrorCode {
        let (category, code) = match self {
            Self::Connection(e) => (1, e.ordinal()),
            Self::Operation(e) => (5, e.ordinal()),
            Self::Conversion(e) => (7, e.ordinal()),
            Self::Configuration(e) => (8, e.ordinal()),
        };
        ErrorCode::new(category, code)
    }

    /// Returns `true` if the session could not be established.
    #[inline]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Emits this error as a log event at its severity.
    pub fn log(&self, context: &str) {
        let code = self.error_code();
        let category = self.category();
        match self.severity() {
            ErrorSeverity::Info => debug!(error_code = %code, category, context, "{self}"),
            ErrorSeverity::Warning => warn!(error_code = %code, category, context, "{self}"),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                error!(error_code = %code, category, context, "{self}")
            }
        }
    }

    /// Emits this error at debug level.
    ///
    /// For failures the caller reports through its own output lines, such as
    /// a missing value or a rejected write.
    pub fn log_outcome(&self, context: &str) {
        debug!(error_code = %self.error_code(), category = self.category(), context, "{self}");
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Failures while establishing or using the session.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Session creation or activation was refused.
    #[error("{endpoint} refused the session: {message}")]
    Refused {
        /// Server URL.
        endpoint: String,
        /// Server or stack message.
        message: String,
    },

    /// `GetEndpoints` failed.
    #[error("cannot discover endpoints of {endpoint}")]
    EndpointNotFound {
        /// Server URL plus failure detail.
        endpoint: String,
    },

    /// The server offers no endpoint with the requested mode and policy.
    #[error("server has no endpoint for {security}")]
    NoSuitableEndpoint {
        /// `policy/mode` pair.
        security: String,
    },

    /// The endpoint or client setup is unusable.
    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint {
        /// Server URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No session is open.
    #[error("not connected")]
    NotConnected,

    /// The session went away mid-call.
    #[error("session closed: {}", .reason.as_deref().unwrap_or("unknown reason"))]
    Closed {
        /// Reason, if known.
        reason: Option<String>,
    },
}

impl ConnectionError {
    /// `endpoint` refused the session.
    pub fn refused(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Refused {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Discovery against `endpoint` failed.
    pub fn endpoint_not_found(endpoint: impl Into<String>) -> Self {
        Self::EndpointNotFound {
            endpoint: endpoint.into(),
        }
    }

    /// No endpoint offers `security`.
    pub fn no_suitable_endpoint(security: impl Into<String>) -> Self {
        Self::NoSuitableEndpoint {
            security: security.into(),
        }
    }

    /// `url` cannot be used.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// The session closed underneath a call.
    pub fn closed(reason: Option<String>) -> Self {
        Self::Closed { reason }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotConnected => ErrorSeverity::Warning,
            Self::InvalidEndpoint { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    fn ordinal(&self) -> u8 {
        match self {
            Self::Refused { .. } => 1,
            Self::EndpointNotFound { .. } => 2,
            Self::NoSuitableEndpoint { .. } => 3,
            Self::InvalidEndpoint { .. } => 4,
            Self::NotConnected => 5,
            Self::Closed { .. } => 6,
        }
    }
}

// =============================================================================
// OperationError
// =============================================================================

/// Failures of the read or write service call.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The read call failed.
    #[error("reading {node_id} failed: {message}")]
    ReadFailed {
        /// Node, `ns=<n>;s=<id>`.
        node_id: String,
        /// Stack message.
        message: String,
    },

    /// The write call failed or was rejected.
    #[error("writing {node_id} failed: {message}")]
    WriteFailed {
        /// Node, `ns=<n>;s=<id>`.
        node_id: String,
        /// Stack message or status name.
        message: String,
        /// Status code, when the server returned one.
        status_code: Option<u32>,
    },

    /// The server answered with a bad status.
    #[error("{node_id}: {status_name} ({status_code:#010x})")]
    BadStatus {
        /// Node, `ns=<n>;s=<id>`.
        node_id: String,
        /// Status code.
        status_code: u32,
        /// Symbolic status name.
        status_name: String,
    },
}

impl OperationError {
    /// The read call for `node_id` failed.
    pub fn read_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            node_id: node_id.into(),
            message: message.into(),
        }
    }

    /// The write call for `node_id` failed without a status.
    pub fn write_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            node_id: node_id.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// The server rejected the write with `status_code`.
    pub fn write_failed_with_status(node_id: impl Into<String>, status_code: u32) -> Self {
        Self::WriteFailed {
            node_id: node_id.into(),
            message: Self::status_code_name(status_code).to_string(),
            status_code: Some(status_code),
        }
    }

    /// A read returned `status_code`.
    pub fn bad_status(node_id: impl Into<String>, status_code: u32) -> Self {
        Self::BadStatus {
            node_id: node_id.into(),
            status_code,
            status_name: Self::status_code_name(status_code).to_string(),
        }
    }

    /// Symbolic name of an OPC UA status code.
    pub fn status_code_name(code: u32) -> &'static str {
        // Lower 16 bits are info bits.
        match code & 0xFFFF_0000 {
            0x0000_0000 => "Good",
            0x4000_0000 => "Uncertain",
            0x8000_0000 => "Bad",
            0x8001_0000 => "BadUnexpectedError",
            0x8002_0000 => "BadInternalError",
            0x8003_0000 => "BadOutOfMemory",
            0x8005_0000 => "BadCommunicationError",
            0x8006_0000 => "BadEncodingError",
            0x8007_0000 => "BadDecodingError",
            0x800A_0000 => "BadTimeout",
            0x800B_0000 => "BadServiceUnsupported",
            0x800C_0000 => "BadShutdown",
            0x800D_0000 => "BadServerNotConnected",
            0x801F_0000 => "BadUserAccessDenied",
            0x8025_0000 => "BadSessionIdInvalid",
            0x8026_0000 => "BadSessionClosed",
            0x8027_0000 => "BadSessionNotActivated",
            0x8033_0000 => "BadNodeIdInvalid",
            0x8034_0000 => "BadNodeIdUnknown",
            0x8035_0000 => "BadAttributeIdInvalid",
            0x803A_0000 => "BadNotReadable",
            0x803B_0000 => "BadNotWritable",
            0x803C_0000 => "BadOutOfRange",
            0x803D_0000 => "BadNotSupported",
            0x803E_0000 => "BadNotFound",
            0x8074_0000 => "BadTypeMismatch",
            0x80AB_0000 => "BadInvalidArgument",
            0x80AC_0000 => "BadConnectionRejected",
            0x80AD_0000 => "BadDisconnect",
            0x80AE_0000 => "BadConnectionClosed",
            other if other & 0x8000_0000 != 0 => "Bad",
            other if other & 0x4000_0000 != 0 => "Uncertain",
            _ => "Good",
        }
    }

    fn ordinal(&self) -> u8 {
        match self {
            Self::ReadFailed { .. } => 1,
            Self::WriteFailed { .. } => 2,
            Self::BadStatus { .. } => 3,
        }
    }
}

// =============================================================================
// ConversionError
// =============================================================================

/// Failures turning server values or literals into a [`ValueKind`](crate::ValueKind).
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The server value has a different type.
    #[error("expected {expected}, server holds {actual}")]
    TypeMismatch {
        /// Requested OPC UA type name.
        expected: String,
        /// OPC UA type name of the server value.
        actual: String,
    },

    /// An array where a scalar was requested.
    #[error("{type_name} array where a scalar was requested")]
    NotScalar {
        /// Element type name.
        type_name: String,
    },

    /// The variant is empty.
    #[error("empty value")]
    NullValue,

    /// A write literal does not fit the type.
    #[error("'{literal}' is not a valid {target_type}: {message}")]
    InvalidLiteral {
        /// Type token.
        target_type: String,
        /// The literal as given.
        literal: String,
        /// Parser message.
        message: String,
    },

    /// A string buffer could not be reserved.
    #[error("cannot allocate {length} bytes for a string value")]
    OutOfMemory {
        /// Payload length.
        length: usize,
    },
}

impl ConversionError {
    /// Server value of type `actual` where `expected` was requested.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Array of `type_name` where a scalar was requested.
    pub fn not_scalar(type_name: impl Into<String>) -> Self {
        Self::NotScalar {
            type_name: type_name.into(),
        }
    }

    /// `literal` does not parse as `target_type`.
    pub fn invalid_literal(
        target_type: impl Into<String>,
        literal: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidLiteral {
            target_type: target_type.into(),
            literal: literal.into(),
            message: message.into(),
        }
    }

    fn ordinal(&self) -> u8 {
        match self {
            Self::TypeMismatch { .. } => 1,
            Self::NotScalar { .. } => 2,
            Self::NullValue => 3,
            Self::InvalidLiteral { .. } => 4,
            Self::OutOfMemory { .. } => 5,
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Rejected settings, node addresses and type tokens.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Unusable endpoint URL.
    #[error("endpoint {url}: {reason}")]
    InvalidEndpoint {
        /// The URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Inconsistent security mode and policy.
    #[error("security settings: {message}")]
    InvalidSecurity {
        /// What is inconsistent.
        message: String,
    },

    /// Unusable timeout.
    #[error("timeout {duration:?} {reason}")]
    InvalidTimeout {
        /// The value given.
        duration: Duration,
        /// Why it was rejected.
        reason: String,
    },

    /// A required setting is absent or empty.
    #[error("{field} is required")]
    MissingField {
        /// Setting name.
        field: String,
    },

    /// Namespace index operand is not a `u16` in decimal.
    #[error("'{index}' is not a namespace index")]
    InvalidNamespace {
        /// The operand as given.
        index: String,
    },

    /// Type operand is not an accepted token.
    #[error("'{data_type}' is not a type token")]
    InvalidDataType {
        /// The operand as given.
        data_type: String,
    },

    /// Unknown security mode or policy name.
    #[error("unknown security {setting} '{value}'")]
    UnknownSecurity {
        /// `mode` or `policy`.
        setting: &'static str,
        /// The name as given.
        value: String,
    },
}

impl ConfigurationError {
    /// `url` is unusable.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Mode and policy do not fit together.
    pub fn invalid_security(message: impl Into<String>) -> Self {
        Self::InvalidSecurity {
            message: message.into(),
        }
    }

    /// `duration` is unusable.
    pub fn invalid_timeout(duration: Duration, reason: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            duration,
            reason: reason.into(),
        }
    }

    /// `field` is required.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Bad namespace operand.
    pub fn invalid_namespace(index: impl Into<String>) -> Self {
        Self::InvalidNamespace {
            index: index.into(),
        }
    }

    /// Bad type operand.
    pub fn invalid_data_type(data_type: impl Into<String>) -> Self {
        Self::InvalidDataType {
            data_type: data_type.into(),
        }
    }

    /// Unknown security mode name.
    pub fn invalid_security_mode(mode: impl Into<String>) -> Self {
        Self::UnknownSecurity {
            setting: "mode",
            value: mode.into(),
        }
    }

    /// Unknown security policy name or URI.
    pub fn invalid_security_policy(policy: impl Into<String>) -> Self {
        Self::UnknownSecurity {
            setting: "policy",
            value: policy.into(),
        }
    }

    fn ordinal(&self) -> u8 {
        match self {
            Self::InvalidEndpoint { .. } => 1,
            Self::InvalidSecurity { .. } => 2,
            Self::InvalidTimeout { .. } => 3,
            Self::MissingField { .. } => 4,
            Self::InvalidNamespace { .. } => 5,
            Self::InvalidDataType { .. } => 6,
            Self::UnknownSecurity { .. } => 7,
        }
    }
}

// =============================================================================
// ErrorSeverity / ErrorCode
// =============================================================================

/// Severity, which picks the log level of [`OpcUaError::log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Logged at debug.
    Info,
    /// Logged at warn.
    Warning,
    /// Logged at error.
    Error,
    /// Logged at error; the invocation itself is wrong.
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        })
    }
}

/// `UA-XXYY` code: XX is the category, YY the error within it.
///
/// Categories: 1 connection, 5 operation, 7 conversion, 8 configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category.
    pub category: u8,
    /// Error within the category.
    pub code: u8,
}

impl ErrorCode {
    /// Builds a code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-kind parse, decode, encode and format.
//!
//! Every scalar kind goes through the same four steps, keyed on
//! [`ValueKind`]:
//!
//! ```text
//!  CLI literal ──parse_literal──┐
//!                               ▼
//!                          TypedValue ──encode──► OpcUaValue (write)
//!                               ▲
//!  OpcUaValue (read) ──decode───┘
//!                               │
//!                               └──write_to──► text sinks
//! ```
//!
//! Decoding never coerces: a server value whose type differs from the
//! requested kind is a [`ConversionError::TypeMismatch`].

use std::fmt;
use std::io;
use std::str::FromStr;

use crate::error::{ConversionError, OpcUaError};
use crate::types::ValueKind;

use super::transport::OpcUaValue;

// =============================================================================
// TypedValue
// =============================================================================

/// One value of the kind selected for this invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Boolean.
    Boolean(bool),
    /// Signed byte.
    SByte(i8),
    /// Unsigned byte.
    Byte(u8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Raw bytes, exactly as long as the payload declared.
    String(Vec<u8>),
}

impl TypedValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
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
        }
    }

    /// Decodes a server value as `kind`.
    ///
    /// # Errors
    ///
    /// - [`ConversionError::NullValue`] for an empty variant
    /// - [`ConversionError::NotScalar`] for an array of `kind`
    /// - [`ConversionError::TypeMismatch`] for any other type
    /// - [`ConversionError::OutOfMemory`] if a string buffer cannot be reserved
    pub fn decode(kind: ValueKind, value: &OpcUaValue) -> Result<Self, ConversionError> {
        let decoded = match (kind, value) {
            (ValueKind::Boolean, OpcUaValue::Boolean(v)) => Self::Boolean(*v),
            (ValueKind::SByte, OpcUaValue::SByte(v)) => Self::SByte(*v),
            (ValueKind::Byte, OpcUaValue::Byte(v)) => Self::Byte(*v),
            (ValueKind::Int16, OpcUaValue::Int16(v)) => Self::Int16(*v),
            (ValueKind::UInt16, OpcUaValue::UInt16(v)) => Self::UInt16(*v),
            (ValueKind::Int32, OpcUaValue::Int32(v)) => Self::Int32(*v),
            (ValueKind::UInt32, OpcUaValue::UInt32(v)) => Self::UInt32(*v),
            (ValueKind::Int64, OpcUaValue::Int64(v)) => Self::Int64(*v),
            (ValueKind::UInt64, OpcUaValue::UInt64(v)) => Self::UInt64(*v),
            (ValueKind::Float, OpcUaValue::Float(v)) => Self::Float(*v),
            (ValueKind::Double, OpcUaValue::Double(v)) => Self::Double(*v),
            (ValueKind::String, OpcUaValue::String(bytes)) => Self::String(copy_exact(bytes)?),
            (_, OpcUaValue::Null) => return Err(ConversionError::NullValue),
            (kind, OpcUaValue::Array { element_type, .. }) if element_type == kind.name() => {
                return Err(ConversionError::not_scalar(kind.name()));
            }
            (kind, other) => {
                return Err(ConversionError::type_mismatch(kind.name(), other.type_name()));
            }
        };
        Ok(decoded)
    }

    /// Encodes this value as the server variant of its kind.
    pub fn encode(&self) -> OpcUaValue {
        match self {
            Self::Boolean(v) => OpcUaValue::Boolean(*v),
            Self::SByte(v) => OpcUaValue::SByte(*v),
            Self::Byte(v) => OpcUaValue::Byte(*v),
            Self::Int16(v) => OpcUaValue::Int16(*v),
            Self::UInt16(v) => OpcUaValue::UInt16(*v),
            Self::Int32(v) => OpcUaValue::Int32(*v),
            Self::UInt32(v) => OpcUaValue::UInt32(*v),
            Self::Int64(v) => OpcUaValue::Int64(*v),
            Self::UInt64(v) => OpcUaValue::UInt64(*v),
            Self::Float(v) => OpcUaValue::Float(*v),
            Self::Double(v) => OpcUaValue::Double(*v),
            Self::String(v) => OpcUaValue::String(v.clone()),
        }
    }

    /// Writes the textual form to `out`.
    ///
    /// Booleans print as `0`/`1`, floating-point kinds with six decimals and
    /// strings as their raw bytes.
    pub fn write_to<W: io::Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Self::String(bytes) => out.write_all(bytes),
            other => write!(out, "{}", other),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", u8::from(*v)),
            Self::SByte(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => fmt_fixed(f, f64::from(*v)),
            Self::Double(v) => fmt_fixed(f, *v),
            Self::String(v) => write!(f, "{}", String::from_utf8_lossy(v)),
        }
    }
}

fn fmt_fixed(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_nan() {
        f.write_str("nan")
    } else {
        write!(f, "{:.6}", value)
    }
}

/// Copies a payload into a buffer of exactly its length.
fn copy_exact(bytes: &[u8]) -> Result<Vec<u8>, ConversionError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes.len())
        .map_err(|_| ConversionError::OutOfMemory {
            length: bytes.len(),
        })?;
    buffer.extend_from_slice(bytes);
    Ok(buffer)
}

// =============================================================================
// Literal parsing
// =============================================================================

impl ValueKind {
    /// Parses a command-line literal as this kind.
    ///
    /// Numbers are decimal with optional leading whitespace; a sign is only
    /// accepted where the kind is signed. `BOOL` takes an unsigned byte where
    /// any non-zero value is true. Strings are taken verbatim.
    ///
    /// ```
    /// use uavar_opcua::client::TypedValue;
    /// use uavar_opcua::types::ValueKind;
    ///
    /// assert_eq!(ValueKind::Int16.parse_literal(" -7").unwrap(), TypedValue::Int16(-7));
    /// assert_eq!(ValueKind::Boolean.parse_literal("2").unwrap(), TypedValue::Boolean(true));
    /// assert!(ValueKind::UInt32.parse_literal("-1").is_err());
    /// ```
    pub fn parse_literal(&self, literal: &str) -> Result<TypedValue, OpcUaError> {
        let text = literal.trim_start();
        if !self.is_float()
            && !self.is_signed_integer()
            && *self != ValueKind::String
            && text.starts_with('-')
        {
            return Err(self.invalid_literal(literal, "negative value for unsigned type"));
        }

        let value = match self {
            Self::Boolean => TypedValue::Boolean(self.parse_number::<u8>(literal, text)? != 0),
            Self::SByte => TypedValue::SByte(self.parse_number(literal, text)?),
            Self::Byte => TypedValue::Byte(self.parse_number(literal, text)?),
            Self::Int16 => TypedValue::Int16(self.parse_number(literal, text)?),
            Self::UInt16 => TypedValue::UInt16(self.parse_number(literal, text)?),
            Self::Int32 => TypedValue::Int32(self.parse_number(literal, text)?),
            Self::UInt32 => TypedValue::UInt32(self.parse_number(literal, text)?),
            Self::Int64 => TypedValue::Int64(self.parse_number(literal, text)?),
            Self::UInt64 => TypedValue::UInt64(self.parse_number(literal, text)?),
            Self::Float => TypedValue::Float(self.parse_number(literal, text)?),
            Self::Double => TypedValue::Double(self.parse_number(literal, text)?),
            Self::String => {
                TypedValue::String(copy_exact(literal.as_bytes()).map_err(OpcUaError::conversion)?)
            }
        };
        Ok(value)
    }

    fn parse_number<T>(&self, literal: &str, text: &str) -> Result<T, OpcUaError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        text.parse::<T>()
            .map_err(|e| self.invalid_literal(literal, e.to_string()))
    }

    fn invalid_literal(&self, literal: &str, message: impl Into<String>) -> OpcUaError {
        OpcUaError::conversion(ConversionError::invalid_literal(
            self.token(),
            literal,
            message,
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================

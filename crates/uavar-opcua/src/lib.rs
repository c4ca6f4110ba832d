// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single-node OPC UA read/write client layer for the `uavar` tools.
//!
//! This crate holds everything the `getvar` and `si-opc-ua-client` binaries
//! share: node addressing, the value-kind table, the transport seam with its
//! `opcua`-backed implementation, and the read/write dispatcher.
//!
//! # Features
//!
//! - One read or one write against one string-addressed node
//! - Twelve scalar kinds with strict, non-coercing decode
//! - Security modes: None, Sign, SignAndEncrypt
//! - Anonymous or username/password authentication
//!
//! # Error Handling
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Endpoint discovery and session establishment
//! ├── Operation     - Read/write operation failures
//! ├── Conversion    - Value kind and literal conversion errors
//! └── Configuration - Invalid settings, node addresses and type tokens
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use uavar_opcua::{read_node, NodeId, OpcUaConfig, OpcUaTransport, RealOpcUaTransport, ValueKind};
//!
//! let config = OpcUaConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()?;
//!
//! let mut transport = RealOpcUaTransport::new(config);
//! transport.connect().await?;
//! let result = read_node(&transport, &NodeId::new(1, "the.answer"), ValueKind::Int32).await;
//! transport.disconnect().await?;
//! println!("{result}");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod types;

pub use error::{
    ConfigurationError, ConnectionError, ConversionError, ErrorCode, ErrorSeverity, OpcUaError,
    OpcUaResult, OperationError,
};

pub use types::{
    NodeId, OpcUaConfig, OpcUaConfigBuilder, SecurityMode, SecurityPolicy, TokenSet,
    UserTokenType, ValueKind,
};

pub use client::{
    read_node, write_node, OpcUaTransport, OpcUaValue, OperationResult, ReadResult,
    SessionState, TypedValue, WriteResult,
};

#[cfg(feature = "real-transport")]
pub use client::RealOpcUaTransport;

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client layer.
//!
//! - **Transport**: the seam to the server (`connect`, `read_value`,
//!   `write_value`, `disconnect`)
//! - **Conversion**: per-kind parse, decode, encode and format
//! - **Operation**: single-node read/write dispatch
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 read_node / write_node                          │
//! │                 (OperationResult)                               │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      TypedValue                                 │
//! │              (decode / encode per ValueKind)                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    OpcUaTransport                               │
//! │          (RealOpcUaTransport or a test double)                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use uavar_opcua::client::{read_node, OpcUaTransport, RealOpcUaTransport};
//! use uavar_opcua::types::{NodeId, OpcUaConfig, ValueKind};
//!
//! let config = OpcUaConfig::builder()
//!     .endpoint("opc.tcp://localhost:4840")
//!     .build()?;
//!
//! let mut transport = RealOpcUaTransport::new(config);
//! transport.connect().await?;
//! let result = read_node(&transport, &NodeId::new(1, "the.answer"), ValueKind::Int32).await;
//! transport.disconnect().await?;
//! ```

mod conversion;
mod operation;
mod transport;

#[cfg(feature = "real-transport")]
mod real_transport;

pub use conversion::TypedValue;
pub use operation::{read_node, write_node, OperationResult};
pub use transport::{OpcUaTransport, OpcUaValue, ReadResult, SessionState, WriteResult};

#[cfg(feature = "real-transport")]
pub use real_transport::RealOpcUaTransport;

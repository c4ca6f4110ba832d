// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # uavar-bin
//!
//! The `getvar` and `si-opc-ua-client` command-line tools.
//!
//! Each binary parses its operands, connects once, performs a single read or
//! write and maps the outcome to text on stdout/stderr and an exit code.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              bin/getvar.rs, bin/si-opc-ua-client.rs          │
//! │                    (Entry Points)                            │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                    ┌──────▼──────┐
//!                    │  commands   │
//!                    └──────┬──────┘
//!                           │
//!     ┌──────────┬──────────┼──────────┬──────────┐
//!     ▼          ▼          ▼          ▼          ▼
//! ┌───────┐ ┌────────┐ ┌─────────┐ ┌────────┐ ┌─────────┐
//! │  cli  │ │ config │ │ runtime │ │ output │ │ logging │
//! └───────┘ └────────┘ └────┬────┘ └────────┘ └─────────┘
//!                           │
//!                    ┌──────▼──────┐
//!                    │ uavar-opcua │
//!                    └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Read an Int32 and record it in getvar.out
//! getvar opc.tcp://localhost:4840 1 the.answer INT32
//!
//! # Same, writing to another file
//! getvar -o /var/lib/silos/level.out opc.tcp://plc:4840 2 level FLOAT
//!
//! # Read and write with the read/write tool
//! si-opc-ua-client opc.tcp://localhost:4840 -r 1 "the.answer" STRING
//! si-opc-ua-client opc.tcp://localhost:4840 -w 1 "the.answer" STRING "42"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod runtime;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{ClientCli, GetVarCli};
pub use commands::{execute_client, execute_getvar};
pub use error::{BinError, BinResult, Program};
pub use logging::init_logging;
pub use output::Console;
pub use runtime::{RunState, SessionRuntime};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

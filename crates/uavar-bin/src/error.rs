// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the uavar binaries.
//!
//! Every failure an invocation can end with is a [`BinError`] variant. The
//! numeric process status depends on which program is running, see
//! [`BinError::exit_code`].

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use uavar_opcua::OpcUaError;

use crate::output::{Console, WRONG_CONNECTION};

/// Result type alias for uavar-bin operations.
pub type BinResult<T> = Result<T, BinError>;

// =============================================================================
// Program
// =============================================================================

/// Which of the two tools is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    /// Read-only tool with an output file.
    GetVar,
    /// Read/write tool.
    Client,
}

impl Program {
    /// Canonical binary name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetVar => "getvar",
            Self::Client => "si-opc-ua-client",
        }
    }
}

// =============================================================================
// BinError
// =============================================================================

/// Errors that end a uavar invocation.
#[derive(Debug, Error)]
pub enum BinError {
    /// Options before the operands were rejected.
    #[error("invalid command line: {0}")]
    Cli(#[from] clap::Error),

    /// Wrong number of operands.
    #[error("wrong command line: {count} operands")]
    ArgumentCount {
        /// Operands received.
        count: usize,
    },

    /// Operation token is neither `-r` nor `-w`.
    #[error("wrong operation {token}")]
    Operation {
        /// The token received.
        token: String,
    },

    /// Operand count does not match the operation.
    #[error("{operation} does not take {count} operands")]
    ArgumentCountForOperation {
        /// The operation token.
        operation: String,
        /// Operands received.
        count: usize,
    },

    /// Namespace index operand is invalid.
    #[error("invalid namespace index {text}")]
    Namespace {
        /// The operand as given.
        text: String,
        /// The parse failure.
        #[source]
        source: OpcUaError,
    },

    /// Type operand is not a known token.
    #[error("unknown type {token}")]
    DataType {
        /// The operand as given.
        token: String,
        /// The lookup failure.
        #[source]
        source: OpcUaError,
    },

    /// Write literal does not parse for the requested kind.
    #[error("cannot read {literal} as the requested type")]
    Literal {
        /// The literal as given.
        literal: String,
        /// The parse failure.
        #[source]
        source: OpcUaError,
    },

    /// `getvar` output file could not be opened or written.
    #[error("cannot open output file {}", .path.display())]
    OutputFile {
        /// The configured path.
        path: PathBuf,
        /// The I/O failure.
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No session could be established.
    #[error("cannot connect to {endpoint}")]
    Connection {
        /// The server URL.
        endpoint: String,
        /// The transport failure.
        #[source]
        source: OpcUaError,
    },

    /// The read produced no usable value.
    #[error("no value")]
    NoValue,

    /// The server rejected the write.
    #[error("write rejected")]
    WriteRejected {
        /// Status code, if the server returned one.
        status: Option<u32>,
    },

    /// A string buffer could not be allocated.
    #[error("not enough memory")]
    OutOfMemory,

    /// Writing to stdout or stderr failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an output file error.
    pub fn output_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::OutputFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a connection error.
    pub fn connection(endpoint: impl Into<String>, source: OpcUaError) -> Self {
        Self::Connection {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Returns the process exit code for this error under `program`.
    pub fn exit_code(&self, program: Program) -> i32 {
        match program {
            Program::GetVar => match self {
                Self::Cli(_)
                | Self::ArgumentCount { .. }
                | Self::Operation { .. }
                | Self::ArgumentCountForOperation { .. }
                | Self::Literal { .. }
                | Self::Configuration(_) => -1,
                Self::OutputFile { .. } | Self::Io(_) => -2,
                Self::Connection { .. } => -3,
                Self::Namespace { .. } => -4,
                Self::DataType { .. } => -5,
                Self::NoValue | Self::WriteRejected { .. } => -6,
                Self::OutOfMemory => -11,
            },
            Program::Client => match self {
                Self::Cli(_)
                | Self::ArgumentCount { .. }
                | Self::Configuration(_)
                | Self::OutputFile { .. }
                | Self::Io(_) => -1,
                Self::Operation { .. } => -2,
                Self::ArgumentCountForOperation { .. } => -3,
                Self::Namespace { .. } => -4,
                Self::NoValue => -5,
                Self::WriteRejected { .. } => -6,
                Self::DataType { .. } => -7,
                Self::Literal { .. } => -9,
                Self::Connection { .. } => -10,
                Self::OutOfMemory => -11,
            },
        }
    }

    /// Symbolic name printed in the `si-opc-ua-client` usage banner.
    pub fn usage_name(&self) -> Option<&'static str> {
        match self {
            Self::ArgumentCount { .. } => Some("WRONG_ARGUMENTS_COUNT"),
            Self::Operation { .. } => Some("WRONG_OPERATION"),
            Self::ArgumentCountForOperation { .. } => Some("WRONG_ARGUMENTS_COUNT_FOR_OPERATION"),
            Self::Namespace { .. } => Some("WRONG_NSINDEX"),
            Self::DataType { .. } => Some("WRONG_TYPE"),
            Self::Literal { .. } => Some("WRONG_CONSOLE_READ"),
            _ => None,
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// `getvar` syntax line.
pub fn getvar_syntax(argv0: &str) -> String {
    format!(
        "syntax: {} <OPC-UA Server URL> <Name Space Index> <Node Id> <Type>",
        argv0
    )
}

/// Writes the `si-opc-ua-client` usage block, optionally headed by an error name.
pub fn write_client_usage(err: &mut dyn Write, error: Option<&str>) -> io::Result<()> {
    let me = Program::Client.name();
    if let Some(name) = error {
        writeln!(err, "Error: {}!", name)?;
    }
    writeln!(err, "Usage:")?;
    writeln!(
        err,
        "  {} <OPC-UA Server URL> <-r|-w> <Name Space Index> <Node Id> <Type> [<Value>]",
        me
    )?;
    writeln!(
        err,
        "valid types are: BOOL, (S)BYTE, (U)INT16, (U)INT32, (U)INT64, FLOAT, DOUBLE, STRING;"
    )?;
    writeln!(err, "example:")?;
    writeln!(err, "  {} opc.tcp://localhost:4840 -r  1 \"the.answer\" STRING", me)?;
    writeln!(err, "or:")?;
    writeln!(
        err,
        "  {} opc.tcp://localhost:4840 -w  1 \"the.answer\" STRING \"42\"",
        me
    )
}

/// Reports an error on the console in the running program's format.
///
/// Outcomes the command already rendered print nothing here: no value, and
/// for `si-opc-ua-client` the rejected write and not-enough-memory sentinels.
pub fn report_error(
    program: Program,
    argv0: &str,
    error: &BinError,
    console: &mut Console<'_>,
) -> io::Result<()> {
    let err = &mut *console.err;
    match (program, error) {
        (_, BinError::Cli(e)) => write!(err, "{}", e),
        (_, BinError::Configuration(_)) | (_, BinError::Io(_)) => {
            writeln!(err, "{}: {}", argv0, error)
        }
        (Program::GetVar, BinError::ArgumentCount { .. }) => {
            writeln!(err, "{}: wrong command line.", argv0)?;
            writeln!(err, "{}", getvar_syntax(argv0))
        }
        (Program::GetVar, BinError::OutputFile { path, .. }) => {
            writeln!(err, "{}: cannot open output file {}.", argv0, path.display())
        }
        (Program::GetVar, BinError::Connection { endpoint, .. }) => {
            writeln!(err, "{}: cannot connect to {}.", argv0, endpoint)
        }
        (Program::GetVar, BinError::Namespace { text, .. }) => writeln!(
            err,
            "{}: <Name Space Index> must be a positive integer and not {}.",
            argv0, text
        ),
        (Program::GetVar, BinError::DataType { .. }) => writeln!(
            err,
            "{}: <Type> can only be BOOL, (U)INT16, (U)INT32, (U)INT64, FLOAT, DOUBLE, STRING.",
            argv0
        ),
        (Program::GetVar, BinError::OutOfMemory) => {
            writeln!(err, "{}: not enough memory.", argv0)
        }
        (Program::Client, BinError::Connection { .. }) => writeln!(err, "{}", WRONG_CONNECTION),
        (Program::Client, BinError::WriteRejected { .. } | BinError::OutOfMemory) => Ok(()),
        (Program::Client, e) if e.usage_name().is_some() => write_client_usage(err, e.usage_name()),
        (_, BinError::NoValue) => Ok(()),
        (_, other) => writeln!(err, "{}: {}", argv0, other),
    }
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and request validation.
//!
//! Options are only recognized before the first operand. From the server URL
//! onward every argument is taken verbatim, which keeps `-r`/`-w` operands
//! rather than flags.
//!
//! - `getvar [options] <url> <ns> <node-id> <type>`
//! - `si-opc-ua-client [options] <url> <-r|-w> <ns> <node-id> <type> [<value>]`

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser};
use uavar_opcua::{NodeId, TokenSet, TypedValue, ValueKind};

use crate::error::{BinError, BinResult};

// =============================================================================
// Shared Options
// =============================================================================

/// Options shared by both programs.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "UAVAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", env = "UAVAR_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "UAVAR_LOG_FORMAT")]
    pub log_format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

// =============================================================================
// getvar
// =============================================================================

/// getvar - read one OPC UA node and record its value
///
/// Prints the value and writes it, alone on one line, to the output file.
#[derive(Parser, Debug)]
#[command(name = "getvar", version)]
pub struct GetVarCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// File receiving the bare value or the XXX-NO-VALUE sentinel
    #[arg(short, long, env = "UAVAR_OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// <OPC-UA Server URL> <Name Space Index> <Node Id> <Type>
    #[arg(
        value_name = "OPERAND",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub operands: Vec<String>,
}

/// `getvar` operands that passed the count check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetVarOperands<'a> {
    /// Server URL.
    pub endpoint: &'a str,
    /// Namespace index as typed.
    pub namespace: &'a str,
    /// Node identifier.
    pub identifier: &'a str,
    /// Type token as typed.
    pub type_token: &'a str,
}

impl GetVarCli {
    /// Checks the operand count.
    pub fn operands(&self) -> BinResult<GetVarOperands<'_>> {
        match self.operands.as_slice() {
            [endpoint, namespace, identifier, type_token] => Ok(GetVarOperands {
                endpoint,
                namespace,
                identifier,
                type_token,
            }),
            other => Err(BinError::ArgumentCount { count: other.len() }),
        }
    }
}

impl GetVarOperands<'_> {
    /// Resolves namespace and type, in that order.
    pub fn resolve(&self) -> BinResult<ReadRequest> {
        let node_id = node_id(self.namespace, self.identifier)?;
        let kind = value_kind(self.type_token, TokenSet::Legacy)?;
        Ok(ReadRequest {
            endpoint: self.endpoint.to_string(),
            node_id,
            kind,
        })
    }
}

/// A validated single-node read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    /// Server URL.
    pub endpoint: String,
    /// Node to read.
    pub node_id: NodeId,
    /// Requested kind.
    pub kind: ValueKind,
}

// =============================================================================
// si-opc-ua-client
// =============================================================================

/// si-opc-ua-client - read or write one OPC UA node
#[derive(Parser, Debug)]
#[command(name = "si-opc-ua-client", version)]
pub struct ClientCli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// <OPC-UA Server URL> <-r|-w> <Name Space Index> <Node Id> <Type> [<Value>]
    #[arg(
        value_name = "OPERAND",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub operands: Vec<String>,
}

/// Operation selected by the second operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `-r`
    Read,
    /// `-w`
    Write,
}

impl Operation {
    /// Parses the exact `-r`/`-w` token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "-r" => Some(Self::Read),
            "-w" => Some(Self::Write),
            _ => None,
        }
    }

    /// Operand count this operation requires.
    pub fn operand_count(&self) -> usize {
        match self {
            Self::Read => 5,
            Self::Write => 6,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("-r"),
            Self::Write => f.write_str("-w"),
        }
    }
}

/// A validated `si-opc-ua-client` request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRequest {
    /// Server URL.
    pub endpoint: String,
    /// Target node.
    pub node_id: NodeId,
    /// Requested kind.
    pub kind: ValueKind,
    /// Read, or write of an already parsed value.
    pub action: ClientAction,
}

/// What to do with the node.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientAction {
    /// Read the current value.
    Read,
    /// Write `value`.
    Write {
        /// Value sent to the server.
        value: TypedValue,
        /// Value echoed on `WROTE:`; a `BOOL` echoes the byte as scanned.
        echo: TypedValue,
    },
}

impl ClientCli {
    /// Validates the operands; the first failing check wins.
    pub fn request(&self) -> BinResult<ClientRequest> {
        let operands = self.operands.as_slice();
        let count = operands.len();
        if count != 5 && count != 6 {
            return Err(BinError::ArgumentCount { count });
        }

        let operation = Operation::from_token(&operands[1]).ok_or_else(|| BinError::Operation {
            token: operands[1].clone(),
        })?;
        if operation.operand_count() != count {
            return Err(BinError::ArgumentCountForOperation {
                operation: operation.to_string(),
                count,
            });
        }

        let node_id = node_id(&operands[2], &operands[3])?;
        let kind = value_kind(&operands[4], TokenSet::Full)?;

        let action = match operation {
            Operation::Read => ClientAction::Read,
            Operation::Write => {
                let literal = &operands[5];
                let scan = |kind: ValueKind| {
                    kind.parse_literal(literal).map_err(|source| BinError::Literal {
                        literal: literal.clone(),
                        source,
                    })
                };
                let value = scan(kind)?;
                let echo = match kind {
                    ValueKind::Boolean => scan(ValueKind::Byte)?,
                    _ => value.clone(),
                };
                ClientAction::Write { value, echo }
            }
        };

        Ok(ClientRequest {
            endpoint: operands[0].clone(),
            node_id,
            kind,
            action,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn node_id(namespace: &str, identifier: &str) -> BinResult<NodeId> {
    NodeId::from_operands(namespace, identifier).map_err(|source| BinError::Namespace {
        text: namespace.to_string(),
        source,
    })
}

fn value_kind(token: &str, set: TokenSet) -> BinResult<ValueKind> {
    ValueKind::from_token(token, set).map_err(|source| BinError::DataType {
        token: token.to_string(),
        source,
    })
}

// =============================================================================
// Tests
// =============================================================================

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session lifecycle for one invocation.
//!
//! ```text
//! Start ──► Parsed ──► Connected ──► OperationComplete ──► Closed
//!   │          │           │
//!   └──────────┴───────────┴──────────────────────────────► ClosedWithError
//! ```
//!
//! Each run walks this machine once. [`SessionRuntime`] owns the transport
//! and disconnects it on every path that reached `Connected`.

use std::fmt;

use tracing::{debug, info, warn};
use uavar_opcua::OpcUaTransport;

use crate::error::{BinError, BinResult};

// =============================================================================
// RunState
// =============================================================================

/// Lifecycle state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing validated yet.
    Start,
    /// Operands validated.
    Parsed,
    /// Session established.
    Connected,
    /// The single read or write has returned.
    OperationComplete,
    /// Session released after a completed operation.
    Closed,
    /// Ended by an error.
    ClosedWithError,
}

impl RunState {
    /// Returns `true` if `next` is a legal successor.
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Start, Parsed)
                | (Parsed, Connected)
                | (Connected, OperationComplete)
                | (OperationComplete, Closed)
                | (Start | Parsed | Connected, ClosedWithError)
        )
    }

    /// Returns `true` once the run has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::ClosedWithError)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Parsed => "parsed",
            Self::Connected => "connected",
            Self::OperationComplete => "operation_complete",
            Self::Closed => "closed",
            Self::ClosedWithError => "closed_with_error",
        };
        f.write_str(name)
    }
}

// =============================================================================
// SessionRuntime
// =============================================================================

/// Drives one transport through the run state machine.
pub struct SessionRuntime<T: OpcUaTransport> {
    transport: T,
    state: RunState,
    session_open: bool,
}

impl<T: OpcUaTransport> SessionRuntime<T> {
    /// Wraps a transport for an already validated request.
    pub fn new(transport: T) -> Self {
        let mut runtime = Self {
            transport,
            state: RunState::Start,
            session_open: false,
        };
        runtime.advance(RunState::Parsed);
        runtime
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Establishes the session.
    pub async fn connect(&mut self) -> BinResult<()> {
        let endpoint = self.transport.endpoint().to_string();
        info!(endpoint = %endpoint, "Connecting");

        match self.transport.connect().await {
            Ok(()) => {
                self.session_open = true;
                self.advance(RunState::Connected);
                Ok(())
            }
            Err(e) => {
                e.log_outcome("connect");
                self.advance(RunState::ClosedWithError);
                Err(BinError::connection(endpoint, e))
            }
        }
    }

    /// Marks the operation as returned.
    pub fn complete(&mut self) {
        self.advance(RunState::OperationComplete);
    }

    /// Releases the session and ends the run.
    ///
    /// Disconnect failures are logged at debug and otherwise ignored.
    pub async fn close(&mut self) {
        if self.session_open {
            if let Err(e) = self.transport.disconnect().await {
                e.log_outcome("disconnect");
            }
            self.session_open = false;
        }

        if self.state == RunState::OperationComplete {
            self.advance(RunState::Closed);
        } else if !self.state.is_terminal() {
            self.advance(RunState::ClosedWithError);
        }
    }

    fn advance(&mut self, next: RunState) {
        if self.state.can_transition_to(next) {
            debug!(from = %self.state, to = %next, "Run state");
            self.state = next;
        } else {
            warn!(from = %self.state, to = %next, "Ignoring illegal run state transition");
        }
    }
}

impl<T: OpcUaTransport> Drop for SessionRuntime<T> {
    fn drop(&mut self) {
        if self.session_open {
            warn!(endpoint = self.transport.endpoint(), "Session dropped without close");
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

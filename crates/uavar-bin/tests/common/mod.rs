// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Shared harness for the command tests: an in-memory server, a transport
//! that talks to it, and a runner that captures stdout/stderr.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use uavar_bin::{execute_client, execute_getvar, Console};
use uavar_opcua::{
    ConnectionError, NodeId, OpcUaConfig, OpcUaError, OpcUaResult, OpcUaTransport, OpcUaValue,
    ReadResult, SessionState, WriteResult,
};

// =============================================================================
// MockServer
// =============================================================================

#[derive(Default)]
struct ServerState {
    values: HashMap<String, OpcUaValue>,
    refuse_connections: bool,
    read_status: Option<u32>,
    write_status: Option<u32>,
    connects: u32,
    disconnects: u32,
    reads: u32,
    writes: u32,
    last_config: Option<OpcUaConfig>,
}

/// In-memory node store shared by every transport it hands out.
#[derive(Clone, Default)]
pub struct MockServer {
    state: Arc<Mutex<ServerState>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, ns: u16, id: &str, value: OpcUaValue) -> Self {
        self.set(ns, id, value);
        self
    }

    pub fn set(&self, ns: u16, id: &str, value: OpcUaValue) {
        self.state
            .lock()
            .unwrap()
            .values
            .insert(NodeId::new(ns, id).to_string(), value);
    }

    pub fn value(&self, ns: u16, id: &str) -> Option<OpcUaValue> {
        self.state
            .lock()
            .unwrap()
            .values
            .get(&NodeId::new(ns, id).to_string())
            .cloned()
    }

    pub fn refuse_connections(self) -> Self {
        self.state.lock().unwrap().refuse_connections = true;
        self
    }

    pub fn reject_reads(self, status: u32) -> Self {
        self.state.lock().unwrap().read_status = Some(status);
        self
    }

    pub fn reject_writes(self, status: u32) -> Self {
        self.state.lock().unwrap().write_status = Some(status);
        self
    }

    pub fn connects(&self) -> u32 {
        self.state.lock().unwrap().connects
    }

    pub fn disconnects(&self) -> u32 {
        self.state.lock().unwrap().disconnects
    }

    pub fn reads(&self) -> u32 {
        self.state.lock().unwrap().reads
    }

    pub fn writes(&self) -> u32 {
        self.state.lock().unwrap().writes
    }

    pub fn last_config(&self) -> Option<OpcUaConfig> {
        self.state.lock().unwrap().last_config.clone()
    }

    /// Transport constructor for the `execute_*` entry points.
    pub fn connector(&self) -> impl FnOnce(OpcUaConfig) -> MockTransport {
        let server = self.clone();
        move |config| {
            server.state.lock().unwrap().last_config = Some(config.clone());
            MockTransport {
                server,
                config,
                connected: false,
            }
        }
    }
}

// =============================================================================
// MockTransport
// =============================================================================

pub struct MockTransport {
    server: MockServer,
    config: OpcUaConfig,
    connected: bool,
}

impl MockTransport {
    fn shared(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.server.state.lock().unwrap()
    }
}

#[async_trait]
impl OpcUaTransport for MockTransport {
    async fn connect(&mut self) -> OpcUaResult<()> {
        let refused = {
            let mut state = self.shared();
            state.connects += 1;
            state.refuse_connections
        };
        if refused {
            return Err(OpcUaError::connection(ConnectionError::refused(
                self.config.endpoint.clone(),
                "connection refused",
            )));
        }
        self.config.validate().map_err(|e| {
            OpcUaError::connection(ConnectionError::invalid_endpoint(
                self.config.endpoint.clone(),
                e.to_string(),
            ))
        })?;
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> OpcUaResult<()> {
        self.shared().disconnects += 1;
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn state(&self) -> SessionState {
        if self.connected {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    async fn read_value(&self, node_id: &NodeId) -> OpcUaResult<ReadResult> {
        let mut state = self.shared();
        state.reads += 1;
        if let Some(status) = state.read_status {
            return Ok(ReadResult::bad(node_id.clone(), status));
        }
        Ok(match state.values.get(&node_id.to_string()) {
            Some(value) => ReadResult::good(node_id.clone(), value.clone()),
            None => ReadResult::bad(node_id.clone(), 0x8034_0000),
        })
    }

    async fn write_value(&self, node_id: &NodeId, value: OpcUaValue) -> OpcUaResult<WriteResult> {
        let mut state = self.shared();
        state.writes += 1;
        if let Some(status) = state.write_status {
            return Ok(WriteResult::rejected(node_id.clone(), status));
        }
        state.values.insert(node_id.to_string(), value);
        Ok(WriteResult::accepted(node_id.clone()))
    }


    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Captured result of one invocation.
#[derive(Debug)]
pub struct Outcome {
    pub code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Outcome {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

pub async fn run_getvar(server: &MockServer, args: &[&str]) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv = std::iter::once("getvar").chain(args.iter().copied());
    let code = {
        let mut console = Console::new(&mut stdout, &mut stderr);
        execute_getvar(argv, server.connector(), &mut console).await
    };
    Outcome {
        code,
        stdout,
        stderr,
    }
}

/// Writer appending into a shared buffer.
pub struct SharedBuffer(pub Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A stream whose every write fails, like a closed pipe.
pub struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

/// Runs `getvar` with `stdout` as the data stream; returns the exit code.
pub async fn run_getvar_to(server: &MockServer, args: &[&str], stdout: &mut dyn Write) -> i32 {
    let mut stderr = Vec::new();
    let argv = std::iter::once("getvar").chain(args.iter().copied());
    let mut console = Console::new(stdout, &mut stderr);
    execute_getvar(argv, server.connector(), &mut console).await
}

pub async fn run_client(server: &MockServer, args: &[&str]) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv = std::iter::once("si-opc-ua-client").chain(args.iter().copied());
    let code = {
        let mut console = Console::new(&mut stdout, &mut stderr);
        execute_client(argv, server.connector(), &mut console).await
    };
    Outcome {
        code,
        stdout,
        stderr,
    }
}

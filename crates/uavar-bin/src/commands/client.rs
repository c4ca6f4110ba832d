// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `si-opc-ua-client`: read or write one node.

use tracing::instrument;
use uavar_opcua::{read_node, write_node, OpcUaConfig, OpcUaTransport, OperationResult};

use crate::cli::{ClientAction, ClientCli, ClientRequest};
use crate::config::Settings;
use crate::error::{BinError, BinResult};
use crate::output::{render_client_read, render_client_write, Console};
use crate::runtime::SessionRuntime;

/// Runs `si-opc-ua-client`.
///
/// All operands, including a write literal, are validated before connecting.
/// A read without a usable value prints `XXX_NOVALUE` and still succeeds.
#[instrument(skip_all)]
pub async fn client<T, F>(
    cli: &ClientCli,
    settings: &Settings,
    connect: F,
    console: &mut Console<'_>,
) -> BinResult<()>
where
    T: OpcUaTransport,
    F: FnOnce(OpcUaConfig) -> T,
{
    let request = cli.request()?;

    let mut runtime = SessionRuntime::new(connect(settings.opcua_config(&request.endpoint)));
    runtime.connect().await?;

    let outcome = perform(&mut runtime, &request, console).await;
    runtime.close().await;
    outcome
}

async fn perform<T: OpcUaTransport>(
    runtime: &mut SessionRuntime<T>,
    request: &ClientRequest,
    console: &mut Console<'_>,
) -> BinResult<()> {
    let result = match &request.action {
        ClientAction::Read => read_node(runtime.transport(), &request.node_id, request.kind).await,
        ClientAction::Write { value, .. } => {
            write_node(runtime.transport(), &request.node_id, value).await
        }
    };
    runtime.complete();

    match &request.action {
        ClientAction::Read => render_client_read(&result, console)?,
        ClientAction::Write { echo, .. } => render_client_write(&result, echo, console)?,
    }
    console.flush()?;

    match result {
        OperationResult::WriteRejected { status } => Err(BinError::WriteRejected { status }),
        OperationResult::ResourceExhausted => Err(BinError::OutOfMemory),
        _ => Ok(()),
    }
}

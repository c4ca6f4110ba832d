// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `getvar`: read one node and record the value in the output file.

use std::io::Write;

use tracing::{debug, instrument, warn};
use uavar_opcua::{read_node, OpcUaConfig, OpcUaTransport, OperationResult};

use crate::cli::{GetVarCli, ReadRequest};
use crate::config::Settings;
use crate::error::{BinError, BinResult};
use crate::output::{render_getvar, Console, OutputFile};
use crate::runtime::SessionRuntime;

/// Runs `getvar`.
///
/// Checks run in this order: operand count, output file, namespace index,
/// type token, connection. From the output file onward every failure leaves
/// the `XXX-NO-VALUE` sentinel in the file.
#[instrument(skip_all)]
pub async fn getvar<T, F>(
    cli: &GetVarCli,
    settings: &Settings,
    connect: F,
    console: &mut Console<'_>,
) -> BinResult<()>
where
    T: OpcUaTransport,
    F: FnOnce(OpcUaConfig) -> T,
{
    let operands = cli.operands()?;

    let path = settings.output_file(cli.output.as_deref());
    debug!(path = %path.display(), "Opening output file");
    let mut file = OutputFile::create(&path).map_err(|e| BinError::output_file(&path, e))?;

    let request = match operands.resolve() {
        Ok(request) => request,
        Err(e) => return Err(abandon(file, e)),
    };

    let mut runtime = SessionRuntime::new(connect(settings.opcua_config(&request.endpoint)));
    if let Err(e) = runtime.connect().await {
        return Err(abandon(file, e));
    }

    let outcome = read_and_record(&mut runtime, &request, console, file).await;
    runtime.close().await;
    outcome
}

async fn read_and_record<T: OpcUaTransport>(
    runtime: &mut SessionRuntime<T>,
    request: &ReadRequest,
    console: &mut Console<'_>,
    mut file: OutputFile,
) -> BinResult<()> {
    let announced = writeln!(
        console.out,
        "Reading the value of node ({}, {})...",
        request.node_id.namespace_index, request.node_id.identifier
    );
    if let Err(e) = announced {
        return Err(abandon(file, e.into()));
    }

    let result = read_node(runtime.transport(), &request.node_id, request.kind).await;
    runtime.complete();

    if let Err(e) = render_getvar(&result, console).and_then(|()| console.flush()) {
        return Err(abandon(file, e.into()));
    }

    let path = file.path().to_path_buf();
    file.record(&result)
        .and_then(|()| file.finish().map(drop))
        .map_err(|e| BinError::output_file(&path, e))?;

    match result {
        OperationResult::Success(_) => Ok(()),
        OperationResult::ResourceExhausted => Err(BinError::OutOfMemory),
        _ => Err(BinError::NoValue),
    }
}

/// Leaves the sentinel behind and returns `error`.
fn abandon(mut file: OutputFile, error: BinError) -> BinError {
    let path = file.path().to_path_buf();
    let written = file.write_no_value().and_then(|()| file.finish().map(drop));
    if let Err(e) = written {
        warn!(path = %path.display(), error = %e, "Could not write sentinel");
    }
    error
}

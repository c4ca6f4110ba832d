// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command implementations and the process-level entry points.
//!
//! - `getvar`: read one node, print it and record it in the output file
//! - `client`: read or write one node (`si-opc-ua-client`)
//!
//! [`execute_getvar`] and [`execute_client`] take the raw argument list and a
//! transport constructor, and return the process exit code. The binaries pass
//! `RealOpcUaTransport::new`; tests pass an in-memory transport.

mod client;
mod getvar;

pub use client::client;
pub use getvar::getvar;

use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use uavar_opcua::{OpcUaConfig, OpcUaTransport};

use crate::cli::{ClientCli, CommonArgs, GetVarCli};
use crate::config::Settings;
use crate::error::{report_error, BinError, BinResult, Program};
use crate::logging::init_logging;
use crate::output::Console;

/// Runs `getvar` with `args` (program name first) and returns the exit code.
pub async fn execute_getvar<I, A, T, F>(args: I, connect: F, console: &mut Console<'_>) -> i32
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
    T: OpcUaTransport,
    F: FnOnce(OpcUaConfig) -> T,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let argv0 = invoked_name(&args, Program::GetVar);

    let result = match parse::<GetVarCli>(&args, console) {
        Ok(Some(cli)) => match prepare(&cli.common) {
            Ok(settings) => getvar(&cli, &settings, connect, console).await,
            Err(e) => Err(e),
        },
        Ok(None) => return 0,
        Err(e) => Err(e),
    };

    finish(Program::GetVar, &argv0, result, console)
}

/// Runs `si-opc-ua-client` with `args` (program name first) and returns the exit code.
pub async fn execute_client<I, A, T, F>(args: I, connect: F, console: &mut Console<'_>) -> i32
where
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
    T: OpcUaTransport,
    F: FnOnce(OpcUaConfig) -> T,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let argv0 = invoked_name(&args, Program::Client);

    let result = match parse::<ClientCli>(&args, console) {
        Ok(Some(cli)) => match prepare(&cli.common) {
            Ok(settings) => client(&cli, &settings, connect, console).await,
            Err(e) => Err(e),
        },
        Ok(None) => return 0,
        Err(e) => Err(e),
    };

    finish(Program::Client, &argv0, result, console)
}

/// Parses options; `Ok(None)` means help or version was printed.
fn parse<C: Parser>(args: &[OsString], console: &mut Console<'_>) -> BinResult<Option<C>> {
    match C::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(console.out, "{}", e)?;
            console.out.flush()?;
            Ok(None)
        }
        Err(e) => Err(BinError::Cli(e)),
    }
}

/// Starts logging and loads the configuration file.
fn prepare(common: &CommonArgs) -> BinResult<Settings> {
    init_logging(&common.log_level, common.log_format);
    Settings::load(common.config.as_deref())
}

fn finish(program: Program, argv0: &str, result: BinResult<()>, console: &mut Console<'_>) -> i32 {
    let code = match result {
        Ok(()) => 0,
        Err(e) => {
            debug!(program = program.name(), error = %e, "Invocation failed");
            if let Err(io) = report_error(program, argv0, &e, console) {
                debug!(error = %io, "Could not report error");
            }
            e.exit_code(program)
        }
    };
    let _ = console.flush();
    code
}

fn invoked_name(args: &[OsString], program: Program) -> String {
    args.first()
        .map(|arg| arg.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.name().to_string())
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! getvar - read one OPC UA node and record its value.

use std::io;

use uavar_bin::{execute_getvar, Console};
use uavar_opcua::RealOpcUaTransport;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut out = io::stdout();
    let mut err = io::stderr();
    let mut console = Console::new(&mut out, &mut err);

    let code = execute_getvar(std::env::args_os(), RealOpcUaTransport::new, &mut console).await;
    std::process::exit(code)
}

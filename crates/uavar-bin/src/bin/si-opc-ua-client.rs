// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! si-opc-ua-client - read or write one OPC UA node.

use std::io;

use uavar_bin::{execute_client, Console};
use uavar_opcua::RealOpcUaTransport;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let mut out = io::stdout();
    let mut err = io::stderr();
    let mut console = Console::new(&mut out, &mut err);

    let code = execute_client(std::env::args_os(), RealOpcUaTransport::new, &mut console).await;
    std::process::exit(code)
}

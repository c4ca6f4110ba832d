// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Diagnostic logging on stderr.
//!
//! stdout carries values only. The filter comes from `UAVAR_LOG`, then
//! `RUST_LOG`, then the `--log-level` option.

use std::io::IsTerminal;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV: &str = "UAVAR_LOG";

/// Installs the global subscriber. Later calls keep the first one.
///
/// ```ignore
/// uavar_bin::init_logging("debug", uavar_bin::cli::LogFormat::Compact);
/// ```
pub fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level_filter(level).into()));
    let ansi = std::io::stderr().is_terminal();

    let text = (format == LogFormat::Text).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(ansi)
    });
    let compact = (format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(ansi)
    });
    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(true)
            .with_line_number(true)
            .with_current_span(true)
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(compact)
        .with(json)
        .try_init();
}

/// Maps a `--log-level` value to a filter; anything unrecognized is `WARN`.
pub fn level_filter(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => LevelFilter::WARN,
        other => other.parse().unwrap_or(LevelFilter::WARN),
    }
}

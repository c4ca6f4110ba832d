// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Output sinks and the per-program rendering of operation outcomes.
//!
//! Both programs write to a [`Console`] (stdout/stderr pair). `getvar`
//! additionally writes exactly one line to an [`OutputFile`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use uavar_opcua::{OperationResult, TypedValue};

// =============================================================================
// Sentinels
// =============================================================================

/// `getvar` placeholder for a missing value (stdout and output file).
pub const GETVAR_NO_VALUE: &str = "XXX-NO-VALUE";

/// `si-opc-ua-client` placeholder for a missing value.
pub const NO_VALUE: &str = "XXX_NOVALUE";

/// `si-opc-ua-client` marker for a rejected write.
pub const NO_WRITE: &str = "XXX_NOWRITE";

/// `si-opc-ua-client` marker for a failed connection.
pub const WRONG_CONNECTION: &str = "WRONG_CONNECTION";

/// `si-opc-ua-client` marker for a failed string buffer allocation.
pub const NOT_ENOUGH_MEMORY: &str = "XXX_NOT_ENOUGH_MEMORY";

// =============================================================================
// Console
// =============================================================================

/// The stdout/stderr pair a command reports to.
pub struct Console<'a> {
    /// Data stream.
    pub out: &'a mut dyn Write,
    /// Diagnostics stream.
    pub err: &'a mut dyn Write,
}

impl<'a> Console<'a> {
    /// Creates a console over the given streams.
    pub fn new(out: &'a mut dyn Write, err: &'a mut dyn Write) -> Self {
        Self { out, err }
    }

    /// Flushes both streams.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.err.flush()
    }
}

// =============================================================================
// OutputFile
// =============================================================================

/// The one-line value file written by `getvar`.
///
/// The file is created (truncated) before any network work so that every
/// later failure can still leave a sentinel behind.
pub struct OutputFile<W: Write = BufWriter<File>> {
    path: PathBuf,
    writer: W,
}

impl OutputFile {
    /// Creates or truncates the file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(path, BufWriter::new(file)))
    }
}

impl<W: Write> OutputFile<W> {
    /// Wraps an arbitrary writer.
    pub fn from_writer(path: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    /// Path the file was opened at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the bare value line.
    pub fn write_value(&mut self, value: &TypedValue) -> io::Result<()> {
        value.write_to(&mut self.writer)?;
        self.writer.write_all(b"\n")
    }

    /// Writes the no-value sentinel line.
    pub fn write_no_value(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}", GETVAR_NO_VALUE)
    }

    /// Writes the line for a read outcome: the value, or the sentinel.
    pub fn record(&mut self, result: &OperationResult) -> io::Result<()> {
        match result.value() {
            Some(value) => self.write_value(value),
            None => self.write_no_value(),
        }
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Renders a `getvar` read outcome on the console.
///
/// The output file line is written separately with [`OutputFile::record`].
pub fn render_getvar(result: &OperationResult, console: &mut Console<'_>) -> io::Result<()> {
    if let OperationResult::TypeMismatch { actual } = result {
        writeln!(console.out, "Actual type: {}.", actual)?;
    }

    match result {
        OperationResult::Success(value) => {
            console.out.write_all(b"The value is ")?;
            value.write_to(&mut *console.out)?;
            console.out.write_all(b".\n")
        }
        OperationResult::ResourceExhausted => Ok(()),
        _ => writeln!(console.out, "{}", GETVAR_NO_VALUE),
    }
}

/// Renders a `si-opc-ua-client` read outcome.
pub fn render_client_read(result: &OperationResult, console: &mut Console<'_>) -> io::Result<()> {
    if let OperationResult::TypeMismatch { actual } = result {
        writeln!(console.out, "Actual type: {}.", actual)?;
    }

    match result {
        OperationResult::Success(value) => {
            value.write_to(&mut *console.out)?;
            console.out.write_all(b"\n")?;
            console.err.write_all(b"READ: ")?;
            value.write_to(&mut *console.err)?;
            console.err.write_all(b"\n")
        }
        OperationResult::ResourceExhausted => {
            writeln!(console.out, "{}", NOT_ENOUGH_MEMORY)?;
            writeln!(console.err, "{}", NOT_ENOUGH_MEMORY)
        }
        _ => {
            writeln!(console.out, "{}", NO_VALUE)?;
            writeln!(console.err, "{}", NO_VALUE)
        }
    }
}

/// Renders a `si-opc-ua-client` write outcome; success echoes `echo`.
pub fn render_client_write(
    result: &OperationResult,
    echo: &TypedValue,
    console: &mut Console<'_>,
) -> io::Result<()> {
    match result {
        OperationResult::Success(_) => {
            console.err.write_all(b"WROTE: ")?;
            echo.write_to(&mut *console.err)?;
            console.err.write_all(b"\n")
        }
        _ => writeln!(console.err, "{}", NO_WRITE),
    }
}

// =============================================================================
// Tests
// =============================================================================

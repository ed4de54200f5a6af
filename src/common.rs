// Licensed under the Apache-2.0 license

//! Crate-wide helpers shared by the peripheral drivers.
//!
//! Drivers never print on their own. They are generic over a [`Logger`] and the
//! board decides where messages go: nowhere ([`NoOpLogger`]) or to a byte sink
//! such as a UART ([`IoLogger`]).

use core::fmt::{self, Write as _};

/// Sink for driver diagnostics.
pub trait Logger {
    fn debug(&mut self, args: fmt::Arguments<'_>);
    fn warn(&mut self, args: fmt::Arguments<'_>);
    fn error(&mut self, args: fmt::Arguments<'_>);
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: fmt::Arguments<'_>) {}
    fn warn(&mut self, _args: fmt::Arguments<'_>) {}
    fn error(&mut self, _args: fmt::Arguments<'_>) {}
}

/// Logger writing one line per message to an `embedded_io::Write` sink.
///
/// Write errors from the sink are dropped: a broken console must not turn a
/// register access into a failure.
pub struct IoLogger<W: embedded_io::Write> {
    writer: W,
}

impl<W: embedded_io::Write> IoLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, level: &str, args: fmt::Arguments<'_>) {
        let mut adapter = FmtAdapter(&mut self.writer);
        let _ = write!(adapter, "[{level}] {args}\r\n");
    }
}

impl<W: embedded_io::Write> Logger for IoLogger<W> {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.line("DEBUG", args);
    }

    fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.line("WARN", args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.line("ERROR", args);
    }
}

struct FmtAdapter<'a, W: embedded_io::Write>(&'a mut W);

impl<W: embedded_io::Write> fmt::Write for FmtAdapter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

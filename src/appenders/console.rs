//! Console mirroring
//!
//! [`ConsoleMirror`] wraps a file sink and duplicates each line to the
//! terminal. The info stream mirrors to stdout but skips Warn and above,
//! since those records also reach the error stream, which mirrors to
//! stderr.

use crate::core::{Appender, LogLevel, Result};
#[cfg(feature = "console")]
use colored::Colorize;
use std::io::Write;

/// Terminal stream a mirror writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

impl ConsoleStream {
    /// Whether a record at `level` is shown on this stream
    pub fn accepts(&self, level: LogLevel) -> bool {
        match self {
            ConsoleStream::Stdout => !level.is_error_stream(),
            ConsoleStream::Stderr => true,
        }
    }
}

pub struct ConsoleMirror<A> {
    inner: A,
    stream: ConsoleStream,
    use_colors: bool,
    name: String,
}

impl<A: Appender> ConsoleMirror<A> {
    pub fn new(inner: A, stream: ConsoleStream) -> Self {
        let name = format!("{}+console", inner.name());
        Self {
            inner,
            stream,
            use_colors: true,
            name,
        }
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    #[cfg(feature = "console")]
    fn render(&self, level: LogLevel, line: &str) -> String {
        if self.use_colors {
            line.color(level.color_code()).to_string()
        } else {
            line.to_string()
        }
    }

    #[cfg(not(feature = "console"))]
    fn render(&self, _level: LogLevel, line: &str) -> String {
        line.to_string()
    }

    fn mirror(&self, level: LogLevel, bytes: &[u8]) {
        if !self.stream.accepts(level) {
            return;
        }
        let text = String::from_utf8_lossy(bytes);
        let output = self.render(level, text.trim_end_matches('\n'));

        // Terminal write failures never affect the file stream
        let _ = match self.stream {
            ConsoleStream::Stdout => writeln!(std::io::stdout().lock(), "{}", output),
            ConsoleStream::Stderr => writeln!(std::io::stderr().lock(), "{}", output),
        };
    }
}

impl<A: Appender> Appender for ConsoleMirror<A> {
    fn append(&self, level: LogLevel, bytes: &[u8]) -> Result<()> {
        let result = self.inner.append(level, bytes);
        self.mirror(level, bytes);
        result
    }

    fn flush(&self) -> Result<()> {
        let result = self.inner.flush();
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        result
    }

    fn close(&self) -> Result<()> {
        self.inner.close()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

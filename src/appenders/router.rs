//! Dual-stream routing
//!
//! Every record goes to the info sink; Warn and above are mirrored into
//! the error sink as well.

use super::buffered::{BufferPolicy, BufferedSink};
use super::console::{ConsoleMirror, ConsoleStream};
use super::file::{open_append, DailyPaths};
use crate::core::{Appender, LogLevel, Result};

/// How the two sinks of a router are built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkOptions {
    pub buffer: BufferPolicy,
    /// Mirror the info stream to stdout and the error stream to stderr
    pub console: bool,
    pub use_colors: bool,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            buffer: BufferPolicy::default(),
            console: true,
            use_colors: true,
        }
    }
}

pub struct DualStreamRouter {
    info: Box<dyn Appender>,
    error: Box<dyn Appender>,
}

impl DualStreamRouter {
    pub fn new(info: Box<dyn Appender>, error: Box<dyn Appender>) -> Self {
        Self { info, error }
    }

    /// Open both daily files and wrap each in its own buffered sink
    pub fn open(paths: &DailyPaths, options: &SinkOptions) -> Result<Self> {
        let info_file = open_append(&paths.info)?;
        let error_file = open_append(&paths.error)?;

        let info = BufferedSink::new(
            paths.info.display().to_string(),
            info_file,
            options.buffer,
        )?;
        let error = BufferedSink::new(
            paths.error.display().to_string(),
            error_file,
            options.buffer,
        )?;

        if options.console {
            Ok(Self::new(
                Box::new(
                    ConsoleMirror::new(info, ConsoleStream::Stdout).with_colors(options.use_colors),
                ),
                Box::new(
                    ConsoleMirror::new(error, ConsoleStream::Stderr).with_colors(options.use_colors),
                ),
            ))
        } else {
            Ok(Self::new(Box::new(info), Box::new(error)))
        }
    }

    fn both<F>(&self, mut op: F) -> Result<()>
    where
        F: FnMut(&dyn Appender) -> Result<()>,
    {
        let info = op(self.info.as_ref());
        let error = op(self.error.as_ref());
        info.and(error)
    }
}

impl Appender for DualStreamRouter {
    /// Both sinks are attempted; the first failure is returned
    fn append(&self, level: LogLevel, bytes: &[u8]) -> Result<()> {
        let info = self.info.append(level, bytes);
        if level.is_error_stream() {
            let error = self.error.append(level, bytes);
            return info.and(error);
        }
        info
    }

    fn flush(&self) -> Result<()> {
        self.both(|sink| sink.flush())
    }

    fn close(&self) -> Result<()> {
        self.both(|sink| sink.close())
    }

    fn name(&self) -> &str {
        "dual-stream"
    }
}

//! Write path: buffering, console mirroring, daily files and routing

pub mod buffered;
pub mod console;
pub mod file;
pub mod rotating_file;
pub mod router;

pub use buffered::{BufferPolicy, BufferedSink, DEFAULT_BUFFER_SIZE, DEFAULT_FLUSH_INTERVAL};
pub use console::{ConsoleMirror, ConsoleStream};
pub use file::{open_append, DailyPaths, LogFileNaming, StreamKind};
pub use rotating_file::RotationCoordinator;
pub use router::{DualStreamRouter, SinkOptions};

pub use crate::core::Appender;

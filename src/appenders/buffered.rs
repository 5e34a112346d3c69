//! Buffered sink with size, level and timer flush triggers
//!
//! With a capacity of zero every write goes straight to the destination.
//! Otherwise writes accumulate in memory and are flushed when:
//!
//! - the buffered length reaches the capacity,
//! - the record's level is at or above `flush_on_level`,
//! - the periodic timer fires (only when `flush_interval` is non-zero),
//! - [`flush`](Appender::flush) or [`close`](Appender::close) is called.
//!
//! A write that would overflow the capacity flushes the existing contents
//! first, so the buffer never holds more than `capacity` bytes once a
//! write has returned successfully.

use crate::core::{Appender, LogLevel, LoggerError, PeriodicTask, Result};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Default buffer capacity in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default interval of the auto-flush timer
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

/// Flush policy of a [`BufferedSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPolicy {
    /// Bytes held before a size-triggered flush; 0 disables buffering
    pub capacity: usize,
    /// Auto-flush period; zero disables the timer
    pub flush_interval: Duration,
    /// Records at or above this level flush immediately
    pub flush_on_level: LogLevel,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BUFFER_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            flush_on_level: LogLevel::Error,
        }
    }
}

impl BufferPolicy {
    pub fn unbuffered() -> Self {
        Self {
            capacity: 0,
            flush_interval: Duration::ZERO,
            flush_on_level: LogLevel::Error,
        }
    }

    pub fn is_buffered(&self) -> bool {
        self.capacity > 0
    }
}

struct BufferState {
    buffer: Vec<u8>,
    destination: Box<dyn Write + Send>,
    closed: bool,
}

struct SinkInner {
    name: String,
    policy: BufferPolicy,
    state: Mutex<BufferState>,
}

impl SinkInner {
    /// Write the buffer out in one call; the buffer is kept on failure
    fn flush_locked(&self, state: &mut BufferState) -> Result<()> {
        if state.buffer.is_empty() {
            return Ok(());
        }

        let BufferState {
            buffer,
            destination,
            ..
        } = state;
        destination
            .write_all(buffer)
            .and_then(|()| destination.flush())
            .map_err(|e| LoggerError::flush(&self.name, e.to_string()))?;

        buffer.clear();
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.flush_locked(&mut state)
    }
}

/// Byte buffer in front of a destination stream
pub struct BufferedSink {
    inner: Arc<SinkInner>,
    timer: Mutex<Option<PeriodicTask>>,
}

impl BufferedSink {
    /// Wrap `destination`; starts the auto-flush timer when the policy asks for one
    pub fn new<W>(name: impl Into<String>, destination: W, policy: BufferPolicy) -> Result<Self>
    where
        W: Write + Send + 'static,
    {
        let name = name.into();
        let inner = Arc::new(SinkInner {
            name: name.clone(),
            policy,
            state: Mutex::new(BufferState {
                buffer: Vec::with_capacity(policy.capacity),
                destination: Box::new(destination),
                closed: false,
            }),
        });

        let timer = if policy.is_buffered() && !policy.flush_interval.is_zero() {
            let flushed = Arc::clone(&inner);
            let task = PeriodicTask::spawn(
                format!("{}-flush", name),
                policy.flush_interval,
                false,
                move || {
                    if let Err(e) = flushed.flush() {
                        eprintln!("[LOGGER ERROR] Periodic flush failed: {}", e);
                    }
                },
            )?;
            Some(task)
        } else {
            None
        };

        Ok(Self {
            inner,
            timer: Mutex::new(timer),
        })
    }

    pub fn policy(&self) -> BufferPolicy {
        self.inner.policy
    }

    /// Bytes currently held in memory
    pub fn buffered_len(&self) -> usize {
        self.inner.state.lock().buffer.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    fn write_through(&self, state: &mut BufferState, bytes: &[u8]) -> Result<()> {
        state
            .destination
            .write_all(bytes)
            .map_err(|e| LoggerError::flush(&self.inner.name, e.to_string()))
    }
}

impl Appender for BufferedSink {
    fn append(&self, level: LogLevel, bytes: &[u8]) -> Result<()> {
        let policy = self.inner.policy;
        let mut state = self.inner.state.lock();
        if state.closed {
            return Err(LoggerError::LoggerStopped);
        }

        if !policy.is_buffered() {
            return self.write_through(&mut state, bytes);
        }

        if !state.buffer.is_empty() && state.buffer.len() + bytes.len() > policy.capacity {
            self.inner.flush_locked(&mut state)?;
        }

        state.buffer.extend_from_slice(bytes);

        if level >= policy.flush_on_level || state.buffer.len() >= policy.capacity {
            self.inner.flush_locked(&mut state)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    /// Stop the timer, then flush whatever is left
    ///
    /// Later calls return `Ok(())` without touching the destination.
    fn close(&self) -> Result<()> {
        // Never join the timer while holding the buffer lock: its tick takes it
        if let Some(timer) = self.timer.lock().take() {
            timer.stop();
        }

        let mut state = self.inner.state.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        self.inner.flush_locked(&mut state)
    }

    fn name(&self) -> &str {
        &self.inner.name
    }
}

impl Drop for BufferedSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to flush '{}' on drop: {}", self.inner.name, e);
        }
    }
}

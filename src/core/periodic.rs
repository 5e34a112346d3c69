//! Cancellable background tasks
//!
//! Used for the buffer auto-flush timer and the daily retention sweep.
//! Each task owns one named thread that waits on a ticker and a stop
//! channel; stopping disconnects the channel and joins the thread, so a
//! task that is mid-run finishes its current iteration first.

use super::error::{LoggerError, Result};
use crossbeam_channel::{bounded, select, tick, Sender};
use parking_lot::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct PeriodicTask {
    name: String,
    stop_signal: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicTask {
    /// Spawn a thread running `task` every `interval`
    ///
    /// With `run_immediately` the task also runs once before the first tick.
    /// A zero interval is rejected.
    pub fn spawn<F>(
        name: impl Into<String>,
        interval: Duration,
        run_immediately: bool,
        mut task: F,
    ) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        if interval.is_zero() {
            return Err(LoggerError::config(
                "PeriodicTask",
                format!("interval for '{}' must be greater than zero", name),
            ));
        }

        let (stop_tx, stop_rx) = bounded::<()>(0);
        let ticker = tick(interval);

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                if run_immediately {
                    task();
                }
                loop {
                    select! {
                        recv(ticker) -> _ => task(),
                        // Disconnection is the stop signal
                        recv(stop_rx) -> _ => break,
                    }
                }
            })
            .map_err(|e| LoggerError::io_operation("spawning background task", name.clone(), e))?;

        Ok(Self {
            name,
            stop_signal: Mutex::new(Some(stop_tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signal the task to stop and wait for it
    ///
    /// Safe to call more than once. When called from the task's own thread
    /// the thread is signalled but not joined.
    pub fn stop(&self) {
        drop(self.stop_signal.lock().take());

        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            eprintln!("[LOGGER ERROR] Background task '{}' panicked", self.name);
        }
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_runs_on_every_tick() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = PeriodicTask::spawn("test-tick", Duration::from_millis(10), false, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        task.stop();
        assert!(runs.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn test_run_immediately() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = PeriodicTask::spawn("test-immediate", Duration::from_secs(3600), true, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while runs.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        task.stop();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_is_idempotent_and_halts_ticks() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = PeriodicTask::spawn("test-stop", Duration::from_millis(5), false, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        task.stop();
        task.stop();
        assert!(!task.is_running());

        let after_stop = runs.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = PeriodicTask::spawn("test-zero", Duration::ZERO, false, || {});
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }
}

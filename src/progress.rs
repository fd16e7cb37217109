//! Live progress output.
//!
//! A background thread polls a [`JobTracker`] and writes every new log entry
//! to a sink (stdout for the CLI). Stopping the printer drains whatever was
//! appended since the last poll, so no line is lost at the end of a run.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::tracker::JobTracker;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to a running printer thread.
pub struct ProgressPrinter {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<io::Result<usize>>>,
}

impl ProgressPrinter {
    /// Print new tracker lines to stdout.
    pub fn stdout(tracker: JobTracker) -> Self {
        Self::spawn(tracker, io::stdout(), DEFAULT_POLL_INTERVAL)
    }

    /// Start polling `tracker` from its current end, writing new lines to
    /// `sink`.
    pub fn spawn<W>(tracker: JobTracker, mut sink: W, interval: Duration) -> Self
    where
        W: Write + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let mut cursor = tracker.len();

        let handle = thread::spawn(move || -> io::Result<usize> {
            let mut printed = 0;
            loop {
                // Read the flag before polling so the final poll sees every
                // line appended before `finish` was called.
                let stopping = flag.load(Ordering::Acquire);
                let (_, lines) = tracker.poll(cursor);
                cursor += lines.len();
                for line in &lines {
                    writeln!(sink, "{}", line)?;
                }
                if !lines.is_empty() {
                    sink.flush()?;
                    printed += lines.len();
                }
                if stopping {
                    return Ok(printed);
                }
                thread::sleep(interval);
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Drain remaining lines, stop the thread and return how many lines
    /// were printed.
    pub fn finish(mut self) -> io::Result<usize> {
        self.join()
    }

    fn join(&mut self) -> io::Result<usize> {
        self.stop.store(true, Ordering::Release);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("progress printer panicked"))),
            None => Ok(0),
        }
    }
}

impl Drop for ProgressPrinter {
    fn drop(&mut self) {
        if let Err(e) = self.join() {
            debug!("Progress printer stopped with error: {}", e);
        }
    }
}

//! Job status tracker
//!
//! Shared, concurrency-safe record of whether a run is active and an
//! append-only log of human-readable progress lines. One writer (the active
//! run) and any number of readers may hold clones of the same handle.
//!
//! # Lifecycle
//!
//! ```text
//! new()  ->  running=false, log=[]
//! start() / append(..)* / stop()      (one run)
//! reset()                             (only way to truncate the log)
//! ```
//!
//! Two runs sharing one tracker interleave their lines; callers serialize
//! runs themselves.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct JobState {
    running: bool,
    log: Vec<String>,
}

/// Cloneable handle to one job status record.
#[derive(Debug, Clone, Default)]
pub struct JobTracker {
    inner: Arc<Mutex<JobState>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, JobState> {
        // A panicking writer cannot leave a torn entry behind: every
        // mutation is a single field write or Vec::push.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clear the running flag and empty the log.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.running = false;
        state.log.clear();
    }

    pub fn start(&self) {
        self.lock().running = true;
    }

    pub fn stop(&self) {
        self.lock().running = false;
    }

    /// Append one entry to the log.
    pub fn append(&self, line: impl Into<String>) {
        let line = line.into();
        self.lock().log.push(line);
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Copy of the whole log.
    pub fn log_snapshot(&self) -> Vec<String> {
        self.lock().log.clone()
    }

    /// Number of entries in the log.
    pub fn len(&self) -> usize {
        self.lock().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().log.is_empty()
    }

    /// Entries appended at or after `cursor`, for pollers that print
    /// incrementally. A cursor past the end (after a reset) yields nothing.
    pub fn lines_since(&self, cursor: usize) -> Vec<String> {
        let state = self.lock();
        state.log.get(cursor..).map(<[String]>::to_vec).unwrap_or_default()
    }

    /// Running flag and the entries since `cursor`, read under one lock.
    pub fn poll(&self, cursor: usize) -> (bool, Vec<String>) {
        let state = self.lock();
        let lines = state.log.get(cursor..).map(<[String]>::to_vec).unwrap_or_default();
        (state.running, lines)
    }
}

/// Marks the tracker running for as long as the guard lives.
pub(crate) struct RunningGuard<'a> {
    tracker: &'a JobTracker,
}

impl<'a> RunningGuard<'a> {
    pub(crate) fn start(tracker: &'a JobTracker) -> Self {
        tracker.start();
        Self { tracker }
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.tracker.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracker_is_idle_and_empty() {
        let tracker = JobTracker::new();
        assert!(!tracker.is_running());
        assert!(tracker.log_snapshot().is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let tracker = JobTracker::new();
        tracker.start();
        tracker.append("x");
        tracker.append("y");
        assert!(tracker.is_running());
        assert_eq!(tracker.log_snapshot(), vec!["x", "y"]);
    }

    #[test]
    fn test_stop_keeps_log() {
        let tracker = JobTracker::new();
        tracker.start();
        tracker.append("x");
        tracker.stop();
        assert!(!tracker.is_running());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let tracker = JobTracker::new();
        tracker.start();
        tracker.append("x");
        tracker.reset();
        assert!(!tracker.is_running());
        assert!(tracker.log_snapshot().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = JobTracker::new();
        let observer = tracker.clone();
        tracker.append("shared");
        assert_eq!(observer.log_snapshot(), vec!["shared"]);
    }

    #[test]
    fn test_lines_since_cursor() {
        let tracker = JobTracker::new();
        tracker.append("a");
        tracker.append("b");
        tracker.append("c");
        assert_eq!(tracker.lines_since(1), vec!["b", "c"]);
        assert!(tracker.lines_since(3).is_empty());
        assert!(tracker.lines_since(10).is_empty());
    }

    #[test]
    fn test_running_guard_stops_on_drop() {
        let tracker = JobTracker::new();
        {
            let _guard = RunningGuard::start(&tracker);
            assert!(tracker.is_running());
        }
        assert!(!tracker.is_running());
    }

    #[test]
    fn test_poll_reads_flag_and_lines_together() {
        let tracker = JobTracker::new();
        tracker.start();
        tracker.append("a");
        let (running, lines) = tracker.poll(0);
        assert!(running);
        assert_eq!(lines, vec!["a"]);
    }
}

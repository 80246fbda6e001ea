use chrono::Local;
use log;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Mutable state for a single export run: counters, timestamped logs, the
/// wall-clock budget and the cooperative cancellation flag.
///
/// One instance is created per invocation and owned by it; nothing here is
/// shared between independent runs. The cancellation flag is the only part
/// visible to other threads, through [`AnalysisRun::cancel_handle`].
#[derive(Debug)]
pub struct AnalysisRun {
    pub files_processed: usize,
    pub files_skipped: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
    started: Instant,
    timeout: Duration,
    cancelled: Arc<AtomicBool>,
}

impl AnalysisRun {
    pub fn new(timeout: Duration) -> Self {
        AnalysisRun {
            files_processed: 0,
            files_skipped: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            started: Instant::now(),
            timeout,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.errors
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S"), message));
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings
            .push(format!("[{}] {}", Local::now().format("%H:%M:%S"), message));
    }

    /// True once the wall-clock budget is spent. Logs the overrun as an
    /// error; callers are expected to stop traversal right after.
    pub fn check_timeout(&mut self) -> bool {
        if !self.timeout.is_zero() && self.started.elapsed() > self.timeout {
            self.log_error(format!("Timeout exceeded ({}s)", self.timeout.as_secs()));
            return true;
        }
        false
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Shared flag a coordinating caller can set to request a cooperative
    /// stop. Polled before each directory and before each file read.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Combined soft-stop poll: timeout or cancellation.
    pub fn should_stop(&mut self) -> bool {
        self.check_timeout() || self.is_cancelled()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

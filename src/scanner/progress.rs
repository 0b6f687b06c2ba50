//! Scan progress tracking and reporting.

use crate::core::types::{AnalysisResult, DisguiseStatus};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Scan progress information.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files whose analysis has finished
    pub files_completed: u64,
    /// Number of files in the batch
    pub total_files: u64,
    /// Files flagged as disguised so far
    pub disguised: u64,
    /// Files that could not be verified so far (degraded ones included)
    pub unverifiable: u64,
    /// Degraded results so far
    pub failed: u64,
    /// Bytes of analyzed files
    pub bytes_processed: u64,
    /// Most recently completed path
    pub current_path: Option<PathBuf>,
    /// Scan start time
    pub start_time: Instant,
    /// Whether scan is complete
    pub is_complete: bool,
    /// Whether scan was cancelled
    pub is_cancelled: bool,
}

impl ScanProgress {
    /// Calculate elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Calculate scan rate (files per second).
    pub fn files_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.files_completed as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Estimate remaining time based on progress.
    pub fn estimated_remaining(&self) -> Option<Duration> {
        if self.files_completed == 0 || self.files_completed >= self.total_files {
            return None;
        }
        let rate = self.files_per_second();
        if rate <= 0.0 {
            return None;
        }
        let remaining = (self.total_files - self.files_completed) as f64 / rate;
        Some(Duration::from_secs_f64(remaining))
    }

    /// Calculate completion percentage.
    pub fn percentage(&self) -> f64 {
        if self.total_files > 0 {
            (self.files_completed as f64 / self.total_files as f64) * 100.0
        } else {
            100.0
        }
    }
}

type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

/// Progress tracker for real-time scan monitoring.
///
/// The callback fires after every completed file and once more when the scan
/// finishes. Cancellation itself is owned by the scanner; the tracker only
/// records how the scan ended.
pub struct ProgressTracker {
    files_completed: AtomicU64,
    total_files: AtomicU64,
    disguised: AtomicU64,
    unverifiable: AtomicU64,
    failed: AtomicU64,
    bytes_processed: AtomicU64,
    current_path: RwLock<Option<PathBuf>>,
    start_time: RwLock<Instant>,
    is_complete: AtomicBool,
    is_cancelled: AtomicBool,
    callback: RwLock<Option<ProgressCallback>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    /// Create a new progress tracker.
    pub fn new() -> Self {
        Self {
            files_completed: AtomicU64::new(0),
            total_files: AtomicU64::new(0),
            disguised: AtomicU64::new(0),
            unverifiable: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            bytes_processed: AtomicU64::new(0),
            current_path: RwLock::new(None),
            start_time: RwLock::new(Instant::now()),
            is_complete: AtomicBool::new(false),
            is_cancelled: AtomicBool::new(false),
            callback: RwLock::new(None),
        }
    }

    /// Set a progress callback function.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        let mut cb = self.callback.write().unwrap_or_else(PoisonError::into_inner);
        *cb = Some(Box::new(callback));
    }

    /// Set the number of files in the batch.
    pub fn set_total_files(&self, total: u64) {
        self.total_files.store(total, Ordering::Relaxed);
    }

    /// Record one completed analysis and notify the observer.
    pub fn record(&self, result: &AnalysisResult) {
        match result.status {
            DisguiseStatus::Disguised => {
                self.disguised.fetch_add(1, Ordering::Relaxed);
            }
            DisguiseStatus::Unverifiable => {
                self.unverifiable.fetch_add(1, Ordering::Relaxed);
            }
            DisguiseStatus::Normal => {}
        }
        if result.is_degraded() {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.bytes_processed
            .fetch_add(result.size_bytes, Ordering::Relaxed);
        *self
            .current_path
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(result.path.clone());
        self.files_completed.fetch_add(1, Ordering::Relaxed);
        self.notify();
    }

    /// Mark the scan as finished, noting whether it was cancelled, and send
    /// the final snapshot.
    pub fn finish(&self, cancelled: bool) {
        self.is_cancelled.store(cancelled, Ordering::SeqCst);
        self.is_complete.store(true, Ordering::SeqCst);
        self.notify();
    }

    /// Get current progress snapshot.
    pub fn snapshot(&self) -> ScanProgress {
        ScanProgress {
            files_completed: self.files_completed.load(Ordering::Relaxed),
            total_files: self.total_files.load(Ordering::Relaxed),
            disguised: self.disguised.load(Ordering::Relaxed),
            unverifiable: self.unverifiable.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bytes_processed: self.bytes_processed.load(Ordering::Relaxed),
            current_path: self
                .current_path
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            start_time: *self.start_time.read().unwrap_or_else(PoisonError::into_inner),
            is_complete: self.is_complete.load(Ordering::SeqCst),
            is_cancelled: self.is_cancelled.load(Ordering::SeqCst),
        }
    }

    /// Reset all counters for a new scan. The callback is kept.
    pub fn reset(&self) {
        self.files_completed.store(0, Ordering::Relaxed);
        self.total_files.store(0, Ordering::Relaxed);
        self.disguised.store(0, Ordering::Relaxed);
        self.unverifiable.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.bytes_processed.store(0, Ordering::Relaxed);
        *self
            .current_path
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *self.start_time.write().unwrap_or_else(PoisonError::into_inner) = Instant::now();
        self.is_complete.store(false, Ordering::SeqCst);
        self.is_cancelled.store(false, Ordering::SeqCst);
    }

    fn notify(&self) {
        let callback = self.callback.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(ref cb) = *callback {
            cb(self.snapshot());
        }
    }
}

/// Console progress reporter writing a single updating line to stderr.
pub struct ConsoleProgressReporter {
    last_line_length: AtomicUsize,
    verbose: bool,
}

impl Default for ConsoleProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgressReporter {
    /// Create a new console reporter.
    pub fn new() -> Self {
        Self {
            last_line_length: AtomicUsize::new(0),
            verbose: false,
        }
    }

    /// Also print the path of each completed file.
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Format a progress line.
    pub fn format_line(progress: &ScanProgress) -> String {
        let status = if progress.is_cancelled {
            "Cancelled"
        } else if progress.is_complete {
            "Complete"
        } else {
            "Scanning"
        };

        format!(
            "[{}] {:.1}% | Files: {}/{} | Disguised: {} | Unverifiable: {} | Time: {}s",
            status,
            progress.percentage(),
            progress.files_completed,
            progress.total_files,
            progress.disguised,
            progress.unverifiable,
            progress.elapsed().as_secs()
        )
    }

    /// Report progress to console.
    pub fn report(&self, progress: &ScanProgress) {
        let last_len = self.last_line_length.load(Ordering::Relaxed);

        if self.verbose && !progress.is_complete {
            if let Some(path) = &progress.current_path {
                eprintln!("\r{}\r  {}", " ".repeat(last_len), path.display());
            }
        }

        let message = format!("\r{}", Self::format_line(progress));

        let padding = if message.len() < last_len {
            " ".repeat(last_len - message.len())
        } else {
            String::new()
        };

        eprint!("{}{}", message, padding);
        self.last_line_length.store(message.len(), Ordering::Relaxed);

        if progress.is_complete {
            eprintln!(); // New line at end
            self.last_line_length.store(0, Ordering::Relaxed);
        }
    }
}

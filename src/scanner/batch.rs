//! Batch scanner: runs the analyzer over many paths on a bounded worker pool.

use crate::core::config::{Config, ScanConfig, MAX_WORKERS};
use crate::core::error::{Error, Result};
use crate::core::types::{AnalysisResult, BatchReport, ScanStatus};
use crate::scanner::analyzer::FileAnalyzer;
use crate::scanner::progress::{ProgressTracker, ScanProgress};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use walkdir::{DirEntry, WalkDir};

/// A queued unit of work: input position and path.
type WorkItem = (usize, PathBuf);

/// Scans a list of paths and returns their results in input order.
pub struct BatchScanner {
    config: Arc<Config>,
    analyzer: Arc<FileAnalyzer>,
    cancelled: Arc<AtomicBool>,
    progress: Arc<ProgressTracker>,
    file_timeout: Option<Duration>,
}

impl BatchScanner {
    /// Create a new batch scanner with the given configuration.
    pub fn new(config: Arc<Config>) -> Self {
        let analyzer = FileAnalyzer::from_config(&config);
        Self::with_analyzer(config, analyzer)
    }

    /// Create a scanner with a specific analyzer.
    pub fn with_analyzer(config: Arc<Config>, analyzer: FileAnalyzer) -> Self {
        let file_timeout = match config.scan.file_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            config,
            analyzer: Arc::new(analyzer),
            cancelled: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(ProgressTracker::new()),
            file_timeout,
        }
    }

    /// Override the per-file timeout (`None` disables it).
    pub fn with_file_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.file_timeout = timeout;
        self
    }

    /// Get the analyzer shared by the workers.
    pub fn analyzer(&self) -> &FileAnalyzer {
        &self.analyzer
    }

    /// Get the progress tracker.
    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    /// Set a progress callback.
    pub fn set_progress_callback<F>(&self, callback: F)
    where
        F: Fn(ScanProgress) + Send + Sync + 'static,
    {
        self.progress.set_callback(callback);
    }

    /// Request cancellation of the running scan. Files already being
    /// analyzed still finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if the scan has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the cancel flag and the progress counters.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
        self.progress.reset();
    }

    /// Expand directory arguments into the regular files they contain.
    pub fn collect_paths(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        collect_paths(inputs, &self.config.scan)
    }

    /// Analyze every path and return a report with one result per completed
    /// file, in input order.
    ///
    /// Per-file failures become degraded results. After [`cancel`](Self::cancel)
    /// no new file is started and the report holds the files that finished.
    /// Each call starts uncancelled, so a scanner stays usable after a
    /// cancelled scan.
    pub async fn scan(&self, paths: Vec<PathBuf>) -> Result<BatchReport> {
        let total = paths.len();
        let mut report = BatchReport::new(total);

        self.reset();
        self.progress.set_total_files(total as u64);

        let num_workers = self.config.scan.workers.clamp(1, MAX_WORKERS).min(total.max(1));
        log::info!(
            "Scanning {} file(s) with {} worker(s), report {}",
            total,
            num_workers,
            report.report_id
        );

        let queue: Arc<Mutex<VecDeque<WorkItem>>> =
            Arc::new(Mutex::new(paths.into_iter().enumerate().collect()));

        let (tx, mut rx) = mpsc::channel::<(usize, AnalysisResult)>(num_workers * 2);
        let mut handles = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let queue = Arc::clone(&queue);
            let analyzer = Arc::clone(&self.analyzer);
            let cancelled = Arc::clone(&self.cancelled);
            let timeout = self.file_timeout;
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                loop {
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }

                    let item = match queue.lock() {
                        Ok(mut q) => q.pop_front(),
                        Err(_) => {
                            log::error!("{}", Error::lock_poisoned("work queue"));
                            break;
                        }
                    };

                    let Some((index, path)) = item else {
                        break;
                    };

                    let result = analyze_one(Arc::clone(&analyzer), path, timeout).await;
                    if tx.send((index, result)).await.is_err() {
                        break;
                    }
                }
            });

            handles.push(handle);
        }

        // Drop the sender so the channel closes when workers finish
        drop(tx);

        let mut slots: Vec<Option<AnalysisResult>> = vec![None; total];
        while let Some((index, result)) = rx.recv().await {
            self.progress.record(&result);
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(result);
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("{}", Error::WorkerFailed(e.to_string()));
            }
        }

        report.results = slots.into_iter().flatten().collect();

        if self.is_cancelled() {
            report.cancel();
            log::warn!(
                "Scan cancelled: {} of {} file(s) analyzed",
                report.processed(),
                total
            );
        } else {
            report.complete();
            log::info!(
                "Scan completed: {} file(s), {} disguised, {} failed",
                report.processed(),
                report.disguised().count(),
                report.failed()
            );
        }

        self.progress.finish(report.status == ScanStatus::Cancelled);
        Ok(report)
    }
}

/// Run one analysis on the blocking pool, folding every failure into a
/// degraded result.
async fn analyze_one(
    analyzer: Arc<FileAnalyzer>,
    path: PathBuf,
    timeout: Option<Duration>,
) -> AnalysisResult {
    let task_path = path.clone();
    let task = tokio::task::spawn_blocking(move || analyzer.analyze(&task_path));

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                let err = Error::ScanTimeout {
                    path: path.clone(),
                    timeout_secs: limit.as_secs(),
                };
                log::warn!("{}", err);
                return AnalysisResult::degraded(&path, &err);
            }
        },
        None => task.await,
    };

    match joined {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            if e.is_recoverable() {
                log::warn!("[{}] {} recorded as unverifiable: {}", e.category(), path.display(), e);
            } else {
                log::error!("[{}] {} recorded as unverifiable: {}", e.category(), path.display(), e);
            }
            AnalysisResult::degraded(&path, &e)
        }
        Err(join_err) => {
            let err = Error::WorkerFailed(join_err.to_string());
            log::error!("{}: {}", path.display(), err);
            AnalysisResult::degraded(&path, &err)
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Regular files, including symlinks that resolve to one.
fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        || (entry.path_is_symlink() && fs::metadata(entry.path()).is_ok_and(|m| m.is_file()))
}

/// Expand directory arguments into their regular files.
///
/// Directories are listed one level deep unless `scan.recursive` is set, sorted
/// by file name. Symlinked files are always listed; `scan.follow_symlinks` only
/// decides whether symlinked directories are descended into. Other arguments
/// are kept as given, including paths that do not exist.
pub fn collect_paths(inputs: &[PathBuf], scan: &ScanConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        collect_dir(input, scan, &mut files);
    }

    if files.is_empty() {
        return Err(Error::NoFilesFound);
    }

    log::debug!("Collected {} path(s) from {} argument(s)", files.len(), inputs.len());
    Ok(files)
}

fn collect_dir(dir: &Path, scan: &ScanConfig, files: &mut Vec<PathBuf>) {
    let max_depth = if scan.recursive { usize::MAX } else { 1 };
    let include_hidden = scan.include_hidden;

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(scan.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| e.depth() == 0 || include_hidden || !is_hidden(e));

    for entry in walker {
        match entry {
            Ok(entry) if is_regular_file(&entry) => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                match e.into_io_error() {
                    Some(source) => log::warn!("{}", Error::DirectoryAccess { path, source }),
                    None => log::warn!("Skipping {}: filesystem loop", path.display()),
                }
            }
        }
    }
}

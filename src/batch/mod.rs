//! Parsing many documents at once.
//!
//! Each file is parsed independently on a rayon pool sized from
//! [`BatchConfig::workers`](crate::core::BatchConfig). A failed file shows up
//! in [`BatchReport::failures`] and never stops its siblings.

use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::{DianError, DocumentRecord, ParseFailure, ParserConfig};
use crate::dian::parse_document;

/// Cooperative cancellation flag, checked before each file is started.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Successful records, in input order.
    pub records: Vec<DocumentRecord>,
    /// Files that could not be parsed, in input order.
    pub failures: Vec<ParseFailure>,
    /// Files never started because the batch was cancelled.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn was_cancelled(&self) -> bool {
        !self.skipped.is_empty()
    }
}

enum Outcome {
    Parsed(Box<DocumentRecord>),
    Failed(ParseFailure),
    Skipped(PathBuf),
}

/// List the files in `dir` (not recursive) whose extension is accepted by
/// `config`, sorted by path.
pub fn collect_input_files(dir: &Path, config: &ParserConfig) -> Result<Vec<PathBuf>, DianError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && config.accepts_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse `paths` in parallel.
///
/// Returns an error only if the worker pool cannot be built; per-file
/// problems are reported inside the [`BatchReport`].
pub fn parse_batch(
    paths: &[PathBuf],
    config: &ParserConfig,
    token: &CancellationToken,
) -> Result<BatchReport, DianError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.batch.workers)
        .build()
        .map_err(|e| DianError::Batch(e.to_string()))?;

    let outcomes: Vec<Outcome> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                if token.is_cancelled() {
                    return Outcome::Skipped(path.clone());
                }
                match parse_isolated(path, config) {
                    Ok(record) => Outcome::Parsed(Box::new(record)),
                    Err(failure) => {
                        warn!(file = %path.display(), "skipping document: {}", failure.message);
                        Outcome::Failed(failure)
                    }
                }
            })
            .collect()
    });

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Parsed(record) => report.records.push(*record),
            Outcome::Failed(failure) => report.failures.push(failure),
            Outcome::Skipped(path) => report.skipped.push(path),
        }
    }

    info!(
        parsed = report.records.len(),
        failed = report.failures.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    Ok(report)
}

/// Parse one file, turning a panic into a failure for that file alone.
fn parse_isolated(path: &Path, config: &ParserConfig) -> Result<DocumentRecord, ParseFailure> {
    panic::catch_unwind(|| parse_document(path, config)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".into());
        Err(ParseFailure::new(path, format!("parser panicked: {reason}")))
    })
}

/// A batch running on its own thread.
pub struct BatchHandle {
    token: CancellationToken,
    handle: JoinHandle<Result<BatchReport, DianError>>,
}

impl BatchHandle {
    /// Ask the batch to stop; files already started still finish.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the batch and return its report.
    pub fn join(self) -> Result<BatchReport, DianError> {
        self.handle
            .join()
            .map_err(|_| DianError::Batch("batch thread panicked".into()))?
    }
}

/// Run [`parse_batch`] off the caller's thread.
pub fn spawn_batch(paths: Vec<PathBuf>, config: ParserConfig) -> BatchHandle {
    let token = CancellationToken::new();
    let worker_token = token.clone();
    let handle = std::thread::spawn(move || parse_batch(&paths, &config, &worker_token));
    BatchHandle { token, handle }
}

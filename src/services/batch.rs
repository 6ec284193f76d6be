//! Parallel execution of one stage over many files.

use crate::error::GeinkError;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Outcome of a batch, in input order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub succeeded: Vec<(PathBuf, T)>,
    pub failed: Vec<(PathBuf, GeinkError)>,
}

impl<T> BatchReport<T> {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// True when there was work and none of it succeeded.
    pub fn is_total_failure(&self) -> bool {
        self.total() > 0 && self.succeeded.is_empty()
    }

    /// Log a one-line summary under `stage`.
    pub fn log_summary(&self, stage: &str, dir: &Path) {
        if self.total() == 0 {
            tracing::warn!(stage, dir = %dir.display(), "No matching files found");
        } else if self.failed.is_empty() {
            tracing::info!(
                stage,
                dir = %dir.display(),
                succeeded = self.succeeded.len(),
                "Batch complete"
            );
        } else {
            tracing::warn!(
                stage,
                dir = %dir.display(),
                succeeded = self.succeeded.len(),
                failed = self.failed.len(),
                "Batch complete with failures"
            );
        }
    }
}

/// Run `job` on every input across the rayon pool.
///
/// Each item is independent: a failure is logged and recorded, and the
/// remaining items still run.
pub fn run_batch<T, F>(inputs: Vec<PathBuf>, job: F) -> BatchReport<T>
where
    T: Send,
    F: Fn(&Path) -> Result<T, GeinkError> + Sync,
{
    let results: Vec<(PathBuf, Result<T, GeinkError>)> = inputs
        .into_par_iter()
        .map(|input| {
            let result = job(&input);
            if let Err(e) = &result {
                tracing::error!(
                    input = %input.display(),
                    kind = ?e.kind(),
                    error = %e,
                    "Failed to process file"
                );
            }
            (input, result)
        })
        .collect();

    let mut report = BatchReport {
        succeeded: Vec::new(),
        failed: Vec::new(),
    };
    for (input, result) in results {
        match result {
            Ok(value) => report.succeeded.push((input, value)),
            Err(e) => report.failed.push((input, e)),
        }
    }
    report
}

// pulp-image/src/core/reporter.rs
use super::{FailureRecord, ProcessResult, PulpError, SkipRecord, Totals};
use crate::utils::percent_of;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Accumulates per-file outcomes for one run. Never fails.
#[derive(Debug, Default)]
pub struct Reporter {
    processed: Vec<ProcessResult>,
    skipped: Vec<SkipRecord>,
    failed: Vec<FailureRecord>,
}

/// Which bucket an outcome landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Processed,
    Skipped,
    Failed,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&mut self, result: ProcessResult) {
        self.processed.push(result);
    }

    pub fn record_skipped(&mut self, file_path: impl Into<PathBuf>, reason: &PulpError) {
        self.skipped.push(SkipRecord {
            file_path: file_path.into(),
            reason: reason.to_string(),
            kind: reason.kind(),
        });
    }

    pub fn record_failed(&mut self, file_path: impl Into<PathBuf>, error: &PulpError) {
        self.failed.push(FailureRecord {
            file_path: file_path.into(),
            error: error.to_string(),
            kind: error.kind(),
        });
    }

    /// Files an outcome into the matching bucket by error variant.
    pub fn record_outcome(
        &mut self,
        file_path: &Path,
        outcome: std::result::Result<ProcessResult, PulpError>,
    ) -> OutcomeKind {
        match outcome {
            Ok(result) => {
                self.record_processed(result);
                OutcomeKind::Processed
            }
            Err(err) if err.is_skip() => {
                self.record_skipped(file_path, &err);
                OutcomeKind::Skipped
            }
            Err(err) => {
                self.record_failed(file_path, &err);
                OutcomeKind::Failed
            }
        }
    }

    pub fn totals(&self) -> Totals {
        let total_original: u64 = self.processed.iter().map(|r| r.original_size).sum();
        let total_final: u64 = self.processed.iter().map(|r| r.final_size).sum();
        let total_saved = total_original as i64 - total_final as i64;

        Totals {
            total_original,
            total_final,
            total_saved,
            percent_saved: percent_of(total_saved, total_original),
            processed_count: self.processed.len(),
            skipped_count: self.skipped.len(),
            failed_count: self.failed.len(),
        }
    }

    pub fn into_report(self) -> JobReport {
        let totals = self.totals();
        JobReport {
            processed: self.processed,
            skipped: self.skipped,
            failed: self.failed,
            totals,
        }
    }
}

/// The data product of one run, shared by the CLI and the HTTP API.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobReport {
    pub processed: Vec<ProcessResult>,
    pub skipped: Vec<SkipRecord>,
    pub failed: Vec<FailureRecord>,
    pub totals: Totals,
}

impl JobReport {
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

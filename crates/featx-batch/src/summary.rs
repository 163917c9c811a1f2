//! Run summary accumulated by the orchestrator

use chrono::{DateTime, Utc};
use featx_domain::{ErrorInfo, ExtractionResult, ExtractionStatus};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Final status of one file in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Every feature extracted
    Success,
    /// Some features extracted
    Partial,
    /// No usable extraction
    Failed,
    /// Never dispatched because the run was stopped
    Skipped,
}

impl FileStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Success => "success",
            FileStatus::Partial => "partial",
            FileStatus::Failed => "failed",
            FileStatus::Skipped => "skipped",
        }
    }
}

impl From<ExtractionStatus> for FileStatus {
    fn from(status: ExtractionStatus) -> Self {
        match status {
            ExtractionStatus::Success => FileStatus::Success,
            ExtractionStatus::Partial => FileStatus::Partial,
            ExtractionStatus::Failed => FileStatus::Failed,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    /// Source file name
    pub file_id: String,

    /// Final status
    pub status: FileStatus,

    /// Provider attempts made
    pub attempts: u32,

    /// Wall-clock processing time
    pub duration_ms: u64,

    /// Features with a non-null value
    pub features_found: usize,

    /// Last error, for failed files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    /// Written artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Where the source file ended up
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relocated_to: Option<PathBuf>,
}

impl FileReport {
    /// Report for a settled extraction
    pub fn from_result(result: &ExtractionResult, duration_ms: u64) -> Self {
        Self {
            file_id: result.file_id.clone(),
            status: result.status.into(),
            attempts: result.attempts,
            duration_ms,
            features_found: result.features_found(),
            error: result.error.clone(),
            output: None,
            relocated_to: None,
        }
    }

    /// Report for a file that was never dispatched
    pub fn skipped(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            status: FileStatus::Skipped,
            attempts: 0,
            duration_ms: 0,
            features_found: 0,
            error: None,
            output: None,
            relocated_to: None,
        }
    }
}

/// Statistics and per-file outcomes for one run
///
/// Owned and updated by the orchestrator's driving loop only.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Unique run identifier
    pub run_id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Files discovered
    pub total: usize,

    /// Files with every feature extracted
    pub succeeded: usize,

    /// Files with some features extracted
    pub partial: usize,

    /// Files that failed
    pub failed: usize,

    /// Files not dispatched because the run was stopped
    pub skipped: usize,

    /// Share of processed files that produced an artifact
    pub success_rate: f64,

    /// Per-file outcomes in completion order
    pub per_file: Vec<FileReport>,
}

impl RunSummary {
    /// Start a summary for `total` discovered files
    pub fn new(total: usize) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            finished_at: None,
            total,
            succeeded: 0,
            partial: 0,
            failed: 0,
            skipped: 0,
            success_rate: 0.0,
            per_file: Vec::with_capacity(total),
        }
    }

    /// Record one file's outcome
    pub fn record(&mut self, report: FileReport) {
        match report.status {
            FileStatus::Success => self.succeeded += 1,
            FileStatus::Partial => self.partial += 1,
            FileStatus::Failed => self.failed += 1,
            FileStatus::Skipped => self.skipped += 1,
        }
        self.per_file.push(report);
        self.success_rate = self.compute_success_rate();
    }

    /// Mark the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Files with a recorded outcome (including skipped)
    pub fn completed(&self) -> usize {
        self.per_file.len()
    }

    /// Files that were actually processed
    pub fn processed(&self) -> usize {
        self.succeeded + self.partial + self.failed
    }

    fn compute_success_rate(&self) -> f64 {
        match self.processed() {
            0 => 0.0,
            n => (self.succeeded + self.partial) as f64 / n as f64,
        }
    }

    /// Run duration, once finished
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Extraction Run Summary".to_string(),
            "======================".to_string(),
            format!("Run: {}", self.run_id),
            format!("Files: {}", self.total),
            format!("  Succeeded: {}", self.succeeded),
            format!("  Partial: {}", self.partial),
            format!("  Failed: {}", self.failed),
        ];
        if self.skipped > 0 {
            lines.push(format!("  Skipped: {}", self.skipped));
        }
        lines.push(format!("Success rate: {:.1}%", self.success_rate * 100.0));
        if let Some(secs) = self.elapsed_secs() {
            lines.push(format!("Total runtime: {:.1}s", secs));
        }
        lines.join("\n")
    }
}

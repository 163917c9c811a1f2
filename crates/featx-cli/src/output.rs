//! Output formatting for the CLI.

use colored::*;
use featx_batch::{FileReport, FileStatus, Progress, ProgressCallback, RunSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest error message shown in the table.
const ERROR_PREVIEW: usize = 60;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Per-file outcome table, in completion order.
    pub fn format_reports(&self, reports: &[FileReport]) -> String {
        if reports.is_empty() {
            return self.colorize("No files processed.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["File", "Status", "Attempts", "Features", "Time", "Error"]);

        for report in reports {
            let error = report
                .error
                .as_ref()
                .map(|e| truncate(&format!("{}: {}", e.kind, e.message), ERROR_PREVIEW))
                .unwrap_or_default();
            builder.push_record([
                report.file_id.clone(),
                self.status(report.status),
                report.attempts.to_string(),
                report.features_found.to_string(),
                format!("{:.1}s", report.duration_ms as f64 / 1000.0),
                error,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// One-line totals.
    pub fn format_totals(&self, summary: &RunSummary) -> String {
        let mut parts = vec![
            self.colorize(&format!("{} succeeded", summary.succeeded), "green"),
            self.colorize(&format!("{} partial", summary.partial), "yellow"),
            self.colorize(&format!("{} failed", summary.failed), "red"),
        ];
        if summary.skipped > 0 {
            parts.push(format!("{} skipped", summary.skipped));
        }
        format!(
            "{} files: {} ({:.1}% success)",
            summary.total,
            parts.join(", "),
            summary.success_rate * 100.0
        )
    }

    /// Colored status label.
    pub fn status(&self, status: FileStatus) -> String {
        let color = match status {
            FileStatus::Success => "green",
            FileStatus::Partial => "yellow",
            FileStatus::Failed => "red",
            FileStatus::Skipped => "",
        };
        self.colorize(status.as_str(), color)
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Create the batch progress bar. Hidden bars track position but never draw.
pub fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Progress callback that advances `bar` as files settle.
pub fn progress_callback(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |progress: &Progress| {
        bar.set_length(progress.total as u64);
        bar.set_position(progress.completed as u64);
        bar.set_message(format!("{} {}", progress.file_id, progress.status));
    })
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

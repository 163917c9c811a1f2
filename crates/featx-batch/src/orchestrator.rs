//! Batch orchestrator: discovery, bounded concurrency and per-file settlement

use crate::config::BatchConfig;
use crate::discovery::{discover, ensure_directories, read_text, SourceFile};
use crate::error::BatchError;
use crate::output::{CsvOutputWriter, JsonSummaryWriter};
use crate::relocate::FsMover;
use crate::summary::{FileReport, FileStatus, RunSummary};
use crate::traits::{Destination, FileMover, OutputWriter, SummaryWriter};
use featx_domain::{ErrorInfo, ExtractionRequest, ExtractionResult, FeatureSchema, LlmClient};
use featx_extractor::ExtractionEngine;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Progress notification sent after every settled file
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Files settled so far
    pub completed: usize,

    /// Files discovered
    pub total: usize,

    /// File that just settled
    pub file_id: String,

    /// Its final status
    pub status: FileStatus,
}

/// Callback receiving [`Progress`] updates
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Runs every discovered file through extraction, output and relocation
///
/// # Examples
///
/// ```no_run
/// use featx_batch::{BatchConfig, BatchOrchestrator};
/// use featx_domain::FeatureSchema;
/// use featx_extractor::{ExtractionEngine, ExtractorConfig};
/// use featx_llm::ProviderFactory;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ProviderFactory::from_env().create("groq", None)?;
/// let schema = Arc::new(FeatureSchema::parse(["weight_kg", "material"])?);
/// let engine = ExtractionEngine::new(ExtractorConfig::default());
///
/// let orchestrator = BatchOrchestrator::new(BatchConfig::default(), engine, client);
/// let summary = orchestrator.run(schema).await?;
/// println!("{}", summary.summary());
/// # Ok(())
/// # }
/// ```
pub struct BatchOrchestrator {
    config: BatchConfig,
    engine: ExtractionEngine,
    client: Arc<dyn LlmClient>,
    writer: Arc<dyn OutputWriter>,
    mover: Arc<dyn FileMover>,
    summary_writer: Arc<dyn SummaryWriter>,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl BatchOrchestrator {
    /// Create an orchestrator with filesystem writers derived from `config`
    ///
    /// The engine is rebound to the orchestrator's cancellation token.
    pub fn new(config: BatchConfig, engine: ExtractionEngine, client: Arc<dyn LlmClient>) -> Self {
        let cancel = CancellationToken::new();
        Self {
            writer: Arc::new(CsvOutputWriter::new(&config.output_dir)),
            mover: Arc::new(FsMover::from_config(&config)),
            summary_writer: Arc::new(JsonSummaryWriter::new(&config.summary_file)),
            engine: engine.with_cancellation(cancel.clone()),
            config,
            client,
            cancel,
            progress: None,
        }
    }

    /// Replace the artifact writer
    pub fn with_output_writer(mut self, writer: Arc<dyn OutputWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Replace the file mover
    pub fn with_file_mover(mut self, mover: Arc<dyn FileMover>) -> Self {
        self.mover = mover;
        self
    }

    /// Replace the summary writer
    pub fn with_summary_writer(mut self, writer: Arc<dyn SummaryWriter>) -> Self {
        self.summary_writer = writer;
        self
    }

    /// Stop dispatching new files once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.engine = self.engine.with_cancellation(token.clone());
        self.cancel = token;
        self
    }

    /// Receive a [`Progress`] update after every settled file
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Token that stops the run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Process every matching file and return the run summary
    ///
    /// Per-file failures are recorded in the summary; only setup problems
    /// (configuration, pattern, directories) return an error.
    pub async fn run(&self, schema: Arc<FeatureSchema>) -> Result<RunSummary, BatchError> {
        self.config.validate()?;
        ensure_directories(&self.config).await?;
        let files = discover(&self.config.input_dir, &self.config.file_pattern)?;

        let total = files.len();
        let mut summary = RunSummary::new(total);

        if files.is_empty() {
            warn!(
                pattern = %self.config.file_pattern,
                dir = %self.config.input_dir.display(),
                "No matching files found"
            );
        } else {
            info!(total, batch_size = self.config.batch_size, "Found files to process");
        }

        let worker = FileWorker {
            engine: self.engine.clone(),
            client: Arc::clone(&self.client),
            writer: Arc::clone(&self.writer),
            mover: Arc::clone(&self.mover),
            schema,
        };

        let outcomes = stream::iter(files)
            .map(|source| {
                let worker = worker.clone();
                let cancel = self.cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return FileReport::skipped(source.file_id);
                    }
                    let file_id = source.file_id.clone();
                    match tokio::spawn(worker.process(source)).await {
                        Ok(report) => report,
                        Err(e) => {
                            error!(file_id = %file_id, error = %e, "File task aborted");
                            let mut report = FileReport::skipped(file_id);
                            report.status = FileStatus::Failed;
                            report.error = Some(ErrorInfo::io(format!("Worker task aborted: {}", e)));
                            report
                        }
                    }
                }
            })
            .buffer_unordered(self.config.batch_size);
        let mut outcomes = std::pin::pin!(outcomes);

        while let Some(report) = outcomes.next().await {
            let progress = Progress {
                completed: summary.completed() + 1,
                total,
                file_id: report.file_id.clone(),
                status: report.status,
            };
            info!(
                completed = progress.completed,
                total,
                file_id = %progress.file_id,
                status = %progress.status,
                "File settled"
            );
            summary.record(report);
            if let Some(callback) = &self.progress {
                callback(&progress);
            }
        }

        summary.finish();
        if summary.skipped > 0 {
            warn!(skipped = summary.skipped, "Run stopped before every file was dispatched");
        }
        info!(
            succeeded = summary.succeeded,
            partial = summary.partial,
            failed = summary.failed,
            success_rate = %format!("{:.1}%", summary.success_rate * 100.0),
            "Processing complete"
        );

        match self.summary_writer.write(&summary).await {
            Ok(path) => info!(path = %path.display(), "Wrote processing summary"),
            Err(e) => warn!(error = %e, "Failed to write summary report"),
        }

        Ok(summary)
    }
}

/// Everything one file task needs, shared across tasks
#[derive(Clone)]
struct FileWorker {
    engine: ExtractionEngine,
    client: Arc<dyn LlmClient>,
    writer: Arc<dyn OutputWriter>,
    mover: Arc<dyn FileMover>,
    schema: Arc<FeatureSchema>,
}

impl FileWorker {
    async fn process(self, source: SourceFile) -> FileReport {
        let started = Instant::now();
        info!(file_id = %source.file_id, "Processing file");

        let result = match read_text(&source.path).await {
            Ok(text) => {
                let request = ExtractionRequest::new(source.file_id.clone(), text, Arc::clone(&self.schema));
                self.engine.extract(&request, self.client.as_ref()).await
            }
            Err(e) => {
                warn!(file_id = %source.file_id, error = %e, "Failed to read input file");
                ExtractionResult::failed(&source.file_id, &self.schema, ErrorInfo::io(e.to_string()), 0)
            }
        };

        let (result, output, relocated_to) = self.settle(&source, result).await;

        let mut report = FileReport::from_result(&result, started.elapsed().as_millis() as u64);
        report.output = output;
        report.relocated_to = relocated_to;
        report
    }

    /// Write the artifact and relocate the source
    ///
    /// An artifact is only kept when the source reached the processed location.
    async fn settle(
        &self,
        source: &SourceFile,
        result: ExtractionResult,
    ) -> (ExtractionResult, Option<PathBuf>, Option<PathBuf>) {
        let file_id = source.file_id.as_str();

        let result = if result.is_failed() {
            result
        } else {
            match self.writer.write(&result, &self.schema).await {
                Ok(artifact) => match self.mover.relocate(&source.path, Destination::Processed).await {
                    Ok(target) => return (result, Some(artifact), Some(target)),
                    Err(e) => {
                        warn!(file_id, error = %e, "Failed to move processed file, rolling back artifact");
                        if let Err(remove_err) = self.writer.remove(&artifact).await {
                            error!(file_id, error = %remove_err, "Failed to remove artifact");
                        }
                        result.into_failed(&self.schema, ErrorInfo::io(format!("File move error: {}", e)))
                    }
                },
                Err(e) => {
                    warn!(file_id, error = %e, "Failed to write output file");
                    result.into_failed(&self.schema, ErrorInfo::io(format!("Output write error: {}", e)))
                }
            }
        };

        let relocated_to = match self.mover.relocate(&source.path, Destination::Error).await {
            Ok(target) => Some(target),
            Err(e) => {
                error!(file_id, error = %e, "Failed to move file to error location");
                None
            }
        };
        (result, None, relocated_to)
    }
}

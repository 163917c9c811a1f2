//! Wiring a configuration into a batch run.

use crate::config::Config;
use crate::error::{CliError, Result};
use featx_batch::{BatchOrchestrator, ProgressCallback, RunSummary};
use featx_domain::{FeatureSchema, LlmClient};
use featx_extractor::ExtractionEngine;
use featx_llm::ProviderFactory;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Read and parse the feature list.
pub fn load_schema(path: &Path) -> Result<FeatureSchema> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::FeaturesFile {
        path: path.to_path_buf(),
        source,
    })?;
    let schema = FeatureSchema::parse(contents.lines())?;

    info!(path = %path.display(), features = schema.len(), "Loaded features");
    for feature in schema.features() {
        debug!(name = %feature.name, kind = %feature.inferred_type, "Feature");
    }
    Ok(schema)
}

/// Build the provider client from `config` and run the batch.
///
/// `progress`, when given, is called once per settled file.
pub async fn run(
    config: &Config,
    factory: &ProviderFactory,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
) -> Result<RunSummary> {
    let schema = load_schema(&config.paths.features)?;
    let client = factory.create(&config.llm.provider, config.llm.model.as_deref())?;
    run_with_client(config, schema, client, cancel, progress).await
}

/// Run the batch with an already constructed client.
pub async fn run_with_client(
    config: &Config,
    schema: FeatureSchema,
    client: Arc<dyn LlmClient>,
    cancel: CancellationToken,
    progress: Option<ProgressCallback>,
) -> Result<RunSummary> {
    config.processing.engine.validate()?;
    let batch = config.batch_config();
    batch.validate()?;

    info!(provider = client.provider(), model = client.model(), "Starting batch processing");
    let engine = ExtractionEngine::new(config.processing.engine.clone());
    let mut orchestrator = BatchOrchestrator::new(batch, engine, client).with_cancellation(cancel);
    if let Some(callback) = progress {
        orchestrator = orchestrator.with_progress(move |update| callback(update));
    }

    Ok(orchestrator.run(Arc::new(schema)).await?)
}

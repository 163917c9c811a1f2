//! Artifact and summary writers

use crate::error::BatchError;
use crate::summary::RunSummary;
use crate::traits::{OutputWriter, SummaryWriter};
use async_trait::async_trait;
use featx_domain::{ExtractionResult, FeatureSchema};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Writes `<output_dir>/<file stem>.csv` with `Feature,Value` rows
///
/// Unresolved features are written with an empty value. Each artifact path
/// belongs to the first file that writes it; a later file with the same stem
/// (`product_1.txt` after `product_1.md`) is refused instead of overwriting it.
#[derive(Debug, Clone)]
pub struct CsvOutputWriter {
    output_dir: PathBuf,
    claimed: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl CsvOutputWriter {
    /// Create a writer for `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            claimed: Arc::default(),
        }
    }

    /// Reserve `path` for `file_id`. Returns whether this call made the claim.
    fn claim(&self, path: &Path, file_id: &str) -> Result<bool, BatchError> {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        match claimed.get(path) {
            Some(owner) if owner == file_id => Ok(false),
            Some(owner) => Err(BatchError::ArtifactClaimed {
                path: path.to_path_buf(),
                claimed_by: owner.clone(),
            }),
            None => {
                claimed.insert(path.to_path_buf(), file_id.to_string());
                Ok(true)
            }
        }
    }

    fn release(&self, path: &Path) {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }

    /// Artifact path for a source file name
    pub fn artifact_path(&self, file_id: &str) -> PathBuf {
        let stem = Path::new(file_id)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_id.to_string());
        self.output_dir.join(format!("{}.csv", stem))
    }
}

/// Render the `Feature,Value` table in schema order
pub fn render_csv(result: &ExtractionResult, schema: &FeatureSchema) -> Result<Vec<u8>, BatchError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Feature", "Value"])
        .map_err(|e| BatchError::Output(e.to_string()))?;

    for feature in schema.features() {
        let value = result
            .values
            .get(&feature.name)
            .and_then(Option::as_ref)
            .map(ToString::to_string)
            .unwrap_or_default();
        writer
            .write_record([feature.name.as_str(), value.as_str()])
            .map_err(|e| BatchError::Output(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| BatchError::Output(e.to_string()))
}

/// Write `bytes` to `path` through a temporary sibling and a rename
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BatchError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = dir.join(format!(".{}.{}.tmp", file_name, Uuid::now_v7().simple()));

    if let Err(e) = tokio::fs::write(&temp, bytes).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(BatchError::io(&temp, e));
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(BatchError::io(path, e));
    }
    Ok(())
}

#[async_trait]
impl OutputWriter for CsvOutputWriter {
    async fn write(&self, result: &ExtractionResult, schema: &FeatureSchema) -> Result<PathBuf, BatchError> {
        let bytes = render_csv(result, schema)?;
        let path = self.artifact_path(&result.file_id);

        let fresh = self.claim(&path, &result.file_id).inspect_err(|e| {
            warn!(file_id = %result.file_id, error = %e, "Artifact name collision");
        })?;
        if let Err(e) = write_atomic(&path, &bytes).await {
            if fresh {
                self.release(&path);
            }
            return Err(e);
        }
        info!(file_id = %result.file_id, output = %path.display(), "Saved extracted features");
        Ok(path)
    }

    async fn remove(&self, path: &Path) -> Result<(), BatchError> {
        self.release(path);
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!(output = %path.display(), "Removed artifact");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BatchError::io(path, e)),
        }
    }
}

/// Writes the run summary as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonSummaryWriter {
    path: PathBuf,
}

impl JsonSummaryWriter {
    /// Create a writer for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SummaryWriter for JsonSummaryWriter {
    async fn write(&self, summary: &RunSummary) -> Result<PathBuf, BatchError> {
        let json = serde_json::to_vec_pretty(summary).map_err(|e| BatchError::Output(e.to_string()))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| BatchError::io(dir, e))?;
        }
        write_atomic(&self.path, &json).await?;
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn schema() -> FeatureSchema {
        FeatureSchema::parse(["weight_kg", "is_waterproof", "material"]).unwrap()
    }

    fn partial_result(schema: &FeatureSchema) -> ExtractionResult {
        let values = schema.validate(
            json!({"weight_kg": 1.2, "is_waterproof": "UNKNOWN", "material": "steel, brushed"})
                .as_object()
                .unwrap(),
        );
        ExtractionResult::from_values("product_1.txt", values, 1)
    }

    #[test]
    fn test_render_csv_in_schema_order() {
        let schema = schema();
        let bytes = render_csv(&partial_result(&schema), &schema).unwrap();

        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Feature,Value\nweight_kg,1.2\nis_waterproof,\nmaterial,\"steel, brushed\"\n"
        );
    }

    #[test]
    fn test_artifact_path_uses_stem() {
        let writer = CsvOutputWriter::new("/out");
        assert_eq!(writer.artifact_path("product_7.txt"), PathBuf::from("/out/product_7.csv"));
    }

    #[tokio::test]
    async fn test_write_and_remove_artifact() {
        let dir = TempDir::new().unwrap();
        let schema = schema();
        let writer = CsvOutputWriter::new(dir.path());

        let path = writer.write(&partial_result(&schema), &schema).await.unwrap();
        assert!(path.exists());
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);

        writer.remove(&path).await.unwrap();
        assert!(!path.exists());
        writer.remove(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_same_stem_cannot_overwrite_artifact() {
        let dir = TempDir::new().unwrap();
        let schema = schema();
        let writer = CsvOutputWriter::new(dir.path());
        let first = partial_result(&schema);
        let mut second = partial_result(&schema);
        second.file_id = "product_1.md".to_string();

        let path = writer.write(&first, &schema).await.unwrap();
        let err = writer.clone().write(&second, &schema).await.unwrap_err();
        assert!(matches!(err, BatchError::ArtifactClaimed { ref claimed_by, .. } if claimed_by == "product_1.txt"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("steel"));

        // Rewriting the owner's artifact is fine; removing it frees the name.
        writer.write(&first, &schema).await.unwrap();
        writer.remove(&path).await.unwrap();
        assert_eq!(writer.write(&second, &schema).await.unwrap(), path);
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let schema = schema();
        let writer = CsvOutputWriter::new(dir.path().join("missing"));

        let err = writer.write(&partial_result(&schema), &schema).await.unwrap_err();
        assert!(matches!(err, BatchError::Io { .. }));
    }

    #[tokio::test]
    async fn test_json_summary_writer() {
        let dir = TempDir::new().unwrap();
        let writer = JsonSummaryWriter::new(dir.path().join("reports/extraction_summary.json"));

        let mut summary = RunSummary::new(0);
        summary.finish();
        let path = writer.write(&summary).await.unwrap();

        let json: serde_json::Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
        assert_eq!(json["total"], 0);
        assert!(json["finished_at"].is_string());
    }
}

//! Input discovery and reading

use crate::config::BatchConfig;
use crate::error::BatchError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An input file found in the input directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Full path
    pub path: PathBuf,

    /// File name, used as the record identifier
    pub file_id: String,
}

impl SourceFile {
    /// Describe the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, file_id }
    }
}

/// Files in `input_dir` whose names match `pattern`, sorted by path
///
/// Only regular files directly inside `input_dir` are considered.
///
/// # Errors
///
/// - `InvalidPattern` if `pattern` is not a valid glob
/// - `Io` if the directory cannot be listed
pub fn discover(input_dir: &Path, pattern: &str) -> Result<Vec<SourceFile>, BatchError> {
    let matcher = Pattern::new(pattern).map_err(|e| BatchError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let entries = std::fs::read_dir(input_dir).map_err(|e| BatchError::io(input_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BatchError::io(input_dir, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && matcher.matches(&entry.file_name().to_string_lossy()) {
            files.push(SourceFile::new(entry.path()));
        }
    }

    files.sort();
    debug!(count = files.len(), pattern, dir = %input_dir.display(), "Discovered input files");
    Ok(files)
}

/// Create every directory a run writes to
pub async fn ensure_directories(config: &BatchConfig) -> Result<(), BatchError> {
    for dir in [
        config.input_dir.clone(),
        config.output_dir.clone(),
        config.processed_dir.clone(),
        config.error_dir(),
    ] {
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| BatchError::io(&dir, e))?;
    }
    Ok(())
}

/// Read a product description, falling back to Latin-1 for non-UTF-8 files
pub async fn read_text(path: &Path) -> Result<String, BatchError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BatchError::io(path, e))?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(path = %path.display(), "File is not valid UTF-8, decoding as Latin-1");
            Ok(decode_latin1(e.as_bytes()))
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "text").unwrap();
    }

    #[test]
    fn test_discover_matches_pattern_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "product_b.txt");
        touch(dir.path(), "product_a.txt");
        touch(dir.path(), "notes.txt");
        std::fs::create_dir(dir.path().join("product_dir.txt")).unwrap();

        let files = discover(dir.path(), "product_*.txt").unwrap();
        let ids: Vec<_> = files.iter().map(|f| f.file_id.as_str()).collect();
        assert_eq!(ids, vec!["product_a.txt", "product_b.txt"]);
    }

    #[test]
    fn test_discover_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let err = discover(dir.path(), "product_[.txt").unwrap_err();
        assert!(matches!(err, BatchError::InvalidPattern { .. }));
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = TempDir::new().unwrap();
        let err = discover(&dir.path().join("absent"), "*").unwrap_err();
        assert!(matches!(err, BatchError::Io { .. }));
    }

    #[tokio::test]
    async fn test_read_text_falls_back_to_latin1() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("product_1.txt");
        std::fs::write(&path, [b'C', b'a', b'f', 0xE9]).unwrap();

        assert_eq!(read_text(&path).await.unwrap(), "Café");
    }

    #[tokio::test]
    async fn test_ensure_directories_creates_error_dir() {
        let dir = TempDir::new().unwrap();
        let config = BatchConfig {
            input_dir: dir.path().join("in"),
            output_dir: dir.path().join("out"),
            processed_dir: dir.path().join("done"),
            ..Default::default()
        };

        ensure_directories(&config).await.unwrap();
        assert!(config.input_dir.is_dir());
        assert!(config.error_dir().is_dir());
    }
}

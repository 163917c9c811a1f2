//! Filesystem relocation of processed inputs

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::traits::{Destination, FileMover};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Moves inputs to `processed_dir` or `processed_dir/errors`
#[derive(Debug, Clone)]
pub struct FsMover {
    processed_dir: PathBuf,
    error_dir: PathBuf,
}

impl FsMover {
    /// Create a mover for the given directories
    pub fn new(processed_dir: impl Into<PathBuf>, error_dir: impl Into<PathBuf>) -> Self {
        Self {
            processed_dir: processed_dir.into(),
            error_dir: error_dir.into(),
        }
    }

    /// Create a mover for a batch configuration
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(&config.processed_dir, config.error_dir())
    }

    fn dir_for(&self, destination: Destination) -> &Path {
        match destination {
            Destination::Processed => &self.processed_dir,
            Destination::Error => &self.error_dir,
        }
    }
}

#[async_trait]
impl FileMover for FsMover {
    async fn relocate(&self, source: &Path, destination: Destination) -> Result<PathBuf, BatchError> {
        let file_name = source.file_name().ok_or_else(|| {
            BatchError::io(source, std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"))
        })?;

        let dir = self.dir_for(destination);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| BatchError::io(dir, e))?;
        let target = dir.join(file_name);

        match tokio::fs::rename(source, &target).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound && target.exists() && !source.exists() => {
                debug!(target = %target.display(), "File already relocated");
                return Ok(target);
            }
            Err(e) if e.kind() == ErrorKind::CrossesDevices => {
                tokio::fs::copy(source, &target)
                    .await
                    .map_err(|e| BatchError::io(&target, e))?;
                tokio::fs::remove_file(source)
                    .await
                    .map_err(|e| BatchError::io(source, e))?;
            }
            Err(e) => return Err(BatchError::io(source, e)),
        }

        match destination {
            Destination::Processed => info!(target = %target.display(), "Moved processed file"),
            Destination::Error => warn!(target = %target.display(), "Moved file with errors"),
        }
        Ok(target)
    }
}

//! Configuration management for the CLI.
//!
//! Values are resolved in three layers: built-in defaults, then environment
//! variables, then the optional TOML file. Keys missing from a layer keep the
//! value of the layer below.

use crate::error::{CliError, Result};
use featx_batch::BatchConfig;
use featx_extractor::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Batch size used when the configured one is unusable.
pub const DEFAULT_BATCH_SIZE: i64 = 5;

/// Environment variables and the config keys they set.
pub const ENV_MAPPINGS: [(&str, &str); 8] = [
    ("LLM_PROVIDER", "llm.provider"),
    ("LLM_MODEL", "llm.model"),
    ("FEATURES_FILE", "paths.features"),
    ("INPUT_DIR", "paths.input_dir"),
    ("OUTPUT_DIR", "paths.output_dir"),
    ("PROCESSED_DIR", "paths.processed_dir"),
    ("FILE_PATTERN", "paths.file_pattern"),
    ("BATCH_SIZE", "processing.batch_size"),
];

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider selection
    pub llm: LlmSettings,

    /// Input and output locations
    pub paths: PathSettings,

    /// Concurrency and engine knobs
    pub processing: ProcessingSettings,
}

/// Provider selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider name: openai, anthropic or groq
    pub provider: String,

    /// Model override; the provider's default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Per-request HTTP timeout (seconds)
    pub request_timeout_secs: u64,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Feature list, one definition per line
    pub features: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub file_pattern: String,
    pub summary_file: PathBuf,
}

/// Concurrency and engine knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Maximum files in flight
    pub batch_size: i64,

    /// Retry, timeout and input limits
    #[serde(flatten)]
    pub engine: ExtractorConfig,
}

impl Config {
    /// Load configuration from the process environment and an optional file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |var| std::env::var(var).ok())
    }

    /// Load configuration with a custom environment lookup.
    ///
    /// A config file that cannot be read or parsed is an error.
    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_env(&env);

        if let Some(path) = path {
            let contents = std::fs::read_to_string(path).map_err(|source| CliError::ConfigFile {
                path: path.to_path_buf(),
                source,
            })?;
            config = config.overlay(&contents)?;
            info!(path = %path.display(), "Loaded configuration file");
        }

        config.normalize();
        Ok(config)
    }

    fn apply_env(&mut self, env: &dyn Fn(&str) -> Option<String>) {
        for (var, key) in ENV_MAPPINGS {
            let Some(value) = env(var).map(|v| v.trim().to_string()) else {
                continue;
            };
            match key {
                "llm.provider" => self.llm.provider = value,
                "llm.model" => self.llm.model = Some(value).filter(|m| !m.is_empty()),
                "paths.features" => self.paths.features = value.into(),
                "paths.input_dir" => self.paths.input_dir = value.into(),
                "paths.output_dir" => self.paths.output_dir = value.into(),
                "paths.processed_dir" => self.paths.processed_dir = value.into(),
                "paths.file_pattern" => self.paths.file_pattern = value,
                "processing.batch_size" => match value.parse() {
                    Ok(size) => self.processing.batch_size = size,
                    Err(_) => {
                        warn!(var, value = %value, "Invalid batch size in environment, ignoring");
                        continue;
                    }
                },
                _ => continue,
            }
            debug!(key, var, "Set from environment variable");
        }
    }

    /// Merge a TOML document over this configuration.
    fn overlay(&self, contents: &str) -> Result<Self> {
        let overlay: toml::Table = toml::from_str(contents)?;
        let mut base = match toml::Value::try_from(self) {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => return Err(CliError::Config("Config did not serialize to a table".to_string())),
            Err(e) => return Err(CliError::Config(format!("Failed to serialize config: {}", e))),
        };
        merge_tables(&mut base, overlay);
        Ok(toml::Value::Table(base).try_into()?)
    }

    fn normalize(&mut self) {
        if self.processing.batch_size < 1 {
            warn!(
                batch_size = self.processing.batch_size,
                default = DEFAULT_BATCH_SIZE,
                "Invalid batch size, using default"
            );
            self.processing.batch_size = DEFAULT_BATCH_SIZE;
        }
    }

    /// Batch settings for the orchestrator.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            input_dir: self.paths.input_dir.clone(),
            output_dir: self.paths.output_dir.clone(),
            processed_dir: self.paths.processed_dir.clone(),
            file_pattern: self.paths.file_pattern.clone(),
            batch_size: usize::try_from(self.processing.batch_size).unwrap_or(DEFAULT_BATCH_SIZE as usize),
            summary_file: self.paths.summary_file.clone(),
        }
    }

    /// Per-request HTTP timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.request_timeout_secs)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(inner)), toml::Value::Table(value)) => merge_tables(inner, value),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: None,
            request_timeout_secs: featx_domain::DEFAULT_REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        let batch = BatchConfig::default();
        Self {
            features: PathBuf::from("features.txt"),
            input_dir: batch.input_dir,
            output_dir: batch.output_dir,
            processed_dir: batch.processed_dir,
            file_pattern: batch.file_pattern,
            summary_file: batch.summary_file,
        }
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            engine: ExtractorConfig::default(),
        }
    }
}

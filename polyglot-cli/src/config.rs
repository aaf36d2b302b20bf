use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use object_uploader::{Backoff, RetryPolicy, UploadConfig, DEFAULT_CHUNK_SIZE};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.e-olymp.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read configuration {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to parse configuration {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Configuration {
    pub eolymp: Eolymp,
    pub upload: Upload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Eolymp {
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub token: String,
}

impl Default for Eolymp {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            username: String::new(),
            password: String::new(),
            token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    Fixed,
    Linear,
    Quadratic,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Upload {
    pub chunk_size: usize,
    pub multipart_threshold: usize,
    pub retry_attempts: u32,
    pub retry_delay_secs: u64,
    pub backoff: BackoffKind,
    pub timeout_secs: u64,
    pub cache_path: PathBuf,
}

impl Default for Upload {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            multipart_threshold: DEFAULT_CHUNK_SIZE,
            retry_attempts: 10,
            retry_delay_secs: 10,
            backoff: BackoffKind::Fixed,
            timeout_secs: 60,
            cache_path: PathBuf::from("cache.json"),
        }
    }
}

impl Upload {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn upload_config(&self) -> UploadConfig {
        let delay = Duration::from_secs(self.retry_delay_secs);
        let backoff = match self.backoff {
            BackoffKind::Fixed => Backoff::Fixed(delay),
            BackoffKind::Linear => Backoff::Linear(delay),
            BackoffKind::Quadratic => Backoff::Quadratic(delay),
        };
        UploadConfig {
            chunk_size: self.chunk_size,
            multipart_threshold: self.multipart_threshold,
            retry: RetryPolicy::new(self.retry_attempts, backoff),
        }
    }
}

impl Configuration {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("no configuration at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.chunk_size == 0 {
            return Err(ConfigError::Invalid("Upload.ChunkSize must be positive".to_string()));
        }
        if self.upload.multipart_threshold == 0 {
            return Err(ConfigError::Invalid("Upload.MultipartThreshold must be positive".to_string()));
        }
        if self.upload.retry_attempts == 0 {
            return Err(ConfigError::Invalid("Upload.RetryAttempts must be positive".to_string()));
        }
        Url::parse(&self.eolymp.api_url)
            .map_err(|e| ConfigError::Invalid(format!("Eolymp.ApiUrl {:?}: {}", self.eolymp.api_url, e)))?;
        Ok(())
    }
}

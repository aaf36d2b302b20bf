use std::io;
use std::path::PathBuf;
use blob_store::{HttpStoreError, OAuthError};
use object_uploader::{CacheError, UploadError};
use thiserror::Error;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliErr {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to authenticate: {0}")]
    Auth(#[from] OAuthError),

    #[error("failed to set up object store: {0}")]
    Store(#[from] HttpStoreError),

    #[error("failed to load dedup cache: {0}")]
    Cache(#[from] CacheError),

    #[error("unable to collect tests from {path:?}: {source}")]
    Collect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("upload failed: {source}")]
    Upload {
        #[from]
        source: UploadError,
    },

    #[error("unable to write output: {0}")]
    Output(#[from] io::Error),
}

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use crate::cache::CacheError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Step of an upload that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    CreateObject,
    StartMultipart,
    UploadPart(u32),
    CompleteMultipart,
    Cache,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Read => f.write_str("read"),
            Stage::CreateObject => f.write_str("create object"),
            Stage::StartMultipart => f.write_str("start multipart upload"),
            Stage::UploadPart(n) => write!(f, "upload part #{}", n),
            Stage::CompleteMultipart => f.write_str("complete multipart upload"),
            Stage::Cache => f.write_str("cache update"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unable to read payload {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("create object failed after {attempts} attempts: {source}")]
    CreateObject {
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error("start multipart upload failed after {attempts} attempts: {source}")]
    StartMultipart {
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error("upload of part #{part} failed after {attempts} attempts: {source}")]
    UploadPart {
        part: u32,
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error("complete multipart upload failed after {attempts} attempts: {source}")]
    CompleteMultipart {
        attempts: u32,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl UploadError {
    pub fn stage(&self) -> Stage {
        match self {
            UploadError::Read { .. } => Stage::Read,
            UploadError::CreateObject { .. } => Stage::CreateObject,
            UploadError::StartMultipart { .. } => Stage::StartMultipart,
            UploadError::UploadPart { part, .. } => Stage::UploadPart(*part),
            UploadError::CompleteMultipart { .. } => Stage::CompleteMultipart,
            UploadError::Cache(_) => Stage::Cache,
        }
    }
}

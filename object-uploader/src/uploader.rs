use std::path::{Path, PathBuf};
use blob_store::{CompletedPart, ObjectStore};
use tokio::fs;
use crate::cache::DedupCache;
use crate::error::UploadError;
use crate::hash::ContentHash;
use crate::retry::RetryPolicy;

/// 5 MiB, the smallest part size object stores accept for multipart uploads.
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadConfig {
    pub chunk_size: usize,
    /// Payloads of at least this many bytes go through a multipart session.
    pub multipart_threshold: usize,
    pub retry: RetryPolicy,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            multipart_threshold: DEFAULT_CHUNK_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

/// Bytes to upload, either from disk or already in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    File(PathBuf),
    Inline(Vec<u8>),
}

/// Uploads payloads to an `ObjectStore`, skipping content that was uploaded before.
pub struct ObjectUploader<S> {
    store: S,
    cache: DedupCache,
    config: UploadConfig,
}

impl<S: ObjectStore> ObjectUploader<S> {
    pub fn new(store: S, cache: DedupCache, config: UploadConfig) -> Self {
        Self { store, cache, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub async fn upload_payload(&mut self, payload: &Payload) -> Result<String, UploadError> {
        match payload {
            Payload::File(path) => self.upload_file(path).await,
            Payload::Inline(data) => self.upload(data).await,
        }
    }

    pub async fn upload_file(&mut self, path: &Path) -> Result<String, UploadError> {
        let data = fs::read(path)
            .await
            .map_err(|source| UploadError::Read { path: path.to_path_buf(), source })?;
        self.upload(&data).await
    }

    /// Returns the object key for `data`, uploading it only if its hash is not cached.
    pub async fn upload(&mut self, data: &[u8]) -> Result<String, UploadError> {
        let hash = ContentHash::of(data);
        tracing::info!("{} ({} bytes)", hash, data.len());

        if let Some(key) = self.cache.get(&hash) {
            tracing::info!("cached {} -> {}", hash, key);
            return Ok(key.to_string());
        }

        let key = if data.len() < self.config.multipart_threshold {
            self.upload_single(data).await?
        } else {
            self.upload_multipart(data).await?
        };
        tracing::info!("uploaded {} -> {}", hash, key);

        self.cache.set(hash, key.clone()).await?;
        Ok(key)
    }

    async fn upload_single(&self, data: &[u8]) -> Result<String, UploadError> {
        let store = &self.store;
        self.config
            .retry
            .run("create object", move || store.create_object(data))
            .await
            .map_err(|e| UploadError::CreateObject { attempts: e.attempts, source: e.source })
    }

    async fn upload_multipart(&self, data: &[u8]) -> Result<String, UploadError> {
        let store = &self.store;
        let retry = &self.config.retry;

        let session = retry
            .run("start multipart upload", move || store.start_multipart_upload())
            .await
            .map_err(|e| UploadError::StartMultipart { attempts: e.attempts, source: e.source })?;
        tracing::debug!("started upload {} for object {}", session.upload_id, session.object_id);

        let session = &session;
        let mut parts = Vec::new();
        for (i, chunk) in data.chunks(self.config.chunk_size.max(1)).enumerate() {
            let number = i as u32 + 1;
            tracing::info!("Uploading part #{}, {} bytes", number, chunk.len());

            let etag = retry
                .run(&format!("upload part #{}", number), move || {
                    store.upload_part(session, number, chunk)
                })
                .await
                .map_err(|e| UploadError::UploadPart {
                    part: number,
                    attempts: e.attempts,
                    source: e.source,
                })?;
            parts.push(CompletedPart { number, etag });
        }

        let parts = &parts[..];
        retry
            .run("complete multipart upload", move || {
                store.complete_multipart_upload(session, parts)
            })
            .await
            .map_err(|e| UploadError::CompleteMultipart { attempts: e.attempts, source: e.source })
    }
}

use std::error::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::http_store::KeeperHttpStore;
use crate::local_store::LocalFileBlobStore;


pub type ObjectResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Handle of an open multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartSession {
    pub object_id: String,
    pub upload_id: String,
}

/// A part acknowledged by the store, referenced again when completing the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedPart {
    pub number: u32,
    pub etag: String,
}

/// Remote object storage the uploader talks to.
///
/// Small payloads go through `create_object`; large ones through a multipart
/// session that is opened, filled part by part (numbered from 1) and completed
/// with the full list of etags in part order.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `data` as a single object and returns its key.
    async fn create_object(&self, data: &[u8]) -> ObjectResult<String>;

    async fn start_multipart_upload(&self) -> ObjectResult<MultipartSession>;

    /// Uploads one part of an open session and returns its etag.
    async fn upload_part(
        &self,
        session: &MultipartSession,
        part_number: u32,
        data: &[u8],
    ) -> ObjectResult<String>;

    /// Finalizes the session and returns the object id of the assembled object.
    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: &[CompletedPart],
    ) -> ObjectResult<String>;
}


#[derive(Debug, Clone)]
pub enum ObjectStores {
    Local(LocalFileBlobStore),
    Keeper(KeeperHttpStore),
}

impl ObjectStores {
    /// Returns a reference to the inner value as a trait object.
    pub fn as_trait(&self) -> &dyn ObjectStore {
        match self {
            ObjectStores::Local(a) => a,
            ObjectStores::Keeper(b) => b,
        }
    }
}

#[async_trait]
impl ObjectStore for ObjectStores {
    async fn create_object(&self, data: &[u8]) -> ObjectResult<String> {
        self.as_trait().create_object(data).await
    }

    async fn start_multipart_upload(&self) -> ObjectResult<MultipartSession> {
        self.as_trait().start_multipart_upload().await
    }

    async fn upload_part(
        &self,
        session: &MultipartSession,
        part_number: u32,
        data: &[u8],
    ) -> ObjectResult<String> {
        self.as_trait().upload_part(session, part_number, data).await
    }

    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: &[CompletedPart],
    ) -> ObjectResult<String> {
        self.as_trait().complete_multipart_upload(session, parts).await
    }
}

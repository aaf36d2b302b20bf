use std::io;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;
use crate::store::{CompletedPart, MultipartSession, ObjectResult, ObjectStore};

const UPLOADS_DIR: &str = ".uploads";

/// An `ObjectStore` that keeps objects as files in a local directory.
///
/// Multipart parts are staged under `.uploads/<upload_id>/` until the session
/// is completed, at which point they are concatenated into the final object.
#[derive(Clone, Debug)]
pub struct LocalFileBlobStore {
    base_path: PathBuf,
}

impl LocalFileBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Reads back an object written by this store.
    pub async fn read_object(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.base_path.join(key)).await
    }

    fn upload_dir(&self, upload_id: &str) -> PathBuf {
        self.base_path.join(UPLOADS_DIR).join(upload_id)
    }
}

#[async_trait]
impl ObjectStore for LocalFileBlobStore {
    async fn create_object(&self, data: &[u8]) -> ObjectResult<String> {
        fs::create_dir_all(&self.base_path).await?;
        let key = Uuid::new_v4().to_string();
        fs::write(self.base_path.join(&key), data).await?;
        Ok(key)
    }

    async fn start_multipart_upload(&self) -> ObjectResult<MultipartSession> {
        let session = MultipartSession {
            object_id: Uuid::new_v4().to_string(),
            upload_id: Uuid::new_v4().to_string(),
        };
        fs::create_dir_all(self.upload_dir(&session.upload_id)).await?;
        Ok(session)
    }

    async fn upload_part(
        &self,
        session: &MultipartSession,
        part_number: u32,
        data: &[u8],
    ) -> ObjectResult<String> {
        let dir = self.upload_dir(&session.upload_id);
        if !fs::try_exists(&dir).await? {
            return Err(format!("unknown upload {}", session.upload_id).into());
        }
        let etag = Uuid::new_v4().simple().to_string();
        fs::write(dir.join(format!("{}-{}", part_number, etag)), data).await?;
        Ok(etag)
    }

    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: &[CompletedPart],
    ) -> ObjectResult<String> {
        let dir = self.upload_dir(&session.upload_id);
        let mut contents = Vec::with_capacity(parts.len());
        for part in parts {
            let part_path = dir.join(format!("{}-{}", part.number, part.etag));
            let data = fs::read(&part_path).await.map_err(|e| {
                io::Error::new(e.kind(), format!("part #{} ({}) not found: {}", part.number, part.etag, e))
            })?;
            contents.push(data);
        }

        // No object file exists until every part has been read.
        let mut object = fs::File::create(self.base_path.join(&session.object_id)).await?;
        for data in &contents {
            object.write_all(data).await?;
        }
        object.flush().await?;
        fs::remove_dir_all(&dir).await?;
        Ok(session.object_id.clone())
    }
}



#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_object() {
        let temp_dir = tempdir().unwrap();
        let store = LocalFileBlobStore::new(temp_dir.path());

        let key = store.create_object(b"test data").await.unwrap();

        let data = store.read_object(&key).await.unwrap();
        assert_eq!(data, b"test data");
    }

    #[tokio::test]
    async fn test_create_object_gives_distinct_keys() {
        let temp_dir = tempdir().unwrap();
        let store = LocalFileBlobStore::new(temp_dir.path());

        let first = store.create_object(b"test data 1").await.unwrap();
        let second = store.create_object(b"test data 2").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.read_object(&second).await.unwrap(), b"test data 2");
    }

    #[tokio::test]
    async fn test_multipart_assembles_parts_in_listed_order() {
        let temp_dir = tempdir().unwrap();
        let store = LocalFileBlobStore::new(temp_dir.path());

        let session = store.start_multipart_upload().await.unwrap();
        let e1 = store.upload_part(&session, 1, b"hello ").await.unwrap();
        let e2 = store.upload_part(&session, 2, b"world").await.unwrap();

        let parts = vec![
            CompletedPart { number: 1, etag: e1 },
            CompletedPart { number: 2, etag: e2 },
        ];
        let key = store.complete_multipart_upload(&session, &parts).await.unwrap();

        assert_eq!(key, session.object_id);
        assert_eq!(store.read_object(&key).await.unwrap(), b"hello world");
        assert!(!store.upload_dir(&session.upload_id).exists());
    }

    #[tokio::test]
    async fn test_complete_rejects_unknown_etag() {
        let temp_dir = tempdir().unwrap();
        let store = LocalFileBlobStore::new(temp_dir.path());

        let session = store.start_multipart_upload().await.unwrap();
        store.upload_part(&session, 1, b"data").await.unwrap();

        let parts = vec![CompletedPart { number: 1, etag: "bogus".to_string() }];
        assert!(store.complete_multipart_upload(&session, &parts).await.is_err());
        assert!(!temp_dir.path().join(&session.object_id).exists());
        assert!(store.read_object(&session.object_id).await.is_err());
    }

    #[tokio::test]
    async fn test_upload_part_requires_open_session() {
        let temp_dir = tempdir().unwrap();
        let store = LocalFileBlobStore::new(temp_dir.path());

        let session = MultipartSession {
            object_id: "object".to_string(),
            upload_id: "missing".to_string(),
        };
        assert!(store.upload_part(&session, 1, b"data").await.is_err());
    }
}

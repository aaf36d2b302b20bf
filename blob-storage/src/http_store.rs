use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use base64::prelude::*;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use crate::store::{CompletedPart, MultipartSession, ObjectResult, ObjectStore};

const KEEPER_SERVICE: &str = "eolymp.keeper.Keeper";

#[derive(Debug, Error)]
pub enum HttpStoreError {
    #[error("request to keeper failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{method} returned {status}: {body}")]
    Status {
        method: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("unable to decode {method} response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} response is missing `{field}`")]
    MissingField {
        method: &'static str,
        field: &'static str,
    },
}

fn as_base64<S: Serializer>(data: &&[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64_STANDARD.encode(data))
}

#[derive(Serialize)]
struct CreateObjectInput<'a> {
    #[serde(serialize_with = "as_base64")]
    data: &'a [u8],
}

#[derive(Deserialize)]
struct CreateObjectOutput {
    #[serde(default)]
    key: String,
}

#[derive(Serialize)]
struct StartMultipartUploadInput {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartMultipartUploadOutput {
    #[serde(default)]
    object_id: String,
    #[serde(default)]
    upload_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadPartInput<'a> {
    object_id: &'a str,
    upload_id: &'a str,
    part_number: u32,
    #[serde(serialize_with = "as_base64")]
    data: &'a [u8],
}

#[derive(Deserialize)]
struct UploadPartOutput {
    #[serde(default)]
    etag: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteMultipartUploadInput<'a> {
    object_id: &'a str,
    upload_id: &'a str,
    parts: &'a [CompletedPart],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompleteMultipartUploadOutput {
    #[serde(default)]
    object_id: Option<String>,
}

fn required(method: &'static str, field: &'static str, value: String) -> Result<String, HttpStoreError> {
    if value.is_empty() {
        Err(HttpStoreError::MissingField { method, field })
    } else {
        Ok(value)
    }
}

/// Keeper object storage reached through its twirp JSON endpoint.
#[derive(Clone)]
pub struct KeeperHttpStore {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl fmt::Debug for KeeperHttpStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeeperHttpStore")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl KeeperHttpStore {
    pub fn new(api_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, HttpStoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: api_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/twirp/{}/{}", self.base_url, KEEPER_SERVICE, method)
    }

    async fn invoke<I, O>(&self, method: &'static str, input: &I) -> Result<O, HttpStoreError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(self.method_url(method))
            .header(ACCEPT, "application/json")
            .json(input);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HttpStoreError::Status { method, status, body });
        }

        serde_json::from_str(&body).map_err(|source| HttpStoreError::Decode { method, source })
    }
}

#[async_trait]
impl ObjectStore for KeeperHttpStore {
    async fn create_object(&self, data: &[u8]) -> ObjectResult<String> {
        let out: CreateObjectOutput = self.invoke("CreateObject", &CreateObjectInput { data }).await?;
        Ok(required("CreateObject", "key", out.key)?)
    }

    async fn start_multipart_upload(&self) -> ObjectResult<MultipartSession> {
        let out: StartMultipartUploadOutput = self
            .invoke("StartMultipartUpload", &StartMultipartUploadInput {})
            .await?;
        Ok(MultipartSession {
            object_id: required("StartMultipartUpload", "objectId", out.object_id)?,
            upload_id: required("StartMultipartUpload", "uploadId", out.upload_id)?,
        })
    }

    async fn upload_part(
        &self,
        session: &MultipartSession,
        part_number: u32,
        data: &[u8],
    ) -> ObjectResult<String> {
        let input = UploadPartInput {
            object_id: &session.object_id,
            upload_id: &session.upload_id,
            part_number,
            data,
        };
        let out: UploadPartOutput = self.invoke("UploadPart", &input).await?;
        Ok(required("UploadPart", "etag", out.etag)?)
    }

    async fn complete_multipart_upload(
        &self,
        session: &MultipartSession,
        parts: &[CompletedPart],
    ) -> ObjectResult<String> {
        let input = CompleteMultipartUploadInput {
            object_id: &session.object_id,
            upload_id: &session.upload_id,
            parts,
        };
        let out: CompleteMultipartUploadOutput = self.invoke("CompleteMultipartUpload", &input).await?;
        Ok(out
            .object_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| session.object_id.clone()))
    }
}

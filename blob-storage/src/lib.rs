//! Object storage backends for the uploader: a local directory store and the
//! keeper HTTP API, plus the OAuth client used to authenticate against it.

pub mod http_store;
pub mod local_store;
pub mod oauth;
pub mod store;

pub use http_store::{HttpStoreError, KeeperHttpStore};
pub use local_store::LocalFileBlobStore;
pub use oauth::{OAuthClient, OAuthError, TokenResponse};
pub use store::{CompletedPart, MultipartSession, ObjectResult, ObjectStore, ObjectStores};

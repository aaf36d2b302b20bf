#![allow(clippy::uninlined_format_args)]
#![deny(unused_qualifications)]

//! Content-addressed object uploads with retries and a persisted dedup cache.

pub mod cache;
pub mod error;
pub mod hash;
pub mod retry;
pub mod testdata;
pub mod uploader;

#[cfg(test)]
mod test_support;

pub use cache::{CacheError, DedupCache};
pub use error::{Stage, UploadError};
pub use hash::ContentHash;
pub use retry::{Backoff, RetryExhausted, RetryPolicy};
pub use uploader::{ObjectUploader, Payload, UploadConfig, DEFAULT_CHUNK_SIZE};

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use crate::hash::ContentHash;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("unable to write dedup cache {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to serialize dedup cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Content hash to object key memo, persisted as a flat JSON object.
///
/// The file is read once on `load` and rewritten in full on every `set`.
/// Unreadable or malformed files load as an empty cache.
#[derive(Debug)]
pub struct DedupCache {
    path: PathBuf,
    entries: BTreeMap<ContentHash, String>,
}

impl DedupCache {
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("creating empty dedup cache at {:?}", path);
                fs::write(&path, b"{}")
                    .await
                    .map_err(|source| CacheError::Write { path: path.clone(), source })?;
                return Ok(Self { path, entries: BTreeMap::new() });
            }
            Err(e) => {
                tracing::warn!("unable to read dedup cache {:?}, starting empty: {}", path, e);
                return Ok(Self { path, entries: BTreeMap::new() });
            }
        };

        let entries = parse_entries(&path, &raw);
        tracing::debug!("loaded {} cached objects from {:?}", entries.len(), path);
        Ok(Self { path, entries })
    }

    pub fn get(&self, hash: &ContentHash) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    /// Records `key` for `hash` and rewrites the whole cache file.
    pub async fn set(&mut self, hash: ContentHash, key: String) -> Result<(), CacheError> {
        tracing::debug!("caching {} -> {}", hash, key);
        self.entries.insert(hash, key);
        let data = serde_json::to_vec(&self.entries)?;
        fs::write(&self.path, data)
            .await
            .map_err(|source| CacheError::Write { path: self.path.clone(), source })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_entries(path: &Path, raw: &str) -> BTreeMap<ContentHash, String> {
    let decoded: BTreeMap<String, String> = match serde_json::from_str(raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::warn!("dedup cache {:?} is malformed, starting empty: {}", path, e);
            return BTreeMap::new();
        }
    };

    let mut entries = BTreeMap::new();
    let mut dropped = 0;
    for (hash, key) in decoded {
        match hash.parse::<ContentHash>() {
            Ok(hash) if !key.is_empty() => {
                entries.insert(hash, key);
            }
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::warn!("dropped {} invalid entries from dedup cache {:?}", dropped, path);
    }
    entries
}

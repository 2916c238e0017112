//! Object store capability and the bundled backends.
//!
//! The orchestrator fetches the source and uploads variants through
//! [`ObjectStore`]; cloud backends (S3 and friends) plug in behind the same
//! trait. [`FsStore`] backs local deployments with a directory tree,
//! [`MemoryStore`] backs tests and ephemeral runs.

use crate::error::{ResizeError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Location descriptor returned by a successful `put`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub url: String,
    pub key: String,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's bytes. Absent keys are `ResizeError::NotFound`.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Store `bytes` under `prefix/key` and describe where it landed.
    async fn put(&self, key: &str, bytes: Bytes, prefix: &str) -> Result<StoredObject>;
}

fn join_prefixed(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix.trim_end_matches('/'), key)
    }
}

/// Directory-backed store. Keys map to paths under `root`; `put` writes
/// into `root/prefix/` and reports URLs under `base_url`.
pub struct FsStore {
    root: PathBuf,
    base_url: String,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResizeError::NotFound(key.to_string()))
            }
            Err(e) => Err(ResizeError::Store(format!("read {key}: {e}"))),
        }
    }

    async fn put(&self, key: &str, bytes: Bytes, prefix: &str) -> Result<StoredObject> {
        let dir = self.root.join(prefix);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| ResizeError::Store(format!("create {}: {e}", dir.display())))?;

        let path = dir.join(key);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ResizeError::Store(format!("write {}: {e}", path.display())))?;

        let base = self.base_url.trim_end_matches('/');
        Ok(StoredObject {
            url: format!("{base}/{}", join_prefixed(prefix, key)),
            key: key.to_string(),
            prefix: prefix.to_string(),
            region: None,
            base_url: Some(base.to_string()),
        })
    }
}

/// In-memory store for tests and ephemeral local runs.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, e.g. a test fixture.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Bytes>) {
        self.objects.lock().unwrap().insert(key.into(), bytes.into());
    }

    /// Read back a stored object by its full prefixed key.
    pub fn object(&self, key: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ResizeError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: Bytes, prefix: &str) -> Result<StoredObject> {
        let full_key = join_prefixed(prefix, key);
        self.objects.lock().unwrap().insert(full_key.clone(), bytes);

        Ok(StoredObject {
            url: format!("memory://{full_key}"),
            key: key.to_string(),
            prefix: prefix.to_string(),
            region: None,
            base_url: None,
        })
    }
}

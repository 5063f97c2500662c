//! File-backed store backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::store::{DurableStore, StoreError, StoreResult};

/// Store backend persisting all records as a single JSON document on disk.
///
/// The process-durable stand-in for a real backend: every mutation rewrites
/// the document through a sibling temp file so a crash leaves either the old
/// or the new version.
pub struct FileStore {
    path: PathBuf,
    records: Mutex<HashMap<String, Value>>,
}

impl FileStore {
    /// Open the store at `path`, loading existing records if the file exists.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    async fn persist(&self, records: &HashMap<String, Value>) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(records)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.records.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        let mut records = self.records.lock().await;
        records.insert(key.to_string(), value);
        self.persist(&records).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut records = self.records.lock().await;
        records
            .remove(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        self.persist(&records).await
    }
}

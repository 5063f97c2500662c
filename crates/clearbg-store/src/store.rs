use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Keyed, process-durable storage of JSON-serializable records.
///
/// Writes are visible to the caller's own subsequent reads. Keys are flat
/// strings; record families use a `family/<id>` convention so operations on
/// different keys never touch the same record.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    async fn put(&self, key: &str, value: Value) -> StoreResult<()>;

    /// Remove a key. Fails with [`StoreError::NotFound`] if absent.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}

/// Typed convenience layer over the raw JSON surface.
#[async_trait]
pub trait DurableStoreExt: DurableStore {
    async fn get_json<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn put_json<T>(&self, key: &str, value: &T) -> StoreResult<()>
    where
        T: Serialize + Sync,
    {
        self.put(key, serde_json::to_value(value)?).await
    }
}

impl<S: DurableStore + ?Sized> DurableStoreExt for S {}

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use clearbg_core::models::ImageRecord;

use crate::store::{DurableStore, StoreError, StoreResult};
use crate::DurableStoreExt;

fn image_key(id: Uuid) -> String {
    format!("image/{id}")
}

fn index_key(identity_key: &str) -> String {
    format!("image_index/{identity_key}")
}

/// Persistence for uploaded-image metadata with a per-identity index.
///
/// Index mutations are read-modify-write over one key, so they are
/// serialized behind a single lock; record reads go straight to the store.
#[derive(Clone)]
pub struct ImageRepository {
    store: Arc<dyn DurableStore>,
    index_lock: Arc<Mutex<()>>,
}

impl ImageRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            index_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<ImageRecord>> {
        self.store.get_json(&image_key(id)).await
    }

    #[tracing::instrument(skip(self, record), fields(image_id = %record.id, identity_key = %record.identity_key))]
    pub async fn save(&self, record: &ImageRecord) -> StoreResult<()> {
        self.store.put_json(&image_key(record.id), record).await?;

        let _guard = self.index_lock.lock().await;
        let mut index: Vec<Uuid> = self
            .store
            .get_json(&index_key(&record.identity_key))
            .await?
            .unwrap_or_default();
        if !index.contains(&record.id) {
            index.push(record.id);
            self.store
                .put_json(&index_key(&record.identity_key), &index)
                .await?;
        }
        Ok(())
    }

    pub async fn list_for(&self, identity_key: &str) -> StoreResult<Vec<ImageRecord>> {
        let index: Vec<Uuid> = self
            .store
            .get_json(&index_key(identity_key))
            .await?
            .unwrap_or_default();

        let mut records = Vec::with_capacity(index.len());
        for id in index {
            if let Some(record) = self.get(id).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let record = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(image_key(id)))?;

        self.store.delete(&image_key(id)).await?;

        let _guard = self.index_lock.lock().await;
        let mut index: Vec<Uuid> = self
            .store
            .get_json(&index_key(&record.identity_key))
            .await?
            .unwrap_or_default();
        index.retain(|entry| *entry != id);
        self.store
            .put_json(&index_key(&record.identity_key), &index)
            .await
    }
}

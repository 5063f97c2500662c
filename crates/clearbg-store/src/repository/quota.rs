use std::sync::Arc;

use clearbg_core::models::QuotaRecord;

use crate::store::{DurableStore, StoreResult};
use crate::DurableStoreExt;

fn quota_key(identity_key: &str) -> String {
    format!("quota/{identity_key}")
}

/// Persistence for per-identity quota records.
///
/// Pure storage access; atomicity of check-and-decrement belongs to the
/// quota ledger that owns this repository.
#[derive(Clone)]
pub struct QuotaRepository {
    store: Arc<dyn DurableStore>,
}

impl QuotaRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self, identity_key: &str) -> StoreResult<Option<QuotaRecord>> {
        self.store.get_json(&quota_key(identity_key)).await
    }

    #[tracing::instrument(skip(self, record), fields(identity_key = %record.identity_key, remaining = record.remaining))]
    pub async fn save(&self, record: &QuotaRecord) -> StoreResult<()> {
        self.store
            .put_json(&quota_key(&record.identity_key), record)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_load_missing_record() {
        let repo = QuotaRepository::new(Arc::new(MemoryStore::new()));
        assert!(repo.load("anon_nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let repo = QuotaRepository::new(Arc::new(MemoryStore::new()));
        let record = QuotaRecord::new("anon_device_1", 2);

        repo.save(&record).await.unwrap();
        assert_eq!(repo.load("anon_device_1").await.unwrap(), Some(record));
    }
}

use std::sync::Arc;

use uuid::Uuid;

use clearbg_core::models::AdView;

use crate::store::{DurableStore, StoreResult};
use crate::DurableStoreExt;

fn ad_view_key(id: Uuid) -> String {
    format!("ad_view/{id}")
}

/// Persistence for advertisement-view receipts.
#[derive(Clone)]
pub struct AdViewRepository {
    store: Arc<dyn DurableStore>,
}

impl AdViewRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<AdView>> {
        self.store.get_json(&ad_view_key(id)).await
    }

    #[tracing::instrument(skip(self, view), fields(ad_view_id = %view.id, completed = view.completed))]
    pub async fn save(&self, view: &AdView) -> StoreResult<()> {
        self.store.put_json(&ad_view_key(view.id), view).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_then_get() {
        let repo = AdViewRepository::new(Arc::new(MemoryStore::new()));
        let view = AdView::start(Uuid::new_v4(), Utc::now());

        repo.save(&view).await.unwrap();
        assert_eq!(repo.get(view.id).await.unwrap(), Some(view));
    }

    #[tokio::test]
    async fn test_get_missing_view() {
        let repo = AdViewRepository::new(Arc::new(MemoryStore::new()));
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}

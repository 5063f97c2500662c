use std::sync::Arc;

use uuid::Uuid;

use clearbg_core::models::PaymentIntent;

use crate::store::{DurableStore, StoreResult};
use crate::DurableStoreExt;

fn payment_key(id: Uuid) -> String {
    format!("payment/{id}")
}

/// Persistence for payment intents.
#[derive(Clone)]
pub struct PaymentRepository {
    store: Arc<dyn DurableStore>,
}

impl PaymentRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<PaymentIntent>> {
        self.store.get_json(&payment_key(id)).await
    }

    #[tracing::instrument(skip(self, intent), fields(intent_id = %intent.id, status = ?intent.status))]
    pub async fn save(&self, intent: &PaymentIntent) -> StoreResult<()> {
        self.store.put_json(&payment_key(intent.id), intent).await
    }
}

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use clearbg_core::models::{Session, UserAccount};

use crate::store::{DurableStore, StoreError, StoreResult};
use crate::DurableStoreExt;

fn account_key(id: Uuid) -> String {
    format!("account/{id}")
}

fn email_key(email: &str) -> String {
    format!("account_email/{}", email.to_lowercase())
}

fn session_key(token: &str) -> String {
    format!("session/{token}")
}

/// Persistence for registered accounts and their login sessions.
///
/// Accounts are stored per id with a lowercase-email index so lookups by
/// either handle stay single-key reads.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn DurableStore>,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<UserAccount>> {
        self.store.get_json(&account_key(id)).await
    }

    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let Some(value) = self.store.get(&email_key(email)).await? else {
            return Ok(None);
        };
        let id: Uuid = serde_json::from_value(value)?;
        self.get(id).await
    }

    #[tracing::instrument(skip(self, account), fields(user_id = %account.id))]
    pub async fn save(&self, account: &UserAccount) -> StoreResult<()> {
        self.store
            .put_json(&account_key(account.id), account)
            .await?;
        self.store
            .put(&email_key(&account.email), Value::String(account.id.to_string()))
            .await
    }

    pub async fn get_session(&self, token: &str) -> StoreResult<Option<Session>> {
        self.store.get_json(&session_key(token)).await
    }

    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn save_session(&self, session: &Session) -> StoreResult<()> {
        self.store
            .put_json(&session_key(&session.token), session)
            .await
    }

    /// Drop a session. Deleting an unknown token is a no-op.
    pub async fn delete_session(&self, token: &str) -> StoreResult<()> {
        match self.store.delete(&session_key(token)).await {
            Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

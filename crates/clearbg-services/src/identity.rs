//! Session identity resolution.

use std::sync::Arc;

use rand::Rng;

use clearbg_core::constants::DEVICE_ID_KEY;
use clearbg_core::models::Identity;
use clearbg_store::{AccountRepository, DurableStore, DurableStoreExt};

use crate::error::ServiceResult;

/// Resolves exactly one identity per session: a valid session token yields
/// the registered account, anything else the persisted anonymous device id.
pub struct IdentityResolver {
    store: Arc<dyn DurableStore>,
    accounts: AccountRepository,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            accounts: AccountRepository::new(store.clone()),
            store,
        }
    }

    #[tracing::instrument(skip(self, session_token))]
    pub async fn resolve(&self, session_token: Option<&str>) -> ServiceResult<Identity> {
        if let Some(token) = session_token {
            if let Some(session) = self.accounts.get_session(token).await? {
                return Ok(Identity::Registered {
                    user_id: session.user_id,
                });
            }
        }

        Ok(Identity::Anonymous {
            device_id: self.device_id().await?,
        })
    }

    /// The per-device anonymous id, generated once and persisted for the
    /// lifetime of the device profile.
    pub async fn device_id(&self) -> ServiceResult<String> {
        if let Some(existing) = self.store.get_json::<String>(DEVICE_ID_KEY).await? {
            return Ok(existing);
        }

        let device_id = format!("device_{:016x}", rand::rng().random::<u64>());
        self.store.put_json(DEVICE_ID_KEY, &device_id).await?;
        tracing::debug!(%device_id, "Generated new device id");
        Ok(device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clearbg_core::models::Session;
    use clearbg_store::MemoryStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_device_id_is_stable() {
        let resolver = IdentityResolver::new(Arc::new(MemoryStore::new()));

        let first = resolver.device_id().await.unwrap();
        let second = resolver.device_id().await.unwrap();

        assert!(first.starts_with("device_"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_resolves_session_token_to_registered_identity() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let resolver = IdentityResolver::new(store.clone());

        let user_id = Uuid::new_v4();
        AccountRepository::new(store)
            .save_session(&Session {
                token: "tok_1".to_string(),
                user_id,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let identity = resolver.resolve(Some("tok_1")).await.unwrap();
        assert_eq!(identity, Identity::Registered { user_id });
    }

    #[tokio::test]
    async fn test_unknown_token_falls_back_to_device() {
        let resolver = IdentityResolver::new(Arc::new(MemoryStore::new()));

        let identity = resolver.resolve(Some("tok_unknown")).await.unwrap();
        assert!(matches!(identity, Identity::Anonymous { .. }));
    }

    #[tokio::test]
    async fn test_no_token_resolves_to_same_device() {
        let resolver = IdentityResolver::new(Arc::new(MemoryStore::new()));

        let a = resolver.resolve(None).await.unwrap();
        let b = resolver.resolve(None).await.unwrap();
        assert_eq!(a, b);
    }
}

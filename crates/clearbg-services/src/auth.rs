//! Account registration and login sessions.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use clearbg_core::models::{Identity, Session, UserAccount};
use clearbg_store::{AccountRepository, DurableStore};

use crate::error::{ServiceError, ServiceResult};

fn generate_token() -> String {
    let mut rng = rand::rng();
    format!("{:016x}{:016x}", rng.random::<u64>(), rng.random::<u64>())
}

/// Registration, login and session management for registered users.
///
/// Passwords are bcrypt-hashed before they touch the store. Fresh accounts
/// pick up the default free quota lazily through the ledger; nothing is
/// duplicated on the account record.
pub struct AccountService {
    accounts: AccountRepository,
}

impl AccountService {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            accounts: AccountRepository::new(store),
        }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> ServiceResult<(UserAccount, Session)> {
        if self.accounts.find_by_email(email).await?.is_some() {
            return Err(ServiceError::EmailTaken);
        }

        let account = UserAccount {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: bcrypt::hash(password, bcrypt::DEFAULT_COST)?,
            created_at: Utc::now(),
        };
        self.accounts.save(&account).await?;

        let session = self.issue_session(account.id).await?;
        tracing::info!(user_id = %account.id, "Account registered");
        Ok((account, session))
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<(UserAccount, Session)> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !bcrypt::verify(password, &account.password_hash)? {
            return Err(ServiceError::InvalidCredentials);
        }

        let session = self.issue_session(account.id).await?;
        tracing::debug!(user_id = %account.id, "Login succeeded");
        Ok((account, session))
    }

    /// Resolve a session token to its registered identity.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<Identity> {
        let session = self
            .accounts
            .get_session(token)
            .await?
            .ok_or(ServiceError::InvalidSession)?;
        Ok(Identity::Registered {
            user_id: session.user_id,
        })
    }

    /// Drop a session. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        self.accounts.delete_session(token).await?;
        Ok(())
    }

    async fn issue_session(&self, user_id: Uuid) -> ServiceResult<Session> {
        let session = Session {
            token: generate_token(),
            user_id,
            created_at: Utc::now(),
        };
        self.accounts.save_session(&session).await?;
        Ok(session)
    }
}

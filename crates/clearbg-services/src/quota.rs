//! Per-identity free-use ledger.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use clearbg_core::models::{Identity, QuotaRecord};
use clearbg_store::{DurableStore, QuotaRepository};

use crate::error::ServiceResult;

/// Owns the remaining-free-use counters.
///
/// `try_consume` holds a per-identity-key lock across its read-modify-write
/// span, so two interleaved consumes on the same identity cannot both
/// observe the last remaining use. Operations on different identities never
/// contend.
pub struct QuotaLedger {
    repo: QuotaRepository,
    default_quota: u32,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn DurableStore>, default_quota: u32) -> Self {
        Self {
            repo: QuotaRepository::new(store),
            default_quota,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn key_lock(&self, identity_key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(identity_key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_or_init(&self, identity_key: &str) -> ServiceResult<QuotaRecord> {
        match self.repo.load(identity_key).await? {
            Some(record) => Ok(record),
            None => {
                let record = QuotaRecord::new(identity_key, self.default_quota);
                self.repo.save(&record).await?;
                tracing::debug!(identity_key, quota = self.default_quota, "Initialized quota record");
                Ok(record)
            }
        }
    }

    /// Current remaining count, initializing a fresh record on first query.
    #[tracing::instrument(skip(self, identity), fields(identity_key = %identity.key()))]
    pub async fn remaining(&self, identity: &Identity) -> ServiceResult<u32> {
        let key = identity.key();
        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        Ok(self.load_or_init(&key).await?.remaining)
    }

    /// Atomically check and decrement. Returns false, leaving the record
    /// untouched, when no free uses remain.
    #[tracing::instrument(skip(self, identity), fields(identity_key = %identity.key()))]
    pub async fn try_consume(&self, identity: &Identity) -> ServiceResult<bool> {
        let key = identity.key();
        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        let mut record = self.load_or_init(&key).await?;
        if record.remaining == 0 {
            tracing::debug!(identity_key = %key, "Quota exhausted");
            return Ok(false);
        }

        record.remaining -= 1;
        self.repo.save(&record).await?;
        tracing::debug!(identity_key = %key, remaining = record.remaining, "Consumed one free use");
        Ok(true)
    }

    /// Restore the default quota, e.g. after an out-of-band grant. Not
    /// invoked by the gate itself.
    #[tracing::instrument(skip(self, identity), fields(identity_key = %identity.key()))]
    pub async fn reset(&self, identity: &Identity) -> ServiceResult<()> {
        let key = identity.key();
        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        let record = QuotaRecord::new(&key, self.default_quota);
        self.repo.save(&record).await?;
        Ok(())
    }
}

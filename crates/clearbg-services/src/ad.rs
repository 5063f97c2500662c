//! Timed advertisement-view receipts.
//!
//! Verification checks elapsed wall-clock time since the view started
//! instead of trusting a client-reported "I watched it" flag, so completion
//! cannot be claimed early. This is a soft check with no cryptographic
//! proof; the value it protects is small.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use clearbg_core::models::AdView;
use clearbg_store::{AdViewRepository, DurableStore};

use crate::error::{ServiceError, ServiceResult};

/// Outcome of verifying one advertisement view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    /// Watched for less than the required time; the caller may retry.
    NotYet {
        watched: Duration,
        required: Duration,
    },
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Verified)
    }
}

/// The timing decision, pure so the boundary is testable to the millisecond.
fn evaluate(view: &AdView, now: DateTime<Utc>, required: Duration) -> Verification {
    let watched = now - view.started_at;
    if watched >= required {
        Verification::Verified
    } else {
        Verification::NotYet { watched, required }
    }
}

/// Issues and verifies advertisement-view receipts.
pub struct AdViewVerifier {
    repo: AdViewRepository,
    required: Duration,
    verify_lock: Mutex<()>,
}

impl AdViewVerifier {
    pub fn new(store: Arc<dyn DurableStore>, required: Duration) -> Self {
        Self {
            repo: AdViewRepository::new(store),
            required,
            verify_lock: Mutex::new(()),
        }
    }

    /// Record the start of a new view.
    #[tracing::instrument(skip(self))]
    pub async fn start_view(&self, image_id: Uuid) -> ServiceResult<AdView> {
        let view = AdView::start(image_id, Utc::now());
        self.repo.save(&view).await?;
        tracing::debug!(ad_view_id = %view.id, "Advertisement view started");
        Ok(view)
    }

    /// Verify a view. Idempotent: a completed view stays verified without
    /// re-checking time. An unsatisfied view is left untouched so the caller
    /// can retry after more watch time.
    #[tracing::instrument(skip(self))]
    pub async fn verify(&self, ad_view_id: Uuid) -> ServiceResult<Verification> {
        let _guard = self.verify_lock.lock().await;

        let mut view = self
            .repo
            .get(ad_view_id)
            .await?
            .ok_or(ServiceError::AdViewNotFound(ad_view_id))?;

        if view.completed {
            return Ok(Verification::Verified);
        }

        let now = Utc::now();
        match evaluate(&view, now, self.required) {
            Verification::Verified => {
                view.completed = true;
                view.ended_at = Some(now);
                self.repo.save(&view).await?;
                tracing::info!(ad_view_id = %view.id, "Advertisement view verified");
                Ok(Verification::Verified)
            }
            not_yet => {
                tracing::debug!(ad_view_id = %view.id, "Advertisement view not yet satisfied");
                Ok(not_yet)
            }
        }
    }

    /// Read-only projection for display.
    pub async fn status(&self, ad_view_id: Uuid) -> ServiceResult<AdView> {
        self.repo
            .get(ad_view_id)
            .await?
            .ok_or(ServiceError::AdViewNotFound(ad_view_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearbg_store::MemoryStore;

    fn verifier_with_repo() -> (AdViewVerifier, AdViewRepository) {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        (
            AdViewVerifier::new(store.clone(), Duration::milliseconds(30_000)),
            AdViewRepository::new(store),
        )
    }

    #[test]
    fn test_timing_boundary() {
        let started = Utc::now();
        let view = AdView::start(Uuid::new_v4(), started);
        let required = Duration::milliseconds(30_000);

        let just_short = evaluate(&view, started + Duration::milliseconds(29_999), required);
        assert_eq!(
            just_short,
            Verification::NotYet {
                watched: Duration::milliseconds(29_999),
                required,
            }
        );

        let exact = evaluate(&view, started + Duration::milliseconds(30_000), required);
        assert_eq!(exact, Verification::Verified);

        let late = evaluate(&view, started + Duration::seconds(45), required);
        assert_eq!(late, Verification::Verified);
    }

    #[tokio::test]
    async fn test_verify_unknown_view() {
        let (verifier, _) = verifier_with_repo();
        assert!(matches!(
            verifier.verify(Uuid::new_v4()).await,
            Err(ServiceError::AdViewNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fresh_view_is_not_yet_verified() {
        let (verifier, _) = verifier_with_repo();
        let view = verifier.start_view(Uuid::new_v4()).await.unwrap();

        let outcome = verifier.verify(view.id).await.unwrap();
        assert!(!outcome.is_verified());

        // The record is untouched so the caller can retry later.
        let status = verifier.status(view.id).await.unwrap();
        assert!(!status.completed);
        assert!(status.ended_at.is_none());
    }

    #[tokio::test]
    async fn test_satisfied_view_verifies_and_stays_verified() {
        let (verifier, repo) = verifier_with_repo();

        // Back-date the start so the required watch time has already passed.
        let view = AdView::start(Uuid::new_v4(), Utc::now() - Duration::seconds(31));
        repo.save(&view).await.unwrap();

        assert!(verifier.verify(view.id).await.unwrap().is_verified());

        let completed = verifier.status(view.id).await.unwrap();
        assert!(completed.completed);
        let ended_at = completed.ended_at.expect("ended_at stamped");

        // Re-verification is idempotent: same answer, no new end stamp.
        assert!(verifier.verify(view.id).await.unwrap().is_verified());
        assert_eq!(verifier.status(view.id).await.unwrap().ended_at, Some(ended_at));
    }
}

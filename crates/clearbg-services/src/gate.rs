//! The monetization gate.
//!
//! Composes the quota ledger, the ad verifier and the payment manager into
//! one decision: may this image be processed now, and how was it authorized.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use clearbg_core::models::{Identity, PaymentDetails};

use crate::ad::{AdViewVerifier, Verification};
use crate::error::ServiceResult;
use crate::payment::PaymentIntentManager;
use crate::quota::QuotaLedger;

/// How a grant was authorized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GrantSource {
    Quota,
    Ad,
    Payment,
}

/// Authorization for one removal.
///
/// Intent metadata only: the pipeline trusts any issued grant without
/// re-verifying its origin, and nothing re-checks a grant after issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub image_id: Uuid,
    pub via: GrantSource,
    pub issued_at: DateTime<Utc>,
}

impl Grant {
    fn issue(image_id: Uuid, via: GrantSource) -> Self {
        Self {
            image_id,
            via,
            issued_at: Utc::now(),
        }
    }
}

/// Unlock paths offered once the free quota is exhausted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnlockOption {
    WatchAd,
    Pay,
}

/// Decision for a processing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Granted(Grant),
    /// Quota exhausted; the caller picks an unlock path.
    NeedsChoice { options: Vec<UnlockOption> },
}

/// Outcome of resolving the advertisement path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdResolution {
    Granted(Grant),
    /// The view has not satisfied the watch requirement yet; retryable.
    Pending {
        watched: Duration,
        required: Duration,
    },
}

/// Routes a processing request through the free-quota, advertisement or
/// payment path. Every failure below is recoverable: the caller may retry
/// the same path or switch to another for the same image.
pub struct MonetizationGate {
    ledger: Arc<QuotaLedger>,
    ads: Arc<AdViewVerifier>,
    payments: Arc<PaymentIntentManager>,
}

impl MonetizationGate {
    pub fn new(
        ledger: Arc<QuotaLedger>,
        ads: Arc<AdViewVerifier>,
        payments: Arc<PaymentIntentManager>,
    ) -> Self {
        Self {
            ledger,
            ads,
            payments,
        }
    }

    /// Try the free-quota path. Consumes one use on success; otherwise
    /// offers the unlock options without touching the ledger.
    #[tracing::instrument(skip(self, identity), fields(identity_key = %identity.key()))]
    pub async fn request_authorization(
        &self,
        identity: &Identity,
        image_id: Uuid,
    ) -> ServiceResult<AuthDecision> {
        if self.ledger.try_consume(identity).await? {
            tracing::debug!(%image_id, "Removal authorized from free quota");
            return Ok(AuthDecision::Granted(Grant::issue(
                image_id,
                GrantSource::Quota,
            )));
        }

        tracing::debug!(%image_id, "Free quota exhausted, offering unlock options");
        Ok(AuthDecision::NeedsChoice {
            options: vec![UnlockOption::WatchAd, UnlockOption::Pay],
        })
    }

    /// Resolve the advertisement path. A verified view yields a grant
    /// without consuming quota.
    #[tracing::instrument(skip(self))]
    pub async fn resolve_via_ad(&self, ad_view_id: Uuid) -> ServiceResult<AdResolution> {
        match self.ads.verify(ad_view_id).await? {
            Verification::Verified => {
                let view = self.ads.status(ad_view_id).await?;
                Ok(AdResolution::Granted(Grant::issue(
                    view.image_id,
                    GrantSource::Ad,
                )))
            }
            Verification::NotYet { watched, required } => {
                Ok(AdResolution::Pending { watched, required })
            }
        }
    }

    /// Resolve the payment path. A settled intent yields a grant without
    /// consuming quota.
    #[tracing::instrument(skip(self, details))]
    pub async fn resolve_via_payment(
        &self,
        intent_id: Uuid,
        details: &PaymentDetails,
    ) -> ServiceResult<Grant> {
        let intent = self.payments.settle(intent_id, details).await?;
        Ok(Grant::issue(intent.image_id, GrantSource::Payment))
    }
}

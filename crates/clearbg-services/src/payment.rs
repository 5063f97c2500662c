//! Payment-intent lifecycle.
//!
//! No real funds move here; the contract is strictly the transaction state
//! machine. Execution against a processor is delegated to the embedder.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use clearbg_core::config::PriceTable;
use clearbg_core::models::{Currency, PaymentDetails, PaymentIntent, PaymentStatus, Price};
use clearbg_store::{DurableStore, PaymentRepository};

use crate::error::{ServiceError, ServiceResult};

fn validate_details(details: &PaymentDetails) -> ServiceResult<()> {
    if details.card_number.trim().is_empty() {
        return Err(ServiceError::InvalidPaymentDetails("card number is required"));
    }
    if details.expiry.trim().is_empty() {
        return Err(ServiceError::InvalidPaymentDetails("expiry date is required"));
    }
    if details.cvc.trim().is_empty() {
        return Err(ServiceError::InvalidPaymentDetails("cvc is required"));
    }
    if details.holder_name.trim().is_empty() {
        return Err(ServiceError::InvalidPaymentDetails("holder name is required"));
    }
    Ok(())
}

/// Creates and settles payment intents for single images.
pub struct PaymentIntentManager {
    repo: PaymentRepository,
    prices: PriceTable,
    settle_lock: Mutex<()>,
}

impl PaymentIntentManager {
    pub fn new(store: Arc<dyn DurableStore>, prices: PriceTable) -> Self {
        Self {
            repo: PaymentRepository::new(store),
            prices,
            settle_lock: Mutex::new(()),
        }
    }

    /// Allocate a new intent in `Created` and persist it immediately.
    #[tracing::instrument(skip(self))]
    pub async fn create_intent(
        &self,
        image_id: Uuid,
        currency: Currency,
    ) -> ServiceResult<PaymentIntent> {
        let amount = self.prices.price_for(currency);
        let intent = PaymentIntent::create(image_id, amount, currency, Utc::now());
        self.repo.save(&intent).await?;
        tracing::info!(intent_id = %intent.id, %currency, %amount, "Payment intent created");
        Ok(intent)
    }

    /// As [`create_intent`](Self::create_intent), from a raw currency code.
    /// Unknown codes are rejected instead of silently coerced.
    pub async fn create_intent_for_code(
        &self,
        image_id: Uuid,
        currency_code: &str,
    ) -> ServiceResult<PaymentIntent> {
        let currency = Currency::parse(currency_code)
            .ok_or_else(|| ServiceError::UnsupportedCurrency(currency_code.to_string()))?;
        self.create_intent(image_id, currency).await
    }

    /// Settle an intent exactly once.
    ///
    /// The read-modify-write span is serialized so two interleaved settles
    /// cannot both observe `Created`; the loser gets `AlreadySettled`.
    #[tracing::instrument(skip(self, details))]
    pub async fn settle(
        &self,
        intent_id: Uuid,
        details: &PaymentDetails,
    ) -> ServiceResult<PaymentIntent> {
        let _guard = self.settle_lock.lock().await;

        let mut intent = self
            .repo
            .get(intent_id)
            .await?
            .ok_or(ServiceError::IntentNotFound(intent_id))?;

        validate_details(details)?;

        if intent.status.is_terminal() {
            return Err(ServiceError::AlreadySettled(intent_id));
        }

        intent.status = PaymentStatus::Succeeded;
        intent.completed_at = Some(Utc::now());
        self.repo.save(&intent).await?;
        tracing::info!(intent_id = %intent.id, "Payment intent settled");
        Ok(intent)
    }

    /// Read-only projection for display.
    pub async fn status(&self, intent_id: Uuid) -> ServiceResult<PaymentIntent> {
        self.repo
            .get(intent_id)
            .await?
            .ok_or(ServiceError::IntentNotFound(intent_id))
    }

    /// Display pricing for one currency.
    pub fn quote(&self, currency: Currency) -> Price {
        let amount = self.prices.price_for(currency);
        Price {
            amount,
            currency,
            formatted: format!("{}{}", currency.symbol(), amount.normalize()),
        }
    }
}

use thiserror::Error;
use uuid::Uuid;

use clearbg_store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced by the monetization and account services.
///
/// Every variant is recoverable: the caller may retry the same step or
/// switch to another unlock path for the same image. None of them end the
/// session.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("ad view not found: {0}")]
    AdViewNotFound(Uuid),
    #[error("payment intent not found: {0}")]
    IntentNotFound(Uuid),
    #[error("invalid payment details: {0}")]
    InvalidPaymentDetails(&'static str),
    #[error("payment intent {0} is already settled")]
    AlreadySettled(Uuid),
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("email already in use")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid session token")]
    InvalidSession,
    #[error("image not found: {0}")]
    ImageNotFound(Uuid),
    #[error("image {0} has no processed result yet")]
    NotProcessed(Uuid),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

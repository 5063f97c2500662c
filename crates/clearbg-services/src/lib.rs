//! Monetization and account services.
//!
//! Everything between "a visitor wants a removal" and "the pipeline may run":
//! identity resolution, the quota ledger, the advertisement-view verifier,
//! the payment-intent lifecycle, and the gate that composes them into one
//! authorization decision. All collaborators are injected through
//! constructors; nothing here reaches for ambient state.

pub mod ad;
pub mod auth;
pub mod error;
pub mod gate;
pub mod identity;
pub mod library;
pub mod payment;
pub mod quota;

pub use ad::{AdViewVerifier, Verification};
pub use auth::AccountService;
pub use error::{ServiceError, ServiceResult};
pub use gate::{AdResolution, AuthDecision, Grant, GrantSource, MonetizationGate, UnlockOption};
pub use identity::IdentityResolver;
pub use library::ImageLibrary;
pub use payment::PaymentIntentManager;
pub use quota::QuotaLedger;

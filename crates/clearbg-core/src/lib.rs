//! Core domain models and configuration for the clearbg workspace.
//!
//! This crate holds the data model shared by every other crate: identities,
//! quota records, advertisement views, payment intents, processing jobs and
//! the validated runtime configuration. It has no storage or pipeline logic.

pub mod config;
pub mod constants;
pub mod models;
pub mod telemetry;

pub use config::{AppConfig, ConfigError, PriceTable};
pub use constants::{DEFAULT_FREE_QUOTA, DEFAULT_MAX_DIMENSION, REQUIRED_AD_WATCH_MS};
pub use models::{
    AdView, Currency, Identity, ImageRecord, ImageSource, JobStatus, PaymentDetails,
    PaymentIntent, PaymentStatus, Precision, Price, ProcessingJob, ProcessingOptions,
    QuotaRecord, Session, UserAccount,
};

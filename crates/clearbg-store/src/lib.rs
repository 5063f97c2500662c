//! Durable keyed storage and typed repositories.
//!
//! The original deployment backed these records with browser-local storage;
//! the core only assumes "durable keyed JSON storage", expressed here as the
//! [`DurableStore`] trait with in-memory and file-backed reference backends.

pub mod file;
pub mod memory;
pub mod repository;
pub mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use repository::{
    AccountRepository, AdViewRepository, ImageRepository, PaymentRepository, QuotaRepository,
};
pub use store::{DurableStore, DurableStoreExt, StoreError, StoreResult};

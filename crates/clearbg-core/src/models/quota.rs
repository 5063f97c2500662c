use serde::{Deserialize, Serialize};

/// Remaining free removals for one identity.
///
/// Created lazily on first query; mutated only by the quota ledger.
/// `remaining` never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotaRecord {
    pub identity_key: String,
    pub remaining: u32,
}

impl QuotaRecord {
    pub fn new(identity_key: impl Into<String>, remaining: u32) -> Self {
        Self {
            identity_key: identity_key.into(),
            remaining,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one uploaded image, scoped to its owning identity.
///
/// The encoded bytes live with the presentation layer; the core tracks
/// ownership and whether a processed result exists yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: Uuid,
    pub identity_key: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
}

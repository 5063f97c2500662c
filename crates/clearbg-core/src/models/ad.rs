use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One advertisement-watch attempt.
///
/// `completed` flips true at most once, when verification succeeds; a
/// completed view is immutable apart from the `ended_at` stamp set at the
/// same moment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdView {
    pub id: Uuid,
    pub image_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed: bool,
    pub ended_at: Option<DateTime<Utc>>,
}

impl AdView {
    /// A fresh, not-yet-verified view starting now.
    pub fn start(image_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_id,
            started_at,
            completed: false,
            ended_at: None,
        }
    }
}

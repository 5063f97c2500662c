use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is asking for a removal: a registered account or an anonymous device.
///
/// Exactly one identity resolves per session. Anonymous visitors are scoped
/// by a device id generated once and persisted, so their quota stays bounded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Registered { user_id: Uuid },
    Anonymous { device_id: String },
}

impl Identity {
    /// Stable storage key scoping quota and image ownership to this identity.
    pub fn key(&self) -> String {
        match self {
            Identity::Registered { user_id } => format!("user_{user_id}"),
            Identity::Anonymous { device_id } => format!("anon_{device_id}"),
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Identity::Registered { .. })
    }
}

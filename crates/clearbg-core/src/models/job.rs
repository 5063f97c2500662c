use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Matte precision requested for a removal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Fast,
    #[default]
    Balanced,
    Quality,
}

/// Validated processing options.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingOptions {
    pub precision: Precision,
    pub edge_smoothing: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            precision: Precision::Balanced,
            edge_smoothing: true,
        }
    }
}

/// Where the image bytes come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Raw encoded image bytes already in hand.
    Bytes(Bytes),
    /// An inline `data:` URL.
    DataUrl(String),
    /// A remote reference that must be fetched.
    Remote(String),
}

/// Lifecycle of one removal attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Idle,
    Processing,
    Success,
}

/// Ephemeral state of one in-progress removal request.
///
/// Owned exclusively by the caller for the duration of one removal; never
/// persisted. `progress` is monotonically non-decreasing within one attempt
/// and restarts at zero when a new attempt begins.
#[derive(Debug)]
pub struct ProcessingJob {
    pub source: ImageSource,
    pub options: ProcessingOptions,
    pub progress: f32,
    pub status: JobStatus,
}

impl ProcessingJob {
    pub fn new(source: ImageSource, options: ProcessingOptions) -> Self {
        Self {
            source,
            options,
            progress: 0.0,
            status: JobStatus::Idle,
        }
    }
}

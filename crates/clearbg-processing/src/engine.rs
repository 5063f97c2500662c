use async_trait::async_trait;
use bytes::Bytes;

use clearbg_core::models::ProcessingOptions;

use crate::error::PipelineResult;
use crate::normalize::NormalizedImage;

/// Encoded output of one matte pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatteResult {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

/// The opaque background-separation capability.
///
/// `load` warms whatever the engine needs (weights, sessions, workers);
/// `remove` runs one separation over an already-normalized image, reporting
/// progress in `[0, 1]` through the callback. Returning `Ok(None)` means the
/// model legitimately found nothing to separate — an inconclusive outcome,
/// not a failure.
#[async_trait]
pub trait MatteEngine: Send + Sync {
    async fn load(&self) -> PipelineResult<()>;

    async fn remove(
        &self,
        image: &NormalizedImage,
        options: &ProcessingOptions,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> PipelineResult<Option<MatteResult>>;
}

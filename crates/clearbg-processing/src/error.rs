use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures surfaced by the removal pipeline.
///
/// All of them are recoverable: a failed load can be retried, a failed fetch
/// re-attempted with a new source, a failed removal re-run on the same job.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("model load failed: {0}")]
    ModelLoadFailed(String),
    #[error("image fetch failed: {0}")]
    ImageFetchFailed(String),
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

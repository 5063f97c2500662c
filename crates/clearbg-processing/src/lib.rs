//! The background-removal pipeline.
//!
//! Owns the matte model lifecycle (load once, de-duplicate concurrent
//! loads), image source resolution and size normalization, and the
//! progress-reported execution of a single removal job. The model itself is
//! an opaque capability behind [`MatteEngine`].

pub mod engine;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod test_helpers;

pub use engine::{MatteEngine, MatteResult};
pub use error::{PipelineError, PipelineResult};
pub use fetch::{resolve_source, HttpFetcher, ImageFetcher};
pub use loader::ModelLoader;
pub use normalize::{normalize, NormalizedImage};
pub use pipeline::{RemovalOutcome, RemovalPipeline};

//! Image source resolution.

use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;

use clearbg_core::models::ImageSource;

use crate::error::{PipelineError, PipelineResult};

/// Fetches remote image references.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> PipelineResult<Bytes>;
}

/// HTTP fetcher for `ImageSource::Remote` references.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> PipelineResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| PipelineError::ImageFetchFailed(err.to_string()))?;

        response
            .bytes()
            .await
            .map_err(|err| PipelineError::ImageFetchFailed(err.to_string()))
    }
}

/// Decode an inline base64 `data:` URL into raw bytes.
pub fn decode_data_url(url: &str) -> PipelineResult<Bytes> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| PipelineError::ImageFetchFailed("not a data url".to_string()))?;

    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PipelineError::ImageFetchFailed("malformed data url".to_string()))?;

    if !meta.ends_with(";base64") {
        return Err(PipelineError::ImageFetchFailed(
            "unsupported data url encoding".to_string(),
        ));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map(Bytes::from)
        .map_err(|err| PipelineError::ImageFetchFailed(err.to_string()))
}

/// Resolve any source to encoded image bytes.
pub async fn resolve_source(
    source: &ImageSource,
    fetcher: &dyn ImageFetcher,
) -> PipelineResult<Bytes> {
    match source {
        ImageSource::Bytes(bytes) => Ok(bytes.clone()),
        ImageSource::DataUrl(url) => decode_data_url(url),
        ImageSource::Remote(url) => fetcher.fetch(url).await,
    }
}

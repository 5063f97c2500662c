//! Scripted collaborators for pipeline tests.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use clearbg_core::models::ProcessingOptions;

use crate::engine::{MatteEngine, MatteResult};
use crate::error::{PipelineError, PipelineResult};
use crate::fetch::ImageFetcher;
use crate::normalize::NormalizedImage;

/// Encoded PNG of a solid-color image, for feeding the pipeline in tests.
pub fn png_bytes(width: u32, height: u32) -> Bytes {
    let img =
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([64, 128, 192, 255])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    Bytes::from(buf.into_inner())
}

fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Scripted matte engine: configurable load behavior, progress ticks and
/// removal outcome. The default succeeds on everything and reports progress
/// `0 → 0.3 → 0.7 → 1.0`.
pub struct FakeEngine {
    load_delay: Duration,
    load_count: AtomicUsize,
    fail_loads: AtomicUsize,
    fail_removals: AtomicUsize,
    progress_script: Vec<f32>,
    yield_no_result: bool,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            load_delay: Duration::ZERO,
            load_count: AtomicUsize::new(0),
            fail_loads: AtomicUsize::new(0),
            fail_removals: AtomicUsize::new(0),
            progress_script: vec![0.0, 0.3, 0.7, 1.0],
            yield_no_result: false,
        }
    }

    /// Delay each load, so tests can overlap concurrent loaders.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// Fail the first `n` load attempts.
    pub fn failing_loads(self, n: usize) -> Self {
        self.fail_loads.store(n, Ordering::SeqCst);
        self
    }

    /// Fail the first `n` removals.
    pub fn failing_removals(self, n: usize) -> Self {
        self.fail_removals.store(n, Ordering::SeqCst);
        self
    }

    /// Report these progress values, in order, during each removal.
    pub fn with_progress(mut self, ticks: Vec<f32>) -> Self {
        self.progress_script = ticks;
        self
    }

    /// Yield the inconclusive no-result outcome instead of an image.
    pub fn no_result(mut self) -> Self {
        self.yield_no_result = true;
        self
    }

    /// How many load side effects have happened.
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatteEngine for FakeEngine {
    async fn load(&self) -> PipelineResult<()> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        if take_failure(&self.fail_loads) {
            return Err(PipelineError::ModelLoadFailed(
                "scripted load failure".to_string(),
            ));
        }
        Ok(())
    }

    async fn remove(
        &self,
        image: &NormalizedImage,
        _options: &ProcessingOptions,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> PipelineResult<Option<MatteResult>> {
        if take_failure(&self.fail_removals) {
            return Err(PipelineError::ProcessingFailed(
                "scripted removal failure".to_string(),
            ));
        }

        for tick in &self.progress_script {
            on_progress(*tick);
            tokio::task::yield_now().await;
        }

        if self.yield_no_result {
            return Ok(None);
        }

        Ok(Some(MatteResult {
            bytes: image.bytes.clone(),
            width: image.width,
            height: image.height,
        }))
    }
}

/// Fetcher that always fails, for offline tests of the remote path.
pub struct FailingFetcher;

#[async_trait]
impl ImageFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> PipelineResult<Bytes> {
        Err(PipelineError::ImageFetchFailed(format!(
            "fetcher offline: {url}"
        )))
    }
}

/// Fetcher serving fixed bytes for any reference.
pub struct StaticFetcher(pub Bytes);

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> PipelineResult<Bytes> {
        Ok(self.0.clone())
    }
}

/// Collects progress callbacks for assertions.
#[derive(Default)]
pub struct ProgressRecorder(Mutex<Vec<f32>>);

impl ProgressRecorder {
    pub fn record(&self, progress: f32) {
        self.0.lock().unwrap().push(progress);
    }

    pub fn snapshot(&self) -> Vec<f32> {
        self.0.lock().unwrap().clone()
    }
}

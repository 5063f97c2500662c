//! One-job orchestration: ensure loaded → resolve source → normalize → run.

use std::sync::Arc;

use clearbg_core::models::{JobStatus, ProcessingJob};

use crate::engine::{MatteEngine, MatteResult};
use crate::error::PipelineResult;
use crate::fetch::{resolve_source, ImageFetcher};
use crate::loader::ModelLoader;
use crate::normalize::normalize;

/// Outcome of one removal.
#[derive(Debug, PartialEq, Eq)]
pub enum RemovalOutcome {
    Completed(MatteResult),
    /// The model found nothing to separate. Inconclusive rather than failed:
    /// the job rolls back to `Idle` and no error is surfaced.
    NoResult,
}

/// Executes removal jobs against a shared model.
pub struct RemovalPipeline {
    engine: Arc<dyn MatteEngine>,
    loader: ModelLoader,
    fetcher: Arc<dyn ImageFetcher>,
    max_dimension: u32,
}

impl RemovalPipeline {
    pub fn new(
        engine: Arc<dyn MatteEngine>,
        fetcher: Arc<dyn ImageFetcher>,
        max_dimension: u32,
    ) -> Self {
        Self {
            loader: ModelLoader::new(engine.clone()),
            engine,
            fetcher,
            max_dimension,
        }
    }

    /// Warm the model without running a job. Concurrent calls share one load.
    pub async fn ensure_model_loaded(&self) -> PipelineResult<()> {
        self.loader.ensure_loaded().await
    }

    /// Whether the model is resident (display hint).
    pub async fn is_model_loaded(&self) -> bool {
        self.loader.is_loaded().await
    }

    /// Run one removal.
    ///
    /// `on_progress` sees a monotonically non-decreasing ramp in `[0, 1]`
    /// regardless of what the engine reports, with a final `1.0` on success.
    /// Any failure or inconclusive outcome returns the job to `Idle`; the
    /// job is re-enterable and progress restarts at zero on the next attempt.
    #[tracing::instrument(skip_all, fields(options = ?job.options))]
    pub async fn remove(
        &self,
        job: &mut ProcessingJob,
        on_progress: impl Fn(f32) + Send + Sync,
    ) -> PipelineResult<RemovalOutcome> {
        job.status = JobStatus::Processing;
        job.progress = 0.0;

        let outcome = self.run(job, &on_progress).await;

        match outcome {
            Ok((Some(result), _)) => {
                job.progress = 1.0;
                job.status = JobStatus::Success;
                tracing::info!(width = result.width, height = result.height, "Removal completed");
                Ok(RemovalOutcome::Completed(result))
            }
            Ok((None, progress)) => {
                job.progress = progress;
                job.status = JobStatus::Idle;
                tracing::debug!("Removal produced no result, reverting job to idle");
                Ok(RemovalOutcome::NoResult)
            }
            Err(err) => {
                job.status = JobStatus::Idle;
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        job: &ProcessingJob,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> PipelineResult<(Option<MatteResult>, f32)> {
        self.loader.ensure_loaded().await?;

        let bytes = resolve_source(&job.source, self.fetcher.as_ref()).await?;
        let image = normalize(bytes, self.max_dimension)?;
        tracing::debug!(width = image.width, height = image.height, "Image normalized");

        // Clamp engine-reported progress to a monotone ramp in [0, 1].
        let last = std::sync::Mutex::new(0.0f32);
        let clamped = |progress: f32| {
            let progress = progress.clamp(0.0, 1.0);
            let mut last = last.lock().unwrap();
            if progress >= *last {
                *last = progress;
                on_progress(progress);
            }
        };

        let result = self.engine.remove(&image, &job.options, &clamped).await?;

        let mut final_progress = *last.lock().unwrap();
        if result.is_some() && final_progress < 1.0 {
            on_progress(1.0);
            final_progress = 1.0;
        }
        Ok((result, final_progress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::test_helpers::{png_bytes, FailingFetcher, FakeEngine, ProgressRecorder};
    use clearbg_core::models::{ImageSource, ProcessingOptions};

    fn job() -> ProcessingJob {
        ProcessingJob::new(
            ImageSource::Bytes(png_bytes(64, 64)),
            ProcessingOptions::default(),
        )
    }

    fn pipeline(engine: FakeEngine) -> RemovalPipeline {
        RemovalPipeline::new(Arc::new(engine), Arc::new(FailingFetcher), 1920)
    }

    #[tokio::test]
    async fn test_success_reports_scripted_progress() {
        let pipeline = pipeline(FakeEngine::new().with_progress(vec![0.0, 0.3, 0.7, 1.0]));
        let recorder = ProgressRecorder::default();
        let mut job = job();

        let outcome = pipeline.remove(&mut job, |p| recorder.record(p)).await.unwrap();

        assert!(matches!(outcome, RemovalOutcome::Completed(_)));
        assert_eq!(recorder.snapshot(), vec![0.0, 0.3, 0.7, 1.0]);
        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.progress, 1.0);
    }

    #[tokio::test]
    async fn test_progress_is_clamped_monotone_with_final_tick() {
        // An engine with jittery reporting: the dips are swallowed and the
        // pipeline appends the final 1.0 itself.
        let pipeline = pipeline(FakeEngine::new().with_progress(vec![0.0, 0.5, 0.3, 0.8]));
        let recorder = ProgressRecorder::default();
        let mut job = job();

        pipeline.remove(&mut job, |p| recorder.record(p)).await.unwrap();

        assert_eq!(recorder.snapshot(), vec![0.0, 0.5, 0.8, 1.0]);
    }

    #[tokio::test]
    async fn test_no_result_reverts_job_to_idle() {
        let pipeline = pipeline(FakeEngine::new().no_result());
        let mut job = job();

        let outcome = pipeline.remove(&mut job, |_| {}).await.unwrap();

        assert_eq!(outcome, RemovalOutcome::NoResult);
        assert_eq!(job.status, JobStatus::Idle);
    }

    #[tokio::test]
    async fn test_engine_failure_reverts_job_and_is_retryable() {
        let pipeline = pipeline(FakeEngine::new().failing_removals(1));
        let mut job = job();

        let err = pipeline.remove(&mut job, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::ProcessingFailed(_)));
        assert_eq!(job.status, JobStatus::Idle);

        // Same job, second attempt succeeds.
        let outcome = pipeline.remove(&mut job, |_| {}).await.unwrap();
        assert!(matches!(outcome, RemovalOutcome::Completed(_)));
        assert_eq!(job.status, JobStatus::Success);
    }

    #[tokio::test]
    async fn test_unreachable_remote_source_fails_fetch() {
        let pipeline = pipeline(FakeEngine::new());
        let mut job = ProcessingJob::new(
            ImageSource::Remote("https://example.invalid/cat.png".to_string()),
            ProcessingOptions::default(),
        );

        let err = pipeline.remove(&mut job, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::ImageFetchFailed(_)));
        assert_eq!(job.status, JobStatus::Idle);
    }

    #[tokio::test]
    async fn test_model_load_failure_propagates_and_job_reverts() {
        let pipeline = pipeline(FakeEngine::new().failing_loads(1));
        let mut job = job();

        let err = pipeline.remove(&mut job, |_| {}).await.unwrap_err();
        assert!(matches!(err, PipelineError::ModelLoadFailed(_)));
        assert_eq!(job.status, JobStatus::Idle);

        // The loader reset to unloaded; the retry loads and completes.
        let outcome = pipeline.remove(&mut job, |_| {}).await.unwrap();
        assert!(matches!(outcome, RemovalOutcome::Completed(_)));
    }
}

//! Single-flight model loading.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::engine::MatteEngine;
use crate::error::{PipelineError, PipelineResult};

/// Cloneable failure fanned out to every awaiter of one load attempt.
#[derive(Debug, Clone)]
struct LoadFailure(Arc<String>);

type LoadFuture = Shared<BoxFuture<'static, Result<(), LoadFailure>>>;

enum ModelState {
    Unloaded,
    Loading(LoadFuture),
    Loaded,
}

/// Owns the process-wide model lifecycle.
///
/// Exactly one load attempt is in flight at a time: concurrent callers await
/// the same shared future, so the engine sees a single `load` side effect. A
/// failed attempt resets the state to `Unloaded` — every awaiter of that
/// attempt observes `ModelLoadFailed`, and a later call may retry. An
/// abandoned awaiter does not cancel the shared load; it keeps running for
/// everyone else.
pub struct ModelLoader {
    engine: Arc<dyn MatteEngine>,
    state: Mutex<ModelState>,
}

impl ModelLoader {
    pub fn new(engine: Arc<dyn MatteEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(ModelState::Unloaded),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn ensure_loaded(&self) -> PipelineResult<()> {
        let attempt = {
            let mut state = self.state.lock().await;
            match &*state {
                ModelState::Loaded => return Ok(()),
                ModelState::Loading(attempt) => attempt.clone(),
                ModelState::Unloaded => {
                    let engine = Arc::clone(&self.engine);
                    let attempt: LoadFuture = async move {
                        engine
                            .load()
                            .await
                            .map_err(|err| LoadFailure(Arc::new(err.to_string())))
                    }
                    .boxed()
                    .shared();
                    *state = ModelState::Loading(attempt.clone());
                    tracing::info!("Starting model load");
                    attempt
                }
            }
        };

        let result = attempt.clone().await;

        let mut state = self.state.lock().await;
        match result {
            Ok(()) => {
                *state = ModelState::Loaded;
                Ok(())
            }
            Err(failure) => {
                // Only reset if our failed attempt is still the current one;
                // a retry may already have a fresh attempt in flight.
                if let ModelState::Loading(current) = &*state {
                    if current.ptr_eq(&attempt) {
                        *state = ModelState::Unloaded;
                    }
                }
                tracing::warn!(error = %failure.0, "Model load failed");
                Err(PipelineError::ModelLoadFailed(failure.0.as_ref().clone()))
            }
        }
    }

    /// Whether the model is resident. A display hint; the answer can be
    /// stale by the time the caller acts on it.
    pub async fn is_loaded(&self) -> bool {
        matches!(&*self.state.lock().await, ModelState::Loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeEngine;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_loads_share_one_attempt() {
        let engine = Arc::new(FakeEngine::new().with_load_delay(Duration::from_millis(20)));
        let loader = ModelLoader::new(engine.clone());

        let (a, b) = tokio::join!(loader.ensure_loaded(), loader.ensure_loaded());
        a.unwrap();
        b.unwrap();

        assert_eq!(engine.load_count(), 1);
        assert!(loader.is_loaded().await);
    }

    #[tokio::test]
    async fn test_loaded_model_short_circuits() {
        let engine = Arc::new(FakeEngine::new());
        let loader = ModelLoader::new(engine.clone());

        loader.ensure_loaded().await.unwrap();
        loader.ensure_loaded().await.unwrap();

        assert_eq!(engine.load_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_reaches_every_awaiter_then_retry_succeeds() {
        let engine = Arc::new(
            FakeEngine::new()
                .failing_loads(1)
                .with_load_delay(Duration::from_millis(20)),
        );
        let loader = ModelLoader::new(engine.clone());

        let (a, b) = tokio::join!(loader.ensure_loaded(), loader.ensure_loaded());
        assert!(matches!(a, Err(PipelineError::ModelLoadFailed(_))));
        assert!(matches!(b, Err(PipelineError::ModelLoadFailed(_))));
        assert_eq!(engine.load_count(), 1);
        assert!(!loader.is_loaded().await);

        // The failed attempt reset the state; a fresh call retries.
        loader.ensure_loaded().await.unwrap();
        assert_eq!(engine.load_count(), 2);
        assert!(loader.is_loaded().await);
    }
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::traits::{Studio, StudioFuture};
use super::types::ImageHandle;
use crate::core::taste::{AestheticPlan, GenerationCandidate};
use crate::error::StudioError;

const MAX_BACKOFF_MS: u64 = 10_000;

/// Studio wrapper that retries quota failures with doubling backoff.
///
/// Any other error is returned on first sight.
pub struct ReliableStudio {
    inner: Arc<dyn Studio>,
    max_retries: u32,
    base_backoff_ms: u64,
}

impl ReliableStudio {
    pub fn new(inner: Arc<dyn Studio>, max_retries: u32, base_backoff_ms: u64) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff_ms,
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, StudioError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StudioError>>,
    {
        let mut backoff_ms = self.base_backoff_ms;
        let mut attempt = 0;

        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            studio = self.inner.name(),
                            operation,
                            attempt,
                            "Studio recovered after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(e) if e.is_quota() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        studio = self.inner.name(),
                        operation,
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms,
                        "Quota exhausted, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = backoff_ms.saturating_mul(2).min(MAX_BACKOFF_MS);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Studio for ReliableStudio {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn plan_aesthetic<'a>(
        &'a self,
        candidate: &'a GenerationCandidate,
    ) -> StudioFuture<'a, AestheticPlan> {
        Box::pin(self.with_retry("plan_aesthetic", move || {
            self.inner.plan_aesthetic(candidate)
        }))
    }

    fn generate_image<'a>(
        &'a self,
        candidate: &'a GenerationCandidate,
        plan: &'a AestheticPlan,
    ) -> StudioFuture<'a, ImageHandle> {
        Box::pin(self.with_retry("generate_image", move || {
            self.inner.generate_image(candidate, plan)
        }))
    }

    fn refine_quote<'a>(&'a self, quote: &'a str) -> StudioFuture<'a, String> {
        Box::pin(self.with_retry("refine_quote", move || self.inner.refine_quote(quote)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the queued errors in order, then echoes the quote.
    struct ScriptedStudio {
        calls: AtomicU32,
        failures: Mutex<Vec<StudioError>>,
    }

    impl ScriptedStudio {
        fn new(mut failures: Vec<StudioError>) -> Self {
            failures.reverse();
            Self {
                calls: AtomicU32::new(0),
                failures: Mutex::new(failures),
            }
        }

        fn next(&self) -> Result<(), StudioError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failures.lock().unwrap().pop() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    impl Studio for ScriptedStudio {
        fn name(&self) -> &str {
            "scripted"
        }

        fn plan_aesthetic<'a>(
            &'a self,
            _candidate: &'a GenerationCandidate,
        ) -> StudioFuture<'a, AestheticPlan> {
            Box::pin(async move {
                self.next()?;
                Err(StudioError::Generation("no plans here".into()))
            })
        }

        fn generate_image<'a>(
            &'a self,
            _candidate: &'a GenerationCandidate,
            _plan: &'a AestheticPlan,
        ) -> StudioFuture<'a, ImageHandle> {
            Box::pin(async move {
                self.next()?;
                Ok(ImageHandle {
                    mime_type: "image/png".into(),
                    data: "aGk=".into(),
                })
            })
        }

        fn refine_quote<'a>(&'a self, quote: &'a str) -> StudioFuture<'a, String> {
            Box::pin(async move {
                self.next()?;
                Ok(quote.to_uppercase())
            })
        }
    }

    fn quota() -> StudioError {
        StudioError::QuotaExceeded("429 quota".into())
    }

    fn wrap(inner: &Arc<ScriptedStudio>, max_retries: u32) -> ReliableStudio {
        ReliableStudio::new(inner.clone(), max_retries, 1)
    }

    #[tokio::test]
    async fn recovers_after_quota_failures() {
        let inner = Arc::new(ScriptedStudio::new(vec![quota(), quota()]));
        let studio = wrap(&inner, 3);

        let refined = studio.refine_quote("stay").await.unwrap();
        assert_eq!(refined, "STAY");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let inner = Arc::new(ScriptedStudio::new(vec![quota(); 10]));
        let studio = wrap(&inner, 3);

        let err = studio.refine_quote("stay").await.unwrap_err();
        assert!(err.is_quota());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn generation_errors_are_not_retried() {
        let inner = Arc::new(ScriptedStudio::new(vec![StudioError::Generation(
            "bad prompt".into(),
        )]));
        let studio = wrap(&inner, 3);

        let err = studio.refine_quote("stay").await.unwrap_err();
        assert_eq!(err, StudioError::Generation("bad prompt".into()));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let inner = Arc::new(ScriptedStudio::new(vec![quota()]));
        let studio = wrap(&inner, 0);

        assert!(studio.refine_quote("stay").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wraps_every_operation() {
        let inner = Arc::new(ScriptedStudio::new(vec![quota()]));
        let studio = wrap(&inner, 2);
        let candidate = GenerationCandidate::new("plaint");

        let err = studio.plan_aesthetic(&candidate).await.unwrap_err();
        assert_eq!(err, StudioError::Generation("no plans here".into()));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(studio.name(), "scripted");
    }
}

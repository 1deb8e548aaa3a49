//! The injected refresh operation.
//!
//! The controller has no idea what "refreshing" means for its consumer — it
//! only schedules the operation and observes its settlement. Consumers supply
//! the operation either as a type implementing [`Refresher`] or as a plain
//! async closure via the blanket impl.

use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Refresher::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// An asynchronous refresh operation supplied by the consumer.
///
/// The controller interprets only the settlement (success or failure) and its
/// timing; any data the operation produces is the consumer's business. Errors
/// are logged and swallowed by the controller — they never propagate and never
/// stop the schedule.
pub trait Refresher: Send + Sync {
    /// Run one refresh to completion.
    fn refresh(&self) -> RefreshFuture<'_>;
}

impl<F, Fut> Refresher for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn refresh(&self) -> RefreshFuture<'_> {
        Box::pin((self)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_closure_is_a_refresher() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let refresher = move || {
            let calls = Arc::clone(&calls_clone);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        };

        refresher.refresh().await.expect("refresh should succeed");
        refresher.refresh().await.expect("refresh should succeed");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_reported_through_result() {
        let refresher = || async { Err::<(), anyhow::Error>(anyhow::anyhow!("backend unavailable")) };

        let err = refresher.refresh().await.expect_err("refresh should fail");
        assert!(err.to_string().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let refresher: Arc<dyn Refresher> = Arc::new(|| async { Ok::<(), anyhow::Error>(()) });
        refresher.refresh().await.expect("refresh should succeed");
    }
}

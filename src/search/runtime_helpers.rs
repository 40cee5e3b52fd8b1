//! Async helpers for primary/fallback execution

use std::future::Future;

use crate::repository::RepositoryResult;

/// Which branch of [`fallback_task`] produced the value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Primary,
    Fallback,
}

/// Execute an operation with fallback support
///
/// The primary operation is tried once. Any error sends execution to the
/// fallback, which cannot fail: degraded results are its own concern.
pub async fn fallback_task<F, G, Fut1, Fut2, T>(primary: F, fallback: G) -> (T, Branch)
where
    F: FnOnce() -> Fut1 + Send,
    G: FnOnce() -> Fut2 + Send,
    Fut1: Future<Output = RepositoryResult<T>> + Send,
    Fut2: Future<Output = T> + Send,
    T: Send,
{
    match primary().await {
        Ok(value) => (value, Branch::Primary),
        Err(primary_error) => {
            tracing::warn!(
                error = %primary_error,
                kind = %primary_error.kind(),
                "Primary operation failed, attempting fallback"
            );
            let value = fallback().await;
            tracing::info!("Fallback operation completed");
            (value, Branch::Fallback)
        }
    }
}

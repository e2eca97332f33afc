//! Upper bound on storage round trips.

use std::future::Future;
use std::time::Duration;

use crate::errors::{AppError, AppResult};

/// Run a storage call, giving up after `limit`.
///
/// Dropping the inner future on expiry cancels the query and returns its
/// pooled connection.
pub async fn bounded<T, F>(limit: Duration, operation: &str, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, ?limit, "Storage call timed out");
            Err(AppError::Timeout(operation.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let result = bounded(Duration::from_secs(1), "counting", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let result: AppResult<()> = bounded(Duration::from_millis(10), "filtering cases", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(AppError::Timeout(op)) => assert_eq!(op, "filtering cases"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_inner_error_is_kept() {
        let result: AppResult<()> = bounded(Duration::from_secs(1), "listing", async {
            Err(AppError::Forbidden)
        })
        .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }
}

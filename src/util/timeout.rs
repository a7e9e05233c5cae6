//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::ScoutError;

/// Wrap a fallible future with a timeout, mapping expiry to [`ScoutError::Timeout`].
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, ScoutError>>,
) -> Result<T, ScoutError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ScoutError::Timeout(duration.as_millis() as u64)),
    }
}

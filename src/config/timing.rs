//! Timing defaults and timeout helpers
//!
//! Default values are compile-time constants. Runtime values are carried by
//! [`crate::ResolverConfig`]; nothing here is global mutable state.

use crate::error::SourceError;
use std::future::Future;
use std::time::Duration;

/// Default timeout for remote HTTP and DNS calls in milliseconds
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;
/// Default cache TTL in seconds (one day)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Run `fut` under `timeout`, a zero duration meaning no limit
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    if timeout.is_zero() {
        return fut.await;
    }
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| SourceError::Timeout)?
}

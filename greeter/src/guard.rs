//! Failure boundary for route handlers

use greeter_http::lambda::Error;
use std::future::Future;
use tracing::error;

/// Awaits a handler body, logging a failure once before handing it back untouched.
pub async fn logged<F, T>(body: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    body.await.map_err(|err| {
        error!("Error processing request: {}", err);
        err
    })
}

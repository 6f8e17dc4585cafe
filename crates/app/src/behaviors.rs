//! Cross-cutting pipeline behaviors.

use std::time::Instant;

use async_trait::async_trait;

use crate::dispatch::{ErasedOutput, Next, PipelineBehavior, RequestInfo};
use crate::error::AppError;

/// Outermost stage: records the request name and duration, re-raising errors
/// unchanged.
pub struct LoggingBehavior;

#[async_trait]
impl PipelineBehavior for LoggingBehavior {
    async fn handle(&self, info: &RequestInfo, next: Next<'_>) -> Result<ErasedOutput, AppError> {
        let started = Instant::now();
        let result = next.run().await;
        let elapsed = started.elapsed();

        metrics::histogram!("request_duration_seconds").record(elapsed.as_secs_f64());
        match &result {
            Ok(_) => {
                tracing::info!(
                    request = info.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "request handled"
                );
                metrics::counter!("requests_handled").increment(1);
            }
            Err(err) => {
                tracing::warn!(
                    request = info.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %err,
                    "request failed"
                );
                metrics::counter!("requests_failed").increment(1);
            }
        }

        result
    }
}

/// Rejects malformed input before the handler runs.
///
/// A request with a non-empty violation list never reaches its handler; the
/// pipeline short-circuits with [`AppError::Validation`] carrying the full
/// field-level list.
pub struct ValidationBehavior;

#[async_trait]
impl PipelineBehavior for ValidationBehavior {
    async fn handle(&self, info: &RequestInfo, next: Next<'_>) -> Result<ErasedOutput, AppError> {
        if !info.violations.is_empty() {
            tracing::debug!(
                request = info.name,
                violations = info.violations.len(),
                "request rejected by validation"
            );
            return Err(AppError::Validation(info.violations.clone()));
        }
        next.run().await
    }
}

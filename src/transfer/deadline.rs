//! Deadline and cancellation racing for network calls.

use crate::error::{Operation, OutcomeError};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Drive `call` until it completes, the deadline elapses, or `cancel` fires
///
/// On timeout or cancellation the call future is dropped before this function
/// returns, which aborts the request and releases its connection. The call is
/// never retried.
///
/// If the call and the deadline become ready in the same poll, the call's result
/// wins. Cancellation wins over both.
pub async fn run_with_deadline<T, F>(
    operation: Operation,
    deadline: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, OutcomeError>
where
    F: Future<Output = Result<T, OutcomeError>>,
{
    if cancel.is_cancelled() {
        return Err(cancelled(operation));
    }

    tokio::pin!(call);

    tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            tracing::debug!(operation = %operation, "call cancelled");
            Err(cancelled(operation))
        }
        result = &mut call => result,
        _ = tokio::time::sleep(deadline) => {
            tracing::warn!(
                operation = %operation,
                deadline_ms = deadline.as_millis() as u64,
                "deadline elapsed, cancelling call"
            );
            Err(OutcomeError::timeout(operation, deadline))
        }
    }
}

fn cancelled(operation: Operation) -> OutcomeError {
    OutcomeError::unknown(operation, "request cancelled")
}

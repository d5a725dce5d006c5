//! CPU move retry policy: at most two retries on an invalid-move or
//! transient error, with small delays, honoring cancellation throughout.

use std::future::Future;
use std::time::Duration;
use wall_e_engine::CancellationToken;
use wall_e_types::ErrorCode;

pub const MAX_RETRIES: u32 = 2;
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Run `attempt` up to `MAX_RETRIES + 1` times, retrying only on errors
/// `ErrorCode::is_retryable` accepts. Stops immediately if `cancel` trips
/// between attempts.
pub async fn with_retry<F, Fut, T>(
    cancel: &CancellationToken,
    mut attempt: F,
) -> Result<T, ErrorCode>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ErrorCode>>,
{
    let mut tries = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(ErrorCode::InvalidRequest);
        }
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(code) if code.is_retryable() && tries < MAX_RETRIES => {
                tries += 1;
                sleep_unless_cancelled(cancel, RETRY_DELAY).await;
            }
            Err(code) => return Err(code),
        }
    }
}

async fn sleep_unless_cancelled(cancel: &CancellationToken, duration: Duration) {
    if cancel.is_cancelled() {
        return;
    }
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_one_retryable_failure() {
        let calls = AtomicU32::new(0);
        let cancel = CancellationToken::new();
        let result = with_retry(&cancel, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ErrorCode::WorkerTimeout)
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let cancel = CancellationToken::new();
        let result: Result<(), ErrorCode> =
            with_retry(&cancel, || async { Err(ErrorCode::WorkerTimeout) }).await;
        assert_eq!(result, Err(ErrorCode::WorkerTimeout));
    }

    #[tokio::test]
    async fn non_retryable_error_fails_immediately() {
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let result: Result<(), ErrorCode> = with_retry(&cancel, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ErrorCode::InvalidFen) }
        })
        .await;
        assert_eq!(result, Err(ErrorCode::InvalidFen));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! Retry logic for idempotent node reads.
//!
//! # Responsibilities
//! - Retry reads that failed below the JSON-RPC layer
//! - Space attempts with exponential backoff + jitter
//! - Give up after the configured number of attempts and surface the last error

use std::future::Future;

use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;
use crate::rpc::types::RpcResult;

/// Run `op` until it succeeds, fails with a non-transport error, or the
/// attempt budget in `policy` is spent.
///
/// Only pass operations that are safe to repeat.
pub async fn retry_idempotent<T, F, Fut>(policy: &RetryConfig, method: &str, mut op: F) -> RpcResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RpcResult<T>>,
{
    let max_attempts = if policy.enabled {
        policy.max_attempts.max(1)
    } else {
        1
    };

    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_transport() && attempt < max_attempts => {
                let delay = calculate_backoff(attempt, policy.base_delay_ms, policy.max_delay_ms);
                tracing::warn!(
                    method,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying node read"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::types::RpcError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            enabled: true,
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 2,
        }
    }

    #[tokio::test]
    async fn test_retries_transport_errors_until_success() {
        let calls = &AtomicU32::new(0);
        let result = retry_idempotent(&fast_policy(3), "getrawmempool", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(RpcError::transport("getrawmempool", "connection reset"))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let calls = &AtomicU32::new(0);
        let result: RpcResult<()> = retry_idempotent(&fast_policy(2), "getblockhash", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RpcError::transport("getblockhash", "timeout"))
        })
        .await;

        assert!(result.unwrap_err().is_transport());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_protocol_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: RpcResult<()> = retry_idempotent(&fast_policy(5), "getblockhash", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RpcError::protocol("getblockhash", -8, "Block height out of range"))
        })
        .await;

        assert_eq!(result.unwrap_err().code(), Some(-8));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_policy_is_single_shot() {
        let calls = &AtomicU32::new(0);
        let mut policy = fast_policy(5);
        policy.enabled = false;
        let _: RpcResult<()> = retry_idempotent(&policy, "getmempoolinfo", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(RpcError::transport("getmempoolinfo", "refused"))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for SIGINT (Ctrl-C) and, on Unix, SIGTERM
//! - Race a running command against them
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A failure to install a handler only disables that signal

use std::future::Future;

use thiserror::Error;

/// The command was stopped by a signal before it finished.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("interrupted by {0}")]
pub struct Interrupted(pub &'static str);

/// Resolve when the process receives an interrupt or termination signal.
///
/// Returns the signal name.
pub async fn wait_for_interrupt() -> &'static str {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}

/// Run `fut` to completion unless a signal arrives first.
pub async fn run_until_interrupted<F: Future>(fut: F) -> Result<F::Output, Interrupted> {
    run_until(fut, wait_for_interrupt()).await
}

async fn run_until<F, S>(fut: F, stop: S) -> Result<F::Output, Interrupted>
where
    F: Future,
    S: Future<Output = &'static str>,
{
    tokio::select! {
        output = fut => Ok(output),
        name = stop => {
            tracing::warn!(signal = name, "Interrupted; the node keeps the state of the last completed call");
            Err(Interrupted(name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_command_finishes_first() {
        let result = run_until(async { 7 }, std::future::pending()).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_signal_wins() {
        let slow = tokio::time::sleep(Duration::from_secs(60));
        let result = run_until(slow, async { "SIGINT" }).await;
        assert_eq!(result, Err(Interrupted("SIGINT")));
        assert_eq!(result.unwrap_err().to_string(), "interrupted by SIGINT");
    }
}

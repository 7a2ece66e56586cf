//! Shutdown triggers for the server

use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::domain::DomainError;

#[derive(Debug)]
pub enum ShutdownReason {
    Signal(&'static str),
    /// A bootstrap task failed
    Fatal(DomainError),
}

/// Resolves on SIGINT, SIGTERM or the first fatal bootstrap error
///
/// Once every bootstrap task has finished successfully the channel closes
/// and only the signals remain.
pub async fn wait_for_shutdown(fatal: &mut mpsc::UnboundedReceiver<DomainError>) -> ShutdownReason {
    let reason = tokio::select! {
        _ = ctrl_c() => ShutdownReason::Signal("SIGINT"),
        _ = terminate() => ShutdownReason::Signal("SIGTERM"),
        Some(e) = fatal.recv() => ShutdownReason::Fatal(e),
    };

    match &reason {
        ShutdownReason::Signal(name) => info!(signal = name, "Received signal, initiating graceful shutdown"),
        ShutdownReason::Fatal(e) => error!(error = %e, "Bootstrap failed, shutting down"),
    }

    reason
}

async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!(error = %e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fatal_error_triggers_shutdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(DomainError::process("ssh-keyscan -H gopher.live", "exit status: 1")).unwrap();

        match wait_for_shutdown(&mut rx).await {
            ShutdownReason::Fatal(e) => assert!(matches!(e, DomainError::Process { .. })),
            other => panic!("unexpected reason: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_channel_keeps_waiting() {
        let (tx, mut rx) = mpsc::unbounded_channel::<DomainError>();
        drop(tx);

        let wait = tokio::time::timeout(std::time::Duration::from_secs(60), wait_for_shutdown(&mut rx)).await;
        assert!(wait.is_err());
    }
}

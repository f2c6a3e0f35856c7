//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGINT and SIGTERM handlers (Ctrl+C elsewhere)
//! - Translate the first signal into cancellation of the shutdown token

use tokio_util::sync::CancellationToken;

/// Returns a token cancelled on the first SIGINT or SIGTERM.
///
/// Handlers are registered before returning, so a signal arriving right after
/// this call is not lost.
#[cfg(unix)]
pub fn shutdown_token() -> std::io::Result<CancellationToken> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        };
        tracing::info!(signal = name, "Shutdown signal received");
        trigger.cancel();
    });

    Ok(token)
}

#[cfg(not(unix))]
pub fn shutdown_token() -> std::io::Result<CancellationToken> {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!(signal = "ctrl_c", "Shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C, shutting down"),
        }
        trigger.cancel();
    });

    Ok(token)
}

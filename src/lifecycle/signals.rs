//! OS signal handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancel `token` when Ctrl-C arrives.
///
/// The watcher exits quietly if the token is cancelled first. Abort the
/// returned handle to stop listening early.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => tracing::info!("Interrupt received, cancelling operation"),
                    Err(e) => tracing::warn!(error = %e, "Failed to listen for interrupt, cancelling"),
                }
                token.cancel();
            }
        }
    })
}

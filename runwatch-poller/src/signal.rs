//! Interrupt handling
//!
//! Binds Ctrl-C (and SIGTERM on unix) to a [`CancellationToken`] that poll
//! sessions observe. The listener lives only as long as its guard, so a
//! long-lived process can watch many runs in sequence without piling up
//! signal subscriptions.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Owns an interrupt listener task
///
/// Dropping the guard stops the listener. The token stays valid and keeps
/// whatever state it had.
pub struct InterruptGuard {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl InterruptGuard {
    /// Starts listening for interrupts
    ///
    /// Must be called from within a tokio runtime.
    pub fn install() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// Starts listening for interrupts and cancels `token` when one arrives
    pub fn with_token(token: CancellationToken) -> Self {
        let listener = tokio::spawn({
            let token = token.clone();
            async move {
                wait_for_interrupt().await;
                token.cancel();
            }
        });

        Self { token, listener }
    }

    /// Token cancelled on interrupt
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_interrupted(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Resolves on SIGINT/Ctrl-C, or SIGTERM on unix
///
/// If a handler cannot be registered that signal is ignored rather than
/// treated as an interrupt.
async fn wait_for_interrupt() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT"),
            Err(e) => {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let terminate = async {
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    info!("Received SIGTERM");
                }
                Err(e) => {
                    warn!("Failed to register SIGTERM handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::select! {
            _ = ctrl_c => {}
            _ = terminate => {}
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}

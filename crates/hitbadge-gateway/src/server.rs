//! Listener setup and graceful shutdown.

use std::future::Future;
use std::io::{self, ErrorKind};
use std::net::SocketAddr;

use tokio::net::TcpListener;

use hitbadge_core::error::{HitBadgeError, Result};

use crate::app_state::AppState;

/// Bind `addr`; on address-in-use try the next port, up to `attempts` more times.
pub async fn bind_with_fallback(addr: SocketAddr, attempts: u16) -> Result<TcpListener> {
    let mut candidate = addr;
    let mut last_tried = addr.port();
    for tried in 0..=attempts {
        last_tried = candidate.port();
        match TcpListener::bind(candidate).await {
            Ok(l) => {
                if tried > 0 {
                    tracing::warn!(
                        configured = %addr,
                        actual = %candidate,
                        "listening on a different port than configured"
                    );
                }
                return Ok(l);
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                let Some(next) = candidate.port().checked_add(1) else { break };
                tracing::info!(port = candidate.port(), next, "port already in use, trying next");
                candidate.set_port(next);
            }
            Err(e) => {
                return Err(HitBadgeError::Internal(format!("bind {candidate} failed: {e}")));
            }
        }
    }
    Err(HitBadgeError::Internal(format!(
        "no free port in {}..={}",
        addr.port(),
        last_tried
    )))
}

/// Resolves on Ctrl-C and marks the state as draining so `/readyz` reports 503.
pub async fn shutdown_signal(state: AppState) {
    shutdown_on(tokio::signal::ctrl_c(), state).await
}

/// Resolves once `signal` fires. If the signal handler cannot be installed
/// this never resolves: the server keeps running instead of shutting down.
pub async fn shutdown_on<F>(signal: F, state: AppState)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    state.set_draining();
    tracing::info!("shutdown signal received, draining");
}

//! hitbadge gateway binary.
//!
//! - Badge endpoints: /api/count/{incr,keep}/badge.svg?url=...
//! - Counter store: Redis (or in-memory) with fallback counts when unreachable
//! - Ops: /healthz, /readyz, /metrics

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use hitbadge_gateway::{app_state, config, router, server};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "hitbadge-gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> hitbadge_core::Result<()> {
    let cfg = config::load()?;
    let listen: SocketAddr = cfg
        .gateway
        .listen
        .parse()
        .map_err(|e| hitbadge_core::HitBadgeError::BadRequest(format!("gateway.listen: {e}")))?;
    let attempts = cfg.gateway.port_fallback_attempts;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    let listener = server::bind_with_fallback(listen, attempts).await?;
    let local = listener
        .local_addr()
        .map_err(|e| hitbadge_core::HitBadgeError::Internal(format!("local_addr: {e}")))?;
    tracing::info!(%local, "hitbadge-gateway starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(server::shutdown_signal(state))
        .await
        .map_err(|e| hitbadge_core::HitBadgeError::Internal(format!("server failed: {e}")))
}

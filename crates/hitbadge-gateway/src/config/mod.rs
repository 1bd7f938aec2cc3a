//! Gateway config loader (strict parsing + environment overrides).

pub mod schema;

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use hitbadge_core::error::{HitBadgeError, Result};

pub use schema::{
    BadgeSection, FallbackPolicy, GatewayConfig, GatewaySection, StoreBackend, StoreSection,
};

pub const DEFAULT_CONFIG_PATH: &str = "hitbadge.yaml";

/// Load config from `HITBADGE_CONFIG` (or `hitbadge.yaml`), then apply
/// `PORT` / `REDIS_URI` / `REDIS_HOST`. A missing file means defaults.
pub fn load() -> Result<GatewayConfig> {
    let path = std::env::var("HITBADGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut cfg = if Path::new(&path).exists() {
        load_from_file(&path)?
    } else {
        tracing::info!(%path, "config file not found, using defaults");
        GatewayConfig::default()
    };
    apply_env(&mut cfg, |k| std::env::var(k).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| HitBadgeError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| HitBadgeError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Environment overrides kept compatible with existing deployments.
pub fn apply_env<F>(cfg: &mut GatewayConfig, var: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = var("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| HitBadgeError::BadRequest(format!("PORT must be a port number: {e}")))?;
        let mut addr: SocketAddr = cfg
            .gateway
            .listen
            .parse()
            .map_err(|e| HitBadgeError::BadRequest(format!("gateway.listen invalid: {e}")))?;
        addr.set_port(port);
        cfg.gateway.listen = addr.to_string();
    }

    if let Some(uri) = var("REDIS_URI") {
        cfg.store.uri = uri;
    } else if let Some(host) = var("REDIS_HOST") {
        cfg.store.uri = format!("redis://{host}:6379");
    }

    Ok(())
}

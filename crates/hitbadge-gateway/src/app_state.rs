//! Shared application state for the badge gateway.
//!
//! Built once at startup and cloned into every request. Holds no counter
//! state itself: counts live in the store, the service is a stateless
//! pipeline over each request.

use std::sync::Arc;

use hitbadge_core::error::Result;

use crate::config::GatewayConfig;
use crate::obs::metrics::GatewayMetrics;
use crate::services::BadgeService;
use crate::store::CounterStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    badges: Arc<BadgeService>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Build application state from config. Starts the store supervisor for
    /// the Redis backend, so this must run inside a tokio runtime.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let store = CounterStore::from_config(&cfg.store)?;
        tracing::info!(backend = store.backend_name(), "counter store configured");
        Ok(Self::with_store(cfg, store))
    }

    /// Build with an explicit store (tests, embedding).
    pub fn with_store(cfg: GatewayConfig, store: CounterStore) -> Self {
        let metrics = Arc::new(GatewayMetrics::default());
        let badges = BadgeService::new(store, &cfg.badge, Arc::clone(&metrics));

        Self {
            inner: Arc::new(AppStateInner { cfg, metrics }),
            badges: Arc::new(badges),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn badges(&self) -> Arc<BadgeService> {
        Arc::clone(&self.badges)
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Extra gauge lines for `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![(
            "hitbadge_store_available",
            u64::from(self.badges.store().is_available()),
        )]
    }
}

//! Counter Store Adapter.
//!
//! Wraps a key-value counter backend behind two operations keyed by page and
//! UTC day:
//! - `bump_and_read`: atomic increment of daily + total, refresh daily expiry
//! - `read`: plain read, missing keys are 0, never creates the daily key
//!
//! Atomicity comes from the backend's increment primitive; the adapter takes
//! no locks. When the connection is known to be down the adapter answers
//! `StoreUnavailable` without touching the backend.

mod memory;
mod redis_backend;
mod state;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use hitbadge_core::badge::{Counts, PageId};
use hitbadge_core::error::{HitBadgeError, Result};
use hitbadge_core::keys::{daily_key, total_key, DAILY_TTL_SECS};

pub use memory::MemoryBackend;
pub use redis_backend::{incr_pipeline, read_pipeline, reconnect_delay, RedisBackend};
pub use state::ConnectionState;

use crate::config::{StoreBackend, StoreSection};

const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 10);

/// Key-value backend with atomic increments.
#[async_trait]
pub trait CounterBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Increment both keys and set `ttl_secs` expiry on `daily_key`, atomically.
    async fn incr_pair(&self, daily_key: &str, total_key: &str, ttl_secs: u64) -> Result<Counts>;

    /// Read both keys; missing keys are 0.
    async fn get_pair(&self, daily_key: &str, total_key: &str) -> Result<Counts>;
}

#[derive(Clone)]
pub struct CounterStore {
    backend: Arc<dyn CounterBackend>,
    state: Arc<ConnectionState>,
}

impl CounterStore {
    pub fn new(backend: Arc<dyn CounterBackend>, state: Arc<ConnectionState>) -> Self {
        Self { backend, state }
    }

    /// In-process backend, always available.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), Arc::new(ConnectionState::new(true)))
    }

    /// Build from config. The Redis backend starts unavailable and flips up
    /// once its supervisor connects.
    pub fn from_config(cfg: &StoreSection) -> Result<Self> {
        match cfg.backend {
            StoreBackend::Memory => {
                let backend = Arc::new(MemoryBackend::new());
                memory::spawn_purge(Arc::downgrade(&backend), PURGE_INTERVAL);
                Ok(Self::new(backend, Arc::new(ConnectionState::new(true))))
            }
            StoreBackend::Redis => {
                let state = Arc::new(ConnectionState::new(false));
                let backend = RedisBackend::spawn(cfg, Arc::clone(&state))?;
                Ok(Self::new(backend, state))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_available(&self) -> bool {
        self.state.is_up()
    }

    pub async fn bump_and_read(&self, page: &PageId, today: NaiveDate) -> Result<Counts> {
        self.ensure_available()?;
        self.backend
            .incr_pair(&daily_key(page, today), &total_key(page), DAILY_TTL_SECS)
            .await
            .map_err(into_unavailable)
    }

    pub async fn read(&self, page: &PageId, today: NaiveDate) -> Result<Counts> {
        self.ensure_available()?;
        self.backend
            .get_pair(&daily_key(page, today), &total_key(page))
            .await
            .map_err(into_unavailable)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.state.is_up() {
            Ok(())
        } else {
            Err(HitBadgeError::StoreUnavailable(format!(
                "{} backend not connected",
                self.backend.name()
            )))
        }
    }
}

fn into_unavailable(e: HitBadgeError) -> HitBadgeError {
    match e {
        HitBadgeError::StoreUnavailable(_) => e,
        other => HitBadgeError::StoreUnavailable(other.to_string()),
    }
}

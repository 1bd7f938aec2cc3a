//! In-process counter backend.
//!
//! Each key is a `DashMap` slot, so a single increment is atomic under the
//! shard lock. Expired slots read as 0 and restart from 0 on the next incr.

use std::sync::Weak;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use hitbadge_core::badge::Counts;
use hitbadge_core::error::Result;

use super::CounterBackend;

#[derive(Debug)]
struct Slot {
    value: u64,
    expires_at: Option<Instant>,
}

impl Slot {
    fn expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: DashMap<String, Slot>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self { slots: DashMap::new() }
    }

    fn incr(&self, key: &str, ttl: Option<Duration>) -> u64 {
        let now = Instant::now();
        let mut slot = self
            .slots
            .entry(key.to_string())
            .or_insert(Slot { value: 0, expires_at: None });
        if slot.expired(now) {
            slot.value = 0;
            slot.expires_at = None;
        }
        slot.value += 1;
        if let Some(ttl) = ttl {
            slot.expires_at = Some(now + ttl);
        }
        slot.value
    }

    fn get(&self, key: &str) -> u64 {
        let now = Instant::now();
        match self.slots.get(key) {
            Some(slot) if !slot.expired(now) => slot.value,
            _ => 0,
        }
    }

    /// Whether a live (non-expired) slot exists for `key`.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.slots.get(key).map(|s| !s.expired(now)).unwrap_or(false)
    }

    /// Remaining time-to-live, `None` for missing or persistent keys.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.slots
            .get(key)
            .and_then(|s| s.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Drop expired slots. Returns how many were removed.
    ///
    /// Counted inside `retain`: concurrent inserts change `len()` mid-purge.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.slots.retain(|_, s| {
            let keep = !s.expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

/// Periodically drop expired slots until the backend is dropped.
pub(crate) fn spawn_purge(backend: Weak<MemoryBackend>, every: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.tick().await;
        loop {
            tick.tick().await;
            let Some(b) = backend.upgrade() else { return };
            let removed = b.purge_expired();
            if removed > 0 {
                tracing::info!(removed, remaining = b.slots.len(), "purged expired counters");
            }
        }
    });
}

#[async_trait]
impl CounterBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn incr_pair(&self, daily_key: &str, total_key: &str, ttl_secs: u64) -> Result<Counts> {
        let daily = self.incr(daily_key, Some(Duration::from_secs(ttl_secs)));
        let total = self.incr(total_key, None);
        Ok(Counts::new(daily, total))
    }

    async fn get_pair(&self, daily_key: &str, total_key: &str) -> Result<Counts> {
        Ok(Counts::new(self.get(daily_key), self.get(total_key)))
    }
}

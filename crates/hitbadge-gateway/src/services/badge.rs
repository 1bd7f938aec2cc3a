//! Badge Service: resolve counts through the counter store, render the SVG.
//!
//! Two semantics:
//! - `Increment`: live badge embedded on third-party pages, bumps counters
//! - `Keep`: preview, read-only
//!
//! Store failures never reach the caller. They are absorbed into the fallback
//! policy so the badge stays renderable.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rand::Rng;

use hitbadge_core::badge::{BadgeStyle, Counts, PageId};
use hitbadge_core::error::{HitBadgeError, Result};
use hitbadge_core::svg::{render_badge, Escaping};

use crate::config::{BadgeSection, FallbackPolicy};
use crate::obs::metrics::GatewayMetrics;
use crate::store::CounterStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountMode {
    Increment,
    Keep,
}

impl CountMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CountMode::Increment => "incr",
            CountMode::Keep => "keep",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedBadge {
    pub svg: String,
    pub mode: CountMode,
    pub counts: Counts,
    /// Counts came from the fallback policy, not the store.
    pub degraded: bool,
}

pub struct BadgeService {
    store: CounterStore,
    fallback: FallbackPolicy,
    escaping: Escaping,
    metrics: Arc<GatewayMetrics>,
}

impl BadgeService {
    pub fn new(store: CounterStore, cfg: &BadgeSection, metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            store,
            fallback: cfg.fallback,
            escaping: cfg.escape,
            metrics,
        }
    }

    pub fn store(&self) -> &CounterStore {
        &self.store
    }

    pub async fn render_incrementing(&self, page: Option<&str>, style: &BadgeStyle) -> Result<RenderedBadge> {
        self.render(CountMode::Increment, page, style, utc_today()).await
    }

    pub async fn render_keep(&self, page: Option<&str>, style: &BadgeStyle) -> Result<RenderedBadge> {
        self.render(CountMode::Keep, page, style, utc_today()).await
    }

    /// Full pipeline for an explicit day.
    pub async fn render(
        &self,
        mode: CountMode,
        page: Option<&str>,
        style: &BadgeStyle,
        today: NaiveDate,
    ) -> Result<RenderedBadge> {
        let started = Instant::now();
        let labels_mode = mode.as_str();

        let page = match PageId::parse(page) {
            Ok(p) => p,
            Err(e) => {
                self.metrics
                    .badges_served
                    .inc(&[("mode", labels_mode), ("outcome", "missing_param")]);
                return Err(e);
            }
        };

        let (counts, degraded) = self.resolve_counts(mode, &page, today).await;

        let svg = render_badge(style, counts, self.escaping).map_err(|e| {
            tracing::error!(error = %e, "badge render failed");
            self.metrics
                .badges_served
                .inc(&[("mode", labels_mode), ("outcome", "render_error")]);
            e
        })?;

        let outcome = if degraded { "fallback" } else { "ok" };
        self.metrics
            .badges_served
            .inc(&[("mode", labels_mode), ("outcome", outcome)]);
        self.metrics
            .badge_duration
            .observe(&[("mode", labels_mode)], started.elapsed());

        Ok(RenderedBadge { svg, mode, counts, degraded })
    }

    async fn resolve_counts(&self, mode: CountMode, page: &PageId, today: NaiveDate) -> (Counts, bool) {
        if !self.store.is_available() {
            tracing::warn!(mode = mode.as_str(), "counter store unavailable, using fallback counts");
            self.metrics
                .store_fallbacks
                .inc(&[("mode", mode.as_str()), ("reason", "unavailable")]);
            return (self.fallback_counts(), true);
        }

        let res = match mode {
            CountMode::Increment => self.store.bump_and_read(page, today).await,
            CountMode::Keep => self.store.read(page, today).await,
        };

        match res {
            Ok(c) => (c, false),
            Err(e) => {
                tracing::warn!(error = %e, mode = mode.as_str(), "counter store call failed, using fallback counts");
                self.metrics
                    .store_fallbacks
                    .inc(&[("mode", mode.as_str()), ("reason", reason(&e))]);
                (self.fallback_counts(), true)
            }
        }
    }

    fn fallback_counts(&self) -> Counts {
        match self.fallback {
            FallbackPolicy::Random => {
                let mut rng = rand::thread_rng();
                Counts::new(rng.gen_range(0..100), rng.gen_range(0..1000))
            }
            FallbackPolicy::Zero => Counts::default(),
        }
    }
}

fn reason(e: &HitBadgeError) -> &'static str {
    match e {
        HitBadgeError::StoreUnavailable(_) => "unavailable",
        _ => "error",
    }
}

pub fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

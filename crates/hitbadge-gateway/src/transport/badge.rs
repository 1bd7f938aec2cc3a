//! Badge endpoints.
//!
//! - `GET /api/count/incr/badge.svg` : bumps counters, never cacheable
//! - `GET /api/count/keep/badge.svg` : read-only, short public cache
//!
//! Store failures are already absorbed by the service; only missing `url`
//! (400) and render failures (500) surface here, with no internal detail.
//!
//! The query string is taken as raw pairs: a repeated parameter keeps its
//! first value and unknown parameters are ignored, so no query shape can be
//! rejected by the extractor.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use hitbadge_core::badge::{BadgeStyle, Icon};
use hitbadge_core::error::{ClientCode, HitBadgeError};

use crate::app_state::AppState;
use crate::services::{CountMode, RenderedBadge};

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
pub const DEGRADED_HEADER: &str = "x-hit-counter-degraded";

#[derive(Debug, Default)]
pub struct BadgeQuery {
    pub url: Option<String>,
    pub title: Option<String>,
    pub title_bg: Option<String>,
    pub count_bg: Option<String>,
    pub edge_flat: Option<String>,
    pub text_color: Option<String>,
    pub icon_color: Option<String>,
    pub icon: Option<String>,
}

impl BadgeQuery {
    /// Build from decoded query pairs; the first occurrence of a key wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut q = Self::default();
        for (k, v) in pairs {
            let slot = match k.as_str() {
                "url" => &mut q.url,
                "title" => &mut q.title,
                "title_bg" => &mut q.title_bg,
                "count_bg" => &mut q.count_bg,
                "edge_flat" => &mut q.edge_flat,
                "text_color" => &mut q.text_color,
                "icon_color" => &mut q.icon_color,
                "icon" => &mut q.icon,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(v);
            }
        }
        q
    }

    pub fn style(&self) -> BadgeStyle {
        let d = BadgeStyle::default();
        BadgeStyle {
            title: self.title.clone().filter(|t| !t.is_empty()).unwrap_or(d.title),
            title_bg: self.title_bg.clone().unwrap_or(d.title_bg),
            count_bg: self.count_bg.clone().unwrap_or(d.count_bg),
            text_color: self.text_color.clone().unwrap_or(d.text_color),
            icon_color: self.icon_color.clone().unwrap_or(d.icon_color),
            icon: self.icon.as_deref().and_then(Icon::from_name),
            edge_flat: self.edge_flat.as_deref() == Some("true"),
        }
    }
}

pub async fn incr_badge(
    State(app): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    serve(app, CountMode::Increment, BadgeQuery::from_pairs(pairs)).await
}

pub async fn keep_badge(
    State(app): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    serve(app, CountMode::Keep, BadgeQuery::from_pairs(pairs)).await
}

async fn serve(app: AppState, mode: CountMode, q: BadgeQuery) -> Response {
    let span = tracing::info_span!("badge", mode = mode.as_str());
    async move {
        let badges = app.badges();
        let style = q.style();
        let res = match mode {
            CountMode::Increment => badges.render_incrementing(q.url.as_deref(), &style).await,
            CountMode::Keep => badges.render_keep(q.url.as_deref(), &style).await,
        };

        match res {
            Ok(badge) => {
                tracing::debug!(
                    daily = badge.counts.daily,
                    total = badge.counts.total,
                    degraded = badge.degraded,
                    "badge served"
                );
                svg_response(&app, badge)
            }
            Err(e) => error_response(e),
        }
    }
    .instrument(span)
    .await
}

/// Cache-Control value per mode.
pub fn cache_control(mode: CountMode, keep_max_age_secs: u32) -> String {
    match mode {
        CountMode::Increment => NO_CACHE.to_string(),
        CountMode::Keep => format!("public, max-age={keep_max_age_secs}"),
    }
}

fn svg_response(app: &AppState, badge: RenderedBadge) -> Response {
    let cfg = &app.cfg().badge;
    let mut headers = HeaderMap::new();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(SVG_CONTENT_TYPE));
    if let Ok(v) = HeaderValue::from_str(&cache_control(badge.mode, cfg.keep_max_age_secs)) {
        headers.insert(header::CACHE_CONTROL, v);
    }
    if badge.mode == CountMode::Increment {
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET"));
    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("cross-origin"),
    );
    if cfg.degraded_header && badge.degraded {
        headers.insert(HeaderName::from_static(DEGRADED_HEADER), HeaderValue::from_static("1"));
    }

    (StatusCode::OK, headers, badge.svg).into_response()
}

pub fn error_response(e: HitBadgeError) -> Response {
    let code = e.client_code();
    let status = StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match code {
        ClientCode::MissingParameter => "URL parameter is required.",
        _ => {
            tracing::error!(error = %e, "error generating badge");
            "Error generating badge"
        }
    };
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let s = BadgeQuery::default().style();
        assert_eq!(s, BadgeStyle::default());
    }

    #[test]
    fn edge_flat_only_for_literal_true() {
        for (raw, want) in [("true", true), ("TRUE", false), ("1", false), ("false", false)] {
            let q = BadgeQuery { edge_flat: Some(raw.into()), ..BadgeQuery::default() };
            assert_eq!(q.style().edge_flat, want, "edge_flat={raw}");
        }
    }

    #[test]
    fn empty_title_falls_back_to_hits() {
        let q = BadgeQuery { title: Some(String::new()), ..BadgeQuery::default() };
        assert_eq!(q.style().title, "hits");
    }

    #[test]
    fn unknown_icon_ignored() {
        let q = BadgeQuery { icon: Some("rocket".into()), ..BadgeQuery::default() };
        assert_eq!(q.style().icon, None);
        let q = BadgeQuery { icon: Some("eye".into()), ..BadgeQuery::default() };
        assert_eq!(q.style().icon, Some(Icon::Eye));
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn repeated_key_keeps_first_value() {
        let q = BadgeQuery::from_pairs(pairs(&[
            ("url", "a"),
            ("title", "first"),
            ("url", "b"),
            ("title", "second"),
        ]));
        assert_eq!(q.url.as_deref(), Some("a"));
        assert_eq!(q.style().title, "first");
    }

    #[test]
    fn unknown_keys_ignored() {
        let q = BadgeQuery::from_pairs(pairs(&[("utm_source", "x"), ("icon", "star")]));
        assert_eq!(q.url, None);
        assert_eq!(q.style().icon, Some(Icon::Star));
    }

    #[test]
    fn cache_policies() {
        assert_eq!(cache_control(CountMode::Increment, 60), NO_CACHE);
        assert_eq!(cache_control(CountMode::Keep, 60), "public, max-age=60");
    }
}

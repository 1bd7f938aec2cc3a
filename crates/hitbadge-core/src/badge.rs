//! Badge value types: page identity, counts, and styling.

use std::fmt;

use crate::error::{HitBadgeError, Result};

/// Caller-supplied page identity. Used verbatim in counter keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageId(String);

impl PageId {
    /// Accept any non-empty string. No URL validation or normalization.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            Some(s) if !s.is_empty() => Ok(Self(s.to_string())),
            _ => Err(HitBadgeError::MissingParameter("url")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Daily and cumulative hit counts for one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub daily: u64,
    pub total: u64,
}

impl Counts {
    pub fn new(daily: u64, total: u64) -> Self {
        Self { daily, total }
    }

    /// Text shown in the count segment.
    pub fn label(&self) -> String {
        format!("{}/{}", self.daily, self.total)
    }
}

/// Built-in 14x14 glyphs that can sit left of the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Eye,
    Star,
}

impl Icon {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "eye" => Some(Icon::Eye),
            "star" => Some(Icon::Star),
            _ => None,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Eye => {
                r#"<path d="M7 3C3.5 3 1 7 1 7s2.5 4 6 4 6-4 6-4-2.5-4-6-4zm0 6.5A2.5 2.5 0 1 1 7 4.5a2.5 2.5 0 0 1 0 5z"/>"#
            }
            Icon::Star => {
                r#"<path d="M7 1l1.8 3.9 4.2.5-3.1 2.9.8 4.2L7 10.4 3.3 12.5l.8-4.2L1 5.4l4.2-.5z"/>"#
            }
        }
    }
}

/// Styling inputs for a badge. Colors are raw CSS strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeStyle {
    pub title: String,
    pub title_bg: String,
    pub count_bg: String,
    pub text_color: String,
    pub icon_color: String,
    pub icon: Option<Icon>,
    pub edge_flat: bool,
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            title: "hits".into(),
            title_bg: "#555".into(),
            count_bg: "#4c1".into(),
            text_color: "#fff".into(),
            icon_color: "#fff".into(),
            icon: None,
            edge_flat: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn page_id_rejects_missing_and_empty() {
        assert!(matches!(PageId::parse(None), Err(HitBadgeError::MissingParameter("url"))));
        assert!(matches!(PageId::parse(Some("")), Err(HitBadgeError::MissingParameter("url"))));
    }

    #[test]
    fn page_id_is_verbatim() {
        let p = PageId::parse(Some("HTTPS://X.test/a?b=1#c")).unwrap();
        assert_eq!(p.as_str(), "HTTPS://X.test/a?b=1#c");
    }

    #[test]
    fn counts_label() {
        assert_eq!(Counts::new(12, 345).label(), "12/345");
    }
}

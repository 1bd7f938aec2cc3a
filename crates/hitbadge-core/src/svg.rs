//! SVG badge renderer.
//!
//! Two adjacent segments (title, count) on a fixed 20px height. Widths are
//! derived from a 7px-per-character approximation of 11px Verdana so badge
//! proportions stay stable across renders. Output is self-contained: inline
//! `<style>`, no external references.

use std::fmt::Write;

use serde::Deserialize;

use crate::badge::{BadgeStyle, Counts};
use crate::error::{HitBadgeError, Result};

pub const HEIGHT: u32 = 20;
pub const CHAR_WIDTH: u32 = 7;
pub const PADDING_X: u32 = 10;
pub const PADDING_Y: u32 = 4;
pub const FONT_SIZE: u32 = 11;
pub const ICON_WIDTH: u32 = 20;
pub const ICON_SPACING: u32 = 5;
pub const ICON_SIZE: u32 = 14;
pub const CORNER_RADIUS: u32 = 3;

/// How caller-supplied strings are embedded into the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Escaping {
    /// Escape XML special characters in title and colors.
    #[default]
    Xml,
    /// Emit strings as received.
    Raw,
}

impl Escaping {
    fn apply(self, s: &str) -> String {
        match self {
            Escaping::Raw => s.to_string(),
            Escaping::Xml => escape_xml(s),
        }
    }
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Geometry of a rendered badge.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeLayout {
    pub title_width: u32,
    pub count_width: u32,
    pub total_width: u32,
    pub radius: u32,
    pub title_x: f64,
    pub count_x: f64,
    pub text_y: u32,
    pub count_text: String,
}

impl BadgeLayout {
    pub fn compute(style: &BadgeStyle, counts: Counts) -> Self {
        let (icon_width, icon_spacing) = match style.icon {
            Some(_) => (ICON_WIDTH, ICON_SPACING),
            None => (0, 0),
        };

        // Widths follow the unescaped title.
        let title_text_width = style.title.chars().count() as u32 * CHAR_WIDTH;
        let count_text = counts.label();
        let count_text_width = count_text.chars().count() as u32 * CHAR_WIDTH;

        let title_width = title_text_width + PADDING_X * 2 + icon_width + icon_spacing;
        let count_width = count_text_width + PADDING_X * 2;

        Self {
            title_width,
            count_width,
            total_width: title_width + count_width,
            radius: if style.edge_flat { 0 } else { CORNER_RADIUS },
            title_x: f64::from(PADDING_X + icon_width + icon_spacing) + f64::from(title_text_width) / 2.0,
            count_x: f64::from(title_width) + f64::from(count_width) / 2.0,
            text_y: HEIGHT / 2 + PADDING_Y,
            count_text,
        }
    }
}

/// Render a standalone SVG document.
pub fn render_badge(style: &BadgeStyle, counts: Counts, escaping: Escaping) -> Result<String> {
    let l = BadgeLayout::compute(style, counts);
    let mut out = String::with_capacity(1024);
    write_document(&mut out, style, &l, escaping)
        .map_err(|e| HitBadgeError::RenderFailure(format!("svg write failed: {e}")))?;
    Ok(out)
}

fn write_document(
    out: &mut String,
    style: &BadgeStyle,
    l: &BadgeLayout,
    esc: Escaping,
) -> std::fmt::Result {
    let r = l.radius;

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
        l.total_width, HEIGHT
    )?;
    writeln!(out, "  <style>")?;
    writeln!(out, "    .titleText, .countText {{")?;
    writeln!(out, "      font-family: Verdana, Geneva, DejaVu Sans, sans-serif;")?;
    writeln!(out, "      font-size: {FONT_SIZE}px;")?;
    writeln!(out, "      fill: {};", esc.apply(&style.text_color))?;
    writeln!(out, "      text-anchor: middle;")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    .icon {{")?;
    writeln!(out, "      fill: {};", esc.apply(&style.icon_color))?;
    writeln!(out, "    }}")?;
    writeln!(out, "  </style>")?;
    writeln!(
        out,
        r#"  <rect x="0" y="0" width="{}" height="{HEIGHT}" fill="{}" rx="{r}" ry="{r}" />"#,
        l.title_width,
        esc.apply(&style.title_bg)
    )?;
    writeln!(
        out,
        r#"  <rect x="{}" y="0" width="{}" height="{HEIGHT}" fill="{}" rx="{r}" ry="{r}" />"#,
        l.title_width,
        l.count_width,
        esc.apply(&style.count_bg)
    )?;
    if let Some(icon) = style.icon {
        writeln!(
            out,
            r#"  <g class="icon" transform="translate({PADDING_X}, {})">{}</g>"#,
            (HEIGHT - ICON_SIZE) / 2,
            icon.glyph()
        )?;
    }
    writeln!(
        out,
        r#"  <text x="{}" y="{}" class="titleText">{}</text>"#,
        l.title_x,
        l.text_y,
        esc.apply(&style.title)
    )?;
    writeln!(
        out,
        r#"  <text x="{}" y="{}" class="countText">{}</text>"#,
        l.count_x, l.text_y, l.count_text
    )?;
    writeln!(out, "</svg>")
}

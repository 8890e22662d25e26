// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Schema color identifiers.
//!
//! Schemas name colors the way a web page would: a CSS color keyword or a
//! `#rgb` / `#rgba` / `#rrggbb` / `#rrggbbaa` hex string.

use egui::Color32;

/// Drawn when a schema color cannot be parsed.
pub const FALLBACK_COLOR: Color32 = Color32::from_rgb(255, 0, 255);

const NAMED: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("pink", [255, 192, 203]),
    ("brown", [165, 42, 42]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("olive", [128, 128, 0]),
    ("maroon", [128, 0, 0]),
    ("silver", [192, 192, 192]),
    ("gold", [255, 215, 0]),
    ("violet", [238, 130, 238]),
];

/// Parse a color identifier, case-insensitively.
pub fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim().to_ascii_lowercase();

    if value.starts_with('#') {
        return Color32::from_hex(&value).ok();
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, [r, g, b])| Color32::from_rgb(*r, *g, *b))
}

/// Like [`parse_color`] but falls back to [`FALLBACK_COLOR`].
pub fn resolve_color(value: &str) -> Color32 {
    parse_color(value).unwrap_or_else(|| {
        log::warn!("Unrecognised color '{}'", value);
        FALLBACK_COLOR
    })
}

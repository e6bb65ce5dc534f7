// SPDX-License-Identifier: AGPL-3.0-or-later
//! Style model: resolved text properties, per-element overrides and the
//! per-export style registry.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::tree::TagKind;

/// Point size = pixel size x this factor (96 dpi CSS pixels to points)
pub const PX_TO_PT: f32 = 0.75;

/// Legacy `<font size=N>` values in pixels, indexed by N - 1
const FONT_SIZE_ATTR_PX: [f32; 7] = [10.0, 13.0, 16.0, 18.0, 24.0, 32.0, 48.0];

const NAMED_COLORS: [(&str, &str); 8] = [
    ("black", "#000000"),
    ("blue", "#0000ff"),
    ("red", "#ff0000"),
    ("green", "#008000"),
    ("white", "#ffffff"),
    ("yellow", "#ffff00"),
    ("purple", "#800080"),
    ("orange", "#ffa500"),
];

/// Tuning for how explicit sizes are resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// The surface's implicit font size in pixels
    pub baseline_px: f32,
    /// Sizes this close to the baseline count as the default size
    pub size_tolerance_px: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            baseline_px: 16.0,
            size_tolerance_px: 1.0,
        }
    }
}

/// Resolved formatting at a point in the tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleProperties {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub font_size_pt: Option<u32>,
    pub color_hex: Option<String>,
}

impl StyleProperties {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// The own properties of a single element. `None` keeps the inherited value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOverride {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    /// Absent when the element's size is the implicit default
    pub font_size_pt: Option<u32>,
    /// Absent when the element's color is black or unsupported
    pub color_hex: Option<String>,
}

impl StyleOverride {
    /// Compute the own properties of an element from its tag semantics and
    /// its presentational and inline-style attributes.
    pub fn for_element(
        tag: TagKind,
        attributes: &BTreeMap<String, String>,
        config: &StyleConfig,
    ) -> Self {
        let mut own = Self::default();

        // Unrecognised elements are plain containers
        if tag == TagKind::Other {
            return own;
        }

        match tag {
            TagKind::Bold => own.bold = Some(true),
            TagKind::Italic => own.italic = Some(true),
            TagKind::Underline => own.underline = Some(true),
            TagKind::Font => {
                own.color_hex = attributes.get("color").and_then(|c| explicit_color(c));
                own.font_size_pt = attributes
                    .get("size")
                    .and_then(|s| legacy_font_size_px(s))
                    .and_then(|px| explicit_size_pt(px, config));
            }
            _ => {}
        }

        // Inline style declarations win over tag semantics and attributes
        if let Some(style) = attributes.get("style") {
            for (property, value) in declarations(style) {
                own.apply_declaration(&property, value, config);
            }
        }

        own
    }

    fn apply_declaration(&mut self, property: &str, value: &str, config: &StyleConfig) {
        let lowered = value.to_ascii_lowercase();
        match property {
            "font-size" => {
                if let Some(px) = parse_css_length_px(&lowered) {
                    self.font_size_pt = explicit_size_pt(px, config);
                }
            }
            "color" => {
                if normalize_color(value).is_some() {
                    self.color_hex = explicit_color(value);
                }
            }
            "font-weight" => {
                self.bold = match lowered.as_str() {
                    "bold" | "bolder" => Some(true),
                    "normal" | "lighter" => Some(false),
                    numeric => numeric.parse::<u32>().ok().map(|w| w >= 600),
                }
                .or(self.bold);
            }
            "font-style" => {
                self.italic = match lowered.as_str() {
                    "italic" | "oblique" => Some(true),
                    "normal" => Some(false),
                    _ => self.italic,
                };
            }
            "text-decoration" | "text-decoration-line" => {
                if lowered.split_whitespace().any(|part| part == "underline") {
                    self.underline = Some(true);
                } else if lowered.trim() == "none" {
                    self.underline = Some(false);
                }
            }
            _ => {}
        }
    }

    /// True when the element changes nothing
    pub fn is_empty(&self) -> bool {
        self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.font_size_pt.is_none()
            && self.color_hex.is_none()
    }

    /// Merge over inherited properties, field by field
    pub fn apply(&self, inherited: &StyleProperties) -> StyleProperties {
        StyleProperties {
            bold: self.bold.unwrap_or(inherited.bold),
            italic: self.italic.unwrap_or(inherited.italic),
            underline: self.underline.unwrap_or(inherited.underline),
            font_size_pt: self.font_size_pt.or(inherited.font_size_pt),
            color_hex: self
                .color_hex
                .clone()
                .or_else(|| inherited.color_hex.clone()),
        }
    }
}

/// Split a `style` attribute into `(lowercased property, value)` pairs
fn declarations<'a>(style: &'a str) -> impl Iterator<Item = (String, &'a str)> + 'a {
    style.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        let value = value.trim().trim_end_matches("!important").trim();
        Some((property.trim().to_ascii_lowercase(), value))
    })
}

fn parse_css_length_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let (number, factor) = if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("pt") {
        (n, 1.0 / PX_TO_PT)
    } else {
        return None;
    };
    let px = number.trim().parse::<f32>().ok()? * factor;
    (px.is_finite() && px > 0.0).then_some(px)
}

fn legacy_font_size_px(value: &str) -> Option<f32> {
    let n = value.trim().parse::<usize>().ok()?;
    FONT_SIZE_ATTR_PX.get(n.checked_sub(1)?).copied()
}

/// Convert a pixel size to whole points
pub fn px_to_pt(px: f32) -> u32 {
    (px * PX_TO_PT).round() as u32
}

/// Point size for an explicit pixel size, `None` at the baseline
fn explicit_size_pt(px: f32, config: &StyleConfig) -> Option<u32> {
    let at_baseline = (px - config.baseline_px).abs() <= config.size_tolerance_px;
    (!at_baseline).then(|| px_to_pt(px))
}

/// Normalized color, `None` for black and unsupported values
fn explicit_color(value: &str) -> Option<String> {
    normalize_color(value).filter(|hex| !is_black(hex))
}

fn is_black(hex: &str) -> bool {
    hex.eq_ignore_ascii_case("#000000") || hex.eq_ignore_ascii_case("#000")
}

/// Normalize a color to a hex literal.
///
/// Hex literals are kept as written, a fixed set of names and `rgb(r, g, b)`
/// triples are converted. Anything else yields `None`.
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim();

    if let Some(digits) = value.strip_prefix('#') {
        let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
        return valid.then(|| value.to_string());
    }

    if let Some((_, hex)) = NAMED_COLORS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value))
    {
        return Some((*hex).to_string());
    }

    let lowered = value.to_ascii_lowercase();
    let inner = lowered.strip_prefix("rgb(")?.strip_suffix(')')?;
    let channels = inner
        .split(',')
        .map(|c| c.trim().parse::<i64>().ok().map(|v| v.clamp(0, 255) as u8))
        .collect::<Option<Vec<u8>>>()?;

    match channels.as_slice() {
        [r, g, b] => Some(format!("#{r:02x}{g:02x}{b:02x}")),
        _ => None,
    }
}

/// Style definitions assigned during one export pass
#[derive(Debug, Default)]
pub struct StyleRegistry {
    ids: HashMap<StyleProperties, usize>,
    entries: Vec<(String, StyleProperties)>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier for `props`, assigning the next `StyleN` on first sight
    pub fn intern(&mut self, props: &StyleProperties) -> &str {
        let index = match self.ids.get(props) {
            Some(&index) => index,
            None => {
                let index = self.entries.len();
                self.entries.push((format!("Style{index}"), props.clone()));
                self.ids.insert(props.clone(), index);
                index
            }
        };
        &self.entries[index].0
    }

    /// Definitions in assignment order
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &StyleProperties)> {
        self.entries.iter().map(|(name, props)| (name.as_str(), props))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

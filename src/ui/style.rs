//! Marker styling for the facility groups and the user location.

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    HOSPITAL_MARKER_COLOR, HOSPITAL_MARKER_SIZE, PHARMACY_MARKER_COLOR, PHARMACY_MARKER_SIZE,
    USER_MARKER_COLOR, USER_MARKER_SIZE,
};

/// Shape drawn inside the marker circle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerGlyph {
    /// White medical cross
    Cross,
    /// Small white dot
    Dot,
}

/// Visual style of a marker icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    /// Fill color as `#rrggbb`
    pub fill_color: String,
    /// Border color as `#rrggbb`
    pub border_color: String,
    /// Border width in icon pixels
    pub border_width: f32,
    /// Rendered icon size in pixels (square)
    pub size: u32,
    pub glyph: MarkerGlyph,
}

impl MarkerStyle {
    pub fn hospital() -> Self {
        Self {
            fill_color: HOSPITAL_MARKER_COLOR.to_string(),
            size: HOSPITAL_MARKER_SIZE,
            ..Self::default()
        }
    }

    pub fn pharmacy() -> Self {
        Self {
            fill_color: PHARMACY_MARKER_COLOR.to_string(),
            size: PHARMACY_MARKER_SIZE,
            ..Self::default()
        }
    }

    pub fn user_location() -> Self {
        Self {
            fill_color: USER_MARKER_COLOR.to_string(),
            border_width: 3.0,
            size: USER_MARKER_SIZE,
            glyph: MarkerGlyph::Dot,
            ..Self::default()
        }
    }

    /// Fill color as RGB bytes, `None` if the color is not `#rrggbb`.
    pub fn fill_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.fill_color)
    }

    /// SVG icon on a 24x24 view box; providers scale it to `size`.
    pub fn icon_svg(&self) -> String {
        let inner = match self.glyph {
            MarkerGlyph::Cross => {
                r##"<path d="M12 6v12M6 12h12" stroke="#ffffff" stroke-width="2" stroke-linecap="round"/>"##
                    .to_string()
            }
            MarkerGlyph::Dot => r##"<circle cx="12" cy="12" r="3" fill="#ffffff"/>"##.to_string(),
        };
        let radius = match self.glyph {
            MarkerGlyph::Cross => 10,
            MarkerGlyph::Dot => 8,
        };

        format!(
            r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg"><circle cx="12" cy="12" r="{radius}" fill="{fill}" stroke="{stroke}" stroke-width="{width}"/>{inner}</svg>"#,
            fill = self.fill_color,
            stroke = self.border_color,
            width = self.border_width,
        )
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            fill_color: HOSPITAL_MARKER_COLOR.to_string(),
            border_color: "#ffffff".to_string(),
            border_width: 2.0,
            size: HOSPITAL_MARKER_SIZE,
            glyph: MarkerGlyph::Cross,
        }
    }
}

/// Parses `#rrggbb` into RGB bytes.
pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

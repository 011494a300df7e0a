use crate::foundation::config::{
    FONT_SIZE_ATTRIBUTION, FONT_SIZE_CITY, FONT_SIZE_COORDS, FONT_SIZE_COUNTRY, MAX_CITY_CHARS,
    MIN_FONT_SIZE, REFERENCE_HEIGHT_IN, REFERENCE_WIDTH_IN,
};
use crate::render::backend::Canvas;

/// Dynamic label sizing: shrink long city names so they never truncate,
/// clamped to a readable minimum. Sizes are points on the reference canvas;
/// [`TextLayoutPlan`] applies the canvas scale on top.
pub fn scaled_font_size(label: &str) -> f64 {
    let n = label.chars().count();
    if n > MAX_CITY_CHARS {
        (FONT_SIZE_CITY * MAX_CITY_CHARS as f64 / n as f64).max(MIN_FONT_SIZE)
    } else {
        FONT_SIZE_CITY
    }
}

/// Text and divider placement for one canvas, in 0-1 canvas fractions with
/// the origin at the bottom-left.
///
/// Every reference position is defined in inches against the 12x16 reference
/// canvas, scaled by the actual canvas dimensions, then normalized; font
/// sizes scale with canvas height so any output size keeps the reference
/// design's optical proportions.
#[derive(Clone, Copy, Debug)]
pub struct TextLayoutPlan {
    pub city_y: f64,
    pub line_y: f64,
    pub country_y: f64,
    pub coords_y: f64,
    pub line_x_start: f64,
    pub line_x_end: f64,
    /// Divider stroke width in points, already canvas-scaled.
    pub divider_stroke_pt: f64,
    height_scale: f64,
}

/// Reference vertical positions in inches from the bottom edge.
const CITY_Y_IN: f64 = 2.24;
const LINE_Y_IN: f64 = 2.0;
const COUNTRY_Y_IN: f64 = 1.60;
const COORDS_Y_IN: f64 = 1.12;
/// Divider half-width in inches on the reference canvas.
const LINE_HALF_WIDTH_IN: f64 = 1.2;
const DIVIDER_STROKE_PT: f64 = 1.0;

impl TextLayoutPlan {
    pub fn for_canvas(canvas: &Canvas) -> Self {
        let height_scale = canvas.height_in / REFERENCE_HEIGHT_IN;
        let width_scale = canvas.width_in / REFERENCE_WIDTH_IN;

        let v = |inches: f64| inches * height_scale / canvas.height_in;
        let half_width_frac = LINE_HALF_WIDTH_IN * width_scale / canvas.width_in;

        Self {
            city_y: v(CITY_Y_IN),
            line_y: v(LINE_Y_IN),
            country_y: v(COUNTRY_Y_IN),
            coords_y: v(COORDS_Y_IN),
            line_x_start: 0.5 - half_width_frac,
            line_x_end: 0.5 + half_width_frac,
            divider_stroke_pt: DIVIDER_STROKE_PT * height_scale,
            height_scale,
        }
    }

    /// City label size in points for this canvas.
    pub fn city_size_pt(&self, label: &str) -> f64 {
        scaled_font_size(label) * self.height_scale
    }

    pub fn country_size_pt(&self) -> f64 {
        FONT_SIZE_COUNTRY * self.height_scale
    }

    pub fn coords_size_pt(&self) -> f64 {
        FONT_SIZE_COORDS * self.height_scale
    }

    pub fn attribution_size_pt(&self) -> f64 {
        FONT_SIZE_ATTRIBUTION * self.height_scale
    }
}

/// Letter-space a city label: uppercase with two spaces between characters.
pub fn spaced_label(city: &str) -> String {
    let upper = city.to_uppercase();
    let mut out = String::with_capacity(upper.len() * 3);
    let mut chars = upper.chars();
    if let Some(first) = chars.next() {
        out.push(first);
        for c in chars {
            out.push_str("  ");
            out.push(c);
        }
    }
    out
}

/// Coordinate caption, e.g. `48.8566° N / 2.3522° E`, with S/W hemispheres
/// for negative values.
pub fn coordinate_label(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}° {ns} / {:.4}° {ew}", lat.abs(), lon.abs())
}

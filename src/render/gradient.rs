use crate::foundation::error::PosterResult;
use crate::render::backend::RenderBackend;
use crate::style::color::Rgba;

/// Canvas edge a vignette band attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Bottom,
    Top,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Bottom, Edge::Top, Edge::Left, Edge::Right];
}

/// Vertical (top/bottom) bands cover the inner 15% of the canvas height.
const VERTICAL_BAND_FRACTION: f64 = 0.15;
/// Horizontal (left/right) bands cover the inner 10% of the canvas width.
const HORIZONTAL_BAND_FRACTION: f64 = 0.10;

/// Band placement in pixels: `(x, y, width, height)`, origin top-left.
fn band_rect(width_px: u32, height_px: u32, edge: Edge) -> (u32, u32, u32, u32) {
    match edge {
        Edge::Bottom => {
            let band = (f64::from(height_px) * VERTICAL_BAND_FRACTION).round() as u32;
            (0, height_px - band, width_px, band)
        }
        Edge::Top => {
            let band = (f64::from(height_px) * VERTICAL_BAND_FRACTION).round() as u32;
            (0, 0, width_px, band)
        }
        Edge::Left => {
            let band = (f64::from(width_px) * HORIZONTAL_BAND_FRACTION).round() as u32;
            (0, 0, band, height_px)
        }
        Edge::Right => {
            let band = (f64::from(width_px) * HORIZONTAL_BAND_FRACTION).round() as u32;
            (width_px - band, 0, band, height_px)
        }
    }
}

/// Alpha at ramp position `i` of `len`: fully opaque at the canvas edge,
/// fading to transparent at the inner rim. 256 discrete steps.
fn ramp_alpha(edge: Edge, i: u32, len: u32) -> u8 {
    if len <= 1 {
        return 255;
    }
    let t = f64::from(i) / f64::from(len - 1);
    let opacity = match edge {
        // Pixel rows/columns count from the top-left, so "bottom" and
        // "right" ramps rise with the index while "top" and "left" fall.
        Edge::Bottom | Edge::Right => t,
        Edge::Top | Edge::Left => 1.0 - t,
    };
    (opacity * 255.0).round() as u8
}

fn band_pixels(color: Rgba, edge: Edge, width: u32, height: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for row in 0..height {
        for col in 0..width {
            let alpha = match edge {
                Edge::Bottom | Edge::Top => ramp_alpha(edge, row, height),
                Edge::Left | Edge::Right => ramp_alpha(edge, col, width),
            };
            rgba.extend_from_slice(&[color.r, color.g, color.b, alpha]);
        }
    }
    rgba
}

/// Overlay one vignette band over `backend`.
///
/// Must be invoked once per edge for a full frame; each call writes a
/// disjoint region so call order does not matter.
pub fn apply(backend: &mut dyn RenderBackend, color: Rgba, edge: Edge) -> PosterResult<()> {
    let (width_px, height_px) = (backend.canvas().width_px(), backend.canvas().height_px());
    let (x, y, w, h) = band_rect(width_px, height_px, edge);
    if w == 0 || h == 0 {
        return Ok(());
    }
    let pixels = band_pixels(color, edge, w, h);
    backend.composite_rgba(x, y, w, h, &pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_bands_cover_inner_15_percent() {
        let (x, y, w, h) = band_rect(1200, 1600, Edge::Bottom);
        assert_eq!((x, y, w, h), (0, 1360, 1200, 240));
        let (x, y, w, h) = band_rect(1200, 1600, Edge::Top);
        assert_eq!((x, y, w, h), (0, 0, 1200, 240));
    }

    #[test]
    fn horizontal_bands_cover_inner_10_percent() {
        let (x, y, w, h) = band_rect(1200, 1600, Edge::Left);
        assert_eq!((x, y, w, h), (0, 0, 120, 1600));
        let (x, y, w, h) = band_rect(1200, 1600, Edge::Right);
        assert_eq!((x, y, w, h), (1080, 0, 120, 1600));
    }

    #[test]
    fn bands_are_disjoint_in_their_axis() {
        let (_, top_y, _, top_h) = band_rect(1200, 1600, Edge::Top);
        let (_, bottom_y, _, _) = band_rect(1200, 1600, Edge::Bottom);
        assert!(top_y + top_h <= bottom_y);
    }

    #[test]
    fn ramps_are_opaque_at_the_canvas_edge() {
        // Bottom band: last row touches the canvas bottom.
        assert_eq!(ramp_alpha(Edge::Bottom, 255, 256), 255);
        assert_eq!(ramp_alpha(Edge::Bottom, 0, 256), 0);
        // Top band: first row touches the canvas top.
        assert_eq!(ramp_alpha(Edge::Top, 0, 256), 255);
        assert_eq!(ramp_alpha(Edge::Top, 255, 256), 0);
        assert_eq!(ramp_alpha(Edge::Left, 0, 100), 255);
        assert_eq!(ramp_alpha(Edge::Right, 99, 100), 255);
    }

    #[test]
    fn band_pixels_carry_flat_color_with_ramped_alpha() {
        let color = Rgba::new(10, 20, 30, 255);
        let pixels = band_pixels(color, Edge::Bottom, 2, 4);
        assert_eq!(pixels.len(), 2 * 4 * 4);
        // Every pixel keeps the flat color.
        for px in pixels.chunks_exact(4) {
            assert_eq!(&px[0..3], &[10, 20, 30]);
        }
        // First row transparent-most, last row opaque.
        assert_eq!(pixels[3], 0);
        assert_eq!(pixels[pixels.len() - 1], 255);
    }
}

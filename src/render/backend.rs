use std::path::Path;

use crate::foundation::error::{PosterError, PosterResult};
use crate::style::color::Rgba;
use crate::style::fonts::FontRole;

/// Output encoding for a finished poster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
    Pdf,
}

impl OutputFormat {
    pub fn parse(s: &str) -> PosterResult<Self> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            other => Err(PosterError::validation(format!(
                "unsupported output format '{other}'"
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    /// DPI only sizes raster output; vector formats ignore it.
    pub fn is_raster(self) -> bool {
        matches!(self, Self::Png)
    }
}

/// Output medium: physical size, resolution, and encoding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub format: OutputFormat,
}

impl Canvas {
    /// Canvas aspect as width/height (extent reconciliation target).
    pub fn width_over_height(&self) -> f64 {
        self.width_in / self.height_in
    }

    /// Canvas aspect as height/width (bounding-box latitude stretch).
    pub fn height_over_width(&self) -> f64 {
        self.height_in / self.width_in
    }

    pub fn width_px(&self) -> u32 {
        (self.width_in * f64::from(self.dpi)).round() as u32
    }

    pub fn height_px(&self) -> u32 {
        (self.height_in * f64::from(self.dpi)).round() as u32
    }

    /// Pixels per typographic point at this resolution.
    pub fn px_per_pt(&self) -> f64 {
        f64::from(self.dpi) / 72.0
    }
}

/// Horizontal anchoring for text placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HAlign {
    Center,
    Right,
}

/// Drawing seam between the composer and a concrete rasterizer.
///
/// All geometry arrives in pixel coordinates (origin top-left); stroke and
/// font sizes arrive in points and are converted by the backend at the
/// canvas DPI. Draw calls composite in order, painter's-algorithm style.
pub trait RenderBackend {
    fn canvas(&self) -> &Canvas;

    /// Flood the canvas with a flat color.
    fn clear(&mut self, color: Rgba);

    /// Fill a closed polygon ring.
    fn fill_polygon(&mut self, ring: &[kurbo::Point], color: Rgba);

    /// Stroke an open polyline.
    fn stroke_polyline(&mut self, points: &[kurbo::Point], color: Rgba, width_pt: f64);

    /// Draw one line of text anchored at (`x_px`, baseline `y_px`).
    fn draw_text(
        &mut self,
        text: &str,
        x_px: f64,
        baseline_y_px: f64,
        role: FontRole,
        size_pt: f64,
        color: Rgba,
        align: HAlign,
    ) -> PosterResult<()>;

    /// Composite a straight-alpha RGBA8 buffer over the region at
    /// (`x_px`, `y_px`) of size `width_px` x `height_px`.
    fn composite_rgba(
        &mut self,
        x_px: u32,
        y_px: u32,
        width_px: u32,
        height_px: u32,
        rgba: &[u8],
    ) -> PosterResult<()>;

    /// Encode and write the finished poster.
    fn save(&mut self, path: &Path) -> PosterResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_dimensions_follow_inches_times_dpi() {
        let canvas = Canvas {
            width_in: 12.0,
            height_in: 16.0,
            dpi: 300,
            format: OutputFormat::Png,
        };
        assert_eq!(canvas.width_px(), 3600);
        assert_eq!(canvas.height_px(), 4800);
        assert!((canvas.width_over_height() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn format_parsing() {
        assert_eq!(OutputFormat::parse("PNG").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::parse("svg").unwrap(), OutputFormat::Svg);
        assert!(OutputFormat::parse("jpeg").is_err());
        assert!(OutputFormat::Png.is_raster());
        assert!(!OutputFormat::Pdf.is_raster());
    }
}

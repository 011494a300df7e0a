use std::path::{Path, PathBuf};

use chrono::Local;

use crate::foundation::config::REFERENCE_WIDTH_IN;
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::backend::OutputFormat;

/// Filesystem-safe slug for a city name: lowercased, spaces collapsed to
/// underscores, everything else non-alphanumeric dropped.
pub fn city_slug(city: &str) -> String {
    let mut out = String::with_capacity(city.len());
    for c in city.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
        } else if c.is_whitespace() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Output filename `{city_slug}_{theme_slug}_{YYYYMMDD_HHMMSS}.{ext}` under
/// `dir`. Timestamped so repeated runs never overwrite earlier posters.
pub fn poster_path(dir: &Path, city: &str, theme_name: &str, format: OutputFormat) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!(
        "{}_{}_{stamp}.{}",
        city_slug(city),
        city_slug(theme_name),
        format.extension()
    ))
}

/// Parse a `WIDTHxHEIGHT` pixel resolution, e.g. `3840x2160`.
pub fn parse_resolution(s: &str) -> PosterResult<(u32, u32)> {
    let err = || PosterError::validation(format!("resolution '{s}' must be WIDTHxHEIGHT, e.g. 3840x2160"));

    let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
    let width: u32 = w.trim().parse().map_err(|_| err())?;
    let height: u32 = h.trim().parse().map_err(|_| err())?;
    if width == 0 || height == 0 {
        return Err(err());
    }
    Ok((width, height))
}

/// Effective DPI that makes the fixed-size print fill `width_px` across.
pub fn dpi_from_resolution(width_px: u32, _height_px: u32) -> u32 {
    (f64::from(width_px) / REFERENCE_WIDTH_IN).round().max(1.0) as u32
}

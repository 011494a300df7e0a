use std::path::PathBuf;

/// Reference canvas the layout constants were designed against: a 12x16 inch
/// portrait poster. All positions and font sizes scale from this.
pub const REFERENCE_WIDTH_IN: f64 = 12.0;
pub const REFERENCE_HEIGHT_IN: f64 = 16.0;
pub const DEFAULT_DPI: u32 = 300;

/// Font sizes (points) for the reference canvas. The city size is the base
/// that dynamic sizing shrinks from when the label runs long.
pub const FONT_SIZE_CITY: f64 = 60.0;
pub const FONT_SIZE_COUNTRY: f64 = 22.0;
pub const FONT_SIZE_COORDS: f64 = 14.0;
pub const FONT_SIZE_ATTRIBUTION: f64 = 8.0;

/// Dynamic sizing bounds for long city labels.
pub const MIN_FONT_SIZE: f64 = 24.0;
pub const MAX_CITY_CHARS: usize = 10;

/// Default map radius in meters.
pub const DEFAULT_DISTANCE_M: f64 = 29_000.0;

pub const THEMES_DIR: &str = "themes";
pub const FONTS_DIR: &str = "fonts";
pub const POSTERS_DIR: &str = "posters";
pub const CACHE_DIR: &str = "cache";

/// Environment variable overriding the cache directory.
pub const CACHE_DIR_ENV: &str = "CARTOPRESS_CACHE_DIR";

/// Resolve the cache directory, preferring the environment override.
///
/// Resolution is an explicit call made by the owning component; nothing is
/// created here.
pub fn cache_dir_from_env() -> PathBuf {
    std::env::var_os(CACHE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CACHE_DIR))
}

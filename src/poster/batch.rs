use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::foundation::error::PosterResult;
use crate::foundation::geo::{BBox, GeoPoint};
use crate::geodata::fetch::{FetchObserver, FetchOrchestrator};
use crate::geodata::geocode::resolve_coordinates;
use crate::geodata::model::MapData;
use crate::geodata::provider::{FeatureProvider, Geocoder, StreetGraphProvider};
use crate::poster::compose::compose_poster;
use crate::poster::output::{city_slug, poster_path};
use crate::render::backend::{Canvas, OutputFormat, RenderBackend};
use crate::render::cpu::CpuBackend;
use crate::style::fonts::FontSet;
use crate::style::theme::{Theme, load_theme};

/// Renders one poster to a file. Seam between the batch loop and the
/// rasterizer so batches are testable without pixels.
pub trait PosterRenderer {
    fn render(
        &self,
        data: &MapData,
        center: GeoPoint,
        city: &str,
        country: &str,
        theme: &Theme,
        path: &Path,
    ) -> PosterResult<()>;
}

/// Production renderer: a fresh CPU backend per poster.
pub struct CpuPosterRenderer {
    pub canvas: Canvas,
    pub fonts: Option<FontSet>,
}

impl PosterRenderer for CpuPosterRenderer {
    fn render(
        &self,
        data: &MapData,
        center: GeoPoint,
        city: &str,
        country: &str,
        theme: &Theme,
        path: &Path,
    ) -> PosterResult<()> {
        let mut backend = CpuBackend::new(self.canvas, self.fonts.clone())?;
        compose_poster(&mut backend, data, center, city, country, theme)?;
        backend.save(path)
    }
}

/// What one batch run is asked to produce.
pub struct BatchRequest<'a> {
    pub city: &'a str,
    pub country: &'a str,
    /// Half-width of the framed area in meters.
    pub distance_m: f64,
    /// Canvas height/width, stretching the framed latitude span.
    pub aspect: f64,
    pub themes: &'a [String],
    pub themes_dir: &'a Path,
    pub output_root: &'a Path,
    pub format: OutputFormat,
}

/// Outcome of a batch run.
///
/// `output_dir` is `None` exactly when shared resources (coordinates or map
/// data) could not be obtained and no poster was attempted.
#[derive(Debug, PartialEq, Eq)]
pub struct BatchResult {
    pub successful: usize,
    pub failed: usize,
    pub output_dir: Option<PathBuf>,
}

impl BatchResult {
    fn aborted() -> Self {
        Self {
            successful: 0,
            failed: 0,
            output_dir: None,
        }
    }
}

/// Resolve coordinates and fetch map data for one city, the shared half of
/// both generation paths. `None` means nothing can be rendered.
fn fetch_city_data<P>(
    fetcher: &FetchOrchestrator<P>,
    geocoder: &dyn Geocoder,
    observer: &mut dyn FetchObserver,
    request: &BatchRequest<'_>,
) -> Option<(GeoPoint, MapData)>
where
    P: StreetGraphProvider + FeatureProvider,
{
    let center = match resolve_coordinates(
        fetcher.cache(),
        geocoder,
        fetcher.pacing(),
        request.city,
        request.country,
    ) {
        Ok(point) => point,
        Err(e) => {
            error!(error = %e, city = request.city, "aborted: no coordinates");
            return None;
        }
    };

    let bbox = BBox::around(center, request.distance_m, request.aspect);
    let data = fetcher.fetch(&bbox, observer);
    if data.graph.as_ref().is_none_or(|g| g.is_empty()) {
        error!(city = request.city, "aborted: no street network");
        return None;
    }
    Some((center, data))
}

/// Render one poster for one theme, writing the timestamped file directly
/// under `output_root` with no per-city folder.
///
/// `request.themes` must name exactly one theme.
pub fn generate_single<P>(
    fetcher: &FetchOrchestrator<P>,
    geocoder: &dyn Geocoder,
    renderer: &dyn PosterRenderer,
    observer: &mut dyn FetchObserver,
    request: &BatchRequest<'_>,
) -> BatchResult
where
    P: StreetGraphProvider + FeatureProvider,
{
    let [theme_name] = request.themes else {
        error!(
            themes = request.themes.len(),
            "single poster takes exactly one theme"
        );
        return BatchResult::aborted();
    };

    let Some((center, data)) = fetch_city_data(fetcher, geocoder, observer, request) else {
        return BatchResult::aborted();
    };

    if let Err(e) = std::fs::create_dir_all(request.output_root) {
        error!(error = %e, dir = %request.output_root.display(), "aborted: cannot create output dir");
        return BatchResult::aborted();
    }

    let theme = load_theme(request.themes_dir, theme_name);
    let path = poster_path(request.output_root, request.city, theme_name, request.format);
    let mut result = BatchResult {
        successful: 0,
        failed: 0,
        output_dir: Some(request.output_root.to_path_buf()),
    };
    match renderer.render(&data, center, request.city, request.country, &theme, &path) {
        Ok(()) => {
            info!(theme = %theme_name, path = %path.display(), "poster rendered");
            result.successful = 1;
        }
        Err(e) => {
            warn!(theme = %theme_name, error = %e, "poster failed");
            result.failed = 1;
        }
    }
    result
}

/// Render one city across many themes, fetching coordinates and map data
/// exactly once. Posters land in a per-city folder under `output_root`.
///
/// Shared-resource failure short-circuits the whole batch; a failure inside
/// one theme's render is isolated and the remaining themes still run.
pub fn generate_batch<P>(
    fetcher: &FetchOrchestrator<P>,
    geocoder: &dyn Geocoder,
    renderer: &dyn PosterRenderer,
    observer: &mut dyn FetchObserver,
    request: &BatchRequest<'_>,
) -> BatchResult
where
    P: StreetGraphProvider + FeatureProvider,
{
    let Some((center, data)) = fetch_city_data(fetcher, geocoder, observer, request) else {
        return BatchResult::aborted();
    };

    let output_dir = request.output_root.join(city_slug(request.city));
    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        error!(error = %e, dir = %output_dir.display(), "batch aborted: cannot create output dir");
        return BatchResult::aborted();
    }

    let mut result = BatchResult {
        successful: 0,
        failed: 0,
        output_dir: Some(output_dir.clone()),
    };

    for theme_name in request.themes {
        let theme = load_theme(request.themes_dir, theme_name);
        let path = poster_path(&output_dir, request.city, theme_name, request.format);
        match renderer.render(&data, center, request.city, request.country, &theme, &path) {
            Ok(()) => {
                info!(theme = %theme_name, path = %path.display(), "poster rendered");
                result.successful += 1;
            }
            Err(e) => {
                warn!(theme = %theme_name, error = %e, "poster failed; continuing batch");
                result.failed += 1;
            }
        }
    }

    info!(
        successful = result.successful,
        failed = result.failed,
        "batch finished"
    );
    result
}

use kurbo::Point;
use tracing::{debug, info};

use crate::foundation::error::{PosterError, PosterResult};
use crate::foundation::geo::{GeoPoint, LocalProjection};
use crate::geodata::model::{FeatureLayer, MapData};
use crate::layout::extent::{Extent, Viewport};
use crate::layout::typography::{TextLayoutPlan, coordinate_label, spaced_label};
use crate::render::backend::{HAlign, RenderBackend};
use crate::render::gradient::{self, Edge};
use crate::style::color::Rgba;
use crate::style::fonts::FontRole;
use crate::style::roads;
use crate::style::theme::Theme;

pub const ATTRIBUTION_TEXT: &str = "© OpenStreetMap contributors";
/// Attribution anchor as canvas fractions from the bottom-left corner.
const ATTRIBUTION_X_FRAC: f64 = 0.98;
const ATTRIBUTION_Y_FRAC: f64 = 0.02;
/// Caption alpha factors over the theme text color.
const COORDS_ALPHA: f32 = 0.7;
const ATTRIBUTION_ALPHA: f32 = 0.5;

/// Draw one complete poster onto `backend`: background, water, parks, roads,
/// edge vignettes, then the text block.
///
/// The street graph is mandatory; water and parks are drawn when present and
/// silently skipped otherwise.
pub fn compose_poster(
    backend: &mut dyn RenderBackend,
    data: &MapData,
    center: GeoPoint,
    city: &str,
    country: &str,
    theme: &Theme,
) -> PosterResult<()> {
    let graph = data
        .graph
        .as_ref()
        .filter(|g| !g.is_empty())
        .ok_or_else(|| PosterError::render("no street network available for this area"))?;

    let canvas = *backend.canvas();
    let projection = LocalProjection::new(center);

    // Project every segment once; the plotted extent covers the graph only,
    // so water and parks never widen the frame.
    let segments_m: Vec<Vec<Point>> = graph
        .segments
        .iter()
        .map(|seg| seg.points.iter().map(|p| projection.project(*p)).collect())
        .collect();
    let extent = Extent::covering(segments_m.iter().flatten())
        .ok_or_else(|| PosterError::render("street network has no drawable geometry"))?;
    let extent = extent.reconcile(canvas.width_over_height());
    let viewport = Viewport::new(extent, canvas.width_px(), canvas.height_px());

    backend.clear(Rgba::from_hex(&theme.bg)?);

    if let Some(water) = &data.water {
        fill_layer(backend, &viewport, &projection, water, Rgba::from_hex(&theme.water)?);
    }
    if let Some(parks) = &data.parks {
        fill_layer(backend, &viewport, &projection, parks, Rgba::from_hex(&theme.parks)?);
    }

    let (colors, widths) = roads::classify(&graph.segments, theme)?;
    for ((points_m, color), width_pt) in segments_m.iter().zip(&colors).zip(&widths) {
        let px: Vec<Point> = points_m.iter().map(|p| viewport.to_px(*p)).collect();
        backend.stroke_polyline(&px, *color, f64::from(*width_pt));
    }
    debug!(segments = graph.segments.len(), "street network drawn");

    let gradient_color = Rgba::from_hex(&theme.gradient_color)?;
    for edge in Edge::ALL {
        gradient::apply(backend, gradient_color, edge)?;
    }

    draw_text_block(backend, center, city, country, theme)?;

    info!(city, theme = %theme.name, "poster composed");
    Ok(())
}

fn fill_layer(
    backend: &mut dyn RenderBackend,
    viewport: &Viewport,
    projection: &LocalProjection,
    layer: &FeatureLayer,
    color: Rgba,
) {
    for ring in &layer.polygons {
        let px: Vec<Point> = ring
            .iter()
            .map(|p| viewport.to_px(projection.project(*p)))
            .collect();
        backend.fill_polygon(&px, color);
    }
}

/// City name, divider, country, coordinates, and the attribution corner.
/// Layout fractions measure from the bottom edge; pixel rows from the top.
fn draw_text_block(
    backend: &mut dyn RenderBackend,
    center: GeoPoint,
    city: &str,
    country: &str,
    theme: &Theme,
) -> PosterResult<()> {
    let canvas = *backend.canvas();
    let plan = TextLayoutPlan::for_canvas(&canvas);
    let (w, h) = (f64::from(canvas.width_px()), f64::from(canvas.height_px()));
    let baseline = |frac_from_bottom: f64| (1.0 - frac_from_bottom) * h;

    let text_color = Rgba::from_hex(&theme.text)?;
    let city_label = spaced_label(city);

    backend.draw_text(
        &city_label,
        w / 2.0,
        baseline(plan.city_y),
        FontRole::Bold,
        plan.city_size_pt(&city_label),
        text_color,
        HAlign::Center,
    )?;

    let line_y = baseline(plan.line_y);
    backend.stroke_polyline(
        &[
            Point::new(plan.line_x_start * w, line_y),
            Point::new(plan.line_x_end * w, line_y),
        ],
        text_color,
        plan.divider_stroke_pt,
    );

    backend.draw_text(
        &country.to_uppercase(),
        w / 2.0,
        baseline(plan.country_y),
        FontRole::Light,
        plan.country_size_pt(),
        text_color,
        HAlign::Center,
    )?;

    backend.draw_text(
        &coordinate_label(center.lat, center.lon),
        w / 2.0,
        baseline(plan.coords_y),
        FontRole::Regular,
        plan.coords_size_pt(),
        text_color.with_alpha_scaled(COORDS_ALPHA),
        HAlign::Center,
    )?;

    backend.draw_text(
        ATTRIBUTION_TEXT,
        ATTRIBUTION_X_FRAC * w,
        baseline(ATTRIBUTION_Y_FRAC),
        FontRole::Light,
        plan.attribution_size_pt(),
        text_color.with_alpha_scaled(ATTRIBUTION_ALPHA),
        HAlign::Right,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodata::model::{RoadSegment, StreetGraph, TagValue};
    use crate::render::backend::{Canvas, OutputFormat};
    use std::path::Path;

    /// Records draw calls instead of rasterizing.
    #[derive(Default)]
    struct Recorder {
        cleared: Option<Rgba>,
        polygons: Vec<Rgba>,
        polylines: Vec<(Rgba, f64)>,
        texts: Vec<(String, FontRole, HAlign, Rgba)>,
        composites: usize,
    }

    struct RecordingBackend {
        canvas: Canvas,
        rec: Recorder,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                canvas: Canvas {
                    width_in: 12.0,
                    height_in: 16.0,
                    dpi: 30,
                    format: OutputFormat::Png,
                },
                rec: Recorder::default(),
            }
        }
    }

    impl RenderBackend for RecordingBackend {
        fn canvas(&self) -> &Canvas {
            &self.canvas
        }
        fn clear(&mut self, color: Rgba) {
            self.rec.cleared = Some(color);
        }
        fn fill_polygon(&mut self, _ring: &[Point], color: Rgba) {
            self.rec.polygons.push(color);
        }
        fn stroke_polyline(&mut self, _points: &[Point], color: Rgba, width_pt: f64) {
            self.rec.polylines.push((color, width_pt));
        }
        fn draw_text(
            &mut self,
            text: &str,
            _x: f64,
            _y: f64,
            role: FontRole,
            _size: f64,
            color: Rgba,
            align: HAlign,
        ) -> PosterResult<()> {
            self.rec.texts.push((text.to_string(), role, align, color));
            Ok(())
        }
        fn composite_rgba(
            &mut self,
            _x: u32,
            _y: u32,
            _w: u32,
            _h: u32,
            _rgba: &[u8],
        ) -> PosterResult<()> {
            self.rec.composites += 1;
            Ok(())
        }
        fn save(&mut self, _path: &Path) -> PosterResult<()> {
            Ok(())
        }
    }

    fn center() -> GeoPoint {
        GeoPoint { lat: 48.8566, lon: 2.3522 }
    }

    fn graph() -> StreetGraph {
        let seg = |tag: &str, pts: &[(f64, f64)]| RoadSegment {
            points: pts
                .iter()
                .map(|&(lat, lon)| GeoPoint { lat, lon })
                .collect(),
            highway: Some(TagValue::One(tag.to_string())),
        };
        StreetGraph {
            segments: vec![
                seg("motorway", &[(48.85, 2.34), (48.86, 2.36)]),
                seg("residential", &[(48.855, 2.35), (48.858, 2.355)]),
            ],
        }
    }

    #[test]
    fn missing_graph_aborts_composition() {
        let mut backend = RecordingBackend::new();
        let data = MapData::default();
        let err = compose_poster(
            &mut backend,
            &data,
            center(),
            "Paris",
            "France",
            &Theme::builtin_default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("street network"));
        assert!(backend.rec.cleared.is_none());
    }

    #[test]
    fn full_composition_layers_in_order() {
        let mut backend = RecordingBackend::new();
        let data = MapData {
            graph: Some(graph()),
            water: Some(FeatureLayer {
                polygons: vec![vec![
                    GeoPoint { lat: 48.85, lon: 2.34 },
                    GeoPoint { lat: 48.86, lon: 2.34 },
                    GeoPoint { lat: 48.86, lon: 2.36 },
                ]],
            }),
            parks: None,
        };
        let theme = Theme::builtin_default();
        compose_poster(&mut backend, &data, center(), "Paris", "France", &theme).unwrap();

        assert_eq!(backend.rec.cleared, Some(Rgba::from_hex("#FFFFFF").unwrap()));
        assert_eq!(backend.rec.polygons, vec![Rgba::from_hex("#C0C0C0").unwrap()]);
        // Two road segments plus the divider line.
        assert_eq!(backend.rec.polylines.len(), 3);
        assert_eq!(backend.rec.polylines[0].1, 1.2);
        // Four vignette bands composited.
        assert_eq!(backend.rec.composites, 4);
        // City, country, coordinates, attribution.
        let texts: Vec<&str> = backend
            .rec
            .texts
            .iter()
            .map(|(t, _, _, _)| t.as_str())
            .collect();
        assert_eq!(
            texts,
            vec![
                "P  A  R  I  S",
                "FRANCE",
                "48.8566° N / 2.3522° E",
                ATTRIBUTION_TEXT,
            ]
        );
    }

    #[test]
    fn text_block_font_roles() {
        let mut backend = RecordingBackend::new();
        let data = MapData {
            graph: Some(graph()),
            water: None,
            parks: None,
        };
        let theme = Theme::builtin_default();
        compose_poster(&mut backend, &data, center(), "Paris", "France", &theme).unwrap();

        let roles: Vec<FontRole> = backend.rec.texts.iter().map(|(_, r, _, _)| *r).collect();
        // Bold city, light country, regular coordinates, light attribution.
        assert_eq!(
            roles,
            vec![
                FontRole::Bold,
                FontRole::Light,
                FontRole::Regular,
                FontRole::Light,
            ]
        );
    }

    #[test]
    fn attribution_is_right_aligned_and_faded() {
        let mut backend = RecordingBackend::new();
        let data = MapData {
            graph: Some(graph()),
            water: None,
            parks: None,
        };
        let theme = Theme::builtin_default();
        compose_poster(&mut backend, &data, center(), "Oslo", "Norway", &theme).unwrap();

        let (_, _, align, color) = backend
            .rec
            .texts
            .iter()
            .find(|(t, _, _, _)| t == ATTRIBUTION_TEXT)
            .unwrap();
        assert_eq!(*align, HAlign::Right);
        assert_eq!(color.a, 128); // round(255 * 0.5)
    }
}

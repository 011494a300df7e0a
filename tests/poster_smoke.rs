use std::path::PathBuf;

use cartopress::foundation::geo::GeoPoint;
use cartopress::geodata::{FeatureLayer, MapData, RoadSegment, StreetGraph, TagValue};
use cartopress::poster::batch::{CpuPosterRenderer, PosterRenderer};
use cartopress::render::backend::{Canvas, OutputFormat};
use cartopress::style::theme::Theme;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "cartopress_smoke_test_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample_data() -> MapData {
    let seg = |tag: &str, pts: &[(f64, f64)]| RoadSegment {
        points: pts
            .iter()
            .map(|&(lat, lon)| GeoPoint { lat, lon })
            .collect(),
        highway: Some(TagValue::One(tag.to_string())),
    };

    MapData {
        graph: Some(StreetGraph {
            segments: vec![
                seg("motorway", &[(48.83, 2.30), (48.88, 2.40)]),
                seg("secondary", &[(48.84, 2.36), (48.87, 2.31)]),
                seg("residential", &[(48.85, 2.33), (48.86, 2.37), (48.85, 2.39)]),
            ],
        }),
        water: Some(FeatureLayer {
            polygons: vec![vec![
                GeoPoint { lat: 48.84, lon: 2.32 },
                GeoPoint { lat: 48.85, lon: 2.32 },
                GeoPoint { lat: 48.85, lon: 2.34 },
                GeoPoint { lat: 48.84, lon: 2.34 },
            ]],
        }),
        parks: None,
    }
}

/// End-to-end raster pass at thumbnail size: compose, rasterize, encode.
#[test]
fn renders_a_png_poster_to_disk() {
    let renderer = CpuPosterRenderer {
        canvas: Canvas {
            width_in: 12.0,
            height_in: 16.0,
            dpi: 10, // 120x160 px keeps the test fast
            format: OutputFormat::Png,
        },
        fonts: None,
    };

    let out = temp_dir("png").join("paris_noir.png");
    renderer
        .render(
            &sample_data(),
            GeoPoint { lat: 48.8566, lon: 2.3522 },
            "Paris",
            "France",
            &Theme::builtin_default(),
            &out,
        )
        .unwrap();

    let bytes = std::fs::read(&out).unwrap();
    // PNG magic.
    assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);

    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!(img.width(), 120);
    assert_eq!(img.height(), 160);
}

#[test]
fn vector_formats_are_rejected_by_the_raster_backend() {
    let renderer = CpuPosterRenderer {
        canvas: Canvas {
            width_in: 12.0,
            height_in: 16.0,
            dpi: 10,
            format: OutputFormat::Svg,
        },
        fonts: None,
    };

    let out = temp_dir("svg").join("paris.svg");
    let err = renderer
        .render(
            &sample_data(),
            GeoPoint { lat: 48.8566, lon: 2.3522 },
            "Paris",
            "France",
            &Theme::builtin_default(),
            &out,
        )
        .unwrap_err();
    assert!(err.to_string().contains("vector"));
}

#[test]
fn missing_graph_fails_before_any_file_is_written() {
    let renderer = CpuPosterRenderer {
        canvas: Canvas {
            width_in: 12.0,
            height_in: 16.0,
            dpi: 10,
            format: OutputFormat::Png,
        },
        fonts: None,
    };

    let out = temp_dir("nograph").join("empty.png");
    let data = MapData::default();
    assert!(
        renderer
            .render(
                &data,
                GeoPoint { lat: 0.0, lon: 0.0 },
                "Nowhere",
                "Atlantis",
                &Theme::builtin_default(),
                &out,
            )
            .is_err()
    );
    assert!(!out.exists());
}

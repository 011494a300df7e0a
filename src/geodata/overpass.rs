use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::foundation::geo::{BBox, GeoPoint};
use crate::geodata::http::HttpClient;
use crate::geodata::model::{FeatureLayer, RoadSegment, StreetGraph, TagValue};
use crate::geodata::provider::{FeatureProvider, ProviderError, StreetGraphProvider, TagQuery};

pub const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Street-graph and feature-layer provider backed by the Overpass API.
pub struct OverpassProvider<C: HttpClient> {
    http: C,
    endpoint: String,
}

impl<C: HttpClient> OverpassProvider<C> {
    pub fn new(http: C) -> Self {
        Self::with_endpoint(http, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(http: C, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    fn run_query(&self, query: &str) -> Result<OverpassResponse, ProviderError> {
        let body = self.http.post_form(&self.endpoint, &[("data", query)])?;
        serde_json::from_slice(&body)
            .map_err(|e| ProviderError::malformed(format!("overpass response: {e}")))
    }
}

/// Overpass bbox clause: `(south,west,north,east)`.
fn bbox_clause(bbox: &BBox) -> String {
    format!("({},{},{},{})", bbox.south, bbox.west, bbox.north, bbox.east)
}

fn graph_query(bbox: &BBox) -> String {
    format!(
        "[out:json][timeout:90];way[\"highway\"]{};out geom;",
        bbox_clause(bbox)
    )
}

fn features_query(bbox: &BBox, tags: &TagQuery) -> String {
    let clause = bbox_clause(bbox);
    let mut q = String::from("[out:json][timeout:90];(");
    for (key, value) in tags.pairs() {
        q.push_str(&format!("way[\"{key}\"=\"{value}\"]{clause};"));
    }
    q.push_str(");out geom;");
    q
}

impl<C: HttpClient> StreetGraphProvider for OverpassProvider<C> {
    fn street_graph(&self, bbox: &BBox) -> Result<StreetGraph, ProviderError> {
        let response = self.run_query(&graph_query(bbox))?;
        let graph = decode_graph(response);
        debug!(segments = graph.segments.len(), "decoded street graph");
        Ok(graph)
    }
}

impl<C: HttpClient> FeatureProvider for OverpassProvider<C> {
    fn features(&self, bbox: &BBox, tags: &TagQuery) -> Result<FeatureLayer, ProviderError> {
        let response = self.run_query(&features_query(bbox, tags))?;
        let layer = decode_features(response);
        debug!(polygons = layer.polygons.len(), "decoded feature layer");
        Ok(layer)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    geometry: Vec<RawPoint>,
    #[serde(default)]
    tags: HashMap<String, TagValue>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

fn element_points(element: &Element) -> Vec<GeoPoint> {
    element
        .geometry
        .iter()
        .map(|p| GeoPoint { lat: p.lat, lon: p.lon })
        .collect()
}

fn decode_graph(response: OverpassResponse) -> StreetGraph {
    let mut segments = Vec::new();
    for mut element in response.elements {
        if element.kind != "way" || element.geometry.len() < 2 {
            continue;
        }
        let points = element_points(&element);
        segments.push(RoadSegment {
            points,
            highway: element.tags.remove("highway"),
        });
    }
    StreetGraph { segments }
}

fn decode_features(response: OverpassResponse) -> FeatureLayer {
    let mut polygons = Vec::new();
    for element in &response.elements {
        // Only closed ways become polygons; open fragments are skipped.
        if element.kind != "way" || element.geometry.len() < 4 {
            continue;
        }
        let first = &element.geometry[0];
        let last = &element.geometry[element.geometry.len() - 1];
        if first.lat != last.lat || first.lon != last.lon {
            continue;
        }
        let mut ring = element_points(element);
        ring.pop(); // drop repeated closing point
        polygons.push(ring);
    }
    FeatureLayer { polygons }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BBox {
        BBox {
            west: 2.2,
            south: 48.8,
            east: 2.5,
            north: 48.9,
        }
    }

    #[test]
    fn graph_query_orders_bbox_south_west_north_east() {
        let q = graph_query(&bbox());
        assert!(q.contains("(48.8,2.2,48.9,2.5)"));
        assert!(q.contains("way[\"highway\"]"));
        assert!(q.ends_with("out geom;"));
    }

    #[test]
    fn features_query_unions_all_tag_pairs() {
        let q = features_query(&bbox(), &TagQuery::water());
        assert!(q.contains("way[\"natural\"=\"water\"]"));
        assert!(q.contains("way[\"waterway\"=\"riverbank\"]"));
    }

    #[test]
    fn decode_graph_keeps_ways_with_geometry() {
        let raw = serde_json::json!({
            "elements": [
                {
                    "type": "way",
                    "geometry": [
                        {"lat": 48.85, "lon": 2.35},
                        {"lat": 48.86, "lon": 2.36}
                    ],
                    "tags": {"highway": "residential", "name": "Rue X"}
                },
                {"type": "node", "lat": 48.85, "lon": 2.35},
                {"type": "way", "geometry": [{"lat": 1.0, "lon": 1.0}]}
            ]
        });
        let response: OverpassResponse = serde_json::from_value(raw).unwrap();
        let graph = decode_graph(response);
        assert_eq!(graph.segments.len(), 1);
        assert_eq!(
            graph.segments[0].highway,
            Some(TagValue::One("residential".into()))
        );
        assert_eq!(graph.segments[0].points.len(), 2);
    }

    #[test]
    fn decode_features_keeps_only_closed_rings() {
        let raw = serde_json::json!({
            "elements": [
                {
                    "type": "way",
                    "geometry": [
                        {"lat": 0.0, "lon": 0.0},
                        {"lat": 0.0, "lon": 1.0},
                        {"lat": 1.0, "lon": 1.0},
                        {"lat": 0.0, "lon": 0.0}
                    ]
                },
                {
                    "type": "way",
                    "geometry": [
                        {"lat": 0.0, "lon": 0.0},
                        {"lat": 0.0, "lon": 1.0},
                        {"lat": 1.0, "lon": 1.0},
                        {"lat": 2.0, "lon": 2.0}
                    ]
                }
            ]
        });
        let response: OverpassResponse = serde_json::from_value(raw).unwrap();
        let layer = decode_features(response);
        assert_eq!(layer.polygons.len(), 1);
        // Closing point dropped.
        assert_eq!(layer.polygons[0].len(), 3);
    }
}

use serde::{Deserialize, Serialize};

use crate::foundation::geo::GeoPoint;

/// OSM tag value as it arrives from upstream: a single string or a sequence.
///
/// Classification normalizes this at the boundary; nothing downstream
/// branches on the shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    One(String),
    Many(Vec<String>),
}

impl TagValue {
    /// Canonical single value: the first element when the tag is a sequence.
    /// An empty sequence carries no value.
    pub fn first(&self) -> Option<&str> {
        match self {
            TagValue::One(s) => Some(s),
            TagValue::Many(v) => v.first().map(String::as_str),
        }
    }
}

/// One drawable street segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// Ordered polyline endpoints.
    pub points: Vec<GeoPoint>,
    /// Raw `highway` tag; `None` means the way carried no highway tag.
    pub highway: Option<TagValue>,
}

/// Street network for a bounding box.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetGraph {
    pub segments: Vec<RoadSegment>,
}

impl StreetGraph {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A set of polygon geometries (water or park regions). May be empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayer {
    /// Closed rings; first point is not repeated at the end.
    pub polygons: Vec<Vec<GeoPoint>>,
}

impl FeatureLayer {
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Everything one poster render needs from upstream.
///
/// Water and parks are optional by contract: their absence must not abort
/// rendering. The graph is optional here too; compose rejects an absent
/// graph since a poster without streets is meaningless.
#[derive(Clone, Debug, Default)]
pub struct MapData {
    pub graph: Option<StreetGraph>,
    pub water: Option<FeatureLayer>,
    pub parks: Option<FeatureLayer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_value_first_prefers_head_of_sequence() {
        let many = TagValue::Many(vec!["motorway".into(), "trunk".into()]);
        assert_eq!(many.first(), Some("motorway"));
        assert_eq!(TagValue::One("primary".into()).first(), Some("primary"));
        assert_eq!(TagValue::Many(vec![]).first(), None);
    }

    #[test]
    fn tag_value_deserializes_both_shapes() {
        let one: TagValue = serde_json::from_str("\"residential\"").unwrap();
        assert_eq!(one, TagValue::One("residential".into()));
        let many: TagValue = serde_json::from_str("[\"motorway\",\"trunk\"]").unwrap();
        assert_eq!(many.first(), Some("motorway"));
    }
}

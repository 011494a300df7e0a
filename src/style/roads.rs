use crate::foundation::error::PosterResult;
use crate::geodata::model::RoadSegment;
use crate::style::color::Rgba;
use crate::style::theme::Theme;

/// Canonical highway tag after boundary normalization: either one concrete
/// value or explicitly no tag at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CanonicalTag<'a> {
    Value(&'a str),
    NoTag,
}

/// Color tier a segment falls into; one theme slot per tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoadClass {
    Motorway,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Default,
}

fn canonical_tag(segment: &RoadSegment) -> CanonicalTag<'_> {
    match segment.highway.as_ref().and_then(|tag| tag.first()) {
        Some(value) => CanonicalTag::Value(value),
        None => CanonicalTag::NoTag,
    }
}

fn class_for(tag: CanonicalTag<'_>) -> RoadClass {
    let value = match tag {
        CanonicalTag::Value(v) => v,
        // A missing tag is an explicit "unclassified" for coloring.
        CanonicalTag::NoTag => "unclassified",
    };

    match value {
        "motorway" | "motorway_link" => RoadClass::Motorway,
        "trunk" | "trunk_link" | "primary" | "primary_link" => RoadClass::Primary,
        "secondary" | "secondary_link" => RoadClass::Secondary,
        "tertiary" | "tertiary_link" => RoadClass::Tertiary,
        "residential" | "living_street" | "unclassified" => RoadClass::Residential,
        _ => RoadClass::Default,
    }
}

fn width_for(tag: CanonicalTag<'_>) -> f32 {
    let value = match tag {
        CanonicalTag::Value(v) => v,
        CanonicalTag::NoTag => "unclassified",
    };

    // Five buckets, not six: residential shares the catch-all width even
    // though it owns a color slot.
    match value {
        "motorway" | "motorway_link" => 1.2,
        "trunk" | "trunk_link" | "primary" | "primary_link" => 1.0,
        "secondary" | "secondary_link" => 0.8,
        "tertiary" | "tertiary_link" => 0.6,
        _ => 0.4,
    }
}

fn color_slot<'t>(theme: &'t Theme, class: RoadClass) -> &'t str {
    match class {
        RoadClass::Motorway => &theme.road_motorway,
        RoadClass::Primary => &theme.road_primary,
        RoadClass::Secondary => &theme.road_secondary,
        RoadClass::Tertiary => &theme.road_tertiary,
        RoadClass::Residential => &theme.road_residential,
        RoadClass::Default => &theme.road_default,
    }
}

/// One color and one stroke width (points) per segment, same order as input.
pub fn classify(segments: &[RoadSegment], theme: &Theme) -> PosterResult<(Vec<Rgba>, Vec<f32>)> {
    let mut colors = Vec::with_capacity(segments.len());
    let mut widths = Vec::with_capacity(segments.len());

    for segment in segments {
        let tag = canonical_tag(segment);
        colors.push(Rgba::from_hex(color_slot(theme, class_for(tag)))?);
        widths.push(width_for(tag));
    }

    Ok((colors, widths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodata::model::TagValue;

    fn segment(highway: Option<TagValue>) -> RoadSegment {
        RoadSegment {
            points: Vec::new(),
            highway,
        }
    }

    fn one(tag: &str) -> RoadSegment {
        segment(Some(TagValue::One(tag.to_string())))
    }

    fn classify_one(seg: RoadSegment) -> (Rgba, f32) {
        let theme = Theme::builtin_default();
        let (colors, widths) = classify(&[seg], &theme).unwrap();
        (colors[0], widths[0])
    }

    #[test]
    fn first_element_of_sequence_wins() {
        let seg = segment(Some(TagValue::Many(vec![
            "motorway".into(),
            "trunk".into(),
        ])));
        let (color, width) = classify_one(seg);
        assert_eq!(color, Rgba::from_hex("#0A0A0A").unwrap()); // road_motorway
        assert_eq!(width, 1.2);
    }

    #[test]
    fn missing_tag_is_residential_color_but_default_width() {
        for seg in [segment(None), segment(Some(TagValue::Many(vec![])))] {
            let (color, width) = classify_one(seg);
            assert_eq!(color, Rgba::from_hex("#4A4A4A").unwrap()); // road_residential
            assert_eq!(width, 0.4); // width asymmetry preserved
        }
    }

    #[test]
    fn residential_color_bucket_has_no_width_bucket() {
        for tag in ["residential", "living_street", "unclassified"] {
            let (color, width) = classify_one(one(tag));
            assert_eq!(color, Rgba::from_hex("#4A4A4A").unwrap());
            assert_eq!(width, 0.4);
        }
    }

    #[test]
    fn color_table_membership() {
        let theme = Theme::builtin_default();
        let cases = [
            ("motorway_link", &theme.road_motorway, 1.2),
            ("trunk", &theme.road_primary, 1.0),
            ("primary_link", &theme.road_primary, 1.0),
            ("secondary", &theme.road_secondary, 0.8),
            ("tertiary_link", &theme.road_tertiary, 0.6),
            ("footway", &theme.road_default, 0.4),
            ("cycleway", &theme.road_default, 0.4),
        ];
        for (tag, slot, expected_width) in cases {
            let (color, width) = classify_one(one(tag));
            assert_eq!(color, Rgba::from_hex(slot).unwrap(), "tag {tag}");
            assert_eq!(width, expected_width, "tag {tag}");
        }
    }

    #[test]
    fn output_order_matches_input_order() {
        let theme = Theme::builtin_default();
        let segs = vec![one("motorway"), one("footway"), one("secondary")];
        let (colors, widths) = classify(&segs, &theme).unwrap();
        assert_eq!(colors.len(), 3);
        assert_eq!(widths, vec![1.2, 0.4, 0.8]);
    }
}

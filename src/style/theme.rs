use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::foundation::error::{PosterError, PosterResult};

/// A named palette controlling background, text, water/park, and per-road-tier
/// colors. Immutable once loaded. All color slots hold hex strings as they
/// appear in the JSON schema; parsing to [`crate::style::color::Rgba`]
/// happens at render time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub bg: String,
    pub text: String,
    pub gradient_color: String,
    pub water: String,
    pub parks: String,
    pub road_motorway: String,
    pub road_primary: String,
    pub road_secondary: String,
    pub road_tertiary: String,
    pub road_residential: String,
    pub road_default: String,
}

impl Theme {
    /// The built-in fallback: feature-based greyscale shading on white.
    pub fn builtin_default() -> Self {
        Self {
            name: "Feature-Based Shading".to_string(),
            description: None,
            bg: "#FFFFFF".to_string(),
            text: "#000000".to_string(),
            gradient_color: "#FFFFFF".to_string(),
            water: "#C0C0C0".to_string(),
            parks: "#F0F0F0".to_string(),
            road_motorway: "#0A0A0A".to_string(),
            road_primary: "#1A1A1A".to_string(),
            road_secondary: "#2A2A2A".to_string(),
            road_tertiary: "#3A3A3A".to_string(),
            road_residential: "#4A4A4A".to_string(),
            road_default: "#3A3A3A".to_string(),
        }
    }
}

/// Load `{theme_name}.json` from `themes_dir`.
///
/// A missing file or a file that fails the schema falls back to the built-in
/// default theme rather than aborting: a poster with the default palette
/// beats no poster.
pub fn load_theme(themes_dir: &Path, theme_name: &str) -> Theme {
    let path = themes_dir.join(format!("{theme_name}.json"));
    match read_theme(&path) {
        Ok(theme) => {
            info!(theme = %theme.name, "loaded theme");
            theme
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "falling back to built-in default theme");
            Theme::builtin_default()
        }
    }
}

fn read_theme(path: &Path) -> PosterResult<Theme> {
    let bytes = std::fs::read(path)
        .map_err(|e| PosterError::theme(format!("read '{}': {e}", path.display())))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PosterError::theme(format!("parse '{}': {e}", path.display())))
}

/// Sorted stems of the `.json` files in `themes_dir`. An absent directory
/// yields the empty list.
pub fn available_themes(themes_dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(themes_dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                return None;
            }
            path.file_stem()?.to_str().map(str::to_owned)
        })
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_default_palette_is_stable() {
        let theme = Theme::builtin_default();
        assert_eq!(theme.bg, "#FFFFFF");
        assert_eq!(theme.text, "#000000");
        assert_eq!(theme.road_motorway, "#0A0A0A");
        assert_eq!(theme.road_default, theme.road_tertiary);
    }

    #[test]
    fn missing_theme_falls_back_to_default() {
        let theme = load_theme(Path::new("does/not/exist"), "nope");
        assert_eq!(theme, Theme::builtin_default());
    }

    #[test]
    fn theme_requires_all_color_slots() {
        let incomplete = r##"{"name": "x", "bg": "#000000"}"##;
        assert!(serde_json::from_str::<Theme>(incomplete).is_err());
    }

    #[test]
    fn description_is_optional() {
        let mut theme = Theme::builtin_default();
        theme.description = Some("moody".to_string());
        let json = serde_json::to_string(&theme).unwrap();
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back.description.as_deref(), Some("moody"));
    }
}

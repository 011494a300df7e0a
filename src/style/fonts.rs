use std::path::Path;

use tracing::warn;

/// Which typeface a text element asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontRole {
    Bold,
    Regular,
    Light,
}

/// Three typeface blobs loaded from the fonts directory.
///
/// Absence of any file means "no fonts available" and the backend
/// substitutes a generic fallback family instead.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub bold: Vec<u8>,
    pub regular: Vec<u8>,
    pub light: Vec<u8>,
}

impl FontSet {
    /// Load the Roboto weights from `fonts_dir`; `None` when any is missing.
    pub fn load(fonts_dir: &Path) -> Option<Self> {
        let read = |file: &str| -> Option<Vec<u8>> {
            let path = fonts_dir.join(file);
            match std::fs::read(&path) {
                Ok(bytes) => Some(bytes),
                Err(_) => {
                    warn!(path = %path.display(), "font not found; using generic fallback");
                    None
                }
            }
        };

        Some(Self {
            bold: read("Roboto-Bold.ttf")?,
            regular: read("Roboto-Regular.ttf")?,
            light: read("Roboto-Light.ttf")?,
        })
    }

    pub fn bytes_for(&self, role: FontRole) -> &[u8] {
        match role {
            FontRole::Bold => &self.bold,
            FontRole::Regular => &self.regular,
            FontRole::Light => &self.light,
        }
    }
}

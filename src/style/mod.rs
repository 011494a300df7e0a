pub mod color;
pub mod fonts;
pub mod roads;
pub mod theme;

pub use color::Rgba;
pub use fonts::{FontRole, FontSet};
pub use theme::Theme;

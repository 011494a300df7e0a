pub mod extent;
pub mod typography;

pub use extent::{Extent, Viewport};
pub use typography::{TextLayoutPlan, coordinate_label, scaled_font_size, spaced_label};

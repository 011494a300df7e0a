use kurbo::Point;

/// Plotted-data extent in projected meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    /// Smallest extent covering `points`; `None` when empty.
    pub fn covering<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut extent = Self {
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        for p in iter {
            extent.x_min = extent.x_min.min(p.x);
            extent.x_max = extent.x_max.max(p.x);
            extent.y_min = extent.y_min.min(p.y);
            extent.y_max = extent.y_max.max(p.y);
        }
        Some(extent)
    }

    pub fn x_range(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_range(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Expand about the center, never shrinking and never shifting, until
    /// `x_range / y_range` equals `target_aspect` (canvas width/height).
    ///
    /// Growing only means the displayed scale stays equal in both axes; no
    /// anisotropic stretching ever happens.
    pub fn reconcile(self, target_aspect: f64) -> Self {
        let center = self.center();
        let current_aspect = self.x_range() / self.y_range();

        if current_aspect > target_aspect {
            // Data wider than canvas: grow vertically.
            let new_y_range = self.x_range() / target_aspect;
            Self {
                y_min: center.y - new_y_range / 2.0,
                y_max: center.y + new_y_range / 2.0,
                ..self
            }
        } else {
            // Data taller than canvas: grow horizontally.
            let new_x_range = self.y_range() * target_aspect;
            Self {
                x_min: center.x - new_x_range / 2.0,
                x_max: center.x + new_x_range / 2.0,
                ..self
            }
        }
    }
}

/// Maps a reconciled extent onto pixel coordinates (origin top-left,
/// y grows downward).
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    extent: Extent,
    width_px: f64,
    height_px: f64,
}

impl Viewport {
    pub fn new(extent: Extent, width_px: u32, height_px: u32) -> Self {
        Self {
            extent,
            width_px: f64::from(width_px),
            height_px: f64::from(height_px),
        }
    }

    pub fn to_px(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.extent.x_min) / self.extent.x_range() * self.width_px,
            (self.extent.y_max - p.y) / self.extent.y_range() * self.height_px,
        )
    }
}

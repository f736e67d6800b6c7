//! Regions of interest for statistical aggregation

use geo::{BoundingRect, Contains, Point, Polygon};

use crate::raster::{BBox, GeoTransform};

/// Geometry restricting which pixels take part in a reduction.
///
/// A pixel belongs to the region when its center lies inside the geometry
/// (bbox edges inclusive, polygon boundary exclusive).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Region {
    /// Every pixel of the raster footprint
    #[default]
    Full,
    /// Axis-aligned box in map coordinates
    BBox(BBox),
    /// Arbitrary polygon in map coordinates
    Polygon(Polygon<f64>),
}

impl Region {
    /// Whether the map position lies inside the region.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            Region::Full => true,
            Region::BBox(b) => b.contains_point(x, y),
            Region::Polygon(p) => p.contains(&Point::new(x, y)),
        }
    }

    /// Axis-aligned bounds of the region, if it is bounded.
    pub fn bounds(&self) -> Option<BBox> {
        match self {
            Region::Full => None,
            Region::BBox(b) => Some(*b),
            Region::Polygon(p) => p
                .bounding_rect()
                .map(|r| BBox::new(r.min().x, r.min().y, r.max().x, r.max().y)),
        }
    }

    /// Pixel window `(row_start, row_end, col_start, col_end)` (end exclusive)
    /// of a `rows` x `cols` grid that can contain region pixels.
    ///
    /// Lets reducers skip rows and columns that cannot match.
    pub fn pixel_window(
        &self,
        transform: &GeoTransform,
        rows: usize,
        cols: usize,
    ) -> (usize, usize, usize, usize) {
        let full = (0, rows, 0, cols);
        let Some(b) = self.bounds() else {
            return full;
        };
        if !transform.is_north_up() {
            return full;
        }

        let (c0, r0) = transform.geo_to_pixel(b.min_x, b.max_y);
        let (c1, r1) = transform.geo_to_pixel(b.max_x, b.min_y);
        if !(c0.is_finite() && c1.is_finite() && r0.is_finite() && r1.is_finite()) {
            return full;
        }

        let clamp = |v: f64, max: usize| v.max(0.0).min(max as f64) as usize;
        let row_start = clamp(r0.min(r1).floor(), rows);
        let row_end = clamp(r0.max(r1).ceil(), rows);
        let col_start = clamp(c0.min(c1).floor(), cols);
        let col_end = clamp(c0.max(c1).ceil(), cols);
        (row_start, row_end, col_start, col_end)
    }
}

impl From<BBox> for Region {
    fn from(b: BBox) -> Self {
        Region::BBox(b)
    }
}

impl From<Polygon<f64>> for Region {
    fn from(p: Polygon<f64>) -> Self {
        Region::Polygon(p)
    }
}

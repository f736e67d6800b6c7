//! Raster data structures

mod bbox;
mod element;
mod geotransform;
mod grid;

pub use bbox::BBox;
pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};

/// Continuous single-band index values; NaN marks undefined pixels.
pub type IndexRaster = Raster<f64>;

/// Binary mask: 1 where a condition holds, 0 elsewhere.
pub type Mask = Raster<u8>;

/// Class-label mask produced by multi-class classification.
pub type LabelRaster = Raster<i32>;

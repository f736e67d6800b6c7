//! # geospec colormap
//!
//! Display hints for geospec rasters: color ramps, per-index value ranges,
//! band composites and class legends. An external renderer consumes these;
//! this crate does not draw anything.
//!
//! ## Usage
//!
//! ```
//! use geospec_algorithms::imagery::SpectralIndex;
//! use geospec_colormap::VisParams;
//!
//! let vis = VisParams::for_index(SpectralIndex::Ndvi);
//! assert!(vis.color(f64::NAN).is_none());
//! assert!(vis.color(0.5).is_some());
//! ```

mod scheme;
mod vis;

pub use scheme::{class_color, evaluate, ColorScheme, ColorStop, Rgb, CLASS_PALETTE};
pub use vis::{class_legend, CompositeVis, LegendEntry, VisParams};

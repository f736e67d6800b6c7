//! Statistical reductions of masks and label rasters
//!
//! - **region**: pixel counts, percentages and area within a region of interest

pub mod region;

pub use region::{class_summary, label_summary, region_summary, ClassSummary, RegionSummary};

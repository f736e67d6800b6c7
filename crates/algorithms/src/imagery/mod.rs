//! Imagery analysis
//!
//! - Spectral indices: NDVI, NDWI, clay minerals ratio, iron oxide ratio
//! - Thresholding: index raster to binary mask
//! - Classification: ordered range rules to class labels

mod classify;
mod indices;
mod threshold;

pub use classify::{classify, ClassRule, Classifier, RuleSet, UNCLASSIFIED};
pub use indices::{
    band_ratio, clay_minerals_ratio, iron_oxide_ratio, ndvi, ndwi, normalized_difference,
    IndexCalculator, SpectralIndex,
};
pub use threshold::{threshold, Comparison, Threshold, ThresholdParams};

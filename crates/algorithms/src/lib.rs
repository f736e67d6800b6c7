//! # geospec algorithms
//!
//! Spectral analysis on locally held scenes.
//!
//! ## Modules
//!
//! - **imagery**: spectral indices, thresholding, range-rule classification
//! - **statistics**: pixel counts, percentages and area within a region
//! - **composite**: same-date grouping and last-valid-wins mosaicking
//! - **pipeline**: per-date processing of a scene query, configured from TOML

pub mod composite;
pub mod imagery;
pub mod pipeline;
pub mod statistics;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::composite::{group_by_date, mosaic, Mosaic, TileGroup};
    pub use crate::imagery::{
        classify, ndvi, ndwi, threshold, ClassRule, Classifier, Comparison, IndexCalculator,
        RuleSet, SpectralIndex, Threshold, ThresholdParams,
    };
    pub use crate::pipeline::{Pipeline, PipelineConfig, RegionConfig, StepOutcome, TileOrder};
    pub use crate::statistics::{class_summary, region_summary, ClassSummary, RegionSummary};
    pub use geospec_core::prelude::*;
    pub use geospec_parallel::ProcessingMode;
}

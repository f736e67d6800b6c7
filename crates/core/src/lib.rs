//! # geospec core
//!
//! Core types shared by the geospec spectral analysis crates.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced single-band grid (bands, indices, masks, labels)
//! - `Scene`: multi-band acquisition with timestamp and cloud-cover metadata
//! - `Band` / `Sensor`: band identifiers and sensor asset tables
//! - `Region`: regions of interest for statistics
//! - `RasterSource`: the adapter contract for scene providers
//! - `Algorithm`: uniform trait for pipeline stages

pub mod band;
pub mod error;
pub mod raster;
pub mod region;
pub mod scene;
pub mod source;

pub use band::{Band, Sensor};
pub use error::{Error, Result};
pub use raster::{BBox, GeoTransform, IndexRaster, LabelRaster, Mask, Raster, RasterElement};
pub use region::Region;
pub use scene::Scene;
pub use source::{DateRange, MemorySource, RasterSource, SceneQuery};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::band::{Band, Sensor};
    pub use crate::error::{Error, Result};
    pub use crate::raster::{BBox, GeoTransform, IndexRaster, LabelRaster, Mask, Raster, RasterElement};
    pub use crate::region::Region;
    pub use crate::scene::Scene;
    pub use crate::source::{DateRange, RasterSource, SceneQuery};
    pub use crate::Algorithm;
}

/// Core trait for pipeline stages.
///
/// Stages are pure functions of their input and parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}

//! End-to-end processing of a scene query

mod config;
mod run;

pub use config::{PipelineConfig, RegionConfig, TileOrder};
pub use run::{Pipeline, StepOutcome, StepOutput};

//! Error types for geospec

use crate::band::Band;
use thiserror::Error;

/// Main error type for geospec operations.
///
/// Every variant is local to one raster, scene or tile group. Callers can
/// fix the input and retry, or skip the failing unit.
#[derive(Error, Debug)]
pub enum Error {
    #[error("required band {band} is missing{}", context_suffix(.context))]
    MissingBand { band: Band, context: Option<String> },

    #[error("region contains no pixels")]
    EmptyRegion,

    #[error("tile group is empty")]
    EmptyGroup,

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    DimensionMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("footprint mismatch: {0}")]
    FootprintMismatch(String),

    #[error("CRS mismatch: EPSG:{0} vs EPSG:{1}")]
    CrsMismatch(u32, u32),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("raster source failed: {0}")]
    Source(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::MissingBand`] without context.
    pub fn missing_band(band: Band) -> Self {
        Error::MissingBand { band, context: None }
    }

    /// Shorthand for a [`Error::DimensionMismatch`] between two shapes.
    pub fn dimension_mismatch(expected: (usize, usize), actual: (usize, usize)) -> Self {
        Error::DimensionMismatch {
            er: expected.0,
            ec: expected.1,
            ar: actual.0,
            ac: actual.1,
        }
    }
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(c) => format!(" in {c}"),
        None => String::new(),
    }
}

/// Result type alias for geospec operations
pub type Result<T> = std::result::Result<T, Error>;

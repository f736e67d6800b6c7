//! Binary thresholding of index rasters

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::maybe_rayon::*;
use geospec_core::raster::{IndexRaster, Mask, RasterElement};
use geospec_core::{Algorithm, Error, Result};

/// Comparison applied between a pixel value and the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    /// `value > threshold`
    #[default]
    GreaterThan,
    /// `value >= threshold`
    GreaterOrEqual,
    /// `value < threshold`
    LessThan,
    /// `value <= threshold`
    LessOrEqual,
}

impl Comparison {
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > threshold,
            Comparison::GreaterOrEqual => value >= threshold,
            Comparison::LessThan => value < threshold,
            Comparison::LessOrEqual => value <= threshold,
        }
    }
}

/// Parameters for [`threshold`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParams {
    pub value: f64,
    #[serde(default)]
    pub comparison: Comparison,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            value: 0.0,
            comparison: Comparison::GreaterThan,
        }
    }
}

/// Turn an index raster into a binary mask.
///
/// A pixel is 1 iff `comparison` holds between its value and `value`.
/// No-data pixels are always 0.
///
/// # Example
/// ```
/// use geospec_algorithms::imagery::{threshold, Comparison};
/// use geospec_core::Raster;
///
/// let ndwi = Raster::from_vec(vec![-0.3, 0.1, f64::NAN, 0.4], 2, 2).unwrap();
/// let water = threshold(&ndwi, 0.0, Comparison::GreaterThan).unwrap();
/// assert_eq!(water.data().iter().copied().collect::<Vec<u8>>(), vec![0, 1, 0, 1]);
/// ```
pub fn threshold(index: &IndexRaster, value: f64, comparison: Comparison) -> Result<Mask> {
    if value.is_nan() {
        return Err(Error::InvalidParameter {
            name: "threshold",
            value: value.to_string(),
            reason: "threshold must be a number".into(),
        });
    }

    let (rows, cols) = index.shape();
    let view = index.view();
    let nodata = index.nodata();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let v = view[(row, col)];
                if !v.is_nodata(nodata) && comparison.holds(v, value) {
                    *out = 1;
                }
            }
            row_data
        })
        .collect();

    let mask = index.with_data(data, None)?;
    debug!(threshold = value, ?comparison, "thresholded index raster");
    Ok(mask)
}

/// Thresholding as a pipeline stage
#[derive(Debug, Clone, Default)]
pub struct Threshold;

impl Algorithm for Threshold {
    type Input = IndexRaster;
    type Output = Mask;
    type Params = ThresholdParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Threshold"
    }

    fn description(&self) -> &'static str {
        "Binary mask from an index raster and a scalar threshold"
    }

    fn execute(&self, input: IndexRaster, params: ThresholdParams) -> Result<Mask> {
        threshold(&input, params.value, params.comparison)
    }
}

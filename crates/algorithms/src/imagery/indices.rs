//! Spectral indices
//!
//! Per-pixel band arithmetic over co-registered reflectance bands. The
//! formulas are fixed:
//!
//! | index | formula |
//! |-------|---------|
//! | NDVI  | (NIR - Red) / (NIR + Red) |
//! | NDWI  | (Green - NIR) / (Green + NIR) |
//! | CMR   | SWIR1 / SWIR2 |
//! | IOR   | Red / Blue |
//!
//! A zero denominator, or no-data in any operand, yields NaN at that pixel.
//! Normalized differences outside [-1, 1] are NaN as well; they only arise
//! from operands of opposite sign, e.g. negative Landsat reflectance.
//! NaN is never a valid index value, so it doubles as the no-data marker of
//! every index raster.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::maybe_rayon::*;
use geospec_core::raster::{IndexRaster, Raster, RasterElement};
use geospec_core::{Algorithm, Band, Error, Result, Scene};

/// Denominators smaller than this are treated as zero.
const DENOM_EPSILON: f64 = 1e-10;

/// The supported spectral indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralIndex {
    /// Normalized Difference Vegetation Index
    #[default]
    Ndvi,
    /// Normalized Difference Water Index (McFeeters)
    Ndwi,
    /// Clay Minerals Ratio
    Cmr,
    /// Iron Oxide Ratio
    Ior,
}

impl SpectralIndex {
    pub const ALL: [SpectralIndex; 4] = [
        SpectralIndex::Ndvi,
        SpectralIndex::Ndwi,
        SpectralIndex::Cmr,
        SpectralIndex::Ior,
    ];

    /// Short uppercase name, also used as the band name when an index is
    /// appended to a scene.
    pub fn name(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "NDVI",
            SpectralIndex::Ndwi => "NDWI",
            SpectralIndex::Cmr => "CMR",
            SpectralIndex::Ior => "IOR",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SpectralIndex::Ndvi => "Normalized Difference Vegetation Index",
            SpectralIndex::Ndwi => "Normalized Difference Water Index",
            SpectralIndex::Cmr => "Clay Minerals Ratio",
            SpectralIndex::Ior => "Iron Oxide Ratio",
        }
    }

    /// Input bands as (first operand, second operand).
    pub fn required_bands(&self) -> [Band; 2] {
        match self {
            SpectralIndex::Ndvi => [Band::Nir, Band::Red],
            SpectralIndex::Ndwi => [Band::Green, Band::Nir],
            SpectralIndex::Cmr => [Band::Swir1, Band::Swir2],
            SpectralIndex::Ior => [Band::Red, Band::Blue],
        }
    }

    /// Closed value range of valid results, `None` for unbounded ratios.
    ///
    /// Normalized differences never leave [-1, 1]; pixels that would are
    /// no-data.
    pub fn valid_range(&self) -> Option<(f64, f64)> {
        match self {
            SpectralIndex::Ndvi | SpectralIndex::Ndwi => Some((-1.0, 1.0)),
            SpectralIndex::Cmr | SpectralIndex::Ior => None,
        }
    }

    /// Compute the index from the scene's bands.
    ///
    /// Fails with [`Error::MissingBand`] if a required band is absent.
    pub fn compute(&self, scene: &Scene) -> Result<IndexRaster> {
        let [a, b] = self.required_bands();
        let a = scene.require(&a)?;
        let b = scene.require(&b)?;

        let out = match self {
            SpectralIndex::Ndvi | SpectralIndex::Ndwi => normalized_difference(a, b)?,
            SpectralIndex::Cmr | SpectralIndex::Ior => band_ratio(a, b)?,
        };

        debug!(
            index = self.name(),
            scene = scene.id(),
            rows = out.rows(),
            cols = out.cols(),
            "computed spectral index"
        );
        Ok(out)
    }

    /// Compute the index and store it in the scene as `Band::Named(name)`.
    pub fn append_to(&self, scene: &mut Scene) -> Result<()> {
        let raster = self.compute(scene)?;
        scene.insert_band(Band::Named(self.name().to_string()), raster)
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpectralIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ndvi" => Ok(SpectralIndex::Ndvi),
            "ndwi" => Ok(SpectralIndex::Ndwi),
            "cmr" | "clay" | "clay-minerals" => Ok(SpectralIndex::Cmr),
            "ior" | "iron" | "iron-oxide" => Ok(SpectralIndex::Ior),
            other => Err(Error::InvalidParameter {
                name: "index",
                value: other.to_string(),
                reason: "expected one of ndvi, ndwi, cmr, ior".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Generic band arithmetic
// ---------------------------------------------------------------------------

/// `(band_a - band_b) / (band_a + band_b)`.
///
/// NaN where the sum is zero, either input is no-data, or the result falls
/// outside [-1, 1].
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<IndexRaster> {
    combine(band_a, band_b, |a, b| {
        let sum = a + b;
        if sum.abs() < DENOM_EPSILON {
            return None;
        }
        Some((a - b) / sum).filter(|v| v.abs() <= 1.0)
    })
}

/// `numerator / denominator`, NaN where the denominator is zero.
pub fn band_ratio(numerator: &Raster<f64>, denominator: &Raster<f64>) -> Result<IndexRaster> {
    combine(numerator, denominator, |n, d| {
        if d.abs() < DENOM_EPSILON {
            return None;
        }
        Some(n / d)
    })
}

/// Normalized Difference Vegetation Index: `(NIR - Red) / (NIR + Red)`
///
/// Dense vegetation sits around 0.6 to 0.9, bare soil near 0.1, water and
/// clouds below zero.
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<IndexRaster> {
    normalized_difference(nir, red)
}

/// Normalized Difference Water Index: `(Green - NIR) / (Green + NIR)`
///
/// Positive values indicate open water.
pub fn ndwi(green: &Raster<f64>, nir: &Raster<f64>) -> Result<IndexRaster> {
    normalized_difference(green, nir)
}

/// Clay Minerals Ratio: `SWIR1 / SWIR2`
///
/// Hydroxyl-bearing clays absorb in SWIR2, so altered rock reads high.
pub fn clay_minerals_ratio(swir1: &Raster<f64>, swir2: &Raster<f64>) -> Result<IndexRaster> {
    band_ratio(swir1, swir2)
}

/// Iron Oxide Ratio: `Red / Blue`
pub fn iron_oxide_ratio(red: &Raster<f64>, blue: &Raster<f64>) -> Result<IndexRaster> {
    band_ratio(red, blue)
}

fn combine<F>(a: &Raster<f64>, b: &Raster<f64>, f: F) -> Result<IndexRaster>
where
    F: Fn(f64, f64) -> Option<f64> + Sync + Send,
{
    a.check_same_grid(b)?;

    let (rows, cols) = a.shape();
    let (va, vb) = (a.view(), b.view());
    let (nd_a, nd_b) = (a.nodata(), b.nodata());

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let x = va[(row, col)];
                let y = vb[(row, col)];
                if x.is_nodata(nd_a) || y.is_nodata(nd_b) {
                    continue;
                }
                if let Some(v) = f(x, y).filter(|v| v.is_finite()) {
                    *out = v;
                }
            }
            row_data
        })
        .collect();

    a.with_data(data, Some(f64::NAN))
}

// ---------------------------------------------------------------------------
// Algorithm adapter
// ---------------------------------------------------------------------------

/// Index calculation as a pipeline stage
#[derive(Debug, Clone, Default)]
pub struct IndexCalculator;

impl Algorithm for IndexCalculator {
    type Input = Scene;
    type Output = IndexRaster;
    type Params = SpectralIndex;
    type Error = Error;

    fn name(&self) -> &'static str {
        "IndexCalculator"
    }

    fn description(&self) -> &'static str {
        "Per-pixel spectral index (NDVI, NDWI, CMR, IOR) from scene bands"
    }

    fn execute(&self, input: Scene, params: SpectralIndex) -> Result<IndexRaster> {
        params.compute(&input)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Recommended display parameters for index rasters and band composites.
//!
//! These describe how a renderer should map values to colors. Nothing in
//! this module produces an image.

use serde::{Deserialize, Serialize};

use crate::scheme::{class_color, evaluate, ColorScheme, Rgb, CLASS_PALETTE};
use geospec_algorithms::imagery::{RuleSet, SpectralIndex};
use geospec_core::raster::{Raster, RasterElement};
use geospec_core::{Band, Error, Result, Scene};

/// Value range, gamma and ramp for a single-band raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    /// Value mapped to the start of the ramp. Lower values are clamped.
    pub min: f64,
    /// Value mapped to the end of the ramp. Higher values are clamped.
    pub max: f64,
    #[serde(default = "unit_gamma")]
    pub gamma: f64,
    pub scheme: ColorScheme,
}

fn unit_gamma() -> f64 {
    1.0
}

impl VisParams {
    pub fn new(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            gamma: 1.0,
            scheme,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Recommended parameters for a spectral index.
    pub fn for_index(index: SpectralIndex) -> Self {
        match index {
            SpectralIndex::Ndvi => Self::new(ColorScheme::Ndvi, -0.2, 0.8),
            SpectralIndex::Ndwi => Self::new(ColorScheme::Water, -0.5, 0.5),
            SpectralIndex::Cmr => Self::new(ColorScheme::Mineral, 0.8, 2.0),
            SpectralIndex::Ior => Self::new(ColorScheme::Mineral, 0.5, 3.0).with_gamma(1.2),
        }
    }

    /// Parameters for label rasters; see [`VisParams::color`].
    pub fn classes() -> Self {
        Self::new(ColorScheme::Classes, 0.0, (CLASS_PALETTE.len() - 1) as f64)
    }

    /// Stretch to the valid data range of a raster.
    ///
    /// All-no-data rasters get [0, 1]; constant rasters get [v, v + 1].
    pub fn fit<T: RasterElement>(raster: &Raster<T>, scheme: ColorScheme) -> Self {
        let nodata = raster.nodata();
        let (min, max) = raster
            .data()
            .iter()
            .filter(|v| !v.is_nodata(nodata))
            .filter_map(|v| v.to_f64())
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

        if !min.is_finite() || !max.is_finite() {
            Self::new(scheme, 0.0, 1.0)
        } else if (max - min).abs() < f64::EPSILON {
            Self::new(scheme, min, min + 1.0)
        } else {
            Self::new(scheme, min, max)
        }
    }

    /// Reject ranges and gammas a renderer cannot use.
    pub fn validate(&self) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.min < self.max) {
            return Err(Error::InvalidParameter {
                name: "range",
                value: format!("[{}, {}]", self.min, self.max),
                reason: "min must be below max".into(),
            });
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(Error::InvalidParameter {
                name: "gamma",
                value: self.gamma.to_string(),
                reason: "gamma must be positive".into(),
            });
        }
        Ok(())
    }

    /// Position on the ramp: clamp to [min, max], stretch to [0, 1], then
    /// apply `t^(1/gamma)`. `None` for NaN.
    pub fn normalize(&self, value: f64) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        Some(t.powf(1.0 / self.gamma))
    }

    /// Display color of a value, `None` for no-data.
    ///
    /// With a discrete scheme the value is read as a class label and gets
    /// its palette color, whatever the range.
    pub fn color(&self, value: f64) -> Option<Rgb> {
        if self.scheme.is_discrete() {
            return (!value.is_nan()).then(|| class_color(value.round() as i32));
        }
        self.normalize(value).map(|t| evaluate(self.scheme, t))
    }
}

/// Three-band composite shown as red, green and blue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeVis {
    pub bands: [Band; 3],
    pub min: f64,
    pub max: f64,
    #[serde(default = "unit_gamma")]
    pub gamma: f64,
}

impl CompositeVis {
    /// Natural color: red, green, blue reflectance.
    pub fn true_color() -> Self {
        Self {
            bands: [Band::Red, Band::Green, Band::Blue],
            min: 0.0,
            max: 0.3,
            gamma: 1.4,
        }
    }

    /// Color infrared: vegetation shows red.
    pub fn false_color() -> Self {
        Self {
            bands: [Band::Nir, Band::Red, Band::Green],
            min: 0.0,
            max: 0.4,
            gamma: 1.0,
        }
    }

    fn channel(&self, value: f64) -> u8 {
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        (t.powf(1.0 / self.gamma) * 255.0).round() as u8
    }

    /// Display color of one scene pixel, `None` when any channel is no-data.
    pub fn pixel(&self, scene: &Scene, row: usize, col: usize) -> Result<Option<Rgb>> {
        let mut rgb = [0u8; 3];
        for (out, band) in rgb.iter_mut().zip(&self.bands) {
            let raster = scene.require(band)?;
            let v = raster.get(row, col)?;
            if raster.is_nodata(v) {
                return Ok(None);
            }
            *out = self.channel(v);
        }
        Ok(Some(Rgb::new(rgb[0], rgb[1], rgb[2])))
    }
}

/// One legend row for a classified raster.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: i32,
    pub name: Option<String>,
    pub color: Rgb,
}

/// Legend for the labels a rule set can produce, default label first.
pub fn class_legend(rules: &RuleSet) -> Vec<LegendEntry> {
    let mut labels = vec![rules.default_label];
    for rule in &rules.rules {
        if !labels.contains(&rule.label) {
            labels.push(rule.label);
        }
    }
    labels
        .into_iter()
        .map(|label| LegendEntry {
            label,
            name: rules.name_of(label).map(str::to_string),
            color: class_color(label),
        })
        .collect()
}

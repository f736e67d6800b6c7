//! Spectral band identifiers and sensor band tables

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A spectral band of a multi-band scene.
///
/// The six canonical bands cover every index in the library. Anything else
/// (QA bands, red-edge, thermal) is carried as [`Band::Named`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
    Swir1,
    Swir2,
    Named(String),
}

impl Band {
    /// The six canonical reflectance bands, in wavelength order.
    pub const CANONICAL: [Band; 6] = [
        Band::Blue,
        Band::Green,
        Band::Red,
        Band::Nir,
        Band::Swir1,
        Band::Swir2,
    ];

    /// Lowercase identifier used in messages and configuration files.
    pub fn name(&self) -> &str {
        match self {
            Band::Blue => "blue",
            Band::Green => "green",
            Band::Red => "red",
            Band::Nir => "nir",
            Band::Swir1 => "swir1",
            Band::Swir2 => "swir2",
            Band::Named(name) => name,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Band {
    type Err = std::convert::Infallible;

    /// Parse a band name. Unknown names become [`Band::Named`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let band = match s.trim().to_lowercase().as_str() {
            "blue" | "b" => Band::Blue,
            "green" | "g" => Band::Green,
            "red" | "r" => Band::Red,
            "nir" | "near-infrared" | "near_infrared" => Band::Nir,
            "swir1" | "swir_1" | "swir-1" => Band::Swir1,
            "swir2" | "swir_2" | "swir-2" => Band::Swir2,
            _ => Band::Named(s.trim().to_string()),
        };
        Ok(band)
    }
}

/// Supported optical sensors.
///
/// Source adapters use the sensor tables to map provider asset names onto
/// canonical bands and to convert stored digital numbers to surface
/// reflectance before a scene enters the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sensor {
    /// Landsat 8 OLI, Collection 2 Level-2 surface reflectance
    Landsat8,
    /// Landsat 9 OLI-2, Collection 2 Level-2 surface reflectance
    Landsat9,
    /// Sentinel-2 MSI, Level-2A surface reflectance
    Sentinel2,
}

impl Sensor {
    /// Provider asset name for a canonical band, or `None` for bands the
    /// sensor table does not cover.
    pub fn asset_name(&self, band: &Band) -> Option<&'static str> {
        match self {
            Sensor::Landsat8 | Sensor::Landsat9 => match band {
                Band::Blue => Some("SR_B2"),
                Band::Green => Some("SR_B3"),
                Band::Red => Some("SR_B4"),
                Band::Nir => Some("SR_B5"),
                Band::Swir1 => Some("SR_B6"),
                Band::Swir2 => Some("SR_B7"),
                Band::Named(_) => None,
            },
            Sensor::Sentinel2 => match band {
                Band::Blue => Some("B2"),
                Band::Green => Some("B3"),
                Band::Red => Some("B4"),
                Band::Nir => Some("B8"),
                Band::Swir1 => Some("B11"),
                Band::Swir2 => Some("B12"),
                Band::Named(_) => None,
            },
        }
    }

    /// Reverse lookup: canonical band for a provider asset name.
    ///
    /// Unknown asset names map to [`Band::Named`].
    pub fn band_for_asset(&self, asset: &str) -> Band {
        Band::CANONICAL
            .iter()
            .find(|b| {
                self.asset_name(b)
                    .is_some_and(|name| name.eq_ignore_ascii_case(asset))
            })
            .cloned()
            .unwrap_or_else(|| Band::Named(asset.to_string()))
    }

    /// Convert a stored digital number to surface reflectance.
    pub fn scale(&self, dn: f64) -> f64 {
        match self {
            // Collection 2 Level-2 scale and offset
            Sensor::Landsat8 | Sensor::Landsat9 => dn * 0.000_027_5 - 0.2,
            Sensor::Sentinel2 => dn / 10_000.0,
        }
    }
}

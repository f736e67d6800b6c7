//! Multi-band scenes
//!
//! A [`Scene`] is one acquisition: a set of co-registered reflectance bands
//! sharing a grid, plus the acquisition time and cloud-cover metadata that
//! source adapters attach.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::band::Band;
use crate::error::{Error, Result};
use crate::raster::{BBox, GeoTransform, Mask, Raster};

/// One multi-band acquisition over a footprint.
///
/// All bands share the shape and [`GeoTransform`] fixed at construction;
/// [`Scene::insert_band`] rejects anything else.
#[derive(Debug, Clone)]
pub struct Scene {
    id: String,
    shape: (usize, usize),
    transform: GeoTransform,
    epsg: Option<u32>,
    acquired: DateTime<Utc>,
    cloud_cover: f64,
    bands: BTreeMap<Band, Raster<f64>>,
}

impl Scene {
    /// Create an empty scene on the given grid.
    pub fn new(
        id: impl Into<String>,
        shape: (usize, usize),
        transform: GeoTransform,
        acquired: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            shape,
            transform,
            epsg: None,
            acquired,
            cloud_cover: 0.0,
            bands: BTreeMap::new(),
        }
    }

    /// Create a scene whose grid is taken from the first band.
    pub fn from_bands<I>(id: impl Into<String>, acquired: DateTime<Utc>, bands: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Band, Raster<f64>)>,
    {
        let mut iter = bands.into_iter().peekable();
        let (shape, transform) = match iter.peek() {
            Some((_, first)) => (first.shape(), *first.transform()),
            None => {
                return Err(Error::InvalidParameter {
                    name: "bands",
                    value: "[]".into(),
                    reason: "a scene needs at least one band".into(),
                })
            }
        };

        let mut scene = Scene::new(id, shape, transform, acquired);
        for (band, raster) in iter {
            scene.insert_band(band, raster)?;
        }
        Ok(scene)
    }

    /// Builder-style cloud-cover percentage.
    pub fn with_cloud_cover(mut self, percent: f64) -> Self {
        self.cloud_cover = percent;
        self
    }

    /// Builder-style EPSG code.
    pub fn with_epsg(mut self, epsg: u32) -> Self {
        self.epsg = Some(epsg);
        self
    }

    /// Add or replace a band.
    ///
    /// The raster's transform is forced to the scene's after the grid check,
    /// so callers cannot end up with bands that disagree on georeferencing.
    pub fn insert_band(&mut self, band: Band, mut raster: Raster<f64>) -> Result<()> {
        if raster.shape() != self.shape {
            return Err(Error::dimension_mismatch(self.shape, raster.shape()));
        }
        if self.transform.grid_offset(raster.transform()) != Some((0, 0)) {
            return Err(Error::FootprintMismatch(format!(
                "band {band} of scene {} is not on the scene grid",
                self.id
            )));
        }
        raster.set_transform(self.transform);
        self.bands.insert(band, raster);
        Ok(())
    }

    /// Builder-style [`Scene::insert_band`].
    pub fn with_band(mut self, band: Band, raster: Raster<f64>) -> Result<Self> {
        self.insert_band(band, raster)?;
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn acquired(&self) -> DateTime<Utc> {
        self.acquired
    }

    /// Calendar date (UTC) of the acquisition
    pub fn date(&self) -> NaiveDate {
        self.acquired.date_naive()
    }

    pub fn cloud_cover(&self) -> f64 {
        self.cloud_cover
    }

    /// Spatial footprint of the scene grid
    pub fn footprint(&self) -> BBox {
        self.transform.bounds(self.shape.1, self.shape.0)
    }

    pub fn band(&self, band: &Band) -> Option<&Raster<f64>> {
        self.bands.get(band)
    }

    /// Look up a band, failing with [`Error::MissingBand`] if absent.
    pub fn require(&self, band: &Band) -> Result<&Raster<f64>> {
        self.bands.get(band).ok_or_else(|| Error::MissingBand {
            band: band.clone(),
            context: Some(format!("scene {}", self.id)),
        })
    }

    pub fn has_band(&self, band: &Band) -> bool {
        self.bands.contains_key(band)
    }

    /// Band identifiers in canonical order
    pub fn band_names(&self) -> impl Iterator<Item = &Band> {
        self.bands.keys()
    }

    pub fn bands(&self) -> impl Iterator<Item = (&Band, &Raster<f64>)> {
        self.bands.iter()
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Set every band to NaN wherever `mask` is zero.
    ///
    /// Cloud or quality masking is never applied implicitly; adapters or
    /// callers use this before grouping scenes for a mosaic.
    pub fn apply_mask(&mut self, mask: &Mask) -> Result<()> {
        if mask.shape() != self.shape {
            return Err(Error::dimension_mismatch(self.shape, mask.shape()));
        }
        // NaN is no-data for every float raster, whatever sentinel it declares.
        for raster in self.bands.values_mut() {
            ndarray::Zip::from(raster.data_mut())
                .and(mask.data())
                .for_each(|v, &keep| {
                    if keep == 0 {
                        *v = f64::NAN;
                    }
                });
        }
        Ok(())
    }
}

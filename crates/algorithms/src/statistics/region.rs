//! Region statistics
//!
//! Reduces a mask or label raster over a region of interest to pixel counts,
//! percentages and covered area.
//!
//! # Precondition
//!
//! Every pixel is assumed to cover the same ground area, so counts are
//! proportional to area. This holds for any raster on a single
//! [`GeoTransform`](geospec_core::GeoTransform) grid. Inputs whose pixel
//! area varies across the region (e.g. unprojected grids spanning many
//! degrees of latitude) would need area weighting, which these reducers do
//! not perform.

use std::collections::BTreeMap;

use tracing::debug;

use crate::maybe_rayon::*;
use geospec_core::raster::{LabelRaster, Raster, RasterElement};
use geospec_core::{Error, Region, Result};

/// Count of set pixels within a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSummary {
    /// Pixels in the region where the mask is set
    pub count: usize,
    /// Pixels in the region, excluding mask no-data
    pub total: usize,
    /// `count / total * 100`
    pub percentage: f64,
    /// Area of one pixel in squared map units
    pub pixel_area: f64,
}

impl RegionSummary {
    /// Area covered by set pixels, in squared map units
    pub fn area(&self) -> f64 {
        self.count as f64 * self.pixel_area
    }

    /// Area of the whole region, in squared map units
    pub fn total_area(&self) -> f64 {
        self.total as f64 * self.pixel_area
    }
}

/// Summarize a mask over a region.
///
/// A pixel is set when it is non-zero. Pixels equal to the mask's declared
/// no-data value are left out of both `count` and `total`.
///
/// Meant for binary masks. On a label raster every non-zero label counts as
/// set, including a non-zero default label; use [`label_summary`] or
/// [`class_summary`] there.
///
/// Fails with [`Error::EmptyRegion`] when no pixel of the raster falls
/// inside the region.
pub fn region_summary<T: RasterElement>(mask: &Raster<T>, region: &Region) -> Result<RegionSummary> {
    let zero = T::zero();
    let (count, total) = reduce_region(mask, region, |v| v != zero)?;

    let summary = RegionSummary {
        count,
        total,
        percentage: count as f64 / total as f64 * 100.0,
        pixel_area: mask.pixel_area(),
    };
    debug!(count, total, percentage = summary.percentage, "region summary");
    Ok(summary)
}

/// Summarize pixels of a label raster equal to `label`.
pub fn label_summary(labels: &LabelRaster, label: i32, region: &Region) -> Result<RegionSummary> {
    let (count, total) = reduce_region(labels, region, |v| v == label)?;
    Ok(RegionSummary {
        count,
        total,
        percentage: count as f64 / total as f64 * 100.0,
        pixel_area: labels.pixel_area(),
    })
}

/// Per-label pixel counts of a classified raster within a region.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSummary {
    /// Pixel count for every label present in the region
    pub counts: BTreeMap<i32, usize>,
    /// Pixels in the region, excluding no-data
    pub total: usize,
    pub pixel_area: f64,
}

impl ClassSummary {
    pub fn count(&self, label: i32) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Share of the region covered by `label`, in percent
    pub fn percentage(&self, label: i32) -> f64 {
        self.count(label) as f64 / self.total as f64 * 100.0
    }

    pub fn area(&self, label: i32) -> f64 {
        self.count(label) as f64 * self.pixel_area
    }
}

/// Count every label of a classified raster within a region.
pub fn class_summary(labels: &LabelRaster, region: &Region) -> Result<ClassSummary> {
    let (rows, cols) = labels.shape();
    let (r0, r1, c0, c1) = region.pixel_window(labels.transform(), rows, cols);
    let view = labels.view();
    let nodata = labels.nodata();

    let per_row: Vec<BTreeMap<i32, usize>> = (r0..r1.max(r0))
        .into_par_iter()
        .map(|row| {
            let mut counts = BTreeMap::new();
            for col in c0..c1.max(c0) {
                let v = view[(row, col)];
                if v.is_nodata(nodata) {
                    continue;
                }
                let (x, y) = labels.pixel_to_geo(col, row);
                if region.contains(x, y) {
                    *counts.entry(v).or_insert(0) += 1;
                }
            }
            counts
        })
        .collect();

    let mut counts = BTreeMap::new();
    for row_counts in per_row {
        for (label, n) in row_counts {
            *counts.entry(label).or_insert(0) += n;
        }
    }
    let total: usize = counts.values().sum();
    if total == 0 {
        return Err(Error::EmptyRegion);
    }

    debug!(classes = counts.len(), total, "class summary");
    Ok(ClassSummary {
        counts,
        total,
        pixel_area: labels.pixel_area(),
    })
}

/// Count `(set, total)` pixels of the raster inside the region.
fn reduce_region<T, F>(raster: &Raster<T>, region: &Region, is_set: F) -> Result<(usize, usize)>
where
    T: RasterElement,
    F: Fn(T) -> bool + Sync + Send,
{
    let (rows, cols) = raster.shape();
    let (r0, r1, c0, c1) = region.pixel_window(raster.transform(), rows, cols);
    let view = raster.view();
    let nodata = raster.nodata();

    let per_row: Vec<(usize, usize)> = (r0..r1.max(r0))
        .into_par_iter()
        .map(|row| {
            let mut set = 0;
            let mut total = 0;
            for col in c0..c1.max(c0) {
                let v = view[(row, col)];
                if v.is_nodata(nodata) {
                    continue;
                }
                let (x, y) = raster.pixel_to_geo(col, row);
                if !region.contains(x, y) {
                    continue;
                }
                total += 1;
                if is_set(v) {
                    set += 1;
                }
            }
            (set, total)
        })
        .collect();

    let (set, total) = per_row
        .into_iter()
        .fold((0, 0), |(s, t), (rs, rt)| (s + rs, t + rt));
    if total == 0 {
        return Err(Error::EmptyRegion);
    }
    Ok((set, total))
}

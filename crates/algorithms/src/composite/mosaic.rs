//! Last-valid-wins mosaicking of same-date tiles
//!
//! For every band and output pixel, the value comes from the last tile in
//! the group that has valid data there. Earlier tiles only show through
//! where every later tile is no-data or has no coverage. Nothing is
//! averaged.
//!
//! No cloud or quality masking happens here. Tiles must be masked before
//! grouping, otherwise a cloudy pixel in a later tile hides a clear pixel in
//! an earlier one.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::TileGroup;
use crate::maybe_rayon::*;
use geospec_core::raster::{Raster, RasterElement};
use geospec_core::{Algorithm, Band, Error, Result, Scene};

/// Build one composite scene from a tile group.
///
/// The composite covers the union footprint of all tiles on the grid of the
/// first tile. Uncovered pixels are NaN. A single-tile group is returned
/// unchanged.
///
/// Requirements:
/// - at least one tile ([`Error::EmptyGroup`])
/// - identical band sets ([`Error::MissingBand`])
/// - same EPSG code where both tiles declare one ([`Error::CrsMismatch`])
/// - same pixel size and grid-aligned origins ([`Error::FootprintMismatch`])
///
/// Rows are filled in parallel, but each output row walks the tiles in
/// group order, so the result never depends on scheduling.
pub fn mosaic(group: &TileGroup) -> Result<Scene> {
    let tiles = group.scenes();
    let base = tiles.first().ok_or(Error::EmptyGroup)?;
    if tiles.len() == 1 {
        return Ok(base.clone());
    }

    let bands: BTreeSet<&Band> = base.band_names().collect();
    let mut epsg = base.epsg();
    let mut offsets = Vec::with_capacity(tiles.len());

    for tile in tiles {
        check_bands(base, &bands, tile)?;

        match (epsg, tile.epsg()) {
            (Some(a), Some(b)) if a != b => return Err(Error::CrsMismatch(a, b)),
            (None, Some(b)) => epsg = Some(b),
            _ => {}
        }

        let offset = base.transform().grid_offset(tile.transform()).ok_or_else(|| {
            Error::FootprintMismatch(format!(
                "tile {} is not on the grid of tile {} (pixel size or origin alignment differs)",
                tile.id(),
                base.id()
            ))
        })?;
        offsets.push(offset);
    }

    // Union extent in pixel coordinates of the base grid
    let mut min_col = isize::MAX;
    let mut min_row = isize::MAX;
    let mut max_col = isize::MIN;
    let mut max_row = isize::MIN;
    for (tile, &(dc, dr)) in tiles.iter().zip(&offsets) {
        let (rows, cols) = tile.shape();
        min_col = min_col.min(dc);
        min_row = min_row.min(dr);
        max_col = max_col.max(dc + cols as isize);
        max_row = max_row.max(dr + rows as isize);
    }
    let out_rows = (max_row - min_row) as usize;
    let out_cols = (max_col - min_col) as usize;
    let transform = base.transform().shifted(min_col, min_row);

    // Tile placements relative to the output grid
    let placements: Vec<(usize, usize)> = offsets
        .iter()
        .map(|&(dc, dr)| ((dr - min_row) as usize, (dc - min_col) as usize))
        .collect();

    let acquired: DateTime<Utc> = tiles
        .iter()
        .map(Scene::acquired)
        .min()
        .unwrap_or_else(|| base.acquired());
    let cloud = tiles.iter().map(Scene::cloud_cover).fold(0.0_f64, f64::max);
    let id = tiles.iter().map(Scene::id).collect::<Vec<_>>().join("+");

    let mut composite = Scene::new(id, (out_rows, out_cols), transform, acquired).with_cloud_cover(cloud);
    if let Some(code) = epsg {
        composite = composite.with_epsg(code);
    }

    let mut uncovered = 0;
    for band in bands {
        let layers: Vec<&Raster<f64>> = tiles
            .iter()
            .map(|t| t.require(band))
            .collect::<Result<_>>()?;
        let raster = overlay(&layers, &placements, out_rows, out_cols)?.with_transform(transform);

        uncovered = uncovered.max(raster.data().iter().filter(|v| v.is_nan()).count());
        composite.insert_band(band.clone(), raster)?;
    }

    if uncovered > 0 {
        warn!(id = composite.id(), uncovered, "mosaic leaves pixels without valid data");
    }
    debug!(
        tiles = tiles.len(),
        rows = out_rows,
        cols = out_cols,
        date = %group.date(),
        "built mosaic"
    );
    Ok(composite)
}

fn check_bands(base: &Scene, bands: &BTreeSet<&Band>, tile: &Scene) -> Result<()> {
    if let Some(missing) = bands.iter().find(|b| !tile.has_band(b)) {
        return Err(Error::MissingBand {
            band: (*missing).clone(),
            context: Some(format!("tile {}", tile.id())),
        });
    }
    if let Some(extra) = tile.band_names().find(|b| !bands.contains(b)) {
        return Err(Error::MissingBand {
            band: extra.clone(),
            context: Some(format!("tile {}", base.id())),
        });
    }
    Ok(())
}

/// Draw `layers` in order onto a NaN grid, skipping no-data cells.
fn overlay(
    layers: &[&Raster<f64>],
    placements: &[(usize, usize)],
    rows: usize,
    cols: usize,
) -> Result<Raster<f64>> {
    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (layer, &(r_off, c_off)) in layers.iter().zip(placements) {
                let (l_rows, l_cols) = layer.shape();
                if row < r_off || row >= r_off + l_rows {
                    continue;
                }
                let src = layer.view();
                let nodata = layer.nodata();
                let local_row = row - r_off;
                for local_col in 0..l_cols {
                    let v = src[(local_row, local_col)];
                    if !v.is_nodata(nodata) {
                        row_data[c_off + local_col] = v;
                    }
                }
            }
            row_data
        })
        .collect();

    Raster::from_vec(data, rows, cols).map(|r| r.with_nodata(f64::NAN))
}

/// Mosaicking as a pipeline stage
#[derive(Debug, Clone, Default)]
pub struct Mosaic;

impl Algorithm for Mosaic {
    type Input = TileGroup;
    type Output = Scene;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Mosaic"
    }

    fn description(&self) -> &'static str {
        "Composite of same-date tiles, later tiles override earlier ones"
    }

    fn execute(&self, input: TileGroup, _params: ()) -> Result<Scene> {
        mosaic(&input)
    }
}

//! Behavioral properties of the index, classification, statistics and
//! mosaic stages, checked across crate boundaries.

use approx::assert_relative_eq;
use chrono::{NaiveDate, TimeZone, Utc};
use geospec_algorithms::composite::{mosaic, TileGroup};
use geospec_algorithms::imagery::{classify, ndvi, ndwi, threshold, ClassRule, Comparison, RuleSet};
use geospec_algorithms::statistics::region_summary;
use geospec_core::{Band, Error, GeoTransform, Mask, Raster, Region, Scene};

fn grid() -> GeoTransform {
    GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0)
}

/// Deterministic pseudo-reflectance in [0, 0.6)
fn reflectance(size: usize, seed: usize) -> Raster<f64> {
    let data = (0..size * size)
        .map(|i| ((i * 7919 + seed * 104_729) % 600) as f64 / 1000.0)
        .collect();
    Raster::from_vec(data, size, size).unwrap().with_transform(grid())
}

fn tile(id: &str, nir: Raster<f64>, red: Raster<f64>) -> Scene {
    let (rows, cols) = nir.shape();
    Scene::new(id, (rows, cols), grid(), Utc.with_ymd_and_hms(2023, 7, 14, 10, 0, 0).unwrap())
        .with_band(Band::Nir, nir)
        .unwrap()
        .with_band(Band::Red, red)
        .unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 7, 14).unwrap()
}

#[test]
fn ndvi_zero_where_nir_equals_red() {
    let band = reflectance(32, 1);
    let out = ndvi(&band, &band).unwrap();
    for (v, input) in out.data().iter().zip(band.data().iter()) {
        if *input == 0.0 {
            assert!(v.is_nan(), "0/0 must be no-data");
        } else {
            assert_relative_eq!(*v, 0.0);
        }
    }
}

#[test]
fn normalized_differences_stay_in_unit_range() {
    let a = reflectance(64, 3);
    let b = reflectance(64, 11);
    for out in [ndvi(&a, &b).unwrap(), ndwi(&a, &b).unwrap()] {
        for v in out.data().iter().filter(|v| !v.is_nan()) {
            assert!((-1.0..=1.0).contains(v), "index value {v} out of range");
        }
    }
}

#[test]
fn no_data_never_thresholds_true() {
    let index = Raster::from_vec(vec![f64::NAN; 9], 3, 3).unwrap();
    for comparison in [
        Comparison::GreaterThan,
        Comparison::GreaterOrEqual,
        Comparison::LessThan,
        Comparison::LessOrEqual,
    ] {
        let mask = threshold(&index, 0.0, comparison).unwrap();
        assert!(mask.data().iter().all(|&v| v == 0));
    }
}

#[test]
fn later_overlapping_rule_wins() {
    let index = Raster::from_vec(vec![0.7, 0.2, 1.0, -0.5], 2, 2).unwrap();
    let rules = RuleSet::new(vec![ClassRule::closed(0.0, 1.0, 1), ClassRule::closed(0.5, 1.0, 2)]);
    let labels = classify(&index, &rules).unwrap();
    assert_eq!(labels.data().iter().copied().collect::<Vec<_>>(), vec![2, 1, 2, 0]);
}

#[test]
fn classification_matches_sequential_overwrite() {
    let index = ndvi(&reflectance(40, 5), &reflectance(40, 9)).unwrap();
    let rules = RuleSet::new(vec![
        ClassRule::new(-1.0, 0.0, 1),
        ClassRule::new(-0.2, 0.4, 2),
        ClassRule::closed(0.3, 1.0, 3),
        ClassRule::new(0.1, 0.2, 4),
    ]);
    let labels = classify(&index, &rules).unwrap();

    // Reference: start from the default and overwrite rule by rule
    for (v, label) in index.data().iter().zip(labels.data().iter()) {
        let mut expected = rules.default_label;
        if !v.is_nan() {
            for rule in &rules.rules {
                if rule.matches(*v) {
                    expected = rule.label;
                }
            }
        }
        assert_eq!(*label, expected, "value {v}");
    }
}

#[test]
fn mosaic_single_tile_identity() {
    let t = tile("only", reflectance(16, 1), reflectance(16, 2));
    let out = mosaic(&TileGroup::new(day(), vec![t.clone()])).unwrap();
    assert_eq!(out.band(&Band::Nir), t.band(&Band::Nir));
    assert_eq!(out.band(&Band::Red), t.band(&Band::Red));
}

#[test]
fn mosaic_full_cover_equals_last_tile() {
    let t1 = tile("t1", reflectance(16, 1), reflectance(16, 2));
    let t2 = tile("t2", reflectance(16, 3), reflectance(16, 4));
    let out = mosaic(&TileGroup::new(day(), vec![t1, t2.clone()])).unwrap();
    assert_eq!(out.shape(), t2.shape());
    assert_eq!(out.band(&Band::Nir).unwrap().data(), t2.band(&Band::Nir).unwrap().data());
    assert_eq!(out.band(&Band::Red).unwrap().data(), t2.band(&Band::Red).unwrap().data());
}

#[test]
fn empty_group_and_empty_region_errors() {
    assert!(matches!(
        mosaic(&TileGroup::new(day(), Vec::new())),
        Err(Error::EmptyGroup)
    ));
    assert!(matches!(
        region_summary(&Mask::new(0, 0), &Region::Full),
        Err(Error::EmptyRegion)
    ));
}

#[test]
fn mask_percentages() {
    let all = Mask::filled(10, 10, 1);
    assert_relative_eq!(region_summary(&all, &Region::Full).unwrap().percentage, 100.0);

    let none = Mask::filled(10, 10, 0);
    let s = region_summary(&none, &Region::Full).unwrap();
    assert_eq!(s.count, 0);
    assert_relative_eq!(s.percentage, 0.0);
}

#[test]
fn missing_band_reported() {
    let scene = Scene::new("s", (4, 4), grid(), Utc.with_ymd_and_hms(2023, 7, 14, 10, 0, 0).unwrap())
        .with_band(Band::Nir, reflectance(4, 1))
        .unwrap();
    let err = geospec_algorithms::imagery::SpectralIndex::Ndwi
        .compute(&scene)
        .unwrap_err();
    assert!(matches!(err, Error::MissingBand { band: Band::Green, .. }));
}

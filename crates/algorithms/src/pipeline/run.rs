//! Eager per-date pipeline
//!
//! fetch → group by date → mosaic → index → threshold / classify → summaries
//!
//! Every date is an independent unit. A unit that fails is reported in its
//! [`StepOutcome`] and the other dates still run.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::config::{PipelineConfig, TileOrder};
use crate::composite::{group_by_date, TileGroup};
use crate::imagery::{classify, threshold};
use crate::statistics::{class_summary, region_summary, ClassSummary, RegionSummary};
use geospec_core::raster::{IndexRaster, LabelRaster, Mask};
use geospec_core::{RasterSource, Region, Result, Scene, SceneQuery};
use geospec_parallel::ParallelStrategy;

/// Products of one successful date.
#[derive(Debug, Clone)]
pub struct StepOutput {
    /// Mosaic of the date's tiles
    pub composite: Scene,
    pub index: IndexRaster,
    pub mask: Option<Mask>,
    pub mask_summary: Option<RegionSummary>,
    pub labels: Option<LabelRaster>,
    pub class_summary: Option<ClassSummary>,
}

/// Result of one date.
#[derive(Debug)]
pub struct StepOutcome {
    pub date: NaiveDate,
    /// Number of tiles acquired on that date
    pub tiles: usize,
    pub result: Result<StepOutput>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn output(&self) -> Option<&StepOutput> {
        self.result.as_ref().ok()
    }
}

/// Runs a [`PipelineConfig`] against a [`RasterSource`].
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch scenes and process every acquisition date.
    ///
    /// Only a failing source or an invalid processing mode fails the whole
    /// run. Outcomes are in date order.
    pub fn run<S>(&self, source: &S, query: &SceneQuery) -> Result<Vec<StepOutcome>>
    where
        S: RasterSource + ?Sized,
    {
        self.config.validate()?;
        let scenes = source.fetch(query)?;
        let scene_count = scenes.len();
        let groups = group_by_date(scenes);
        info!(
            scenes = scene_count,
            dates = groups.len(),
            index = %self.config.index,
            "running pipeline"
        );

        let region = self.config.region.to_region();
        let outcomes = self.config.processing.map_ordered(&groups, |group| {
            let result = self.process_group(group, &region);
            match &result {
                Ok(_) => info!(date = %group.date(), tiles = group.len(), "date processed"),
                Err(e) => warn!(date = %group.date(), tiles = group.len(), error = %e, "date failed"),
            }
            StepOutcome {
                date: group.date(),
                tiles: group.len(),
                result,
            }
        })?;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        if failed > 0 {
            warn!(failed, total = outcomes.len(), "pipeline finished with failed dates");
        }
        Ok(outcomes)
    }

    /// Process one tile group.
    pub fn process_group(&self, group: &TileGroup, region: &Region) -> Result<StepOutput> {
        let composite = match self.config.order {
            TileOrder::Source => group.mosaic()?,
            TileOrder::ClearestOnTop => {
                let mut ordered = group.clone();
                ordered.clearest_on_top();
                ordered.mosaic()?
            }
        };
        self.process_scene(composite, region)
    }

    /// Index, masks and summaries for a single scene.
    pub fn process_scene(&self, composite: Scene, region: &Region) -> Result<StepOutput> {
        let index = self.config.index.compute(&composite)?;
        let stats = index.statistics();
        debug!(
            scene = composite.id(),
            index = %self.config.index,
            mean = ?stats.mean,
            valid = stats.valid_count,
            nodata = stats.nodata_count,
            "index statistics"
        );

        let (mask, mask_summary) = match &self.config.threshold {
            Some(t) => {
                let mask = threshold(&index, t.value, t.comparison)?;
                let summary = region_summary(&mask, region)?;
                debug!(
                    scene = composite.id(),
                    count = summary.count,
                    percentage = summary.percentage,
                    "threshold summary"
                );
                (Some(mask), Some(summary))
            }
            None => (None, None),
        };

        let (labels, classes) = match &self.config.rules {
            Some(rules) => {
                let labels = classify(&index, rules)?;
                let summary = class_summary(&labels, region)?;
                (Some(labels), Some(summary))
            }
            None => (None, None),
        };

        Ok(StepOutput {
            composite,
            index,
            mask,
            mask_summary,
            labels,
            class_summary: classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::{ClassRule, Comparison, RuleSet, SpectralIndex, ThresholdParams};
    use crate::pipeline::RegionConfig;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use geospec_core::{BBox, Band, Error, GeoTransform, MemorySource, Raster};
    use geospec_parallel::ProcessingMode;

    fn scene(id: &str, day: u32, nir: Vec<f64>, red: Vec<f64>) -> Scene {
        let gt = GeoTransform::new(0.0, 2.0, 1.0, -1.0);
        Scene::new(id, (2, 2), gt, Utc.with_ymd_and_hms(2024, 6, day, 10, 30, 0).unwrap())
            .with_band(Band::Nir, Raster::from_vec(nir, 2, 2).unwrap().with_transform(gt))
            .unwrap()
            .with_band(Band::Red, Raster::from_vec(red, 2, 2).unwrap().with_transform(gt))
            .unwrap()
    }

    fn query() -> SceneQuery {
        SceneQuery::new(BBox::new(-10.0, -10.0, 10.0, 10.0))
    }

    fn ndvi_config() -> PipelineConfig {
        PipelineConfig::new(SpectralIndex::Ndvi)
            .with_threshold(ThresholdParams {
                value: 0.3,
                comparison: Comparison::GreaterThan,
            })
            .with_rules(RuleSet::new(vec![
                ClassRule::closed(-1.0, 1.0, 1),
                ClassRule::closed(0.5, 1.0, 2),
            ]))
    }

    #[test]
    fn outcomes_in_date_order() {
        let source = MemorySource::new(vec![
            scene("late", 20, vec![0.8; 4], vec![0.1; 4]),
            scene("early", 3, vec![0.2; 4], vec![0.2; 4]),
        ]);
        for mode in [ProcessingMode::Sequential, ProcessingMode::Parallel] {
            let pipeline = Pipeline::new(ndvi_config().with_processing(mode));
            let outcomes = pipeline.run(&source, &query()).unwrap();
            let dates: Vec<u32> = outcomes.iter().map(|o| chrono::Datelike::day(&o.date)).collect();
            assert_eq!(dates, vec![3, 20]);
            assert!(outcomes.iter().all(StepOutcome::is_ok));
        }
    }

    #[test]
    fn summaries_of_one_date() {
        // NDVI per pixel: 0.6, 0.0, 0.4, no-data
        let source = MemorySource::new(vec![scene(
            "s",
            1,
            vec![0.8, 0.3, 0.7, 0.0],
            vec![0.2, 0.3, 0.3, 0.0],
        )]);
        let outcomes = Pipeline::new(ndvi_config()).run(&source, &query()).unwrap();
        let out = outcomes[0].output().unwrap();

        let mask = out.mask_summary.unwrap();
        assert_eq!((mask.count, mask.total), (2, 4));
        assert_relative_eq!(mask.percentage, 50.0);

        let classes = out.class_summary.as_ref().unwrap();
        assert_eq!(classes.count(2), 1);
        assert_eq!(classes.count(1), 2);
        assert_eq!(classes.count(0), 1);
    }

    #[test]
    fn failing_date_does_not_abort_others() {
        let gt = GeoTransform::new(0.0, 2.0, 1.0, -1.0);
        let no_red = Scene::new("broken", (2, 2), gt, Utc.with_ymd_and_hms(2024, 6, 7, 9, 0, 0).unwrap())
            .with_band(Band::Nir, Raster::filled(2, 2, 0.5).with_transform(gt))
            .unwrap();
        let source = MemorySource::new(vec![
            scene("a", 1, vec![0.5; 4], vec![0.1; 4]),
            no_red,
            scene("b", 9, vec![0.5; 4], vec![0.1; 4]),
        ]);

        let outcomes = Pipeline::new(ndvi_config()).run(&source, &query()).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(Error::MissingBand { band: Band::Red, .. })
        ));
        assert!(outcomes[2].is_ok());
    }

    #[test]
    fn same_date_tiles_are_mosaicked() {
        let source = MemorySource::new(vec![
            scene("t1", 4, vec![0.9; 4], vec![0.1; 4]),
            scene("t2", 4, vec![0.5, f64::NAN, 0.5, 0.5], vec![0.5, f64::NAN, 0.5, 0.5]),
        ]);
        let outcomes = Pipeline::new(PipelineConfig::default()).run(&source, &query()).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].tiles, 2);

        let out = outcomes[0].output().unwrap();
        assert_eq!(out.composite.id(), "t1+t2");
        let ndvi: Vec<f64> = out.index.data().iter().copied().collect();
        assert_relative_eq!(ndvi[0], 0.0);
        assert_relative_eq!(ndvi[1], 0.8, epsilon = 1e-12);
    }

    #[test]
    fn clearest_tile_drawn_on_top() {
        let source = MemorySource::new(vec![
            scene("clear", 4, vec![0.9; 4], vec![0.1; 4]).with_cloud_cover(1.0),
            scene("cloudy", 4, vec![0.5; 4], vec![0.5; 4]).with_cloud_cover(60.0),
        ]);
        let config = PipelineConfig::default().with_order(TileOrder::ClearestOnTop);
        let outcomes = Pipeline::new(config).run(&source, &query()).unwrap();
        let out = outcomes[0].output().unwrap();
        assert!(out.index.data().iter().all(|v| (v - 0.8).abs() < 1e-12));
    }

    #[test]
    fn region_outside_data_fails_each_date() {
        let source = MemorySource::new(vec![scene("s", 1, vec![0.5; 4], vec![0.1; 4])]);
        let config = ndvi_config().with_region(RegionConfig::Bbox(BBox::new(50.0, 50.0, 60.0, 60.0)));
        let outcomes = Pipeline::new(config).run(&source, &query()).unwrap();
        assert!(matches!(outcomes[0].result, Err(Error::EmptyRegion)));
    }

    #[test]
    fn no_scenes_gives_no_outcomes() {
        let outcomes = Pipeline::default().run(&MemorySource::default(), &query()).unwrap();
        assert!(outcomes.is_empty());
    }
}

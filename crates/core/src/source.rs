//! Raster source adapters
//!
//! A source hands the pipeline well-formed, radiometrically scaled
//! [`Scene`]s for a footprint, a date range and a cloud-cover limit. Network
//! latency, retries and caching belong to the adapter, never to the core.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::raster::BBox;
use crate::scene::Scene;

/// Half-open date interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range; fails if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidParameter {
                name: "date_range",
                value: format!("{start}/{end}"),
                reason: "end precedes start".into(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse `"YYYY-MM-DD/YYYY-MM-DD"`.
    pub fn parse(s: &str) -> Result<Self> {
        let (a, b) = s.split_once('/').ok_or_else(|| Error::InvalidParameter {
            name: "date_range",
            value: s.to_string(),
            reason: "expected START/END".into(),
        })?;
        let parse = |v: &str| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|e| Error::InvalidParameter {
                name: "date_range",
                value: s.to_string(),
                reason: e.to_string(),
            })
        };
        Self::new(parse(a)?, parse(b)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Search parameters passed to a [`RasterSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneQuery {
    pub footprint: BBox,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dates: Option<DateRange>,
    /// Maximum accepted scene cloud cover, in percent
    #[serde(default = "default_max_cloud")]
    pub max_cloud_percent: f64,
}

fn default_max_cloud() -> f64 {
    100.0
}

impl SceneQuery {
    /// Query a footprint with no date restriction and no cloud limit.
    pub fn new(footprint: BBox) -> Self {
        Self {
            footprint,
            dates: None,
            max_cloud_percent: default_max_cloud(),
        }
    }

    /// Restrict to a date range.
    pub fn dates(mut self, range: DateRange) -> Self {
        self.dates = Some(range);
        self
    }

    /// Set the cloud-cover limit in percent.
    pub fn max_cloud(mut self, percent: f64) -> Self {
        self.max_cloud_percent = percent;
        self
    }

    /// Whether a scene satisfies every criterion of the query.
    pub fn matches(&self, scene: &Scene) -> bool {
        scene.footprint().intersects(&self.footprint)
            && self.dates.map_or(true, |d| d.contains(scene.date()))
            && scene.cloud_cover() <= self.max_cloud_percent
    }
}

/// Supplier of scenes for a query.
///
/// Implementations either return complete scenes or a terminal
/// [`Error::Source`].
pub trait RasterSource {
    fn fetch(&self, query: &SceneQuery) -> Result<Vec<Scene>>;
}

/// In-process source serving a fixed set of scenes.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    scenes: Vec<Scene>,
}

impl MemorySource {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    pub fn push(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl RasterSource for MemorySource {
    /// Matching scenes sorted by acquisition time; ties keep insertion order.
    fn fetch(&self, query: &SceneQuery) -> Result<Vec<Scene>> {
        if !query.max_cloud_percent.is_finite() || query.max_cloud_percent < 0.0 {
            return Err(Error::InvalidParameter {
                name: "max_cloud_percent",
                value: query.max_cloud_percent.to_string(),
                reason: "must be a non-negative percentage".into(),
            });
        }

        let mut hits: Vec<Scene> = self
            .scenes
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        hits.sort_by_key(|s| s.acquired());

        debug!(
            available = self.scenes.len(),
            matched = hits.len(),
            "memory source fetch"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::Band;
    use crate::raster::{GeoTransform, Raster};
    use chrono::{TimeZone, Utc};

    fn scene(id: &str, day: u32, hour: u32, cloud: f64, origin_x: f64) -> Scene {
        let gt = GeoTransform::new(origin_x, 10.0, 1.0, -1.0);
        Scene::new(id, (10, 10), gt, Utc.with_ymd_and_hms(2023, 5, day, hour, 0, 0).unwrap())
            .with_cloud_cover(cloud)
            .with_band(Band::Red, Raster::filled(10, 10, 0.1).with_transform(gt))
            .unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, d).unwrap()
    }

    #[test]
    fn date_range_is_half_open() {
        let r = DateRange::new(date(1), date(10)).unwrap();
        assert!(r.contains(date(1)));
        assert!(r.contains(date(9)));
        assert!(!r.contains(date(10)));
        assert!(DateRange::new(date(10), date(1)).is_err());
    }

    #[test]
    fn parse_date_range() {
        let r = DateRange::parse("2023-05-01/2023-05-10").unwrap();
        assert_eq!(r.start, date(1));
        assert!(DateRange::parse("2023-05-01").is_err());
        assert!(DateRange::parse("2023-05-01/yesterday").is_err());
    }

    #[test]
    fn fetch_filters_and_sorts() {
        let source = MemorySource::new(vec![
            scene("late", 20, 10, 5.0, 0.0),
            scene("cloudy", 3, 10, 80.0, 0.0),
            scene("early", 2, 10, 10.0, 0.0),
            scene("far", 4, 10, 0.0, 1000.0),
        ]);

        let query = SceneQuery::new(BBox::new(2.0, 2.0, 8.0, 8.0))
            .dates(DateRange::new(date(1), date(31)).unwrap())
            .max_cloud(20.0);

        let ids: Vec<_> = source
            .fetch(&query)
            .unwrap()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, ["early", "late"]);
    }

    #[test]
    fn rejects_negative_cloud_limit() {
        let source = MemorySource::default();
        let query = SceneQuery::new(BBox::new(0.0, 0.0, 1.0, 1.0)).max_cloud(-1.0);
        assert!(source.fetch(&query).is_err());
    }
}

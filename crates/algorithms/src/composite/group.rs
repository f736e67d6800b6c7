//! Grouping scenes into same-date tile groups

use std::collections::BTreeMap;

use chrono::NaiveDate;

use geospec_core::{Result, Scene};

/// Scenes sharing one nominal acquisition date.
///
/// Order is draw order: later scenes are drawn over earlier ones when the
/// group is mosaicked.
#[derive(Debug, Clone)]
pub struct TileGroup {
    date: NaiveDate,
    scenes: Vec<Scene>,
}

impl TileGroup {
    pub fn new(date: NaiveDate, scenes: Vec<Scene>) -> Self {
        Self { date, scenes }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Append a scene on top of the current draw order.
    pub fn push(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    /// Reorder so the least cloudy scene is drawn last (on top).
    ///
    /// The sort is stable: scenes with equal cloud cover keep their order.
    pub fn clearest_on_top(&mut self) {
        self.scenes
            .sort_by(|a, b| b.cloud_cover().total_cmp(&a.cloud_cover()));
    }

    /// Collapse the group into one composite scene.
    pub fn mosaic(&self) -> Result<Scene> {
        super::mosaic(self)
    }

    pub fn into_scenes(self) -> Vec<Scene> {
        self.scenes
    }
}

/// Split scenes into groups by UTC acquisition date.
///
/// Groups are sorted by date; within a group the input order is kept.
pub fn group_by_date<I>(scenes: I) -> Vec<TileGroup>
where
    I: IntoIterator<Item = Scene>,
{
    let mut by_date: BTreeMap<NaiveDate, Vec<Scene>> = BTreeMap::new();
    for scene in scenes {
        by_date.entry(scene.date()).or_default().push(scene);
    }
    by_date
        .into_iter()
        .map(|(date, scenes)| TileGroup::new(date, scenes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use geospec_core::GeoTransform;

    fn scene(id: &str, day: u32, hour: u32, cloud: f64) -> Scene {
        Scene::new(
            id,
            (2, 2),
            GeoTransform::default(),
            Utc.with_ymd_and_hms(2023, 8, day, hour, 0, 0).unwrap(),
        )
        .with_cloud_cover(cloud)
    }

    fn ids(group: &TileGroup) -> Vec<&str> {
        group.scenes().iter().map(|s| s.id()).collect()
    }

    #[test]
    fn groups_sorted_by_date_with_input_order_kept() {
        let groups = group_by_date(vec![
            scene("b", 5, 11, 0.0),
            scene("x", 2, 9, 0.0),
            scene("a", 5, 10, 0.0),
            scene("c", 5, 12, 0.0),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date(), NaiveDate::from_ymd_opt(2023, 8, 2).unwrap());
        assert_eq!(ids(&groups[0]), ["x"]);
        assert_eq!(ids(&groups[1]), ["b", "a", "c"]);
    }

    #[test]
    fn clearest_scene_drawn_last() {
        let mut group = TileGroup::new(
            NaiveDate::from_ymd_opt(2023, 8, 5).unwrap(),
            vec![scene("clear", 5, 10, 2.0), scene("hazy", 5, 10, 40.0), scene("mid", 5, 10, 10.0)],
        );
        group.clearest_on_top();
        assert_eq!(ids(&group), ["hazy", "mid", "clear"]);
    }

    #[test]
    fn empty_input_gives_no_groups() {
        assert!(group_by_date(Vec::new()).is_empty());
    }
}

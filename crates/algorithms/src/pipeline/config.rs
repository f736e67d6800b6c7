//! Pipeline configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! index = "ndwi"
//! order = "clearest-on-top"
//!
//! [threshold]
//! value = 0.0
//! comparison = "greater-than"
//!
//! [region]
//! type = "bbox"
//! min_x = 500000.0
//! min_y = 4100000.0
//! max_x = 510000.0
//! max_y = 4110000.0
//!
//! [processing]
//! mode = "parallel-with"
//! threads = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::imagery::{RuleSet, SpectralIndex, ThresholdParams};
use geospec_core::{BBox, Error, Region, Result};
use geospec_parallel::ProcessingMode;

/// Region of interest as written in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegionConfig {
    #[default]
    Full,
    Bbox(BBox),
}

impl RegionConfig {
    pub fn to_region(&self) -> Region {
        match self {
            RegionConfig::Full => Region::Full,
            RegionConfig::Bbox(b) => Region::BBox(*b),
        }
    }
}

/// Draw order of the tiles of one date before mosaicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TileOrder {
    /// Order returned by the source
    #[default]
    Source,
    /// Least cloudy tile drawn last
    ClearestOnTop,
}

/// Everything the pipeline needs besides the source and the query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub index: SpectralIndex,
    pub order: TileOrder,
    /// Binary mask step, skipped when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<ThresholdParams>,
    /// Multi-class step, skipped when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleSet>,
    pub region: RegionConfig,
    pub processing: ProcessingMode,
}

impl PipelineConfig {
    pub fn new(index: SpectralIndex) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, params: ThresholdParams) -> Self {
        self.threshold = Some(params);
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_region(mut self, region: RegionConfig) -> Self {
        self.region = region;
        self
    }

    pub fn with_order(mut self, order: TileOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_processing(mut self, mode: ProcessingMode) -> Self {
        self.processing = mode;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check values that deserialize fine but cannot run.
    pub fn validate(&self) -> Result<()> {
        if let Some(t) = &self.threshold {
            if t.value.is_nan() {
                return Err(Error::Config("threshold value must be a number".into()));
            }
        }
        if let Some(rules) = &self.rules {
            rules.validate().map_err(|e| Error::Config(e.to_string()))?;
        }
        if let RegionConfig::Bbox(b) = &self.region {
            if !(b.min_x <= b.max_x && b.min_y <= b.max_y) {
                return Err(Error::Config(format!(
                    "region bbox is inverted: ({}, {}) .. ({}, {})",
                    b.min_x, b.min_y, b.max_x, b.max_y
                )));
            }
        }
        if self.processing == ProcessingMode::ParallelWith(0) {
            return Err(Error::Config("processing threads must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagery::{ClassRule, Comparison};
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.index, SpectralIndex::Ndvi);
        assert_eq!(config.processing, ProcessingMode::Parallel);
        assert!(config.threshold.is_none());
    }

    #[test]
    fn full_document() {
        let config = PipelineConfig::from_toml_str(
            r#"
            index = "ndwi"
            order = "clearest-on-top"

            [threshold]
            value = 0.1
            comparison = "less-or-equal"

            [rules]
            default_label = 0
            rules = [
                { lower = -1.0, upper = 0.0, label = 1 },
                { lower = 0.0, upper = 1.0, label = 2, upper_inclusive = true },
            ]

            [region]
            type = "bbox"
            min_x = 0.0
            min_y = 0.0
            max_x = 10.0
            max_y = 20.0

            [processing]
            mode = "parallel-with"
            threads = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.index, SpectralIndex::Ndwi);
        assert_eq!(config.order, TileOrder::ClearestOnTop);
        assert_eq!(
            config.threshold,
            Some(ThresholdParams {
                value: 0.1,
                comparison: Comparison::LessOrEqual
            })
        );
        let rules = config.rules.unwrap();
        assert_eq!(rules.rules[1], ClassRule::closed(0.0, 1.0, 2));
        assert_eq!(config.region.to_region(), Region::BBox(BBox::new(0.0, 0.0, 10.0, 20.0)));
        assert_eq!(config.processing, ProcessingMode::ParallelWith(2));
    }

    #[test]
    fn sequential_mode_and_one_sided_rule() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [rules]
            rules = [{ lower = 0.5, upper = inf, label = 3, upper_inclusive = true }]

            [processing]
            mode = "sequential"
            "#,
        )
        .unwrap();
        assert_eq!(config.processing, ProcessingMode::Sequential);
        assert_eq!(config.rules.unwrap().rules[0], ClassRule::above(0.5, 3));
    }

    #[test]
    fn unknown_index_is_config_error() {
        let err = PipelineConfig::from_toml_str(r#"index = "evi""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn inverted_rule_is_config_error() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [rules]
            rules = [{ lower = 1.0, upper = 0.0, label = 1 }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn inverted_bbox_is_config_error() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [region]
            type = "bbox"
            min_x = 5.0
            min_y = 0.0
            max_x = 1.0
            max_y = 1.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_threads_is_config_error() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [processing]
            mode = "parallel-with"
            threads = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "index = \"cmr\"").unwrap();
        writeln!(file, "[threshold]\nvalue = 1.2").unwrap();

        let config = PipelineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.index, SpectralIndex::Cmr);
        assert_eq!(config.threshold.unwrap().comparison, Comparison::GreaterThan);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn toml_round_trip() {
        let config = PipelineConfig::new(SpectralIndex::Ior)
            .with_threshold(ThresholdParams {
                value: 2.0,
                comparison: Comparison::GreaterOrEqual,
            })
            .with_processing(ProcessingMode::Sequential);
        let text = config.to_toml_string().unwrap();
        assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
    }
}

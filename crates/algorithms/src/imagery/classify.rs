//! Multi-class classification with ordered range rules
//!
//! Rules are applied in sequence and each match overwrites the pixel's
//! label, so for overlapping ranges the **last** matching rule wins. This is
//! the semantics of chaining conditional overwrites one after another, and
//! is deliberately different from a first-match lookup table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::maybe_rayon::*;
use geospec_core::raster::{IndexRaster, LabelRaster, RasterElement};
use geospec_core::{Algorithm, Error, Result};

/// Label given to pixels no rule matches.
pub const UNCLASSIFIED: i32 = 0;

/// One range rule: `lower <= value < upper` maps to `label`.
///
/// With `upper_inclusive` the range is closed, `lower <= value <= upper`.
/// Infinite bounds give one-sided rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRule {
    pub lower: f64,
    pub upper: f64,
    pub label: i32,
    #[serde(default)]
    pub upper_inclusive: bool,
}

impl ClassRule {
    /// Half-open rule `[lower, upper)`.
    pub fn new(lower: f64, upper: f64, label: i32) -> Self {
        Self {
            lower,
            upper,
            label,
            upper_inclusive: false,
        }
    }

    /// Closed rule `[lower, upper]`.
    pub fn closed(lower: f64, upper: f64, label: i32) -> Self {
        Self {
            upper_inclusive: true,
            ..Self::new(lower, upper, label)
        }
    }

    /// Rule matching every value at or above `threshold`.
    pub fn above(threshold: f64, label: i32) -> Self {
        Self {
            lower: threshold,
            upper: f64::INFINITY,
            label,
            upper_inclusive: true,
        }
    }

    pub fn matches(&self, value: f64) -> bool {
        let below_upper = if self.upper_inclusive {
            value <= self.upper
        } else {
            value < self.upper
        };
        value >= self.lower && below_upper
    }
}

/// Ordered rule sequence plus the label for unmatched pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<ClassRule>,
    #[serde(default)]
    pub default_label: i32,
    /// Optional human-readable class names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub names: BTreeMap<i32, String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default_label: UNCLASSIFIED,
            names: BTreeMap::new(),
        }
    }
}

impl RuleSet {
    pub fn new(rules: Vec<ClassRule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Append a rule; it takes precedence over every earlier rule.
    pub fn push(mut self, rule: ClassRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Attach a display name to a label.
    pub fn named(mut self, label: i32, name: impl Into<String>) -> Self {
        self.names.insert(label, name.into());
        self
    }

    pub fn with_default_label(mut self, label: i32) -> Self {
        self.default_label = label;
        self
    }

    pub fn name_of(&self, label: i32) -> Option<&str> {
        self.names.get(&label).map(String::as_str)
    }

    /// Label for one value: the last matching rule, else the default.
    pub fn label_for(&self, value: f64) -> i32 {
        self.rules
            .iter()
            .rev()
            .find(|r| r.matches(value))
            .map_or(self.default_label, |r| r.label)
    }

    /// Reject NaN bounds and inverted ranges.
    pub fn validate(&self) -> Result<()> {
        for (i, rule) in self.rules.iter().enumerate() {
            if rule.lower.is_nan() || rule.upper.is_nan() {
                return Err(Error::InvalidParameter {
                    name: "rules",
                    value: format!("rule {i}"),
                    reason: "bounds must not be NaN".into(),
                });
            }
            if rule.lower > rule.upper {
                return Err(Error::InvalidParameter {
                    name: "rules",
                    value: format!("rule {i}: [{}, {}]", rule.lower, rule.upper),
                    reason: "lower bound exceeds upper bound".into(),
                });
            }
        }
        Ok(())
    }
}

/// Classify an index raster with an ordered rule set.
///
/// The result is equivalent to starting from `default_label` everywhere and
/// applying each rule in sequence, overwriting matching pixels. No-data
/// pixels keep the default label.
///
/// # Example
/// ```
/// use geospec_algorithms::imagery::{classify, ClassRule, RuleSet};
/// use geospec_core::Raster;
///
/// let ndvi = Raster::from_vec(vec![0.7], 1, 1).unwrap();
/// let rules = RuleSet::new(vec![
///     ClassRule::closed(0.0, 1.0, 1),
///     ClassRule::closed(0.5, 1.0, 2),
/// ]);
/// assert_eq!(classify(&ndvi, &rules).unwrap().get(0, 0).unwrap(), 2);
/// ```
pub fn classify(index: &IndexRaster, rules: &RuleSet) -> Result<LabelRaster> {
    rules.validate()?;

    let (rows, cols) = index.shape();
    let view = index.view();
    let nodata = index.nodata();
    let default = rules.default_label;

    let data: Vec<i32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![default; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let v = view[(row, col)];
                if v.is_nodata(nodata) {
                    continue;
                }
                *out = rules.label_for(v);
            }
            row_data
        })
        .collect();

    debug!(rules = rules.rules.len(), "classified index raster");
    index.with_data(data, None)
}

/// Classification as a pipeline stage
#[derive(Debug, Clone, Default)]
pub struct Classifier;

impl Algorithm for Classifier {
    type Input = IndexRaster;
    type Output = LabelRaster;
    type Params = RuleSet;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Classifier"
    }

    fn description(&self) -> &'static str {
        "Class labels from ordered range rules, last matching rule wins"
    }

    fn execute(&self, input: IndexRaster, params: RuleSet) -> Result<LabelRaster> {
        classify(&input, &params)
    }
}

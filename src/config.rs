//! Cleaning thresholds.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Options shared by the single-set and joint cleaners.
///
/// Values are applied as plain comparisons and never validated: a negative
/// `minimum_length` turns the length check off, a zero threshold turns the
/// corresponding flatness signal off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "L: Serialize + Ord",
    deserialize = "L: Deserialize<'de> + Ord"
))]
pub struct CleaningConfig<L> {
    /// Curves shorter than this after dropping missing values are rejected.
    #[serde(default = "default_minimum_length")]
    pub minimum_length: i64,

    /// When set, only curves carrying one of these labels are considered.
    #[serde(default)]
    pub included_labels: Option<BTreeSet<L>>,

    /// Reject curves that [`is_flat`](crate::clean::is_flat).
    #[serde(default)]
    pub remove_flat: bool,

    /// Standard deviation below which a curve counts as flat.
    #[serde(default = "default_flat_std_threshold")]
    pub flat_std_threshold: f64,

    /// Value range (max - min) below which a curve counts as flat.
    #[serde(default = "default_flat_range_threshold")]
    pub flat_range_threshold: f64,
}

fn default_minimum_length() -> i64 {
    60
}

fn default_flat_std_threshold() -> f64 {
    1e-3
}

fn default_flat_range_threshold() -> f64 {
    1e-2
}

impl<L> Default for CleaningConfig<L> {
    fn default() -> Self {
        Self {
            minimum_length: default_minimum_length(),
            included_labels: None,
            remove_flat: false,
            flat_std_threshold: default_flat_std_threshold(),
            flat_range_threshold: default_flat_range_threshold(),
        }
    }
}

impl<L: Ord> CleaningConfig<L> {
    pub fn with_minimum_length(mut self, minimum_length: i64) -> Self {
        self.minimum_length = minimum_length;
        self
    }

    pub fn with_included_labels(mut self, labels: impl IntoIterator<Item = L>) -> Self {
        self.included_labels = Some(labels.into_iter().collect());
        self
    }

    pub fn with_remove_flat(mut self, remove_flat: bool) -> Self {
        self.remove_flat = remove_flat;
        self
    }

    pub fn with_flat_thresholds(mut self, std_threshold: f64, range_threshold: f64) -> Self {
        self.flat_std_threshold = std_threshold;
        self.flat_range_threshold = range_threshold;
        self
    }

    /// Whether a sample with this label takes part in cleaning at all.
    pub fn includes(&self, label: &L) -> bool {
        self.included_labels
            .as_ref()
            .map_or(true, |allowed| allowed.contains(label))
    }
}

impl<L: Ord + DeserializeOwned> CleaningConfig<L> {
    /// Read a config from a JSON object. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).context("parsing cleaning config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = CleaningConfig::<i64>::default();
        assert_eq!(cfg.minimum_length, 60);
        assert!(cfg.included_labels.is_none());
        assert!(!cfg.remove_flat);
        assert_eq!(cfg.flat_std_threshold, 1e-3);
        assert_eq!(cfg.flat_range_threshold, 1e-2);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: CleaningConfig<i64> =
            serde_json::from_str(r#"{ "remove_flat": true, "included_labels": [3, 1] }"#).unwrap();
        assert!(cfg.remove_flat);
        assert_eq!(cfg.minimum_length, 60);
        assert!(cfg.includes(&1));
        assert!(cfg.includes(&3));
        assert!(!cfg.includes(&2));
    }

    #[test]
    fn no_inclusion_set_admits_everything() {
        let cfg = CleaningConfig::<i64>::default();
        assert!(cfg.includes(&-42));
    }
}

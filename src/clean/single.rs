use serde::Serialize;

use super::validate::validate_curve;
use super::CleanStats;
use crate::config::CleaningConfig;
use crate::data::model::{Curve, Dataset};
use crate::error::PrepError;

/// Surviving curves (missing values removed) and their labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedSet<L> {
    pub curves: Vec<Curve>,
    pub labels: Vec<L>,
    pub stats: CleanStats,
}

impl<L> CleanedSet<L> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn into_dataset(self) -> Dataset<L> {
        Dataset {
            curves: self.curves,
            labels: self.labels,
        }
    }
}

/// Keep the samples whose label is included and whose curve passes
/// [`validate_curve`], in input order. Stored curves are the cleaned copies.
pub fn clean_curves<L>(
    curves: &[Curve],
    labels: &[L],
    config: &CleaningConfig<L>,
) -> Result<CleanedSet<L>, PrepError>
where
    L: Ord + Clone,
{
    PrepError::check_len("labels", curves.len(), labels.len())?;

    let mut stats = CleanStats::default();
    let mut kept_curves = Vec::new();
    let mut kept_labels = Vec::new();

    for (i, (curve, label)) in curves.iter().zip(labels).enumerate() {
        if !config.includes(label) {
            stats.excluded_label += 1;
            continue;
        }

        let check = validate_curve(curve, config);
        if let Some(rejection) = &check.rejection {
            log::trace!("sample {i}: {rejection}");
            stats.record(rejection);
            continue;
        }

        kept_curves.push(check.cleaned);
        kept_labels.push(label.clone());
    }
    stats.kept = kept_labels.len();

    log::debug!(
        "clean_curves: kept {}/{} (excluded label {}, too short {}, flat {})",
        stats.kept,
        curves.len(),
        stats.excluded_label,
        stats.too_short,
        stats.flat
    );

    Ok(CleanedSet {
        curves: kept_curves,
        labels: kept_labels,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn removes_nan_and_short_curves() {
        let curves = vec![vec![1.0, 2.0, 3.0, f64::NAN], vec![1.0], vec![1.0, 1.0, 1.0]];
        let cfg = CleaningConfig::default().with_minimum_length(2);

        let out = clean_curves(&curves, &[0, 1, 2], &cfg).unwrap();

        assert_eq!(out.curves, vec![vec![1.0, 2.0, 3.0], vec![1.0, 1.0, 1.0]]);
        assert_eq!(out.labels, vec![0, 2]);
        assert_eq!(
            out.stats,
            CleanStats {
                excluded_label: 0,
                too_short: 1,
                flat: 0,
                kept: 2
            }
        );
    }

    #[test]
    fn flat_filtering_keeps_the_ramp() {
        let curves = vec![vec![1.0; 100], linspace(100)];
        let cfg = CleaningConfig::default().with_remove_flat(true);

        let out = clean_curves(&curves, &[0, 1], &cfg).unwrap();

        assert_eq!(out.labels, vec![1]);
        assert_eq!(out.curves, vec![linspace(100)]);
        assert_eq!(out.stats.flat, 1);
    }

    #[test]
    fn all_nan_curve_is_dropped() {
        let out = clean_curves(&[vec![f64::NAN; 3]], &[0], &CleaningConfig::default()).unwrap();
        assert!(out.is_empty());
        assert!(out.curves.is_empty());
    }

    #[test]
    fn included_labels_restrict_output() {
        let ramp: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let cfg = CleaningConfig::default().with_included_labels([1]);

        let out = clean_curves(&[ramp.clone(), ramp], &[1, 2], &cfg).unwrap();

        assert_eq!(out.labels, vec![1]);
        assert_eq!(out.stats.excluded_label, 1);
        assert_eq!(out.stats.seen(), 2);
    }

    #[test]
    fn excluded_label_is_not_validated() {
        // the short curve is excluded by label, not counted as too short
        let cfg = CleaningConfig::default().with_included_labels([7]);
        let out = clean_curves(&[vec![1.0]], &[3], &cfg).unwrap();
        assert_eq!(out.stats.excluded_label, 1);
        assert_eq!(out.stats.too_short, 0);
    }

    #[test]
    fn order_is_preserved() {
        let cfg = CleaningConfig::default().with_minimum_length(1);
        let curves = vec![vec![3.0], vec![f64::NAN], vec![1.0], vec![2.0]];
        let out = clean_curves(&curves, &["c", "x", "a", "b"], &cfg).unwrap();
        assert_eq!(out.labels, vec!["c", "a", "b"]);
        assert_eq!(out.curves, vec![vec![3.0], vec![1.0], vec![2.0]]);
    }

    #[test]
    fn mismatched_labels_fail_fast() {
        let err = clean_curves(&[vec![1.0]], &[0, 1], &CleaningConfig::default()).unwrap_err();
        assert_eq!(
            err,
            PrepError::LengthMismatch {
                what: "labels",
                expected: 1,
                found: 2
            }
        );
    }
}

//! Relabeling samples from learner labels to coarse group names.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::data::model::{AlignedDatasets, Curve, GroupDefinitions, NameRegistry};
use crate::error::PrepError;

// ---------------------------------------------------------------------------
// GroupIndex – label → group, resolved once per call
// ---------------------------------------------------------------------------

/// Inverse lookup from label to group name.
///
/// Built by walking every group (in definition order) and every canonical name it
/// lists. A name resolves to the lowest registry label carrying it; names
/// missing from the registry are skipped. When one label is reachable from
/// several groups the group visited last wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIndex<L> {
    groups: BTreeMap<L, String>,
}

impl<L: Ord + Clone> GroupIndex<L> {
    pub fn build(registry: &NameRegistry<L>, groups: &GroupDefinitions) -> Self {
        // name → lowest label; the registry iterates in ascending label order
        let mut by_name: BTreeMap<&str, &L> = BTreeMap::new();
        for (label, name) in registry {
            by_name.entry(name.as_str()).or_insert(label);
        }

        let mut index = BTreeMap::new();
        for (group, members) in groups {
            for name in members {
                match by_name.get(name.as_str()) {
                    Some(label) => {
                        if let Some(prev) = index.insert((*label).clone(), group.clone()) {
                            if prev != *group {
                                log::debug!("learner '{name}' in '{prev}' and '{group}'");
                            }
                        }
                    }
                    None => log::trace!("group '{group}': no registry entry named '{name}'"),
                }
            }
        }

        Self { groups: index }
    }

    /// Group of `label`, if it has one.
    pub fn group_of(&self, label: &L) -> Option<&str> {
        self.groups.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Resolved `(label, group)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&L, &str)> {
        self.groups.iter().map(|(l, g)| (l, g.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Single set
// ---------------------------------------------------------------------------

/// Samples whose label belongs to a group, with that group alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouped<L> {
    /// Empty when the relabeling ran on labels alone.
    pub curves: Vec<Curve>,
    pub labels: Vec<L>,
    pub group_labels: Vec<String>,
}

/// Keep the samples whose label resolves to a group and attach the group name.
///
/// `curves` may be `None`, in which case only the labels are filtered and the
/// returned `curves` is empty. When present it must be as long as `labels`.
pub fn filter_by_group_definitions<L>(
    curves: Option<&[Curve]>,
    labels: &[L],
    groups: &GroupDefinitions,
    registry: &NameRegistry<L>,
) -> Result<Grouped<L>, PrepError>
where
    L: Ord + Clone,
{
    if let Some(curves) = curves {
        PrepError::check_len("labels", curves.len(), labels.len())?;
    }

    let index = GroupIndex::build(registry, groups);
    let mut out = Grouped {
        curves: Vec::new(),
        labels: Vec::new(),
        group_labels: Vec::new(),
    };

    for (i, label) in labels.iter().enumerate() {
        let Some(group) = index.group_of(label) else {
            continue;
        };
        if let Some(curves) = curves {
            out.curves.push(curves[i].clone());
        }
        out.labels.push(label.clone());
        out.group_labels.push(group.to_string());
    }

    log::debug!(
        "filter_by_group_definitions: {}/{} samples mapped onto {} groups",
        out.labels.len(),
        labels.len(),
        groups.len()
    );

    Ok(out)
}

// ---------------------------------------------------------------------------
// Aligned splits
// ---------------------------------------------------------------------------

/// Aligned splits restricted to grouped samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedAligned<L> {
    pub train: Vec<Curve>,
    pub valid: Vec<Curve>,
    pub test: Vec<Curve>,
    pub labels: Vec<L>,
    pub group_labels: Vec<String>,
}

/// Label-only counterpart of [`filter_by_group_definitions`] for aligned
/// splits: the three curves at a position are kept or dropped together
/// depending on the shared label. Curves are not validated here.
pub fn filter_by_group_definitions_together<L>(
    data: &AlignedDatasets<L>,
    groups: &GroupDefinitions,
    registry: &NameRegistry<L>,
) -> Result<GroupedAligned<L>, PrepError>
where
    L: Ord + Clone,
{
    data.check_alignment()?;

    let index = GroupIndex::build(registry, groups);
    let mut out = GroupedAligned {
        train: Vec::new(),
        valid: Vec::new(),
        test: Vec::new(),
        labels: Vec::new(),
        group_labels: Vec::new(),
    };

    for (i, label) in data.labels.iter().enumerate() {
        if let Some(group) = index.group_of(label) {
            out.train.push(data.train[i].clone());
            out.valid.push(data.valid[i].clone());
            out.test.push(data.test[i].clone());
            out.labels.push(label.clone());
            out.group_labels.push(group.to_string());
        }
    }

    log::debug!(
        "filter_by_group_definitions_together: {}/{} samples grouped",
        out.labels.len(),
        data.len()
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(defs: &[(&str, Vec<&str>)]) -> GroupDefinitions {
        defs.iter()
            .map(|(g, names)| (g.to_string(), names.iter().map(|n| n.to_string()).collect()))
            .collect()
    }

    fn registry(entries: &[(i64, &str)]) -> NameRegistry<i64> {
        entries.iter().map(|(l, n)| (*l, n.to_string())).collect()
    }

    #[test]
    fn keeps_curves_whose_label_has_a_group() {
        let curves = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let defs = groups(&[("A", vec!["Alice"]), ("B", vec!["Bob"])]);
        let zoo = registry(&[(10, "Alice"), (20, "Charlie"), (30, "Bob")]);

        let out = filter_by_group_definitions(Some(curves.as_slice()), &[10, 20, 30], &defs, &zoo)
            .unwrap();

        assert_eq!(out.curves, vec![vec![1.0, 2.0], vec![5.0, 6.0]]);
        assert_eq!(out.labels, vec![10, 30]);
        assert_eq!(out.group_labels, vec!["A", "B"]);
    }

    #[test]
    fn unmatched_label_yields_nothing() {
        let curves: Vec<Curve> = vec![(0..10).map(|i| i as f64).collect()];
        let defs = groups(&[("A", vec!["Alice"])]);
        let zoo = registry(&[(10, "Bob")]);

        let out = filter_by_group_definitions(Some(curves.as_slice()), &[99], &defs, &zoo).unwrap();

        assert!(out.curves.is_empty());
        assert!(out.labels.is_empty());
        assert!(out.group_labels.is_empty());
    }

    #[test]
    fn labels_alone_are_still_filtered() {
        let defs = groups(&[("X", vec!["a"]), ("Y", vec!["b"])]);
        let zoo = registry(&[(1, "a"), (2, "c")]);

        let out = filter_by_group_definitions(None, &[1, 2], &defs, &zoo).unwrap();

        assert!(out.curves.is_empty());
        assert_eq!(out.labels, vec![1]);
        assert_eq!(out.group_labels, vec!["X"]);
    }

    #[test]
    fn duplicate_name_resolves_to_lowest_label() {
        let defs = groups(&[("trees", vec!["forest"])]);
        let zoo = registry(&[(7, "forest"), (3, "forest")]);

        let index = GroupIndex::build(&zoo, &defs);

        assert_eq!(index.group_of(&3), Some("trees"));
        assert_eq!(index.group_of(&7), None);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn later_group_wins_for_shared_member() {
        let defs = groups(&[("linear", vec!["ridge"]), ("boosted", vec!["ridge", "gbm"])]);
        let zoo = registry(&[(1, "ridge"), (2, "gbm")]);

        let index = GroupIndex::build(&zoo, &defs);

        // "boosted" is defined after "linear"
        assert_eq!(index.group_of(&1), Some("boosted"));
        assert_eq!(index.group_of(&2), Some("boosted"));
    }

    #[test]
    fn definition_order_beats_name_order() {
        let defs = groups(&[("zeta", vec!["ridge"]), ("alpha", vec!["ridge"])]);
        let zoo = registry(&[(1, "ridge")]);

        let out = filter_by_group_definitions(None, &[1], &defs, &zoo).unwrap();

        assert_eq!(out.group_labels, vec!["alpha"]);

        let reversed = groups(&[("alpha", vec!["ridge"]), ("zeta", vec!["ridge"])]);
        let out = filter_by_group_definitions(None, &[1], &reversed, &zoo).unwrap();
        assert_eq!(out.group_labels, vec!["zeta"]);
    }

    #[test]
    fn curve_label_length_mismatch_fails() {
        let defs = groups(&[("A", vec!["Alice"])]);
        let zoo = registry(&[(1, "Alice")]);
        let curves = vec![vec![1.0]];
        let err = filter_by_group_definitions(Some(curves.as_slice()), &[1, 1], &defs, &zoo)
            .unwrap_err();
        assert!(matches!(err, PrepError::LengthMismatch { .. }));
    }

    #[test]
    fn aligned_length_mismatch_fails() {
        let data = AlignedDatasets {
            train: vec![vec![1.0], vec![2.0]],
            valid: vec![vec![1.0], vec![2.0]],
            test: vec![vec![1.0]],
            labels: vec![10, 20],
        };
        let defs = groups(&[("A", vec!["Alice"])]);
        let zoo = registry(&[(10, "Alice")]);

        let err = filter_by_group_definitions_together(&data, &defs, &zoo).unwrap_err();

        assert_eq!(
            err,
            PrepError::LengthMismatch {
                what: "test curves",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn aligned_splits_follow_the_shared_label() {
        let data = AlignedDatasets::new(
            vec![vec![1.0], vec![2.0], vec![3.0]],
            vec![vec![f64::NAN], vec![20.0], vec![30.0]],
            vec![vec![100.0], vec![200.0], vec![300.0]],
            vec![10, 20, 30],
        )
        .unwrap();
        let defs = groups(&[("A", vec!["Alice"]), ("B", vec!["Bob"])]);
        let zoo = registry(&[(10, "Alice"), (20, "Charlie"), (30, "Bob")]);

        let out = filter_by_group_definitions_together(&data, &defs, &zoo).unwrap();

        assert_eq!(out.labels, vec![10, 30]);
        assert_eq!(out.group_labels, vec!["A", "B"]);
        assert_eq!(out.train, vec![vec![1.0], vec![3.0]]);
        assert_eq!(out.test, vec![vec![100.0], vec![300.0]]);
        // no curve validation: the NaN-only validation curve survives
        assert_eq!(out.valid.len(), 2);
        assert!(out.valid[0][0].is_nan());
    }
}

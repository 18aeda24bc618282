use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// One learning curve. Missing measurements are stored as `NaN`.
pub type Curve = Vec<f64>;

// ---------------------------------------------------------------------------
// Label – the category a curve came from
// ---------------------------------------------------------------------------

/// A curve label as read from disk: learner index or learner name.
///
/// The cleaning core is generic over any `Ord + Clone` label, this is just the
/// concrete type the loader and the command line work with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Integer(i64),
    Text(String),
}

// -- Manual Eq/Ord so we can put Label in BTreeMap / BTreeSet --

impl Eq for Label {}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Label::*;
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            // integers sort before names
            (Integer(_), Text(_)) => std::cmp::Ordering::Less,
            (Text(_), Integer(_)) => std::cmp::Ordering::Greater,
        }
    }
}

impl std::hash::Hash for Label {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Label::Integer(i) => i.hash(state),
            Label::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Integer(i) => write!(f, "{i}"),
            Label::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Label {
    fn from(i: i64) -> Self {
        Label::Integer(i)
    }
}

impl std::str::FromStr for Label {
    type Err = std::convert::Infallible;

    /// Integers become [`Label::Integer`], anything else a name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<i64>() {
            Ok(i) => Label::Integer(i),
            Err(_) => Label::Text(s.to_string()),
        })
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Lookup tables supplied by the caller
// ---------------------------------------------------------------------------

/// Label → canonical learner name.
///
/// Iterated in ascending label order; when several labels carry the same
/// name, the lowest label is the one a group lookup resolves to.
pub type NameRegistry<L> = BTreeMap<L, String>;

/// Group name → canonical learner names belonging to that group, in the
/// order the groups were defined. A learner listed in several groups ends up
/// in the one defined last.
pub type GroupDefinitions = Vec<(String, Vec<String>)>;

// ---------------------------------------------------------------------------
// Dataset – curves with one label each
// ---------------------------------------------------------------------------

/// An ordered collection of curves with a parallel label sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset<L> {
    pub curves: Vec<Curve>,
    pub labels: Vec<L>,
}

impl<L> Dataset<L> {
    /// Pair curves with labels, rejecting sequences of different length.
    pub fn new(curves: Vec<Curve>, labels: Vec<L>) -> Result<Self, PrepError> {
        PrepError::check_len("labels", curves.len(), labels.len())?;
        Ok(Self { curves, labels })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AlignedDatasets – train / validation / test sharing one index space
// ---------------------------------------------------------------------------

/// Three curve collections where position `i` is the same logical sample in
/// each split, described by a single shared label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedDatasets<L> {
    pub train: Vec<Curve>,
    pub valid: Vec<Curve>,
    pub test: Vec<Curve>,
    pub labels: Vec<L>,
}

impl<L> AlignedDatasets<L> {
    /// Build from raw sequences, checking every split is as long as `labels`.
    pub fn new(
        train: Vec<Curve>,
        valid: Vec<Curve>,
        test: Vec<Curve>,
        labels: Vec<L>,
    ) -> Result<Self, PrepError> {
        let aligned = Self {
            train,
            valid,
            test,
            labels,
        };
        aligned.check_alignment()?;
        Ok(aligned)
    }

    /// Number of aligned samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub(crate) fn check_alignment(&self) -> Result<(), PrepError> {
        let n = self.labels.len();
        PrepError::check_len("train curves", n, self.train.len())?;
        PrepError::check_len("validation curves", n, self.valid.len())?;
        PrepError::check_len("test curves", n, self.test.len())
    }
}

impl<L: PartialEq + fmt::Display> AlignedDatasets<L> {
    /// Join three separately loaded datasets. Their label sequences must be
    /// identical, position by position.
    pub fn from_datasets(
        train: Dataset<L>,
        valid: Dataset<L>,
        test: Dataset<L>,
    ) -> Result<Self, PrepError> {
        let n = train.labels.len();
        PrepError::check_len("validation labels", n, valid.labels.len())?;
        PrepError::check_len("test labels", n, test.labels.len())?;

        for (split, other) in [("validation", &valid.labels), ("test", &test.labels)] {
            if let Some(index) = train.labels.iter().zip(other).position(|(a, b)| a != b) {
                return Err(PrepError::LabelMismatch {
                    split,
                    index,
                    expected: train.labels[index].to_string(),
                    found: other[index].to_string(),
                });
            }
        }

        Self::new(train.curves, valid.curves, test.curves, train.labels)
    }
}

use serde::Serialize;

use super::validate::validate_curve;
use super::CleanStats;
use crate::config::CleaningConfig;
use crate::data::model::{AlignedDatasets, Curve};
use crate::error::PrepError;

/// Jointly cleaned train / validation / test curves, still index-aligned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedAligned<L> {
    pub train: Vec<Curve>,
    pub valid: Vec<Curve>,
    pub test: Vec<Curve>,
    pub labels: Vec<L>,
    pub stats: CleanStats,
}

impl<L> CleanedAligned<L> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn into_aligned(self) -> AlignedDatasets<L> {
        AlignedDatasets {
            train: self.train,
            valid: self.valid,
            test: self.test,
            labels: self.labels,
        }
    }
}

/// Clean three aligned splits at once.
///
/// Position `i` survives only if its label is included and each of
/// `train[i]`, `valid[i]` and `test[i]` passes [`validate_curve`] on its own
/// statistics. A failure in any split drops the position from all three, so
/// the outputs always have the same length. Each split keeps its own cleaned
/// curve.
pub fn clean_curves_together<L>(
    data: &AlignedDatasets<L>,
    config: &CleaningConfig<L>,
) -> Result<CleanedAligned<L>, PrepError>
where
    L: Ord + Clone,
{
    data.check_alignment()?;

    let mut stats = CleanStats::default();
    let mut out = CleanedAligned {
        train: Vec::new(),
        valid: Vec::new(),
        test: Vec::new(),
        labels: Vec::new(),
        stats: CleanStats::default(),
    };

    let samples = data
        .train
        .iter()
        .zip(&data.valid)
        .zip(&data.test)
        .zip(&data.labels)
        .enumerate();

    for (i, (((tr, va), te), label)) in samples {
        if !config.includes(label) {
            stats.excluded_label += 1;
            continue;
        }

        let tr = validate_curve(tr, config);
        let va = validate_curve(va, config);
        let te = validate_curve(te, config);

        // report the first split that failed
        let failed = [("train", &tr), ("valid", &va), ("test", &te)]
            .into_iter()
            .find_map(|(split, check)| check.rejection.map(|r| (split, r)));
        if let Some((split, rejection)) = failed {
            log::trace!("sample {i}: {split} curve {rejection}");
            stats.record(&rejection);
            continue;
        }

        out.train.push(tr.cleaned);
        out.valid.push(va.cleaned);
        out.test.push(te.cleaned);
        out.labels.push(label.clone());
    }
    stats.kept = out.labels.len();
    out.stats = stats;

    log::debug!(
        "clean_curves_together: kept {}/{} (excluded label {}, too short {}, flat {})",
        stats.kept,
        data.len(),
        stats.excluded_label,
        stats.too_short,
        stats.flat
    );

    Ok(out)
}

//! Cleaning layer: per-curve validation and the two dataset cleaners.
//!
//! ```text
//!   raw curve ──► strip_missing ──► length check ──► flatness check ──► CurveCheck
//!                                                                        │
//!        ┌─────────────────────────────────┬─────────────────────────────┘
//!        ▼                                 ▼
//!   ┌──────────────┐                   ┌───────────────────────┐
//!   │ clean_curves │  one Dataset      │ clean_curves_together │  train / valid / test,
//!   └──────────────┘                   └───────────────────────┘  valid in all three
//! ```

pub mod joint;
pub mod single;
pub mod validate;

pub use joint::{clean_curves_together, CleanedAligned};
pub use single::{clean_curves, CleanedSet};
pub use validate::{is_flat, strip_missing, validate_curve, CurveCheck, Rejection, Spread};

use serde::Serialize;

/// How many samples each cleaning stage let through or turned down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanStats {
    pub excluded_label: usize,
    pub too_short: usize,
    pub flat: usize,
    pub kept: usize,
}

impl CleanStats {
    pub(crate) fn record(&mut self, rejection: &Rejection) {
        match rejection {
            Rejection::TooShort { .. } => self.too_short += 1,
            Rejection::Flat { .. } => self.flat += 1,
        }
    }

    /// Samples looked at in total.
    pub fn seen(&self) -> usize {
        self.excluded_label + self.too_short + self.flat + self.kept
    }
}

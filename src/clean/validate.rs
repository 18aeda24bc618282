use std::fmt;

use crate::config::CleaningConfig;
use crate::data::model::Curve;

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// Copy of `curve` without its `NaN` entries, order preserved.
pub fn strip_missing(curve: &[f64]) -> Curve {
    curve.iter().copied().filter(|v| !v.is_nan()).collect()
}

// ---------------------------------------------------------------------------
// Flatness
// ---------------------------------------------------------------------------

/// Spread of a non-empty, `NaN`-free curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spread {
    /// Population standard deviation.
    pub std_dev: f64,
    /// `max - min`.
    pub range: f64,
}

impl Spread {
    /// `None` for an empty curve.
    pub fn of(curve: &[f64]) -> Option<Self> {
        if curve.is_empty() {
            return None;
        }
        let n = curve.len() as f64;
        let mean = curve.iter().sum::<f64>() / n;
        let variance = curve.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = curve
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        Some(Self {
            std_dev: variance.sqrt(),
            range: max - min,
        })
    }

    pub fn is_flat(&self, std_threshold: f64, range_threshold: f64) -> bool {
        self.std_dev < std_threshold || self.range < range_threshold
    }
}

/// A curve is flat when either its standard deviation or its range falls
/// strictly below the matching threshold.
///
/// Callers must length-check first; an empty curve is reported as not flat.
pub fn is_flat(curve: &[f64], std_threshold: f64, range_threshold: f64) -> bool {
    Spread::of(curve).is_some_and(|s| s.is_flat(std_threshold, range_threshold))
}

// ---------------------------------------------------------------------------
// Single-curve verdict
// ---------------------------------------------------------------------------

/// Why a curve was turned down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    TooShort { len: usize, minimum_length: i64 },
    Flat { std_dev: f64, range: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooShort {
                len,
                minimum_length,
            } => write!(f, "too short ({len} < {minimum_length})"),
            Rejection::Flat { std_dev, range } => {
                write!(f, "flat (std {std_dev:.2e}, range {range:.2e})")
            }
        }
    }
}

/// Outcome of [`validate_curve`]: the cleaned curve plus the reason it was
/// rejected, if it was.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveCheck {
    pub cleaned: Curve,
    pub rejection: Option<Rejection>,
}

impl CurveCheck {
    pub fn is_valid(&self) -> bool {
        self.rejection.is_none()
    }

    /// The cleaned curve if it was accepted.
    pub fn accepted(self) -> Option<Curve> {
        match self.rejection {
            None => Some(self.cleaned),
            Some(_) => None,
        }
    }
}

/// Strip missing values, then apply the length check and (when enabled) the
/// flatness check, stopping at the first failure.
pub fn validate_curve<L>(curve: &[f64], config: &CleaningConfig<L>) -> CurveCheck {
    let cleaned = strip_missing(curve);

    // usize -> i64 cannot overflow for any curve that fits in memory
    let len = cleaned.len();
    if (len as i64) < config.minimum_length {
        return CurveCheck {
            cleaned,
            rejection: Some(Rejection::TooShort {
                len,
                minimum_length: config.minimum_length,
            }),
        };
    }

    if config.remove_flat {
        if let Some(spread) = Spread::of(&cleaned) {
            if spread.is_flat(config.flat_std_threshold, config.flat_range_threshold) {
                return CurveCheck {
                    cleaned,
                    rejection: Some(Rejection::Flat {
                        std_dev: spread.std_dev,
                        range: spread.range,
                    }),
                };
            }
        }
    }

    CurveCheck {
        cleaned,
        rejection: None,
    }
}

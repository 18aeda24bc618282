use thiserror::Error;

/// Precondition failures of the cleaning core.
///
/// Rejected curves and unresolvable labels are never errors: they are simply
/// left out of the output. Only malformed inputs end up here.
#[derive(Debug, Error, PartialEq)]
pub enum PrepError {
    #[error("{what}: expected {expected} entries, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{split} label at position {index} is {found}, train has {expected}")]
    LabelMismatch {
        split: &'static str,
        index: usize,
        expected: String,
        found: String,
    },
}

impl PrepError {
    pub(crate) fn check_len(what: &'static str, expected: usize, found: usize) -> Result<(), Self> {
        if expected == found {
            Ok(())
        } else {
            Err(PrepError::LengthMismatch {
                what,
                expected,
                found,
            })
        }
    }
}

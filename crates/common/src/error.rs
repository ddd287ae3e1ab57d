use crate::types::Coordinate;

/// Broad classification of a [`CoreError`], used by callers to decide
/// between rejecting the request and retrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request referenced something outside the declared domain.
    Validation,
    /// A topology mutation lost a race on shared neighbour state. Retry.
    Conflict,
}

/// Errors shared by every warpspace crate.
///
/// Empty results (no route, nothing left to explore) are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("coordinate {0} is outside the declared domain")]
    OutOfDomain(Coordinate),
    #[error("no realized system at {0}")]
    UnknownSystem(Coordinate),
    #[error("system at {0} is not part of the gate network")]
    NotGated(Coordinate),
    #[error("no gate between {0} and {1}")]
    UnknownGate(Coordinate, Coordinate),
    #[error("tier {0} is outside 1..={max}", max = crate::MAX_TIER)]
    InvalidTier(u8),
    #[error("unknown race: {0}")]
    UnknownRace(String),
    #[error("unknown hull class: {0}")]
    UnknownHullClass(String),
    #[error("unknown direction: {0}")]
    UnknownDirection(String),
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
    #[error("expected topology version {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Conflict { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Validation,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_retryable_kind() {
        let err = CoreError::Conflict {
            expected: 3,
            actual: 4,
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("expected topology version 3"));
    }

    #[test]
    fn domain_errors_are_validation() {
        assert_eq!(
            CoreError::OutOfDomain(Coordinate::new(1, 2, 3)).kind(),
            ErrorKind::Validation
        );
        assert_eq!(CoreError::InvalidTier(9).kind(), ErrorKind::Validation);
        assert_eq!(
            CoreError::InvalidTier(9).to_string(),
            "tier 9 is outside 1..=5"
        );
    }
}

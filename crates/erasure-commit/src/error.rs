use eds_primitives::Axis;
use thiserror::Error;

/// Why a square could not be repaired.
#[derive(Debug, Error)]
pub enum RepairError {
    /// Not enough chunks are available to ever complete the square.
    #[error("failed to solve data square")]
    Unrepairable,
    /// A row's data does not match its committed root or its own parity.
    #[error("byzantine row: {0}")]
    ByzantineRow(usize),
    /// A column's data does not match its committed root or its own parity.
    #[error("byzantine column: {0}")]
    ByzantineColumn(usize),
    /// The supplied root of a fully known axis does not match its data.
    #[error("bad root input: {axis} {index}")]
    BadRootInput { axis: Axis, index: usize },
    /// The square or its roots have the wrong shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The codec failed for a reason other than missing shares.
    #[error("codec failure: {0:#}")]
    Codec(eyre::Report),
}

impl RepairError {
    pub fn byzantine(axis: Axis, index: usize) -> Self {
        match axis {
            Axis::Row => Self::ByzantineRow(index),
            Axis::Column => Self::ByzantineColumn(index),
        }
    }

    /// The axis blamed for the failure, if this is a byzantine error
    pub fn byzantine_axis(&self) -> Option<(Axis, usize)> {
        match self {
            Self::ByzantineRow(i) => Some((Axis::Row, *i)),
            Self::ByzantineColumn(i) => Some((Axis::Column, *i)),
            _ => None,
        }
    }

    pub fn is_byzantine(&self) -> bool {
        self.byzantine_axis().is_some()
    }
}

impl From<eyre::Report> for RepairError {
    fn from(report: eyre::Report) -> Self {
        Self::Codec(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(RepairError::ByzantineRow(3).to_string(), "byzantine row: 3");
        assert_eq!(
            RepairError::ByzantineColumn(1).to_string(),
            "byzantine column: 1"
        );
        assert_eq!(
            RepairError::BadRootInput {
                axis: Axis::Column,
                index: 2
            }
            .to_string(),
            "bad root input: column 2"
        );
        assert_eq!(
            RepairError::Unrepairable.to_string(),
            "failed to solve data square"
        );
    }

    #[test]
    fn test_byzantine_axis() {
        assert_eq!(
            RepairError::byzantine(Axis::Column, 4).byzantine_axis(),
            Some((Axis::Column, 4))
        );
        assert!(RepairError::byzantine(Axis::Row, 0).is_byzantine());
        assert!(!RepairError::Unrepairable.is_byzantine());
    }
}

//! Error types.
//!
//! `SnapshotError` and `ConfigError` are returned at the crate boundary.
//! `DeductionFault` never leaves a tier: it is logged and the offending
//! derivation is dropped, so an abnormal board degrades to "no move".

use crate::types::Coord;

/// Error building a [`Snapshot`](crate::snapshot::Snapshot) from flat arrays.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// One of the flat arrays does not cover `rows * cols` cells
    #[error("{name} array should have length {expected}, found {found}")]
    WrongLength {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// A visible value is neither `-1` (hidden) nor a count in `0..=8`
    #[error("cell ({row}, {col}) has invalid visible value {value}")]
    InvalidCell { row: usize, col: usize, value: i8 },
}

/// Error validating a [`SolverConfig`](crate::config::SolverConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("max_component_size must be at least 1")]
    ZeroComponentBound,
    /// Enumeration cost doubles per cell; larger bounds cannot finish a pass
    #[error("max_component_size {0} exceeds the tractable enumeration limit of {limit} cells", limit = crate::config::ENUMERATION_LIMIT)]
    ComponentBoundTooLarge(usize),
    #[error("max_passes must be at least 1")]
    ZeroPassBound,
}

/// A derivation that cannot hold on a well-formed minefield.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeductionFault {
    /// A constraint's remaining mine count falls outside `[0, |cells|]`
    #[error("constraint at {anchor:?} requires {required} mines among {cells} cells")]
    InconsistentConstraint {
        anchor: Coord,
        required: i64,
        cells: usize,
    },
    /// A pairwise difference `B - A` yields an out-of-range count
    #[error("subset of {subset:?} in {superset:?} leaves {required} mines for {cells} cells")]
    InconsistentDifference {
        subset: Coord,
        superset: Coord,
        required: i64,
        cells: usize,
    },
    /// A cell was concluded both safe and a mine in the same pass
    #[error("cell {0:?} concluded both safe and mined")]
    Contradiction(Coord),
    /// No assignment to a frontier component satisfies its constraints
    #[error("component of {0} cells has no consistent assignment")]
    Unsatisfiable(usize),
}

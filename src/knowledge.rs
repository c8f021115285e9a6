//! Knowledge base: the live constraint collection plus the cells proven
//! safe or mined during the current escalation pass.
//!
//! Constraints are re-derived from a fresh snapshot on every update rather
//! than patched, so nothing stale survives a move.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::error::DeductionFault;
use crate::snapshot::Snapshot;
use crate::types::{CellState, Coord, Move, NeighborCache};

/// A revealed number's outstanding obligation: exactly `required` of
/// `cells` are mines. Always `0 <= required <= cells.len()` and `cells` is
/// never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub anchor: Coord,
    pub cells: BTreeSet<Coord>,
    pub required: usize,
}

impl Constraint {
    /// Build a constraint, rejecting counts outside `[0, |cells|]`.
    pub fn new(anchor: Coord, cells: BTreeSet<Coord>, required: i64) -> Result<Self, DeductionFault> {
        if required < 0 || required as usize > cells.len() {
            return Err(DeductionFault::InconsistentConstraint {
                anchor,
                required,
                cells: cells.len(),
            });
        }
        Ok(Self { anchor, cells, required: required as usize })
    }

    /// Every member is safe.
    #[inline]
    pub fn all_safe(&self) -> bool {
        self.required == 0
    }

    /// Every member is a mine.
    #[inline]
    pub fn all_mines(&self) -> bool {
        self.required == self.cells.len()
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.all_safe() || self.all_mines()
    }

    /// Strict, non-empty subset test used by the pairwise tier.
    pub fn is_strict_subset_of(&self, other: &Constraint) -> bool {
        !self.cells.is_empty()
            && self.cells.len() < other.cells.len()
            && self.cells.is_subset(&other.cells)
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    constraints: BTreeMap<Coord, Constraint>,
    known_safe: BTreeSet<Coord>,
    known_mines: BTreeSet<Coord>,
    /// Moves for conclusions not yet handed to the caller, in conclusion order.
    pending: Vec<Move>,
    neighbors: Option<NeighborCache>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the constraint collection from `snapshot`.
    ///
    /// Every revealed number with at least one hidden neighbor yields a
    /// constraint owing `n - flagged neighbors` mines. Conclusions from the
    /// previous pass are dropped: their moves were already yielded.
    pub fn update(&mut self, snapshot: &Snapshot) {
        let nc = match self.neighbors.take() {
            Some(nc) if (nc.rows, nc.cols) == (snapshot.rows, snapshot.cols) => nc,
            _ => snapshot.neighbor_cache(),
        };

        self.constraints.clear();
        self.known_safe.clear();
        self.known_mines.clear();
        self.pending.clear();

        for (anchor, state) in snapshot.iter() {
            let CellState::Revealed(n) = state else { continue };

            let mut cells = BTreeSet::new();
            let mut flagged = 0i64;
            for &neighbor in nc.get(anchor) {
                match snapshot.get(neighbor) {
                    CellState::Hidden => {
                        cells.insert(neighbor);
                    }
                    CellState::Flagged => flagged += 1,
                    CellState::Revealed(_) => {}
                }
            }

            if cells.is_empty() {
                continue;
            }

            match Constraint::new(anchor, cells, n as i64 - flagged) {
                Ok(constraint) => {
                    self.constraints.insert(anchor, constraint);
                }
                Err(fault) => warn!("discarding constraint: {fault}"),
            }
        }

        self.neighbors = Some(nc);
        debug!(
            "knowledge base rebuilt: {} constraints over {}x{}",
            self.constraints.len(),
            snapshot.rows,
            snapshot.cols
        );
    }

    /// Drop every constraint and conclusion.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Constraints in ascending anchor order.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub fn constraint(&self, anchor: Coord) -> Option<&Constraint> {
        self.constraints.get(&anchor)
    }

    /// Insert a constraint directly, replacing any with the same anchor.
    /// Constraints with no cells are vacuous and ignored.
    pub fn insert(&mut self, constraint: Constraint) {
        if !constraint.cells.is_empty() {
            self.constraints.insert(constraint.anchor, constraint);
        }
    }

    pub fn remove(&mut self, anchor: Coord) -> Option<Constraint> {
        self.constraints.remove(&anchor)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Every hidden, unflagged cell named by at least one constraint.
    pub fn frontier(&self) -> BTreeSet<Coord> {
        self.constraints
            .values()
            .flat_map(|c| c.cells.iter().copied())
            .collect()
    }

    pub fn known_safe(&self) -> &BTreeSet<Coord> {
        &self.known_safe
    }

    pub fn known_mines(&self) -> &BTreeSet<Coord> {
        &self.known_mines
    }

    pub fn is_known(&self, at: Coord) -> bool {
        self.known_safe.contains(&at) || self.known_mines.contains(&at)
    }

    /// Record that `at` is a mine (`mine == true`) or safe.
    ///
    /// Returns `Ok(true)` when this is new information and a move was
    /// queued, `Ok(false)` when it was already known.
    pub fn conclude(&mut self, at: Coord, mine: bool) -> Result<bool, DeductionFault> {
        let (same, opposite) = if mine {
            (&mut self.known_mines, &self.known_safe)
        } else {
            (&mut self.known_safe, &self.known_mines)
        };
        if opposite.contains(&at) {
            return Err(DeductionFault::Contradiction(at));
        }
        if !same.insert(at) {
            return Ok(false);
        }
        self.pending.push(if mine { Move::flag(at) } else { Move::reveal(at) });
        Ok(true)
    }

    /// Hand over the queued moves.
    pub fn take_pending(&mut self) -> Vec<Move> {
        std::mem::take(&mut self.pending)
    }
}

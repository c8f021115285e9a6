//! Board snapshot reader.
//!
//! The board belongs to the external environment. Each update cycle copies
//! it into an immutable [`Snapshot`] so the deduction tiers never observe a
//! board that changes under them.

use crate::error::SnapshotError;
use crate::types::{CellState, Coord, NeighborCache};

/// Read access to an external board.
pub trait BoardView {
    fn rows(&self) -> usize;
    fn cols(&self) -> usize;
    fn cell(&self, at: Coord) -> CellState;
}

/// An owned copy of every cell's observable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<CellState>,
}

impl Snapshot {
    /// A board where nothing has been revealed or flagged yet.
    pub fn hidden(rows: usize, cols: usize) -> Self {
        Self { rows, cols, cells: vec![CellState::Hidden; rows * cols] }
    }

    /// Copy the current state of `board`.
    pub fn capture(board: &impl BoardView) -> Self {
        let rows = board.rows();
        let cols = board.cols();
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(board.cell(Coord::new(row, col)));
            }
        }
        Self { rows, cols, cells }
    }

    /// Build from the flat row-major encoding used on the JS side:
    /// `visible` holds `-1` for hidden or the revealed count, `flags` holds
    /// `0`/`1`.
    pub fn from_flat(
        rows: usize,
        cols: usize,
        visible: &[i8],
        flags: &[u8],
    ) -> Result<Self, SnapshotError> {
        let expected = rows * cols;
        if visible.len() != expected {
            return Err(SnapshotError::WrongLength { name: "visible", expected, found: visible.len() });
        }
        if flags.len() != expected {
            return Err(SnapshotError::WrongLength { name: "flags", expected, found: flags.len() });
        }

        let cells = visible
            .iter()
            .zip(flags)
            .enumerate()
            .map(|(idx, (&value, &flag))| {
                CellState::from_visible(value, flag != 0).ok_or(SnapshotError::InvalidCell {
                    row: idx / cols,
                    col: idx % cols,
                    value,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows, cols, cells })
    }

    #[inline(always)]
    pub fn get(&self, at: Coord) -> CellState {
        self.cells[at.row * self.cols + at.col]
    }

    #[inline(always)]
    pub fn in_bounds(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Mutable access for building test boards cell by cell.
    pub fn set(&mut self, at: Coord, state: CellState) {
        self.cells[at.row * self.cols + at.col] = state;
    }

    /// All coordinates in row-major order paired with their state.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &state)| (Coord::new(idx / self.cols, idx % self.cols), state))
    }

    /// True when no cell has been revealed or flagged.
    pub fn is_untouched(&self) -> bool {
        self.cells.iter().all(|state| state.is_hidden())
    }

    pub fn neighbor_cache(&self) -> NeighborCache {
        NeighborCache::new(self.rows, self.cols)
    }
}

impl BoardView for Snapshot {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn cell(&self, at: Coord) -> CellState {
        self.get(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flat_decodes_row_major() {
        let visible = [-1, 1, 0, -1, -1, 2];
        let flags = [0, 0, 0, 1, 0, 0];
        let snap = Snapshot::from_flat(2, 3, &visible, &flags).unwrap();

        assert_eq!(snap.get(Coord::new(0, 0)), CellState::Hidden);
        assert_eq!(snap.get(Coord::new(0, 1)), CellState::Revealed(1));
        assert_eq!(snap.get(Coord::new(1, 0)), CellState::Flagged);
        assert_eq!(snap.get(Coord::new(1, 2)), CellState::Revealed(2));
    }

    #[test]
    fn test_from_flat_rejects_bad_input() {
        assert_eq!(
            Snapshot::from_flat(2, 2, &[-1, -1, -1], &[0; 4]),
            Err(SnapshotError::WrongLength { name: "visible", expected: 4, found: 3 })
        );
        assert_eq!(
            Snapshot::from_flat(2, 2, &[-1; 4], &[0; 5]),
            Err(SnapshotError::WrongLength { name: "flags", expected: 4, found: 5 })
        );
        assert_eq!(
            Snapshot::from_flat(2, 2, &[-1, -1, 12, -1], &[0; 4]),
            Err(SnapshotError::InvalidCell { row: 1, col: 0, value: 12 })
        );
    }

    #[test]
    fn test_capture_copies_board() {
        let mut original = Snapshot::hidden(3, 2);
        original.set(Coord::new(2, 1), CellState::Revealed(0));
        let copy = Snapshot::capture(&original);
        original.set(Coord::new(0, 0), CellState::Flagged);

        assert_eq!(copy.get(Coord::new(2, 1)), CellState::Revealed(0));
        assert_eq!(copy.get(Coord::new(0, 0)), CellState::Hidden);
        assert!(!copy.is_untouched());
        assert!(Snapshot::hidden(4, 4).is_untouched());
    }

    #[test]
    fn test_iter_visits_every_cell_in_order() {
        let snap = Snapshot::hidden(2, 3);
        let coords: Vec<Coord> = snap.iter().map(|(at, _)| at).collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[4], Coord::new(1, 1));
        assert!(snap.in_bounds(Coord::new(1, 2)));
        assert!(!snap.in_bounds(Coord::new(2, 0)));
    }
}

//! Core data types for the deduction engine.
//!
//! Coordinates are `(row, col)`, 0-indexed. Flat grid storage is row-major:
//! `cells[row * cols + col]`.

use serde::{Deserialize, Serialize};

/// A cell position. Ordering is row first, then column, which is the
/// order every tier emits its moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[inline(always)]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Coord {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// What the solver can observe about a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    /// Revealed, showing the number of adjacent mines.
    Revealed(u8),
    Flagged,
}

impl CellState {
    /// Decode the JS-side encoding: `-1` hidden, `0..=8` revealed.
    /// A set flag wins over the visible value.
    pub fn from_visible(value: i8, flagged: bool) -> Option<Self> {
        match (value, flagged) {
            (_, true) => Some(CellState::Flagged),
            (-1, false) => Some(CellState::Hidden),
            (n @ 0..=8, false) => Some(CellState::Revealed(n as u8)),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn is_hidden(self) -> bool {
        matches!(self, CellState::Hidden)
    }
}

/// A move intent for the game engine: reveal the cell, or flag it when
/// `flag` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
    pub flag: bool,
}

impl Move {
    pub const fn reveal(at: Coord) -> Self {
        Self { row: at.row, col: at.col, flag: false }
    }

    pub const fn flag(at: Coord) -> Self {
        Self { row: at.row, col: at.col, flag: true }
    }

    pub const fn coord(self) -> Coord {
        Coord::new(self.row, self.col)
    }
}

impl From<Move> for (usize, usize, bool) {
    fn from(mv: Move) -> Self {
        (mv.row, mv.col, mv.flag)
    }
}

impl From<(usize, usize, bool)> for Move {
    fn from((row, col, flag): (usize, usize, bool)) -> Self {
        Self { row, col, flag }
    }
}

/// Pre-computed neighbor cache for all cells.
///
/// Stores the 8-directional neighbors (clipped to grid bounds) for every cell.
/// Indexed by `row * cols + col`, each entry is a slice of coordinates in
/// ascending order.
#[derive(Debug, Clone)]
pub struct NeighborCache {
    pub rows: usize,
    pub cols: usize,
    /// Flat storage of all neighbors.
    data: Vec<Coord>,
    /// offsets[i] = start index in `data` for cell i.
    /// offsets[i+1] - offsets[i] = number of neighbors for cell i.
    offsets: Vec<usize>,
}

impl NeighborCache {
    /// Build the neighbor cache for a grid of the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        let total = rows * cols;
        let mut data = Vec::with_capacity(total * 8);
        let mut offsets = Vec::with_capacity(total + 1);

        for row in 0..rows {
            for col in 0..cols {
                offsets.push(data.len());
                for dr in -1i64..=1 {
                    for dc in -1i64..=1 {
                        if dr == 0 && dc == 0 {
                            continue;
                        }
                        let nr = row as i64 + dr;
                        let nc = col as i64 + dc;
                        if nr >= 0 && nr < rows as i64 && nc >= 0 && nc < cols as i64 {
                            data.push(Coord::new(nr as usize, nc as usize));
                        }
                    }
                }
            }
        }
        offsets.push(data.len()); // sentinel

        Self { rows, cols, data, offsets }
    }

    /// Get the pre-computed neighbors for `at`.
    #[inline(always)]
    pub fn get(&self, at: Coord) -> &[Coord] {
        let idx = at.row * self.cols + at.col;
        &self.data[self.offsets[idx]..self.offsets[idx + 1]]
    }
}

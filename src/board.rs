//! Reference minefield.
//!
//! The authoritative board normally belongs to the game engine. This one
//! stands in for it when the solver has to be driven end to end: no-guess
//! board generation, solvability checks and the randomized soundness tests.

use crate::rng::GameRng;
use crate::snapshot::BoardView;
use crate::types::{CellState, Coord, Move, NeighborCache};

/// Result of applying a [`Move`] to a [`Minefield`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Number of cells uncovered, including flood-filled zeros.
    Revealed(usize),
    Flagged,
    /// A mine was revealed; the game is lost.
    Exploded,
    /// The target was already revealed or flagged, or out of bounds.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Minefield {
    rows: usize,
    cols: usize,
    mines: Vec<bool>,
    /// Adjacent mine count per cell. Mine cells hold 0.
    numbers: Vec<u8>,
    state: Vec<CellState>,
    exploded: bool,
    nc: NeighborCache,
}

impl Minefield {
    /// Build a board with mines at exactly `mines`.
    pub fn from_mines(rows: usize, cols: usize, mines: &[Coord]) -> Self {
        let mut layout = vec![false; rows * cols];
        for at in mines {
            if at.row < rows && at.col < cols {
                layout[at.row * cols + at.col] = true;
            }
        }
        Self::from_layout(rows, cols, layout)
    }

    /// Place `mine_count` mines at random, keeping every cell within
    /// `safe_radius` (Chebyshev distance) of `start` clear.
    pub fn random(
        rows: usize,
        cols: usize,
        mine_count: usize,
        start: Coord,
        safe_radius: usize,
        rng: &mut GameRng,
    ) -> Self {
        let mut layout = vec![false; rows * cols];
        let mut placed = 0;
        let mut attempts = 0;
        let max_placement_attempts = 100_000;

        while placed < mine_count && attempts < max_placement_attempts {
            attempts += 1;
            let at = rng.coord(rows, cols);

            if at.row.abs_diff(start.row) <= safe_radius && at.col.abs_diff(start.col) <= safe_radius {
                continue;
            }

            let idx = at.row * cols + at.col;
            if !layout[idx] {
                layout[idx] = true;
                placed += 1;
            }
        }

        Self::from_layout(rows, cols, layout)
    }

    fn from_layout(rows: usize, cols: usize, mines: Vec<bool>) -> Self {
        let nc = NeighborCache::new(rows, cols);
        let numbers = calculate_numbers(rows, cols, &mines, &nc);
        Self {
            rows,
            cols,
            mines,
            numbers,
            state: vec![CellState::Hidden; rows * cols],
            exploded: false,
            nc,
        }
    }

    #[inline(always)]
    fn idx(&self, at: Coord) -> usize {
        at.row * self.cols + at.col
    }

    #[inline(always)]
    pub fn in_bounds(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    pub fn is_mine(&self, at: Coord) -> bool {
        self.mines[self.idx(at)]
    }

    /// Adjacent mine count of `at`.
    pub fn number(&self, at: Coord) -> u8 {
        self.numbers[self.idx(at)]
    }

    pub fn mine_count(&self) -> usize {
        self.mines.iter().filter(|&&m| m).count()
    }

    pub fn revealed_count(&self) -> usize {
        self.state.iter().filter(|s| matches!(s, CellState::Revealed(_))).count()
    }

    pub fn is_lost(&self) -> bool {
        self.exploded
    }

    /// Every safe cell is revealed and no mine went off.
    pub fn is_won(&self) -> bool {
        !self.exploded && self.revealed_count() == self.rows * self.cols - self.mine_count()
    }

    /// Apply a reveal or flag.
    pub fn apply(&mut self, mv: Move) -> MoveOutcome {
        let at = mv.coord();
        if !self.in_bounds(at) || !self.state[self.idx(at)].is_hidden() {
            return MoveOutcome::Ignored;
        }

        if mv.flag {
            let idx = self.idx(at);
            self.state[idx] = CellState::Flagged;
            return MoveOutcome::Flagged;
        }

        if self.is_mine(at) {
            self.exploded = true;
            return MoveOutcome::Exploded;
        }

        MoveOutcome::Revealed(self.reveal(at))
    }

    /// Reveal `at`, flood-filling through zeros. Flagged cells are left alone.
    fn reveal(&mut self, at: Coord) -> usize {
        let mut stack = vec![at];
        let mut revealed = 0;

        while let Some(cell) = stack.pop() {
            let idx = self.idx(cell);
            if !self.state[idx].is_hidden() || self.mines[idx] {
                continue;
            }

            let n = self.numbers[idx];
            self.state[idx] = CellState::Revealed(n);
            revealed += 1;

            if n == 0 {
                stack.extend_from_slice(self.nc.get(cell));
            }
        }

        revealed
    }

    /// Hide every cell again, keeping the same mine layout.
    pub fn replay(&mut self) {
        self.state.iter_mut().for_each(|s| *s = CellState::Hidden);
        self.exploded = false;
    }
}

impl BoardView for Minefield {
    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn cell(&self, at: Coord) -> CellState {
        self.state[self.idx(at)]
    }
}

/// Neighbor mine counts for every non-mine cell. Mine cells get 0.
fn calculate_numbers(rows: usize, cols: usize, mines: &[bool], nc: &NeighborCache) -> Vec<u8> {
    let mut numbers = vec![0u8; rows * cols];
    for row in 0..rows {
        for col in 0..cols {
            let idx = row * cols + col;
            if mines[idx] {
                continue;
            }
            numbers[idx] = nc
                .get(Coord::new(row, col))
                .iter()
                .filter(|n| mines[n.row * cols + n.col])
                .count() as u8;
        }
    }
    numbers
}

/// Result of a no-guess board generation attempt.
pub struct BoardResult {
    pub field: Minefield,
    /// How many random layouts were tried.
    pub attempts: u32,
    /// True if a solvable board was found within `max_attempts`.
    pub success: bool,
}

/// Generate a board that `is_solvable_fn` accepts from `start`, retrying
/// random layouts up to `max_attempts` times. On failure the last layout is
/// returned.
pub fn generate_solvable_board<F>(
    rows: usize,
    cols: usize,
    mine_count: usize,
    start: Coord,
    safe_radius: usize,
    max_attempts: u32,
    rng: &mut GameRng,
    is_solvable_fn: F,
) -> BoardResult
where
    F: Fn(&Minefield, Coord) -> bool,
{
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let field = Minefield::random(rows, cols, mine_count, start, safe_radius, rng);

        if is_solvable_fn(&field, start) {
            return BoardResult { field, attempts, success: true };
        }
        if attempts >= max_attempts {
            return BoardResult { field, attempts, success: false };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_places_requested_count() {
        let mut rng = GameRng::from_seed(42);
        let field = Minefield::random(16, 30, 99, Coord::new(8, 15), 1, &mut rng);
        assert_eq!(field.mine_count(), 99);
    }

    #[test]
    fn test_random_keeps_safe_zone_clear() {
        let mut rng = GameRng::from_seed(42);
        let field = Minefield::random(10, 10, 20, Coord::new(5, 5), 2, &mut rng);
        for row in 3..=7 {
            for col in 3..=7 {
                assert!(!field.is_mine(Coord::new(row, col)), "mine in safe zone at ({row}, {col})");
            }
        }
        assert_eq!(field.mine_count(), 20);
    }

    #[test]
    fn test_numbers_around_centre_mine() {
        let field = Minefield::from_mines(3, 3, &[Coord::new(1, 1)]);
        for row in 0..3 {
            for col in 0..3 {
                if (row, col) != (1, 1) {
                    assert_eq!(field.number(Coord::new(row, col)), 1);
                }
            }
        }
    }

    #[test]
    fn test_reveal_flood_fills_zeros() {
        let mut field = Minefield::from_mines(3, 3, &[Coord::new(2, 2)]);
        let outcome = field.apply(Move::reveal(Coord::new(0, 0)));
        assert_eq!(outcome, MoveOutcome::Revealed(8));
        assert!(field.is_won());
        assert_eq!(field.cell(Coord::new(2, 2)), CellState::Hidden);
        assert_eq!(field.cell(Coord::new(1, 1)), CellState::Revealed(1));
    }

    #[test]
    fn test_flag_and_explode() {
        let mut field = Minefield::from_mines(2, 2, &[Coord::new(0, 0)]);
        assert_eq!(field.apply(Move::flag(Coord::new(0, 0))), MoveOutcome::Flagged);
        assert_eq!(field.apply(Move::reveal(Coord::new(0, 0))), MoveOutcome::Ignored);
        assert_eq!(field.cell(Coord::new(0, 0)), CellState::Flagged);

        let mut field = Minefield::from_mines(2, 2, &[Coord::new(0, 0)]);
        assert_eq!(field.apply(Move::reveal(Coord::new(0, 0))), MoveOutcome::Exploded);
        assert!(field.is_lost());
        assert!(!field.is_won());
    }

    #[test]
    fn test_replay_restores_hidden_board() {
        let mut field = Minefield::from_mines(3, 3, &[Coord::new(2, 2)]);
        field.apply(Move::reveal(Coord::new(0, 0)));
        field.replay();
        assert_eq!(field.revealed_count(), 0);
        assert!(field.is_mine(Coord::new(2, 2)));
    }

    #[test]
    fn test_generate_solvable_board_accepting() {
        let mut rng = GameRng::from_seed(1);
        let result = generate_solvable_board(5, 5, 3, Coord::new(2, 2), 1, 100, &mut rng, |_, _| true);
        assert!(result.success);
        assert_eq!(result.attempts, 1);
        assert_eq!(result.field.mine_count(), 3);
    }

    #[test]
    fn test_generate_solvable_board_rejecting() {
        let mut rng = GameRng::from_seed(1);
        let result = generate_solvable_board(5, 5, 3, Coord::new(2, 2), 1, 10, &mut rng, |_, _| false);
        assert!(!result.success);
        assert_eq!(result.attempts, 10);
    }
}

//! Logical Minesweeper deduction engine.
//!
//! Given what is currently visible on a board, infers which hidden cells are
//! provably safe or provably mines and emits `(row, col, flag)` moves for a
//! game engine to apply. Reasoning escalates through three tiers: direct
//! constraints, pairwise subset elimination and bounded exhaustive
//! enumeration of frontier components. The engine never guesses.
//!
//! Flat grid data crossing the JS boundary is row-major:
//! `cells[row * cols + col]`.

pub mod board;
pub mod config;
pub mod enumeration;
pub mod error;
pub mod knowledge;
pub mod rng;
pub mod snapshot;
pub mod solver;
pub mod types;

pub use config::SolverConfig;
pub use error::{ConfigError, DeductionFault, SnapshotError};
pub use knowledge::{Constraint, KnowledgeBase};
pub use snapshot::{BoardView, Snapshot};
pub use solver::{Deduction, Moves, Phase, Solver, Tier};
pub use types::{CellState, Coord, Move};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use wasm_bindgen::prelude::*;

    use crate::board::Minefield;
    use crate::snapshot::Snapshot;
    use crate::solver::{self, Solver};
    use crate::types::Coord;

    /// Deduce moves for the given visible state.
    ///
    /// `tier` 1-3 runs only that tier; any other value runs a full
    /// escalation pass. Returns an array of `{ row, col, flag }`.
    #[wasm_bindgen(js_name = "deduceMoves")]
    pub fn wasm_deduce_moves(
        rows: usize,
        cols: usize,
        visible_flat: &[i8],
        flags_flat: &[u8],
        tier: u8,
    ) -> Result<JsValue, JsValue> {
        let snapshot = Snapshot::from_flat(rows, cols, visible_flat, flags_flat)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut solver = Solver::new();

        let moves: Vec<_> = match tier {
            1..=3 => {
                solver.update_from_snapshot(&snapshot);
                match tier {
                    1 => solver.make_safe_moves().collect(),
                    2 => solver.make_advanced_tier1_moves().collect(),
                    _ => solver.make_advanced_tier2_moves().collect(),
                }
            }
            _ => solver.next_moves(&snapshot).moves,
        };

        serde_wasm_bindgen::to_value(&moves).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Check if a board is solvable without guessing.
    /// Returns JS object: `{ solvable: bool, mineCount: u32 }`
    #[wasm_bindgen(js_name = "isSolvable")]
    pub fn wasm_is_solvable(
        rows: usize,
        cols: usize,
        mines_flat: &[u8],
        start_row: usize,
        start_col: usize,
    ) -> Result<JsValue, JsValue> {
        if mines_flat.len() != rows * cols {
            return Err(JsValue::from_str("mines array does not match board size"));
        }
        let mines: Vec<Coord> = mines_flat
            .iter()
            .enumerate()
            .filter(|&(_, &m)| m != 0)
            .map(|(idx, _)| Coord::new(idx / cols, idx % cols))
            .collect();
        let field = Minefield::from_mines(rows, cols, &mines);
        let solvable = solver::is_solvable(&field, Coord::new(start_row, start_col));

        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"solvable".into(), &solvable.into())?;
        js_sys::Reflect::set(&obj, &"mineCount".into(), &(mines.len() as u32).into())?;
        Ok(obj.into())
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM deducer ready".to_string()
    }
}

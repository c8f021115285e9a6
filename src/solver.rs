//! Minesweeper deduction: tiered strategies and the escalation controller.
//!
//! - Tier 1: direct constraints (`required == 0` or `required == |cells|`)
//! - Tier 2: pairwise subset elimination
//! - Tier 3: grouped exhaustive enumeration (in `enumeration.rs`)
//! - [`Solver`]: runs the tiers cheapest first, restarting from a fresh
//!   knowledge base whenever one of them yields a move
//! - [`solve_to_fixpoint`] / [`is_solvable`]: drive a [`Minefield`] to the
//!   end without guessing

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::board::{Minefield, MoveOutcome};
use crate::config::SolverConfig;
use crate::enumeration;
use crate::error::{ConfigError, DeductionFault};
use crate::knowledge::KnowledgeBase;
use crate::snapshot::{BoardView, Snapshot};
use crate::types::{Coord, Move};

/// Largest anchor distance at which two constraints can overlap.
const OVERLAP_RADIUS: usize = 2;

// ─── Strategy 1: Direct constraints ─────────────────────────────────────────

/// Resolve every constraint whose count fixes all its cells, removing it
/// from `kb`. Conclusions are queued in ascending anchor order, then
/// ascending cell order. Returns the number of new conclusions.
pub fn apply_direct_constraints(kb: &mut KnowledgeBase) -> usize {
    let resolved: Vec<Coord> = kb
        .constraints()
        .filter(|c| c.is_resolved())
        .map(|c| c.anchor)
        .collect();

    let mut concluded = 0;
    for anchor in resolved {
        let Some(constraint) = kb.remove(anchor) else { continue };
        let mine = constraint.all_mines();
        for &at in &constraint.cells {
            match kb.conclude(at, mine) {
                Ok(true) => concluded += 1,
                Ok(false) => {}
                Err(fault) => warn!("skipping direct conclusion from {anchor:?}: {fault}"),
            }
        }
    }
    concluded
}

// ─── Strategy 2: Subset logic ───────────────────────────────────────────────

/// For each ordered pair `(A, B)` with `A.cells` a strict subset of
/// `B.cells`, the cells of `B - A` hold exactly `B.required - A.required`
/// mines. Differences that fix every cell are concluded; the rest are
/// dropped. Returns the number of new conclusions.
pub fn apply_subset_logic(kb: &mut KnowledgeBase) -> usize {
    let constraints: Vec<_> = kb.constraints().cloned().collect();
    let mut concluded = 0;

    for a in &constraints {
        for b in &constraints {
            if a.anchor == b.anchor
                || a.anchor.row.abs_diff(b.anchor.row) > OVERLAP_RADIUS
                || a.anchor.col.abs_diff(b.anchor.col) > OVERLAP_RADIUS
                || !a.is_strict_subset_of(b)
            {
                continue;
            }

            let diff: BTreeSet<Coord> = b.cells.difference(&a.cells).copied().collect();
            let required = b.required as i64 - a.required as i64;
            if required < 0 || required as usize > diff.len() {
                warn!(
                    "{}",
                    DeductionFault::InconsistentDifference {
                        subset: a.anchor,
                        superset: b.anchor,
                        required,
                        cells: diff.len(),
                    }
                );
                continue;
            }

            let mine = if required == 0 {
                false
            } else if required as usize == diff.len() {
                true
            } else {
                continue;
            };

            for at in diff {
                match kb.conclude(at, mine) {
                    Ok(true) => concluded += 1,
                    Ok(false) => {}
                    Err(fault) => warn!("skipping subset conclusion from {:?}: {fault}", b.anchor),
                }
            }
        }
    }
    concluded
}

// ─── Escalation controller ──────────────────────────────────────────────────

/// The deduction strategy that produced a batch of moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Direct,
    Pairwise,
    Enumeration,
}

/// Where an escalation pass currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Updating,
    Tier1,
    Tier2,
    Tier3,
}

impl Phase {
    /// Transition after finishing the current phase. `produced` is whether
    /// that phase yielded any move; a productive tier restarts the pass.
    pub fn next(self, produced: bool) -> Phase {
        match self {
            Phase::Idle => Phase::Updating,
            Phase::Updating => Phase::Tier1,
            Phase::Tier1 | Phase::Tier2 | Phase::Tier3 if produced => Phase::Updating,
            Phase::Tier1 => Phase::Tier2,
            Phase::Tier2 => Phase::Tier3,
            Phase::Tier3 => Phase::Idle,
        }
    }

    fn tier(self) -> Option<Tier> {
        match self {
            Phase::Tier1 => Some(Tier::Direct),
            Phase::Tier2 => Some(Tier::Pairwise),
            Phase::Tier3 => Some(Tier::Enumeration),
            Phase::Idle | Phase::Updating => None,
        }
    }
}

/// A finite batch of moves from one tier call.
#[derive(Debug, Clone)]
pub struct Moves {
    inner: std::vec::IntoIter<Move>,
}

impl Moves {
    fn new(moves: Vec<Move>) -> Self {
        Self { inner: moves.into_iter() }
    }
}

impl Iterator for Moves {
    type Item = Move;

    fn next(&mut self) -> Option<Move> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Moves {}

/// Result of one escalation pass. An empty deduction means no tier could
/// make progress; choosing a fallback is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Deduction {
    pub tier: Option<Tier>,
    pub moves: Vec<Move>,
}

impl Deduction {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Counters for the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverStats {
    pub passes: usize,
    pub direct_moves: usize,
    pub pairwise_moves: usize,
    pub enumeration_moves: usize,
    /// Times the current game has been replayed from the start.
    pub replays: usize,
}

impl SolverStats {
    pub fn total_moves(&self) -> usize {
        self.direct_moves + self.pairwise_moves + self.enumeration_moves
    }

    fn record(&mut self, tier: Tier, count: usize) {
        match tier {
            Tier::Direct => self.direct_moves += count,
            Tier::Pairwise => self.pairwise_moves += count,
            Tier::Enumeration => self.enumeration_moves += count,
        }
    }
}

/// Escalation controller. Owns the knowledge base; reads the board only
/// through snapshots.
#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
    kb: KnowledgeBase,
    phase: Phase,
    first_click: bool,
    stats: SolverStats,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self {
            config: SolverConfig::default(),
            kb: KnowledgeBase::new(),
            phase: Phase::Idle,
            first_click: true,
            stats: SolverStats::default(),
        }
    }

    pub fn with_config(config: SolverConfig) -> Result<Self, ConfigError> {
        Ok(Self { config: config.validate()?, ..Self::new() })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// True until the first move of the current game. While set there is
    /// no information to deduce from, so the caller must pick the opening
    /// move itself.
    pub fn first_click(&self) -> bool {
        self.first_click
    }

    /// Tell the solver the caller applied a move it chose itself.
    pub fn record_move(&mut self) {
        self.first_click = false;
    }

    /// Rebuild the knowledge base from a copy of `board`.
    pub fn update_knowledge_base(&mut self, board: &impl BoardView) {
        self.update_from_snapshot(&Snapshot::capture(board));
    }

    pub fn update_from_snapshot(&mut self, snapshot: &Snapshot) {
        self.kb.update(snapshot);
    }

    /// Tier 1 moves against the last update.
    pub fn make_safe_moves(&mut self) -> Moves {
        apply_direct_constraints(&mut self.kb);
        self.yield_moves(Tier::Direct)
    }

    /// Tier 2 moves against the last update.
    pub fn make_advanced_tier1_moves(&mut self) -> Moves {
        apply_subset_logic(&mut self.kb);
        self.yield_moves(Tier::Pairwise)
    }

    /// Tier 3 moves against the last update.
    pub fn make_advanced_tier2_moves(&mut self) -> Moves {
        enumeration::deduce(&mut self.kb, self.config.max_component_size);
        self.yield_moves(Tier::Enumeration)
    }

    fn yield_moves(&mut self, tier: Tier) -> Moves {
        let moves = self.kb.take_pending();
        debug!("{tier:?} tier produced {} moves", moves.len());
        if !moves.is_empty() {
            self.first_click = false;
            self.stats.record(tier, moves.len());
        }
        Moves::new(moves)
    }

    fn run_tier(&mut self, tier: Tier) -> Vec<Move> {
        match tier {
            Tier::Direct => self.make_safe_moves().collect(),
            Tier::Pairwise => self.make_advanced_tier1_moves().collect(),
            Tier::Enumeration => self.make_advanced_tier2_moves().collect(),
        }
    }

    /// One escalation pass: update, then tiers 1 to 3, stopping at the first
    /// tier that yields moves. The caller applies them and calls again.
    pub fn next_moves(&mut self, board: &impl BoardView) -> Deduction {
        let snapshot = Snapshot::capture(board);
        if snapshot.is_untouched() {
            debug!("nothing revealed yet, no deduction possible");
            self.kb.clear();
            self.phase = Phase::Idle;
            return Deduction::default();
        }
        self.stats.passes += 1;
        self.phase = Phase::Updating;

        loop {
            let tier = self.phase.tier();
            let moves = match self.phase {
                Phase::Idle => return Deduction::default(),
                Phase::Updating => {
                    self.update_from_snapshot(&snapshot);
                    Vec::new()
                }
                Phase::Tier1 => self.run_tier(Tier::Direct),
                Phase::Tier2 => self.run_tier(Tier::Pairwise),
                Phase::Tier3 => self.run_tier(Tier::Enumeration),
            };

            self.phase = self.phase.next(!moves.is_empty());
            if !moves.is_empty() {
                return Deduction { tier, moves };
            }
        }
    }

    /// Forget everything about the current game.
    pub fn reset(&mut self) {
        info!("solver reset");
        self.kb.clear();
        self.phase = Phase::Idle;
        self.first_click = true;
        self.stats = SolverStats::default();
    }

    /// Prepare to play the current game again from its start. Deduction
    /// restarts from the replayed board's first snapshot.
    pub fn replay(&mut self) {
        let replays = self.stats.replays + 1;
        self.reset();
        self.stats.replays = replays;
        info!("solver replay #{replays}");
    }
}

// ─── Top-level: solve_to_fixpoint / is_solvable ─────────────────────────────

/// Summary of driving a minefield with the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveReport {
    pub passes: usize,
    pub moves_applied: usize,
    pub stats: SolverStats,
    pub won: bool,
    pub exploded: bool,
    /// No tier could progress before the board was finished.
    pub stuck: bool,
}

/// Reveal `start` if nothing has been played yet, then apply escalation
/// passes until the board is won, no tier progresses, or the pass bound is
/// reached.
pub fn solve_to_fixpoint(solver: &mut Solver, field: &mut Minefield, start: Coord) -> SolveReport {
    let mut moves_applied = 0;
    let mut exploded = false;
    let mut stuck = false;
    let mut passes = 0;

    if solver.first_click() && field.revealed_count() == 0 {
        if field.apply(Move::reveal(start)) == MoveOutcome::Exploded {
            exploded = true;
        }
        solver.record_move();
        moves_applied += 1;
    }

    let limit = solver.config().pass_limit(field.rows(), field.cols());

    while !exploded && !field.is_won() && passes < limit {
        passes += 1;
        let deduction = solver.next_moves(field);
        if deduction.is_empty() {
            stuck = true;
            break;
        }

        for mv in deduction.moves {
            match field.apply(mv) {
                MoveOutcome::Exploded => {
                    warn!("deduced move {mv:?} hit a mine");
                    exploded = true;
                    break;
                }
                MoveOutcome::Ignored => {}
                MoveOutcome::Revealed(_) | MoveOutcome::Flagged => moves_applied += 1,
            }
        }
    }

    let report = SolveReport {
        passes,
        moves_applied,
        stats: *solver.stats(),
        won: field.is_won(),
        exploded,
        stuck,
    };
    info!(
        "solve finished after {} passes: won={} stuck={} moves={}",
        report.passes, report.won, report.stuck, report.moves_applied
    );
    report
}

/// Whether `field` can be cleared from `start` without guessing.
pub fn is_solvable(field: &Minefield, start: Coord) -> bool {
    let mut field = field.clone();
    field.replay();
    let mut solver = Solver::new();
    solve_to_fixpoint(&mut solver, &mut field, start).won
}

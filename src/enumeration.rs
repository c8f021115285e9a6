//! Tier 3: grouped exhaustive enumeration.
//!
//! The frontier is split into connected components (two cells are connected
//! when some constraint names both). Each component small enough to pass
//! the tractability bound has every mine/safe assignment tested against its
//! constraints; a cell that takes the same value in every consistent
//! assignment is decided.
//!
//! Cells live in an index arena: a component refers to frontier slots by
//! position and assignments are bit masks over those positions.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::config::ENUMERATION_LIMIT;
use crate::error::DeductionFault;
use crate::knowledge::KnowledgeBase;
use crate::types::Coord;

/// One connected group of frontier cells with the constraints over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Components are numbered in ascending order of their smallest cell.
    pub id: usize,
    /// Cells in ascending order; bit `i` of an assignment is `cells[i]`.
    pub cells: Vec<Coord>,
    /// `(member mask, required mines)` per constraint.
    constraints: Vec<(u64, u32)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentOutcome {
    /// Larger than the tractability bound; no deduction offered.
    Skipped,
    Solved {
        mines: Vec<Coord>,
        safe: Vec<Coord>,
        /// Number of consistent assignments found.
        assignments: u64,
    },
    /// No assignment satisfies every constraint.
    Unsatisfiable,
}

impl Component {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Enumerate all assignments when the component has at most `bound`
    /// cells. Bounds above [`ENUMERATION_LIMIT`] are clamped to it.
    pub fn solve(&self, bound: usize) -> ComponentOutcome {
        let n = self.cells.len();
        if n == 0 || n > bound.min(ENUMERATION_LIMIT) {
            return ComponentOutcome::Skipped;
        }

        let full: u64 = (1u64 << n) - 1;
        let mut always_mine = full;
        let mut ever_mine = 0u64;
        let mut assignments = 0u64;

        for mask in 0..=full {
            let consistent = self
                .constraints
                .iter()
                .all(|&(members, required)| (mask & members).count_ones() == required);
            if consistent {
                always_mine &= mask;
                ever_mine |= mask;
                assignments += 1;
            }
        }

        if assignments == 0 {
            return ComponentOutcome::Unsatisfiable;
        }

        let never_mine = full & !ever_mine;
        let pick = |bits: u64| -> Vec<Coord> {
            (0..n).filter(|i| (bits >> i) & 1 == 1).map(|i| self.cells[i]).collect()
        };

        ComponentOutcome::Solved {
            mines: pick(always_mine),
            safe: pick(never_mine),
            assignments,
        }
    }
}

/// Partition the frontier of `kb` into connected components.
pub fn partition(kb: &KnowledgeBase) -> Vec<Component> {
    let frontier: Vec<Coord> = kb.frontier().into_iter().collect();
    if frontier.is_empty() {
        return vec![];
    }

    let slot_of: HashMap<Coord, usize> = frontier
        .iter()
        .enumerate()
        .map(|(slot, &at)| (at, slot))
        .collect();

    // constraint -> slots, slot -> constraints
    let members: Vec<(Vec<usize>, u32)> = kb
        .constraints()
        .map(|c| {
            let slots = c.cells.iter().filter_map(|at| slot_of.get(at).copied()).collect();
            (slots, c.required as u32)
        })
        .collect();
    let mut touching: Vec<Vec<usize>> = vec![Vec::new(); frontier.len()];
    for (ci, (slots, _)) in members.iter().enumerate() {
        for &slot in slots {
            touching[slot].push(ci);
        }
    }

    // component index per slot, usize::MAX while unvisited
    let mut owner = vec![usize::MAX; frontier.len()];
    let mut components = Vec::new();

    for start in 0..frontier.len() {
        if owner[start] != usize::MAX {
            continue;
        }
        let id = components.len();
        owner[start] = id;
        let mut queue = vec![start];
        let mut head = 0;
        let mut constraint_ids = Vec::new();

        while head < queue.len() {
            let slot = queue[head];
            head += 1;
            for &ci in &touching[slot] {
                if !constraint_ids.contains(&ci) {
                    constraint_ids.push(ci);
                }
                for &other in &members[ci].0 {
                    if owner[other] == usize::MAX {
                        owner[other] = id;
                        queue.push(other);
                    }
                }
            }
        }

        queue.sort_unstable();
        let local: HashMap<usize, usize> = queue.iter().enumerate().map(|(i, &slot)| (slot, i)).collect();
        constraint_ids.sort_unstable();
        let constraints = constraint_ids
            .iter()
            .map(|&ci| {
                let (slots, required) = &members[ci];
                let mask = slots
                    .iter()
                    .filter_map(|slot| local.get(slot))
                    // oversized components are skipped before enumeration
                    .filter(|&&i| i < ENUMERATION_LIMIT)
                    .fold(0u64, |acc, &i| acc | (1u64 << i));
                (mask, *required)
            })
            .collect();

        components.push(Component {
            id,
            cells: queue.iter().map(|&slot| frontier[slot]).collect(),
            constraints,
        });
    }

    components
}

/// Run tier 3 over `kb`, recording every decided cell as a conclusion.
/// Returns the number of new conclusions.
pub fn deduce(kb: &mut KnowledgeBase, bound: usize) -> usize {
    let components = partition(kb);
    let mut concluded = 0;

    for component in &components {
        match component.solve(bound) {
            ComponentOutcome::Skipped => {
                trace!(
                    "component {} skipped: {} cells exceeds bound {}",
                    component.id,
                    component.len(),
                    bound
                );
            }
            ComponentOutcome::Unsatisfiable => {
                warn!("{}", DeductionFault::Unsatisfiable(component.len()));
            }
            ComponentOutcome::Solved { mines, safe, assignments } => {
                trace!(
                    "component {}: {} cells, {} consistent assignments, {} mines, {} safe",
                    component.id,
                    component.len(),
                    assignments,
                    mines.len(),
                    safe.len()
                );
                let mut decided: Vec<(Coord, bool)> = mines
                    .into_iter()
                    .map(|at| (at, true))
                    .chain(safe.into_iter().map(|at| (at, false)))
                    .collect();
                decided.sort_unstable();
                for (at, mine) in decided {
                    match kb.conclude(at, mine) {
                        Ok(true) => concluded += 1,
                        Ok(false) => {}
                        Err(fault) => warn!("dropping enumeration result: {fault}"),
                    }
                }
            }
        }
    }

    debug!("tier 3: {} components, {} conclusions", components.len(), concluded);
    concluded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Constraint;
    use crate::snapshot::Snapshot;
    use crate::types::CellState;

    fn board(rows: &[&str]) -> Snapshot {
        // '#' hidden, 'F' flagged, digit revealed
        let mut snap = Snapshot::hidden(rows.len(), rows[0].len());
        for (r, line) in rows.iter().enumerate() {
            for (c, ch) in line.chars().enumerate() {
                let state = match ch {
                    '#' => CellState::Hidden,
                    'F' => CellState::Flagged,
                    d => CellState::Revealed(d.to_digit(10).unwrap() as u8),
                };
                snap.set(Coord::new(r, c), state);
            }
        }
        snap
    }

    fn kb_for(rows: &[&str]) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.update(&board(rows));
        kb
    }

    #[test]
    fn test_partition_separates_independent_groups() {
        let kb = kb_for(&["#1001#", "#1001#"]);
        let components = partition(&kb);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].id, 0);
        assert_eq!(components[0].cells, vec![Coord::new(0, 0), Coord::new(1, 0)]);
        assert_eq!(components[1].cells, vec![Coord::new(0, 5), Coord::new(1, 5)]);
    }

    #[test]
    fn test_partition_joins_through_shared_constraint() {
        let kb = kb_for(&["###", "121"]);
        let components = partition(&kb);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 3);
    }

    #[test]
    fn test_solve_finds_forced_cells() {
        // 1-2-1 pattern: both ends are mines, the middle is safe.
        let kb = kb_for(&["###", "121"]);
        let components = partition(&kb);
        match components[0].solve(20) {
            ComponentOutcome::Solved { mines, safe, assignments } => {
                assert_eq!(assignments, 1);
                assert_eq!(mines, vec![Coord::new(0, 0), Coord::new(0, 2)]);
                assert_eq!(safe, vec![Coord::new(0, 1)]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_solve_leaves_mixed_cells_undecided() {
        let kb = kb_for(&["##", "11"]);
        match partition(&kb)[0].solve(20) {
            ComponentOutcome::Solved { mines, safe, assignments } => {
                assert_eq!(assignments, 2);
                assert!(mines.is_empty());
                assert!(safe.is_empty());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_solve_respects_bound() {
        let kb = kb_for(&["###", "121"]);
        assert_eq!(partition(&kb)[0].solve(2), ComponentOutcome::Skipped);
    }

    #[test]
    fn test_solve_reports_unsatisfiable() {
        // The "0" makes both cells safe while the "2" needs two mines.
        let mut kb = kb_for(&["##", "20"]);
        assert_eq!(partition(&kb)[0].solve(20), ComponentOutcome::Unsatisfiable);
        assert_eq!(deduce(&mut kb, 20), 0);
    }

    #[test]
    fn test_wide_board_cells_stay_distinct() {
        // (0, 65536) and (1, 0) must not share a frontier slot.
        let cells = |list: &[(usize, usize)]| list.iter().map(|&c| Coord::from(c)).collect();
        let mut kb = KnowledgeBase::new();
        kb.insert(Constraint::new(Coord::new(0, 0), cells(&[(1, 0), (1, 1)]), 1).unwrap());
        kb.insert(Constraint::new(Coord::new(1, 65535), cells(&[(0, 65536)]), 0).unwrap());

        let components = partition(&kb);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].cells, vec![Coord::new(0, 65536)]);
        assert_eq!(components[1].cells, vec![Coord::new(1, 0), Coord::new(1, 1)]);

        assert_eq!(deduce(&mut kb, 20), 1);
        let moves: Vec<(usize, usize, bool)> = kb.take_pending().into_iter().map(Into::into).collect();
        assert_eq!(moves, vec![(0, 65536, false)]);
    }

    #[test]
    fn test_solve_clamps_bound_to_limit() {
        // A row of ENUMERATION_LIMIT + 1 hidden cells under one constraint.
        let cells = (0..=ENUMERATION_LIMIT).map(|c| Coord::new(0, c)).collect();
        let mut kb = KnowledgeBase::new();
        kb.insert(Constraint::new(Coord::new(1, 0), cells, 1).unwrap());
        assert_eq!(partition(&kb)[0].solve(usize::MAX), ComponentOutcome::Skipped);
    }

    #[test]
    fn test_deduce_emits_in_coordinate_order() {
        let mut kb = kb_for(&["###", "121"]);
        assert_eq!(deduce(&mut kb, 20), 3);
        let moves: Vec<(usize, usize, bool)> = kb.take_pending().into_iter().map(Into::into).collect();
        assert_eq!(moves, vec![(0, 0, true), (0, 1, false), (0, 2, true)]);
    }
}

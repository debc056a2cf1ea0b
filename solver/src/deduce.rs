use std::collections::{BTreeSet, HashSet, VecDeque};

use itertools::Itertools;

use crate::board::{Board, Move, Point};
use crate::constraint::{Constraint, ConstraintSet};
use crate::error::SolverError;

/// Cells proven safe or mined with certainty from the current snapshot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Deductions {
    pub mines: BTreeSet<Point>,
    pub safe: BTreeSet<Point>,
}

impl Deductions {
    pub fn is_empty(&self) -> bool {
        self.mines.is_empty() && self.safe.is_empty()
    }

    /// Flatten to a move list in ascending coordinate order.
    pub fn into_moves(self) -> Vec<Move> {
        let mut moves: Vec<Move> = self
            .mines
            .into_iter()
            .map(Move::Flag)
            .chain(self.safe.into_iter().map(Move::Reveal))
            .collect();
        moves.sort_by_key(Move::point);
        moves
    }
}

/// Apply the logic rules to fixpoint and return every certain move.
///
/// Three local rules run over a worklist of constraints:
/// - all-mines: `required == |cells|` makes every cell a mine,
/// - all-safe: `required == 0` makes every cell safe,
/// - subset-difference: A ⊆ B derives a constraint over B∖A requiring
///   `B.required − A.required`, which is fed back into the worklist.
///
/// Two global rules cover cells no local constraint reaches: a spent mine
/// budget proves every hidden cell safe, and a budget equal to the hidden
/// count proves every hidden cell a mine.
///
/// Facts are monotone, so rule order cannot change the fixpoint; constraints
/// are still processed in a stable order to keep move lists reproducible.
pub fn deduce(board: &Board, set: &ConstraintSet) -> Result<Deductions, SolverError> {
    let mut out = Deductions::default();

    let remaining = board.mines_remaining()?;
    let hidden = board.hidden_points();

    if remaining == 0 {
        out.safe.extend(hidden);
        return Ok(out);
    }
    if remaining == hidden.len() {
        out.mines.extend(hidden);
        return Ok(out);
    }

    let mut engine = Engine::new(set.constraints.clone());
    engine.run()?;

    if engine.mines.len() > remaining {
        return Err(SolverError::inconsistency(format!(
            "{} certain mines exceed the {remaining} remaining",
            engine.mines.len()
        )));
    }

    out.mines = engine.mines;
    out.safe = engine.safe;
    Ok(out)
}

/// Worklist fixpoint over a shrinking constraint set.
struct Engine {
    constraints: Vec<Constraint>,
    /// Every constraint form ever admitted, so derived duplicates are not
    /// re-queued. Keyed on (cells, required) at admission time; cell sets
    /// only ever shrink, so this keeps the iteration finite.
    seen: HashSet<(Vec<Point>, usize)>,
    mines: BTreeSet<Point>,
    safe: BTreeSet<Point>,
}

impl Engine {
    fn new(constraints: Vec<Constraint>) -> Self {
        let mut engine = Engine {
            constraints: Vec::new(),
            seen: HashSet::new(),
            mines: BTreeSet::new(),
            safe: BTreeSet::new(),
        };
        for c in constraints {
            engine.admit(c);
        }
        engine
    }

    fn admit(&mut self, constraint: Constraint) -> bool {
        let key = (
            constraint.cells.iter().copied().collect::<Vec<_>>(),
            constraint.required,
        );
        if !self.seen.insert(key) {
            return false;
        }
        self.constraints.push(constraint);
        true
    }

    fn run(&mut self) -> Result<(), SolverError> {
        loop {
            let mut changed = self.resolve_trivial()?;
            changed |= self.derive_differences()?;
            if !changed {
                return Ok(());
            }
        }
    }

    /// Fire the all-mines and all-safe rules until neither applies,
    /// propagating each resolved cell through every constraint that
    /// references it.
    fn resolve_trivial(&mut self) -> Result<bool, SolverError> {
        let mut changed = false;
        let mut queue: VecDeque<(Point, bool)> = VecDeque::new();

        loop {
            for c in &self.constraints {
                if c.cells.is_empty() {
                    continue;
                }
                if c.required == 0 {
                    queue.extend(c.cells.iter().map(|&p| (p, false)));
                } else if c.required == c.cells.len() {
                    queue.extend(c.cells.iter().map(|&p| (p, true)));
                }
            }
            if queue.is_empty() {
                return Ok(changed);
            }

            while let Some((point, is_mine)) = queue.pop_front() {
                self.record(point, is_mine)?;
                changed = true;

                for c in &mut self.constraints {
                    if !c.cells.remove(&point) {
                        continue;
                    }
                    if is_mine {
                        c.required = c.required.checked_sub(1).ok_or_else(|| {
                            SolverError::inconsistency(format!(
                                "certain mine at {point} violates a satisfied constraint"
                            ))
                        })?;
                    }
                    if c.required > c.cells.len() {
                        return Err(SolverError::inconsistency(format!(
                            "removing safe cell {point} leaves {} mines for {} cells",
                            c.required,
                            c.cells.len()
                        )));
                    }
                }
            }
            self.constraints.retain(|c| !c.cells.is_empty());
        }
    }

    /// Subset-difference rule: for A ⊆ B, B∖A needs exactly
    /// `B.required − A.required` mines. Derived constraints join the
    /// worklist so chained deductions propagate without enumeration.
    fn derive_differences(&mut self) -> Result<bool, SolverError> {
        let mut derived = Vec::new();

        for (a, b) in self.constraints.iter().tuple_combinations() {
            let (sub, sup) = if a.cells.len() <= b.cells.len() {
                (a, b)
            } else {
                (b, a)
            };
            if sub.cells.len() == sup.cells.len() || !sub.cells.is_subset(&sup.cells) {
                continue;
            }
            let required = sup.required.checked_sub(sub.required).ok_or_else(|| {
                SolverError::inconsistency(format!(
                    "nested constraints require {} mines inside {}",
                    sub.required, sup.required
                ))
            })?;
            let cells: BTreeSet<Point> = sup.cells.difference(&sub.cells).copied().collect();
            derived.push(Constraint { cells, required });
        }

        let mut changed = false;
        for c in derived {
            changed |= self.admit(c);
        }
        Ok(changed)
    }

    fn record(&mut self, point: Point, is_mine: bool) -> Result<(), SolverError> {
        let conflicting = if is_mine {
            self.safe.contains(&point)
        } else {
            self.mines.contains(&point)
        };
        if conflicting {
            return Err(SolverError::inconsistency(format!(
                "cell {point} deduced both mine and safe"
            )));
        }
        if is_mine {
            self.mines.insert(point);
        } else {
            self.safe.insert(point);
        }
        Ok(())
    }
}

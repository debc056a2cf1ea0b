use std::collections::BTreeSet;

use crate::board::{Board, CellState, Point};
use crate::error::SolverError;

/// A single numeric constraint derived from one revealed cell: exactly
/// `required` mines sit among `cells`.
///
/// A revealed `0` with hidden neighbors produces a `required = 0`
/// constraint, which is what lets the all-safe rule open up the border of a
/// flood-filled region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// The hidden, unflagged neighbors the constraint ranges over.
    pub cells: BTreeSet<Point>,
    /// Mines still unaccounted for among `cells`, after subtracting
    /// already-flagged neighbors.
    pub required: usize,
}

impl Constraint {
    pub fn new(cells: impl IntoIterator<Item = Point>, required: usize) -> Self {
        Constraint {
            cells: cells.into_iter().collect(),
            required,
        }
    }
}

/// Everything the downstream engines need from one board snapshot.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    pub constraints: Vec<Constraint>,
    /// Hidden cells referenced by at least one constraint.
    pub frontier: BTreeSet<Point>,
    /// Hidden cells with no direct constraint; they matter only through
    /// the global mine budget.
    pub interior: BTreeSet<Point>,
}

/// Derive the full constraint set from a board snapshot. Pure function.
///
/// Fails with `BoardInconsistency` when any revealed number is impossible
/// given its flagged and hidden neighbors, which indicates a stale or
/// misread snapshot rather than a solver bug.
pub fn extract(board: &Board) -> Result<ConstraintSet, SolverError> {
    let mut constraints = Vec::new();
    let mut frontier = BTreeSet::new();

    for at in board.points() {
        let CellState::Revealed(number) = board.get(at) else {
            continue;
        };

        let mut hidden = BTreeSet::new();
        let mut flagged = 0usize;
        for neighbor in board.neighbors(at) {
            match board.get(neighbor) {
                CellState::Hidden => {
                    hidden.insert(neighbor);
                }
                CellState::Flagged => flagged += 1,
                CellState::Revealed(_) => {}
            }
        }

        // A cell with no hidden neighbors contributes no constraint, but a
        // flag count above its number still proves the snapshot bad.
        let required = (number as usize).checked_sub(flagged).ok_or_else(|| {
            SolverError::inconsistency(format!(
                "revealed {number} at {at} has {flagged} flagged neighbors"
            ))
        })?;
        if hidden.is_empty() {
            if required != 0 {
                return Err(SolverError::inconsistency(format!(
                    "revealed {number} at {at} requires {required} mines but has no hidden neighbors"
                )));
            }
            continue;
        }
        if required > hidden.len() {
            return Err(SolverError::inconsistency(format!(
                "revealed {number} at {at} requires {required} mines among {} hidden neighbors",
                hidden.len()
            )));
        }

        frontier.extend(hidden.iter().copied());
        constraints.push(Constraint { cells: hidden, required });
    }

    let interior = board
        .hidden_points()
        .into_iter()
        .filter(|p| !frontier.contains(p))
        .collect();

    Ok(ConstraintSet {
        constraints,
        frontier,
        interior,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_counts() {
        let mut board = Board::new(3, 3, 2);
        board.cells[1][1] = CellState::Revealed(1);

        let set = extract(&board).unwrap();
        assert_eq!(set.constraints.len(), 1);
        assert_eq!(set.constraints[0].required, 1);
        assert_eq!(set.constraints[0].cells.len(), 8);
        assert_eq!(set.frontier.len(), 8);
        assert!(set.interior.is_empty());
    }

    #[test]
    fn test_flags_reduce_required() {
        let mut board = Board::new(3, 3, 2);
        board.cells[1][1] = CellState::Revealed(2);
        board.cells[0][0] = CellState::Flagged;

        let set = extract(&board).unwrap();
        assert_eq!(set.constraints.len(), 1);
        assert_eq!(set.constraints[0].required, 1);
        assert_eq!(set.constraints[0].cells.len(), 7);
        assert!(!set.frontier.contains(&Point::new(0, 0)));
    }

    #[test]
    fn test_interior_split() {
        // Revealed 1 in a corner of a 4x4 board: its three neighbors are
        // frontier, the rest of the hidden cells are interior.
        let mut board = Board::new(4, 4, 3);
        board.cells[0][0] = CellState::Revealed(1);

        let set = extract(&board).unwrap();
        assert_eq!(set.frontier.len(), 3);
        assert_eq!(set.interior.len(), 16 - 1 - 3);
    }

    #[test]
    fn test_over_flagged_cell_is_inconsistent() {
        let mut board = Board::new(3, 3, 3);
        board.cells[1][1] = CellState::Revealed(1);
        board.cells[0][0] = CellState::Flagged;
        board.cells[0][1] = CellState::Flagged;

        assert!(matches!(
            extract(&board),
            Err(SolverError::BoardInconsistency { .. })
        ));
    }

    #[test]
    fn test_required_above_hidden_is_inconsistent() {
        let mut board = Board::new(2, 2, 3);
        board.cells[0][0] = CellState::Revealed(3);
        board.cells[0][1] = CellState::Revealed(1);
        board.cells[1][0] = CellState::Revealed(1);

        // Only (1,1) is hidden, but (0,0) demands 3 mines.
        assert!(matches!(
            extract(&board),
            Err(SolverError::BoardInconsistency { .. })
        ));
    }

    #[test]
    fn test_revealed_zero_contributes_trivial_constraint() {
        let mut board = Board::new(2, 2, 1);
        board.cells[0][0] = CellState::Revealed(0);

        let set = extract(&board).unwrap();
        assert_eq!(set.constraints.len(), 1);
        assert_eq!(set.constraints[0].required, 0);
        assert_eq!(set.constraints[0].cells.len(), 3);
    }
}

use crate::board::{Board, Move, Point};
use crate::config::SolverConfig;
use crate::constraint;
use crate::deduce;
use crate::error::SolverError;
use crate::partition;
use crate::probability;

/// The designated opening move for an untouched board. Corners are the
/// statistically safest blind click, and a fixed one keeps runs reproducible.
const OPENING: Point = Point { row: 0, col: 0 };

/// One full solving cycle: board snapshot in, move list out.
///
/// Deterministic moves always take priority; probability estimation only
/// runs when logic alone is stuck, and then a single lowest-risk reveal is
/// emitted, since every guess changes the board. Holds no state between
/// calls: the same snapshot and config always produce the same moves.
pub fn solve(board: &Board, config: &SolverConfig) -> Result<Vec<Move>, SolverError> {
    config.validate()?;

    if board.is_untouched() {
        tracing::debug!(at = %OPENING, "untouched board, playing the opening");
        return Ok(vec![Move::Reveal(OPENING)]);
    }

    let hidden = board.hidden_points();
    if hidden.is_empty() {
        return Err(SolverError::NoMoveAvailable);
    }

    let set = constraint::extract(board)?;

    if config.enable_logic_rules {
        let deductions = deduce::deduce(board, &set)?;
        if !deductions.is_empty() {
            let moves = deductions.into_moves();
            tracing::info!(count = moves.len(), "deterministic moves found");
            return Ok(moves);
        }
    }

    if config.enable_probability_calculation {
        let remaining = board.mines_remaining()?;
        if remaining == 0 {
            // Every hidden cell is certain-safe once the budget is spent;
            // reached here only when the logic rules are switched off.
            return Ok(hidden.into_iter().map(Move::Reveal).collect());
        }

        let components = partition::partition(&set.constraints);
        let probabilities =
            probability::estimate(&components, remaining, &set.interior, config.max_configurations)?;

        // BTreeMap iterates ascending, so strict less-than gives the
        // lowest-coordinate cell among equal probabilities.
        let mut best: Option<(Point, f64)> = None;
        for (&cell, &prob) in &probabilities {
            if best.is_none_or(|(_, lowest)| prob < lowest) {
                best = Some((cell, prob));
            }
        }
        if let Some((cell, prob)) = best {
            tracing::info!(at = %cell, probability = prob, "guessing the safest cell");
            return Ok(vec![Move::Reveal(cell)]);
        }
    }

    Err(SolverError::NoMoveAvailable)
}

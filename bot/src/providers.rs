use minesweeper_solver::{Board, Move};

/// The observed game could not be turned into a board snapshot this cycle.
/// The game loop treats this as "no move computable" and tries again.
#[derive(Debug, thiserror::Error)]
#[error("board detection failed: {0}")]
pub struct DetectionFailure(pub String);

/// Produces a board snapshot of the current observed game.
///
/// The production implementation is a screen reader; the simulated game in
/// this crate implements it directly off its own state.
pub trait BoardStateProvider {
    fn capture(&mut self) -> Result<Board, DetectionFailure>;
}

/// Performs an ordered list of moves against the live game.
///
/// Failures end the session rather than being retried: for the simulated
/// game, revealing a mine is reported as an error here.
pub trait ActionExecutor {
    fn execute(&mut self, moves: &[Move]) -> anyhow::Result<()>;
}

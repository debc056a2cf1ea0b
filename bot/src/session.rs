use anyhow::Context;
use minesweeper_solver::{SolverConfig, SolverError, solve};

use crate::providers::{ActionExecutor, BoardStateProvider};

/// Give up after this many consecutive failed captures.
const MAX_DETECTION_FAILURES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    /// The move budget ran out, captures kept failing, or the solver ended
    /// with hidden cells left it could not act on.
    Stalled,
}

/// One autonomous game: capture a snapshot, solve, execute, repeat.
///
/// The session owns no game state; everything is recomputed from the
/// provider's snapshot each cycle, so a stale capture costs one cycle and
/// nothing else.
pub struct Session {
    pub config: SolverConfig,
    /// Safety limit on total executed moves per game.
    pub max_moves: usize,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            config: SolverConfig::default(),
            max_moves: 1000,
        }
    }
}

impl Session {
    pub fn run<G>(&self, game: &mut G) -> anyhow::Result<Outcome>
    where
        G: BoardStateProvider + ActionExecutor,
    {
        let mut moves_made = 0usize;
        let mut detection_failures = 0u32;

        while moves_made < self.max_moves {
            let board = match game.capture() {
                Ok(board) => board,
                Err(err) => {
                    detection_failures += 1;
                    tracing::warn!(error = %err, "capture failed, skipping cycle");
                    if detection_failures >= MAX_DETECTION_FAILURES {
                        return Ok(Outcome::Stalled);
                    }
                    continue;
                }
            };
            detection_failures = 0;

            let moves = match solve(&board, &self.config) {
                Ok(moves) => moves,
                Err(SolverError::NoMoveAvailable) => {
                    return Ok(if board.hidden_points().is_empty() {
                        Outcome::Won
                    } else {
                        Outcome::Stalled
                    });
                }
                Err(err) => return Err(err).context("solving cycle failed"),
            };

            tracing::debug!(count = moves.len(), total = moves_made, "executing moves");
            moves_made += moves.len();

            if let Err(err) = game.execute(&moves) {
                tracing::info!(error = %err, "executor ended the game");
                return Ok(Outcome::Lost);
            }
        }

        tracing::warn!(max_moves = self.max_moves, "move limit reached");
        Ok(Outcome::Stalled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{SimulatedGame, Status};
    use crate::providers::DetectionFailure;
    use minesweeper_solver::{Board, Move};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_mine_free_game_is_won_deterministically() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = SimulatedGame::new(5, 5, 0, &mut rng);

        let outcome = Session::default().run(&mut game).unwrap();
        assert_eq!(outcome, Outcome::Won);
        assert_eq!(game.status(), Status::Won);
    }

    #[test]
    fn test_outcome_matches_game_status() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut game = SimulatedGame::new(9, 9, 10, &mut rng);

        let outcome = Session::default().run(&mut game).unwrap();
        match outcome {
            Outcome::Won => assert_eq!(game.status(), Status::Won),
            Outcome::Lost => assert_eq!(game.status(), Status::Lost),
            Outcome::Stalled => {}
        }
    }

    #[test]
    fn test_repeated_capture_failure_stalls() {
        struct Broken;
        impl BoardStateProvider for Broken {
            fn capture(&mut self) -> Result<Board, DetectionFailure> {
                Err(DetectionFailure("window lost".into()))
            }
        }
        impl ActionExecutor for Broken {
            fn execute(&mut self, _moves: &[Move]) -> anyhow::Result<()> {
                unreachable!("no board was ever captured")
            }
        }

        let outcome = Session::default().run(&mut Broken).unwrap();
        assert_eq!(outcome, Outcome::Stalled);
    }
}

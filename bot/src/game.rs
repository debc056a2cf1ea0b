use std::collections::{HashSet, VecDeque};

use anyhow::bail;
use minesweeper_solver::{Board, CellState, Move, Point};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::providers::{ActionExecutor, BoardStateProvider, DetectionFailure};

/// The opening corner the solver plays first; the simulated field keeps it
/// and its neighbors mine-free so a fresh game is always survivable.
pub const OPENING: Point = Point { row: 0, col: 0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Won,
    Lost,
}

/// An in-process Minesweeper game standing in for a real window: it hands
/// out board snapshots and accepts moves through the same traits a screen
/// reader and mouse controller would implement.
pub struct SimulatedGame {
    board: Board,
    mines: HashSet<Point>,
    status: Status,
}

impl SimulatedGame {
    pub fn new(rows: usize, cols: usize, total_mines: usize, rng: &mut impl Rng) -> Self {
        let board = Board::new(rows, cols, total_mines);

        let mut protected: HashSet<Point> = board.neighbors(OPENING).collect();
        protected.insert(OPENING);
        let candidates: Vec<Point> = board
            .points()
            .filter(|p| !protected.contains(p))
            .collect();
        if total_mines > candidates.len() {
            panic!("{total_mines} mines do not fit outside the protected opening");
        }
        let mines = candidates
            .choose_multiple(rng, total_mines)
            .copied()
            .collect();

        SimulatedGame {
            board,
            mines,
            status: Status::Playing,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn adjacent_mines(&self, at: Point) -> u8 {
        self.board
            .neighbors(at)
            .filter(|p| self.mines.contains(p))
            .count() as u8
    }

    /// Reveal a cell, cascading through zero-count neighbors the way the
    /// real game does. Revealing a mine loses the game.
    fn reveal(&mut self, at: Point) {
        if !matches!(self.board.get(at), CellState::Hidden) {
            return;
        }
        if self.mines.contains(&at) {
            self.status = Status::Lost;
            return;
        }

        let mut queue = VecDeque::from([at]);
        let mut visited = HashSet::from([at]);

        while let Some(point) = queue.pop_front() {
            if !matches!(self.board.get(point), CellState::Hidden) {
                continue;
            }
            let count = self.adjacent_mines(point);
            self.board.cells[point.row][point.col] = CellState::Revealed(count);

            if count == 0 {
                for neighbor in self.board.neighbors(point).collect::<Vec<_>>() {
                    if visited.insert(neighbor)
                        && !self.mines.contains(&neighbor)
                        && matches!(self.board.get(neighbor), CellState::Hidden)
                    {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        self.update_win();
    }

    fn flag(&mut self, at: Point) {
        if matches!(self.board.get(at), CellState::Hidden) {
            self.board.cells[at.row][at.col] = CellState::Flagged;
        }
    }

    fn update_win(&mut self) {
        let all_safe_revealed = self.board.points().all(|p| {
            self.mines.contains(&p) || matches!(self.board.get(p), CellState::Revealed(_))
        });
        if all_safe_revealed {
            self.status = Status::Won;
            // The real game flags the remaining mines on a win.
            for &mine in &self.mines {
                if matches!(self.board.cells[mine.row][mine.col], CellState::Hidden) {
                    self.board.cells[mine.row][mine.col] = CellState::Flagged;
                }
            }
        }
    }
}

impl BoardStateProvider for SimulatedGame {
    fn capture(&mut self) -> Result<Board, DetectionFailure> {
        Ok(self.board.clone())
    }
}

impl ActionExecutor for SimulatedGame {
    fn execute(&mut self, moves: &[Move]) -> anyhow::Result<()> {
        for &mv in moves {
            match self.status {
                Status::Playing => {}
                // A finished game ignores further input.
                Status::Won => break,
                Status::Lost => bail!("game already lost"),
            }
            match mv {
                Move::Reveal(at) => {
                    self.reveal(at);
                    if self.status == Status::Lost {
                        bail!("mine exploded at {at}");
                    }
                }
                Move::Flag(at) => self.flag(at),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_new_game_protects_the_opening() {
        let game = SimulatedGame::new(9, 9, 10, &mut rng());
        assert_eq!(game.mines.len(), 10);
        assert_eq!(game.status(), Status::Playing);
        assert!(game.board().is_untouched());

        assert!(!game.mines.contains(&OPENING));
        for neighbor in game.board().neighbors(OPENING).collect::<Vec<_>>() {
            assert!(!game.mines.contains(&neighbor));
        }
    }

    #[test]
    fn test_zero_reveal_cascades() {
        // No mines at all: revealing the corner floods the whole board.
        let mut game = SimulatedGame::new(4, 4, 0, &mut rng());
        game.execute(&[Move::Reveal(OPENING)]).unwrap();

        assert_eq!(game.status(), Status::Won);
        assert!(game.board().hidden_points().is_empty());
    }

    #[test]
    fn test_revealing_a_mine_loses() {
        let mut game = SimulatedGame::new(5, 5, 8, &mut rng());
        let mine = *game.mines.iter().next().unwrap();

        let result = game.execute(&[Move::Reveal(mine)]);
        assert!(result.is_err());
        assert_eq!(game.status(), Status::Lost);
    }

    #[test]
    fn test_revealing_every_safe_cell_wins() {
        let mut game = SimulatedGame::new(3, 3, 1, &mut rng());
        let safe: Vec<Point> = game
            .board()
            .points()
            .filter(|p| !game.mines.contains(p))
            .collect();

        for point in safe {
            game.reveal(point);
        }
        assert_eq!(game.status(), Status::Won);

        // The leftover mine is flagged automatically on a win.
        let mine = *game.mines.iter().next().unwrap();
        assert_eq!(game.board().get(mine), CellState::Flagged);
    }

    #[test]
    fn test_flag_only_marks_hidden_cells() {
        let mut game = SimulatedGame::new(4, 4, 0, &mut rng());
        game.reveal(Point::new(2, 2));

        game.flag(Point::new(2, 2));
        assert!(matches!(
            game.board().get(Point::new(2, 2)),
            CellState::Revealed(_)
        ));
    }

    #[test]
    fn test_captured_board_matches_visible_state() {
        let mut game = SimulatedGame::new(4, 4, 2, &mut rng());
        game.flag(Point::new(3, 3));

        let board = game.capture().unwrap();
        assert_eq!(board.get(Point::new(3, 3)), CellState::Flagged);
        assert_eq!(board.total_mines, 2);
    }
}

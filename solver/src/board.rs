use std::fmt;

use crate::error::SolverError;

/// Represents a 2D coordinate on the minesweeper board.
///
/// `Ord` derives in (row, col) order, so sorted collections of points are
/// already in the ascending coordinate order used for reproducible output.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The observed state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CellState {
    Hidden,
    Revealed(u8), // The u8 is the number of adjacent mines (0..=8).
    Flagged,
}

/// An action for the external executor to perform against the live game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Move {
    Reveal(Point),
    Flag(Point),
}

impl Move {
    pub fn point(&self) -> Point {
        match *self {
            Move::Reveal(p) | Move::Flag(p) => p,
        }
    }
}

/// One snapshot of the observed board plus the global mine budget.
///
/// The solver treats a `Board` as an immutable value: one snapshot in, one
/// move list out. It is rebuilt from the external state provider every
/// solving cycle and never mutated by the solver itself.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Board {
    pub rows: usize,
    pub cols: usize,
    /// Row-major grid of observed cell states.
    pub cells: Vec<Vec<CellState>>,
    /// The total number of mines the board contains. This acts as the
    /// global constraint on every probability estimate.
    pub total_mines: usize,
}

impl Board {
    /// A fully hidden board, as seen at game start.
    pub fn new(rows: usize, cols: usize, total_mines: usize) -> Self {
        Board {
            rows,
            cols,
            cells: vec![vec![CellState::Hidden; cols]; rows],
            total_mines,
        }
    }

    pub fn get(&self, at: Point) -> CellState {
        self.cells[at.row][at.col]
    }

    /// All valid neighbor coordinates of a point, clipped to the board
    /// edges, yielded in ascending coordinate order.
    pub fn neighbors(&self, at: Point) -> impl Iterator<Item = Point> {
        let rows = self.rows;
        let cols = self.cols;

        (-1..=1).flat_map(move |dr: isize| {
            (-1..=1).filter_map(move |dc: isize| {
                if dr == 0 && dc == 0 {
                    return None;
                }
                let nr = at.row as isize + dr;
                let nc = at.col as isize + dc;
                if nr >= 0 && nr < rows as isize && nc >= 0 && nc < cols as isize {
                    Some(Point::new(nr as usize, nc as usize))
                } else {
                    None
                }
            })
        })
    }

    /// Iterate all coordinates in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Point::new(row, col)))
    }

    pub fn flagged_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| matches!(c, CellState::Flagged))
            .count()
    }

    /// Mines not yet accounted for by flags. More flags than total mines
    /// means the snapshot cannot be trusted.
    pub fn mines_remaining(&self) -> Result<usize, SolverError> {
        let flagged = self.flagged_count();
        self.total_mines.checked_sub(flagged).ok_or_else(|| {
            SolverError::inconsistency(format!(
                "{flagged} flags exceed the {} total mines",
                self.total_mines
            ))
        })
    }

    /// All hidden, unflagged cells in ascending coordinate order.
    pub fn hidden_points(&self) -> Vec<Point> {
        self.points()
            .filter(|&p| matches!(self.get(p), CellState::Hidden))
            .collect()
    }

    /// True before the first move: nothing revealed, nothing flagged.
    pub fn is_untouched(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .all(|c| matches!(c, CellState::Hidden))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_untouched() {
        let board = Board::new(5, 5, 3);
        assert_eq!(board.rows, 5);
        assert_eq!(board.cols, 5);
        assert_eq!(board.total_mines, 3);
        assert!(board.is_untouched());
        assert_eq!(board.hidden_points().len(), 25);
    }

    #[test]
    fn test_neighbors() {
        let board = Board::new(3, 3, 1);

        // Corner cell (0,0) should have 3 neighbors.
        let corner: Vec<Point> = board.neighbors(Point::new(0, 0)).collect();
        assert_eq!(corner.len(), 3);

        // Center cell (1,1) should have 8 neighbors.
        let center: Vec<Point> = board.neighbors(Point::new(1, 1)).collect();
        assert_eq!(center.len(), 8);

        // Edge cell (0,1) should have 5 neighbors.
        let edge: Vec<Point> = board.neighbors(Point::new(0, 1)).collect();
        assert_eq!(edge.len(), 5);
    }

    #[test]
    fn test_neighbors_ascending_order() {
        let board = Board::new(3, 3, 1);
        let center: Vec<Point> = board.neighbors(Point::new(1, 1)).collect();
        let mut sorted = center.clone();
        sorted.sort();
        assert_eq!(center, sorted);
    }

    #[test]
    fn test_mines_remaining() {
        let mut board = Board::new(3, 3, 2);
        assert_eq!(board.mines_remaining().unwrap(), 2);

        board.cells[0][0] = CellState::Flagged;
        assert_eq!(board.mines_remaining().unwrap(), 1);
        assert_eq!(board.hidden_points().len(), 8);

        board.cells[0][1] = CellState::Flagged;
        board.cells[0][2] = CellState::Flagged;
        assert!(matches!(
            board.mines_remaining(),
            Err(SolverError::BoardInconsistency { .. })
        ));
    }

    #[test]
    fn test_point_ordering_is_row_major() {
        let mut points = vec![Point::new(1, 0), Point::new(0, 2), Point::new(0, 1)];
        points.sort();
        assert_eq!(
            points,
            vec![Point::new(0, 1), Point::new(0, 2), Point::new(1, 0)]
        );
    }
}

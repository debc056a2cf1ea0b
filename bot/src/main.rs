//! Autonomous Minesweeper bot: plays one simulated game end to end using
//! the solving engine, printing the board as it goes.

mod game;
mod providers;
mod session;

use std::process::ExitCode;

use minesweeper_solver::{Board, CellState};
use tracing_subscriber::EnvFilter;

use crate::game::SimulatedGame;
use crate::session::{Outcome, Session};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut rng = rand::rng();
    let mut game = SimulatedGame::new(9, 9, 10, &mut rng);
    let session = Session::default();

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: certain moves first, lowest-probability guess otherwise.");

    let outcome = match session.run(&mut game) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, "session failed");
            return ExitCode::FAILURE;
        }
    };

    println!("\nFinal board:");
    print_board(game.board());

    match (outcome, game.status()) {
        (Outcome::Won, _) => {
            println!("Result: the bot won!");
            ExitCode::SUCCESS
        }
        (Outcome::Lost, _) => {
            println!("Result: the bot hit a mine and lost.");
            ExitCode::FAILURE
        }
        (Outcome::Stalled, status) => {
            println!("Result: the game stalled (status {status:?}).");
            ExitCode::FAILURE
        }
    }
}

fn print_board(board: &Board) {
    print!("   ");
    for col in 0..board.cols {
        print!("{col:^3}");
    }
    println!("\n  +{}", "---".repeat(board.cols));

    for (row, cells) in board.cells.iter().enumerate() {
        print!("{row:^2}|");
        for cell in cells {
            match cell {
                CellState::Hidden => print!(" ■ "),
                CellState::Flagged => print!(" ⚑ "),
                CellState::Revealed(n) => print!(" {n} "),
            }
        }
        println!();
    }
}

//! Autonomous Minesweeper solving engine.
//!
//! Works in two phases over one immutable board snapshot. Constraint
//! propagation first derives every logically certain reveal and flag; when
//! nothing is certain, independent constraint components are enumerated
//! exhaustively and per-cell mine probabilities are estimated, weighted
//! against the global remaining-mine count, so a single lowest-risk guess
//! can be made.
//!
//! The engine holds no state across cycles. Screen capture, board
//! recognition and click execution live with the caller; see the
//! `minesweeper-bot` crate for the collaborator traits and game loop.

pub mod board;
pub mod config;
pub mod constraint;
pub mod deduce;
pub mod error;
pub mod partition;
pub mod probability;
pub mod select;

pub use board::{Board, CellState, Move, Point};
pub use config::SolverConfig;
pub use error::SolverError;
pub use select::solve;

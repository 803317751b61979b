//! Core types for chess and its variants.
//!
//! This crate provides the value types shared by the rules engine and its
//! tools:
//! - [`Color`], [`Role`] and [`Piece`] for piece representation
//! - [`Square`], [`File`], [`Rank`] and [`SquareSet`] for board coordinates
//! - [`Board`] for piece placement
//! - [`Setup`] for unvalidated positions, with FEN parsing and serialization
//! - [`Move`] with UCI notation

mod board;
mod color;
pub mod fen;
mod mov;
mod piece;
mod setup;
mod square;
mod square_set;

pub use board::Board;
pub use color::{ByColor, Color};
pub use fen::{make_fen, parse_fen, FenError};
pub use mov::Move;
pub use piece::{Piece, Role};
pub use setup::{Material, MaterialSide, RemainingChecks, Setup};
pub use square::{File, Rank, Square};
pub use square_set::{SquareSet, SquareSetIter, Subsets};

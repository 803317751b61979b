//! Legal move generation for chess and its variants.
//!
//! This crate turns the value types of `chess_core` into a rules engine:
//! - [`Position`] validates a [`Setup`](chess_core::Setup), generates legal
//!   moves, plays them and detects the end of the game
//! - [`Rules`] selects standard chess or one of seven variants, each a
//!   [`RuleSet`] that overrides only what it changes
//! - [`AttackTables`] holds the compile-time attack tables
//! - [`perft`] counts move-tree leaves for validation
//!
//! # Example
//!
//! ```
//! use chess_core::parse_fen;
//! use chess_rules::{perft, Position, Rules};
//!
//! let setup = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
//! let pos = Position::from_setup(&setup, Rules::Chess).unwrap();
//! assert_eq!(pos.legal_moves().len(), 20);
//! assert_eq!(perft(&pos, 2), 400);
//! ```

mod attacks;
mod castles;
mod move_list;
mod perft;
mod position;
pub mod rules;

pub use attacks::{AttackTables, ATTACKS};
pub use castles::{Castles, CastlingSide};
pub use move_list::MoveList;
pub use perft::{perft, perft_divide};
pub use position::{Context, DrawReason, Outcome, Position, PositionError, SetupOptions};
pub use rules::{RuleSet, Rules};

//! Standard chess rules, and the checks other variants build on.

use super::RuleSet;
use crate::{Position, PositionError, SetupOptions};
use chess_core::{Board, Color, Square, SquareSet};

/// Standard chess (FIDE), also covering Chess960 castling.
///
/// Uses every default of [`RuleSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl RuleSet for Standard {}

/// Rejects boards that are empty, lack exactly one king per side, have the
/// side not to move in check, or have pawns on a back rank.
pub(crate) fn validate(pos: &Position, options: &SetupOptions) -> Result<(), PositionError> {
    let board = pos.board();
    let turn = pos.turn();
    if board.occupied().is_empty() {
        return Err(PositionError::Empty);
    }
    if board.kings().size() != 2 || board.king_of(turn).is_none() {
        return Err(PositionError::Kings);
    }
    let Some(other_king) = board.king_of(!turn) else {
        return Err(PositionError::Kings);
    };
    if pos
        .king_attackers(other_king, turn, board.occupied())
        .is_not_empty()
    {
        return Err(PositionError::OppositeCheck);
    }
    if SquareSet::BACKRANKS.intersects(board.pawns()) {
        return Err(PositionError::PawnsOnBackrank);
    }
    if options.ignore_impossible_check {
        Ok(())
    } else {
        validate_checkers(pos)
    }
}

/// Rejects check configurations that no legal last move could produce.
///
/// After a double step only the pushed pawn, or a single discovered
/// slider, can give check. Otherwise there are at most two checkers, and
/// two checkers are never aligned with the king.
pub(crate) fn validate_checkers(pos: &Position) -> Result<(), PositionError> {
    let board = pos.board();
    let turn = pos.turn();
    let Some(our_king) = board.king_of(turn) else {
        return Ok(());
    };
    let checkers = pos.king_attackers(our_king, !turn, board.occupied());
    if checkers.is_empty() {
        return Ok(());
    }

    let impossible = match pos.ep_square() {
        Some(ep) => {
            let pushed_to = Square::from_index(ep.index() ^ 8);
            let pushed_from = Square::from_index(ep.index() ^ 24);
            match (pushed_to, pushed_from) {
                (Some(pushed_to), Some(pushed_from)) => {
                    let before = board.occupied().without(pushed_to).with(pushed_from);
                    checkers.more_than_one()
                        || (checkers.first() != Some(pushed_to)
                            && pos
                                .king_attackers(our_king, !turn, before)
                                .is_not_empty())
                }
                _ => false,
            }
        }
        None => match (checkers.first(), checkers.last()) {
            _ if checkers.size() > 2 => true,
            (Some(first), Some(last)) if checkers.size() == 2 => {
                pos.tables().ray(first, last).has(our_king)
            }
            _ => false,
        },
    };

    if impossible {
        Err(PositionError::ImpossibleCheck)
    } else {
        Ok(())
    }
}

/// Whether `color` lacks the material to ever deliver mate.
pub(crate) fn has_insufficient_material(board: &Board, color: Color) -> bool {
    let ours = board.by_color(color);
    if ours.intersects(board.pawns() | board.rooks_and_queens()) {
        return false;
    }
    if ours.intersects(board.knights()) {
        return ours.size() <= 2
            && (board.by_color(!color) - board.kings() - board.queens()).is_empty();
    }
    if ours.intersects(board.bishops()) {
        let same_color = !board.bishops().intersects(SquareSet::DARK_SQUARES)
            || !board.bishops().intersects(SquareSet::LIGHT_SQUARES);
        return same_color && board.pawns().is_empty() && board.knights().is_empty();
    }
    true
}

//! Racing kings: no checks allowed, first king to the eighth rank wins.
//! Black gets one more move to equalize when white arrives first.

use super::{standard, RuleSet};
use crate::{AttackTables, Castles, Context, DrawReason, Outcome, Position, PositionError, SetupOptions};
use chess_core::{Board, Color, Move, Setup, Square, SquareSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct RacingKings;

impl RuleSet for RacingKings {
    fn initial_setup(&self) -> Setup {
        Setup {
            board: Board::racing_kings(),
            ..Setup::empty()
        }
    }

    fn castles(&self, _tables: &AttackTables, _board: &Board, _unmoved_rooks: SquareSet) -> Castles {
        Castles::EMPTY
    }

    fn validate(&self, pos: &Position, options: &SetupOptions) -> Result<(), PositionError> {
        if pos.is_check() || pos.board().pawns().is_not_empty() {
            return Err(PositionError::Variant);
        }
        standard::validate(pos, options)
    }

    /// Moves that give check are illegal, including king moves that
    /// uncover a check.
    fn dests(&self, pos: &Position, sq: Square, ctx: &Context) -> SquareSet {
        let dests = pos.legal_dests(sq, ctx);
        let mut safe = SquareSet::EMPTY;
        for to in dests {
            let mut after = pos.clone();
            after.play(&Move::normal(sq, to));
            if !after.is_check() {
                safe = safe.with(to);
            }
        }
        safe
    }

    /// Kings race, so nothing is ever a material draw.
    fn has_insufficient_material(&self, _pos: &Position, _color: Color) -> bool {
        false
    }

    fn is_variant_end(&self, pos: &Position) -> bool {
        let board = pos.board();
        let goal = SquareSet::RANK_8;
        let kings_in_goal = board.kings() & goal;
        if kings_in_goal.is_empty() {
            return false;
        }
        if pos.turn() == Color::White || kings_in_goal.intersects(board.black()) {
            return true;
        }

        // White reached the goal; black may still catch up in one move.
        let Some(black_king) = board.king_of(Color::Black) else {
            return true;
        };
        let occupied = board.occupied().without(black_king);
        let targets = pos.tables().king(black_king) & (goal - board.black());
        !targets
            .into_iter()
            .any(|target| pos.king_attackers(target, Color::White, occupied).is_empty())
    }

    fn variant_outcome(&self, pos: &Position, ctx: &Context) -> Option<Outcome> {
        if !ctx.variant_end {
            return None;
        }
        let in_goal = pos.board().kings() & SquareSet::RANK_8;
        let black = in_goal.intersects(pos.board().black());
        let white = in_goal.intersects(pos.board().white());
        Some(match (white, black) {
            (true, false) => Outcome::Decisive {
                winner: Color::White,
            },
            (false, true) => Outcome::Decisive {
                winner: Color::Black,
            },
            _ => Outcome::Draw(DrawReason::VariantEnd),
        })
    }
}

//! Antichess: captures are compulsory, kings are ordinary pieces, and the
//! first side to lose all its pieces or be stalemated wins.

use super::RuleSet;
use crate::{AttackTables, Castles, Context, Outcome, Position, PositionError, SetupOptions};
use chess_core::{Board, Color, Role, Square, SquareSet};

const PROMOTIONS: [Role; 5] = [Role::Queen, Role::Rook, Role::Bishop, Role::Knight, Role::King];

#[derive(Debug, Clone, Copy, Default)]
pub struct Antichess;

impl RuleSet for Antichess {
    fn castles(&self, _tables: &AttackTables, _board: &Board, _unmoved_rooks: SquareSet) -> Castles {
        Castles::EMPTY
    }

    fn validate(&self, pos: &Position, _options: &SetupOptions) -> Result<(), PositionError> {
        if pos.board().occupied().is_empty() {
            return Err(PositionError::Empty);
        }
        if SquareSet::BACKRANKS.intersects(pos.board().pawns()) {
            return Err(PositionError::PawnsOnBackrank);
        }
        Ok(())
    }

    /// There is no check.
    fn king_attackers(
        &self,
        _pos: &Position,
        _sq: Square,
        _attacker: Color,
        _occupied: SquareSet,
    ) -> SquareSet {
        SquareSet::EMPTY
    }

    fn must_capture(&self, pos: &Position, ctx: &Context) -> bool {
        let turn = pos.turn();
        let board = pos.board();
        if let Some(ep) = pos.ep_square() {
            if pos
                .tables()
                .pawn(!turn, ep)
                .intersects(board.pieces(turn, Role::Pawn))
            {
                return true;
            }
        }
        let enemy = board.by_color(!turn);
        board
            .by_color(turn)
            .into_iter()
            .any(|from| pos.pseudo_dests(from, ctx).intersects(enemy))
    }

    fn dests(&self, pos: &Position, sq: Square, ctx: &Context) -> SquareSet {
        let dests = pos.pseudo_dests(sq, ctx);
        if !ctx.must_capture {
            return dests;
        }
        let mut targets = pos.board().by_color(!pos.turn());
        if let Some(ep) = pos.ep_square() {
            if pos.board().pawns().has(sq) {
                targets = targets.with(ep);
            }
        }
        dests & targets
    }

    fn has_insufficient_material(&self, pos: &Position, color: Color) -> bool {
        let board = pos.board();
        if board.by_color(color).is_empty() {
            return false;
        }
        if board.by_color(!color).is_empty() {
            return true;
        }
        if board.occupied() == board.bishops() {
            // Bishops on opposite colors can never be forced to capture.
            let ours = board.by_color(color);
            let theirs = board.by_color(!color);
            return (ours.intersects(SquareSet::LIGHT_SQUARES)
                && theirs.is_disjoint(SquareSet::LIGHT_SQUARES))
                || (ours.intersects(SquareSet::DARK_SQUARES)
                    && theirs.is_disjoint(SquareSet::DARK_SQUARES));
        }
        if board.occupied() == board.knights() && board.occupied().size() == 2 {
            let white_on_light = board.white().intersects(SquareSet::LIGHT_SQUARES);
            let black_on_dark = board.black().intersects(SquareSet::DARK_SQUARES);
            return (white_on_light != black_on_dark) != (pos.turn() == color);
        }
        false
    }

    fn is_variant_end(&self, pos: &Position) -> bool {
        pos.board().by_color(pos.turn()).is_empty()
    }

    /// Running out of pieces or moves wins.
    fn variant_outcome(&self, pos: &Position, ctx: &Context) -> Option<Outcome> {
        if ctx.variant_end || pos.is_stalemate(ctx) {
            Some(Outcome::Decisive { winner: pos.turn() })
        } else {
            None
        }
    }

    fn promotion_roles(&self) -> &'static [Role] {
        &PROMOTIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{perft, Rules};
    use chess_core::{parse_fen, Move};

    fn position(fen: &str) -> Position {
        Position::from_setup(&parse_fen(fen).unwrap(), Rules::Antichess).unwrap()
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn start() {
        let pos = Position::new(Rules::Antichess);
        assert!(pos.castles().is_empty());
        assert_eq!(perft(&pos, 1), 20);
        assert_eq!(perft(&pos, 2), 400);
        assert_eq!(perft(&pos, 3), 8067);
    }

    #[test]
    fn no_king_required() {
        let pos = position("8/8/8/8/8/8/8/N7 w - - 0 1");
        assert!(!pos.is_check());
        assert_eq!(pos.legal_moves().len(), 2);
    }

    #[test]
    fn captures_are_forced() {
        let pos = position("8/8/8/3p4/4P3/8/8/R7 w - - 0 1");
        let ctx = pos.ctx();
        assert!(ctx.must_capture);
        let moves = pos.legal_moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0], Move::normal(sq("e4"), sq("d5")));
    }

    #[test]
    fn king_may_walk_into_attack_and_promote() {
        let pos = position("8/P7/8/8/8/8/1r6/K7 w - - 0 1");
        let ctx = pos.ctx();
        // The king is an ordinary piece and must capture.
        assert!(ctx.must_capture);
        assert_eq!(pos.dests(Square::A1, &ctx), SquareSet::from_square(sq("b2")));
        assert_eq!(pos.dests(sq("a7"), &ctx), SquareSet::EMPTY);
        let pos = position("8/P7/8/8/8/8/8/7r w - - 0 1");
        let ctx = pos.ctx();
        assert!(pos.is_legal(&Move::from_uci("a7a8k").unwrap(), &ctx));
        assert_eq!(pos.legal_moves().len(), 5);
    }

    #[test]
    fn losing_everything_wins() {
        let mut pos = position("8/8/8/8/8/8/1p6/R7 b - - 0 1");
        pos.play(&Move::from_uci("b2a1q").unwrap());
        let ctx = pos.ctx();
        assert!(ctx.variant_end);
        assert_eq!(
            pos.outcome(&ctx),
            Some(Outcome::Decisive {
                winner: Color::White
            })
        );
    }

    #[test]
    fn stalemate_wins() {
        let pos = position("8/8/8/8/8/p7/P7/8 w - - 0 1");
        let ctx = pos.ctx();
        assert_eq!(
            pos.outcome(&ctx),
            Some(Outcome::Decisive {
                winner: Color::White
            })
        );
    }

    #[test]
    fn insufficient_material() {
        // Bishops on opposite colors never meet.
        let pos = position("8/8/8/8/8/8/8/B6b w - - 0 1");
        assert!(pos.has_insufficient_material(Color::White));
        assert!(pos.has_insufficient_material(Color::Black));
        let pos = position("8/8/8/8/8/8/8/B5b1 w - - 0 1");
        assert!(!pos.is_insufficient_material());
        assert!(!position("8/8/8/8/8/8/8/R6r w - - 0 1").is_insufficient_material());
    }
}

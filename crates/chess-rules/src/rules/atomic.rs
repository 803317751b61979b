//! Atomic chess: captures explode, removing every non-pawn piece around
//! the capture square along with the capturer.

use super::{standard, RuleSet};
use crate::{Context, Outcome, Position, PositionError, SetupOptions};
use chess_core::{Color, Move, Piece, Role, Square, SquareSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct Atomic;

impl RuleSet for Atomic {
    fn validate(&self, pos: &Position, options: &SetupOptions) -> Result<(), PositionError> {
        let board = pos.board();
        let turn = pos.turn();
        if board.occupied().is_empty() {
            return Err(PositionError::Empty);
        }
        if board.kings().size() > 2 {
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
        // Explosions can produce any checker layout, except right after a
        // double step.
        if pos.ep_square().is_some() && !options.ignore_impossible_check {
            standard::validate_checkers(pos)?;
        }
        Ok(())
    }

    /// Kings never check a king, and a king touching its enemy king is safe
    /// because capturing it would blow up both.
    fn king_attackers(
        &self,
        pos: &Position,
        sq: Square,
        attacker: Color,
        occupied: SquareSet,
    ) -> SquareSet {
        let board = pos.board();
        match board.king_of(attacker) {
            Some(king) if !pos.tables().king(sq).has(king) => {
                pos.tables().attacks_to(sq, attacker, board, occupied)
            }
            _ => SquareSet::EMPTY,
        }
    }

    fn dests(&self, pos: &Position, sq: Square, ctx: &Context) -> SquareSet {
        let turn = pos.turn();
        let mut dests = SquareSet::EMPTY;
        for to in pos.pseudo_dests(sq, ctx) {
            let mut after = pos.clone();
            after.play(&Move::normal(sq, to));
            let Some(our_king) = after.board().king_of(turn) else {
                continue;
            };
            let safe = after.board().king_of(!turn).is_none()
                || after
                    .king_attackers(our_king, !turn, after.board().occupied())
                    .is_empty();
            if safe {
                dests = dests.with(to);
            }
        }
        dests
    }

    fn on_capture(&self, pos: &mut Position, sq: Square, _captured: Piece) {
        pos.board.remove(sq);
        let blast = pos.tables().king(sq) & (pos.board.occupied() - pos.board.pawns());
        for exploded in blast {
            if let Some(piece) = pos.board.take(exploded) {
                match piece.role {
                    Role::Rook => pos.castles.discard_rook(exploded),
                    Role::King => pos.castles.discard_side(piece.color),
                    _ => {}
                }
            }
        }
    }

    fn has_insufficient_material(&self, pos: &Position, color: Color) -> bool {
        let board = pos.board();
        // Exploding the enemy king is always a way to win.
        if board.king_of(!color).is_none() {
            return false;
        }
        if (board.by_color(color) - board.kings()).is_empty() {
            return true;
        }
        if (board.by_color(!color) - board.kings()).is_not_empty() {
            // Bishops on opposite-colored squares can never meet.
            if board.occupied() == board.bishops() | board.kings() {
                let white_bishops = board.bishops() & board.white();
                let black_bishops = board.bishops() & board.black();
                if !white_bishops.intersects(SquareSet::DARK_SQUARES) {
                    return !black_bishops.intersects(SquareSet::LIGHT_SQUARES);
                }
                if !white_bishops.intersects(SquareSet::LIGHT_SQUARES) {
                    return !black_bishops.intersects(SquareSet::DARK_SQUARES);
                }
            }
            return false;
        }
        if board.queens().is_not_empty() || board.pawns().is_not_empty() {
            return false;
        }
        if (board.knights() | board.bishops() | board.rooks()).size() == 1 {
            return true;
        }
        if board.occupied() == board.knights() | board.kings() {
            return board.knights().size() <= 2;
        }
        false
    }

    fn is_variant_end(&self, pos: &Position) -> bool {
        exploded_king(pos).is_some()
    }

    fn variant_outcome(&self, pos: &Position, _ctx: &Context) -> Option<Outcome> {
        exploded_king(pos).map(|loser| Outcome::Decisive { winner: !loser })
    }
}

fn exploded_king(pos: &Position) -> Option<Color> {
    Color::ALL
        .into_iter()
        .find(|&color| pos.board().king_of(color).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{perft, Rules};
    use chess_core::parse_fen;

    fn position(fen: &str) -> Position {
        Position::from_setup(&parse_fen(fen).unwrap(), Rules::Atomic).unwrap()
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn start_perft() {
        let pos = Position::new(Rules::Atomic);
        assert_eq!(perft(&pos, 1), 20);
        assert_eq!(perft(&pos, 2), 400);
        assert_eq!(perft(&pos, 3), 8902);
    }

    #[test]
    fn checkers_after_double_step_are_validated() {
        let setup = parse_fen("8/8/8/8/3P4/5k2/8/4K1N1 b - d3 0 1").unwrap();
        assert_eq!(
            Position::from_setup(&setup, Rules::Atomic),
            Err(PositionError::ImpossibleCheck)
        );
        let options = SetupOptions {
            ignore_impossible_check: true,
            ..SetupOptions::default()
        };
        assert!(Position::from_setup_with(&setup, Rules::Atomic, options).is_ok());

        // Without a double step any checker layout can come from explosions.
        position("8/8/8/8/3P4/5k2/8/4K1N1 b - - 0 1");
        position("4k3/8/8/8/8/8/8/r3K2r w - - 0 1");
    }

    #[test]
    fn castling_rook_may_shield_destination() {
        let mut pos = position("r3k1rR/5K2/8/8/8/8/8/8 b kq - 0 1");
        pos.play(&Move::from_uci("g8g1").unwrap());
        pos.play(&Move::from_uci("f7e7").unwrap());
        let ctx = pos.ctx();
        assert!(pos.is_legal(&Move::from_uci("e8a8").unwrap(), &ctx));
    }

    #[test]
    fn castling_960_perft() {
        let pos = position("r3k1rR/5K2/8/8/8/8/8/8 b kq - 0 1");
        assert_eq!(perft(&pos, 3), 6753);
    }

    #[test]
    fn capture_explodes_neighbours() {
        let mut pos = position("4k3/8/8/3nbp2/4N3/8/8/4K3 w - - 0 1");
        pos.play(&Move::from_uci("e4f6").unwrap());
        // Quiet move, nothing explodes.
        assert_eq!(pos.board().occupied().size(), 6);

        let mut pos = position("4k3/8/8/3nbp2/4N3/8/8/4K3 w - - 0 1");
        pos.play(&Move::from_uci("e4d6").unwrap());
        pos.play(&Move::from_uci("e5d6").unwrap());
        // The bishop takes on d6: bishop, knight and the d5 knight vanish.
        assert!(!pos.board().has(sq("d6")));
        assert!(!pos.board().has(sq("d5")));
        assert!(pos.board().has(sq("f5")));
    }

    #[test]
    fn pawns_survive_explosions() {
        let mut pos = position("4k3/8/3p4/2pnp3/4N3/8/8/4K3 w - - 0 1");
        pos.play(&Move::from_uci("e4c5").unwrap());
        assert!(!pos.board().has(sq("c5")));
        assert!(!pos.board().has(sq("d5")));
        assert!(pos.board().has(sq("d6")));
        assert!(pos.board().has(sq("e5")));
    }

    #[test]
    fn exploding_the_king_wins() {
        let mut pos = position("4k3/4q3/8/8/8/8/8/R5K1 w - - 0 1");
        let ctx = pos.ctx();
        assert!(pos.dests(Square::A1, &ctx).has(sq("a8")));
        pos.play(&Move::from_uci("a1a7").unwrap());
        pos.play(&Move::from_uci("e8f8").unwrap());
        pos.play(&Move::from_uci("a7e7").unwrap());
        assert!(pos.board().king_of(Color::Black).is_none());
        let ctx = pos.ctx();
        assert!(ctx.variant_end);
        assert_eq!(
            pos.outcome(&ctx),
            Some(Outcome::Decisive {
                winner: Color::White
            })
        );
        assert!(pos.legal_moves().is_empty());
    }

    #[test]
    fn touching_kings_are_not_in_check() {
        let pos = position("8/8/8/8/8/3kK2q/8/8 w - - 0 1");
        assert!(!pos.is_check());
        // The queen hits e3 but the kings touch.
        let ctx = pos.ctx();
        assert!(ctx.checkers.is_empty());
    }

    #[test]
    fn cannot_explode_own_king() {
        let pos = position("8/8/8/8/8/8/3pK3/7k w - - 0 1");
        let ctx = pos.ctx();
        assert!(!pos.dests(sq("e2"), &ctx).has(sq("d2")));
    }

    #[test]
    fn insufficient_material() {
        assert!(position("8/8/8/8/8/8/8/K1k5 w - - 0 1").is_insufficient_material());
        assert!(position("8/8/8/8/8/8/8/KBk5 w - - 0 1").has_insufficient_material(Color::White));
        // Bishops on opposite colors.
        assert!(position("8/8/8/8/8/8/8/KBk1b3 w - - 0 1").is_insufficient_material());
        assert!(!position("7k/8/8/8/8/8/8/KQ6 w - - 0 1").has_insufficient_material(Color::White));
    }
}

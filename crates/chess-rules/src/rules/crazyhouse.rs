//! Crazyhouse: captured pieces change sides and can be dropped back onto
//! the board.

use super::{standard, RuleSet};
use crate::{Context, Position, PositionError, SetupOptions};
use chess_core::{Color, Material, Role, Setup, SquareSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct Crazyhouse;

impl RuleSet for Crazyhouse {
    fn initial_setup(&self) -> Setup {
        Setup {
            pockets: Some(Material::default()),
            ..Setup::default()
        }
    }

    fn pockets(&self, setup: &Setup) -> Option<Material> {
        Some(setup.pockets.unwrap_or_default())
    }

    fn tracks_promoted(&self) -> bool {
        true
    }

    fn validate(&self, pos: &Position, options: &SetupOptions) -> Result<(), PositionError> {
        standard::validate(pos, options)?;
        let pockets = pos.pockets().copied().unwrap_or_default();
        if pockets.count(Color::White, Role::King) > 0 || pockets.count(Color::Black, Role::King) > 0 {
            return Err(PositionError::Kings);
        }
        if pockets.size() + pos.board().occupied().size() > 64 {
            return Err(PositionError::Variant);
        }
        Ok(())
    }

    /// Drops may land on any vacant square, pawns not on a back rank. In
    /// check a drop must block the single checking line.
    fn drop_dests(&self, pos: &Position, ctx: &Context) -> SquareSet {
        let Some(pockets) = pos.pockets() else {
            return SquareSet::EMPTY;
        };
        let hand = pockets.get(pos.turn());
        let allowed = if hand.has_non_pawns() {
            SquareSet::FULL
        } else if hand.has_pawns() {
            !SquareSet::BACKRANKS
        } else {
            SquareSet::EMPTY
        };
        let mask = !pos.board().occupied() & allowed;
        match ctx.king {
            Some(king) if ctx.checkers.is_not_empty() => match ctx.checkers.single_square() {
                Some(checker) => mask & pos.tables().between(checker, king),
                None => SquareSet::EMPTY,
            },
            _ => mask,
        }
    }

    /// Material in the pockets can always come back, so only a few bare
    /// minor pieces are a draw.
    fn has_insufficient_material(&self, pos: &Position, _color: Color) -> bool {
        let board = pos.board();
        let pockets = pos.pockets().copied().unwrap_or_default();
        let in_pockets = |role: Role| {
            pockets.count(Color::White, role) + pockets.count(Color::Black, role) > 0
        };
        board.occupied().size() + pockets.size() <= 3
            && board.pawns().is_empty()
            && board.promoted().is_empty()
            && board.rooks_and_queens().is_empty()
            && !in_pockets(Role::Pawn)
            && !in_pockets(Role::Rook)
            && !in_pockets(Role::Queen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{perft, Rules};
    use chess_core::{parse_fen, Move, Square};

    fn position(fen: &str) -> Position {
        Position::from_setup(&parse_fen(fen).unwrap(), Rules::Crazyhouse).unwrap()
    }

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn start() {
        let pos = Position::new(Rules::Crazyhouse);
        assert_eq!(pos.pockets(), Some(&Material::default()));
        assert_eq!(perft(&pos, 2), 400);
    }

    #[test]
    fn drop_counts() {
        assert_eq!(perft(&position("4k3/8/8/8/8/8/8/4K3[N] w - - 0 1"), 1), 67);
        assert_eq!(perft(&position("4k3/8/8/8/8/8/8/4K3[P] w - - 0 1"), 1), 53);
    }

    #[test]
    fn captures_fill_the_pocket() {
        let mut pos = position("4k3/8/8/3p4/4N3/8/8/4K3[] w - - 0 1");
        pos.play(&Move::from_uci("e4d6").unwrap());
        assert!(pos.pockets().unwrap().get(Color::White).is_empty());
        let mut pos = position("4k3/8/8/3p4/4B3/8/8/4K3[] w - - 0 1");
        pos.play(&Move::from_uci("e4d5").unwrap());
        assert_eq!(pos.pockets().unwrap().count(Color::White, Role::Pawn), 1);
        pos.play(&Move::from_uci("e8d7").unwrap());
        let ctx = pos.ctx();
        assert!(pos.is_legal(&Move::from_uci("P@d6").unwrap(), &ctx));
        assert!(!pos.is_legal(&Move::from_uci("P@d8").unwrap(), &ctx));
        assert!(!pos.is_legal(&Move::from_uci("N@d6").unwrap(), &ctx));
        pos.play(&Move::from_uci("P@c6").unwrap());
        assert_eq!(pos.board().get(sq("c6")), Some(Role::Pawn.of(Color::White)));
        assert!(pos.pockets().unwrap().get(Color::White).is_empty());
        assert_eq!(pos.halfmoves(), 0);
    }

    #[test]
    fn promoted_pieces_return_as_pawns() {
        let mut pos = position("1rk5/P7/8/8/8/8/8/4K3[] w - - 0 1");
        pos.play(&Move::from_uci("a7b8q").unwrap());
        assert!(pos.board().promoted().has(sq("b8")));
        assert_eq!(pos.pockets().unwrap().count(Color::White, Role::Rook), 1);
        pos.play(&Move::from_uci("c8b8").unwrap());
        assert_eq!(pos.pockets().unwrap().count(Color::Black, Role::Pawn), 1);
        assert_eq!(pos.pockets().unwrap().count(Color::Black, Role::Queen), 0);
    }

    #[test]
    fn drops_must_block_check() {
        let pos = position("4k3/8/8/8/8/8/8/r3K3[Q] w - - 0 1");
        let ctx = pos.ctx();
        assert_eq!(
            pos.drop_dests(&ctx),
            [Square::B1, Square::C1, Square::D1].into_iter().collect::<SquareSet>()
        );
    }

    #[test]
    fn validation() {
        let kings = parse_fen("4k3/8/8/8/8/8/8/4K3[K] w - - 0 1").unwrap();
        assert_eq!(
            Position::from_setup(&kings, Rules::Crazyhouse),
            Err(PositionError::Kings)
        );
        let mut crowded = parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut pockets = Material::default();
        pockets.white.set(Role::Pawn, 63);
        crowded.pockets = Some(pockets);
        assert_eq!(
            Position::from_setup(&crowded, Rules::Crazyhouse),
            Err(PositionError::Variant)
        );
    }

    #[test]
    fn insufficient_material() {
        assert!(position("4k3/8/8/8/8/8/8/4K3[] w - - 0 1").is_insufficient_material());
        assert!(position("4k3/8/8/8/8/8/8/4K3[n] w - - 0 1").is_insufficient_material());
        assert!(!position("4k3/8/8/8/8/8/8/4K3[p] w - - 0 1").is_insufficient_material());
        assert!(!position("4k3/8/8/8/8/8/8/4K3[Nn] w - - 0 1").is_insufficient_material());
    }
}

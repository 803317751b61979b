//! King of the hill: bringing the king to one of the four center squares
//! wins.

use super::RuleSet;
use crate::{Context, Outcome, Position};
use chess_core::{Color, SquareSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct KingOfTheHill;

impl RuleSet for KingOfTheHill {
    /// A lone king can still walk to the center.
    fn has_insufficient_material(&self, _pos: &Position, _color: Color) -> bool {
        false
    }

    fn is_variant_end(&self, pos: &Position) -> bool {
        pos.board().kings().intersects(SquareSet::CENTER)
    }

    fn variant_outcome(&self, pos: &Position, _ctx: &Context) -> Option<Outcome> {
        Color::ALL
            .into_iter()
            .find(|&color| {
                pos.board()
                    .by_color(color)
                    .intersects(pos.board().kings() & SquareSet::CENTER)
            })
            .map(|winner| Outcome::Decisive { winner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{perft, Rules};
    use chess_core::{parse_fen, Move};

    #[test]
    fn start_perft() {
        assert_eq!(perft(&Position::new(Rules::KingOfTheHill), 3), 8902);
    }

    #[test]
    fn reaching_the_center_wins() {
        let setup = parse_fen("4k3/8/8/8/8/4K3/8/8 w - - 0 1").unwrap();
        let mut pos = Position::from_setup(&setup, Rules::KingOfTheHill).unwrap();
        assert!(!pos.is_variant_end());
        pos.play(&Move::from_uci("e3e4").unwrap());
        let ctx = pos.ctx();
        assert!(ctx.variant_end);
        assert!(pos.is_end(&ctx));
        assert_eq!(
            pos.outcome(&ctx),
            Some(Outcome::Decisive {
                winner: Color::White
            })
        );
    }

    #[test]
    fn bare_kings_are_not_a_draw() {
        let setup = parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let pos = Position::from_setup(&setup, Rules::KingOfTheHill).unwrap();
        assert!(!pos.is_insufficient_material());
        assert_eq!(pos.outcome(&pos.ctx()), None);
    }
}

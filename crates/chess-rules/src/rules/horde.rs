//! Horde: white has no king but 36 pawns, and wins by checkmate; black
//! wins by capturing every white piece.

use super::{standard, RuleSet};
use crate::{Context, Outcome, Position, PositionError, SetupOptions};
use chess_core::{Board, Color, Material, MaterialSide, Role, Setup, SquareSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct Horde;

impl RuleSet for Horde {
    fn initial_setup(&self) -> Setup {
        Setup {
            board: Board::horde(),
            unmoved_rooks: SquareSet::backrank(Color::Black) & SquareSet::CORNERS,
            ..Setup::empty()
        }
    }

    /// Exactly one king overall. A side without a king may keep pawns on
    /// its own back rank.
    fn validate(&self, pos: &Position, options: &SetupOptions) -> Result<(), PositionError> {
        let board = pos.board();
        let turn = pos.turn();
        if board.occupied().is_empty() {
            return Err(PositionError::Empty);
        }
        if board.kings().size() != 1 {
            return Err(PositionError::Kings);
        }
        if let Some(other_king) = board.king_of(!turn) {
            if pos
                .king_attackers(other_king, turn, board.occupied())
                .is_not_empty()
            {
                return Err(PositionError::OppositeCheck);
            }
        }
        for color in Color::ALL {
            let forbidden = if board.king_of(color).is_some() {
                SquareSet::BACKRANKS
            } else {
                SquareSet::backrank(!color)
            };
            if board.pieces(color, Role::Pawn).intersects(forbidden) {
                return Err(PositionError::PawnsOnBackrank);
            }
        }
        if options.ignore_impossible_check {
            Ok(())
        } else {
            standard::validate_checkers(pos)
        }
    }

    fn has_insufficient_material(&self, pos: &Position, color: Color) -> bool {
        horde_insufficient_material(pos.board(), color)
    }

    fn is_variant_end(&self, pos: &Position) -> bool {
        wiped_out(pos).is_some()
    }

    fn variant_outcome(&self, pos: &Position, _ctx: &Context) -> Option<Outcome> {
        wiped_out(pos).map(|loser| Outcome::Decisive { winner: !loser })
    }
}

fn wiped_out(pos: &Position) -> Option<Color> {
    Color::ALL
        .into_iter()
        .find(|&color| pos.board().by_color(color).is_empty())
}

/// Whether `color` can never win.
///
/// The side with a king can be mated only if the horde keeps enough
/// material. The king side itself wins by capturing everything, which is
/// always possible in principle, so only the kingless side is examined.
/// A lone horde pawn is judged by the pieces it could promote to.
fn horde_insufficient_material(board: &Board, color: Color) -> bool {
    if board.king_of(color).is_some() {
        return false;
    }

    let material = Material::from_board(board);
    let horde = material.get(color);
    let pieces = material.get(!color);
    let count = |side: &MaterialSide, role: Role| u32::from(side.count(role));

    let horde_bishops = |squares: SquareSet| (board.pieces(color, Role::Bishop) & squares).size();
    let pieces_bishops = |squares: SquareSet| (board.pieces(!color, Role::Bishop) & squares).size();
    let has_bishop_pair = |side: Color| {
        let bishops = board.pieces(side, Role::Bishop);
        bishops.intersects(SquareSet::DARK_SQUARES) && bishops.intersects(SquareSet::LIGHT_SQUARES)
    };
    let (horde_bishop_color, other_bishop_color) = if horde_bishops(SquareSet::LIGHT_SQUARES) >= 1 {
        (SquareSet::LIGHT_SQUARES, SquareSet::DARK_SQUARES)
    } else {
        (SquareSet::DARK_SQUARES, SquareSet::LIGHT_SQUARES)
    };

    let (hp, hn, hb, hr, hq) = (
        count(horde, Role::Pawn),
        count(horde, Role::Knight),
        count(horde, Role::Bishop),
        count(horde, Role::Rook),
        count(horde, Role::Queen),
    );
    let (pp, pn, pb, pr, pq) = (
        count(pieces, Role::Pawn),
        count(pieces, Role::Knight),
        count(pieces, Role::Bishop),
        count(pieces, Role::Rook),
        count(pieces, Role::Queen),
    );

    // Same-colored bishops beyond the second add nothing.
    let horde_num = hp
        + hn
        + hr
        + hq
        + horde_bishops(SquareSet::DARK_SQUARES).min(2)
        + horde_bishops(SquareSet::LIGHT_SQUARES).min(2);
    let pieces_num = pieces.size();
    let pieces_except = |n: u32| pieces_num.saturating_sub(n);

    if horde_num == 0 {
        return true;
    }
    if horde_num >= 4 {
        return false;
    }
    if (hp >= 1 || hq >= 1) && horde_num >= 2 {
        return false;
    }
    if hr >= 1
        && horde_num >= 2
        && !(horde_num == 2
            && hr == 1
            && hb == 1
            && pieces_except(pieces_bishops(horde_bishop_color)) == 1)
    {
        return false;
    }

    match horde_num {
        1 => {
            if pieces_num == 1 {
                // A lone piece cannot mate a lone king.
                true
            } else if hq == 1 {
                !(pp >= 1
                    || pr >= 1
                    || pieces_bishops(SquareSet::LIGHT_SQUARES) >= 2
                    || pieces_bishops(SquareSet::DARK_SQUARES) >= 2)
            } else if hp == 1 {
                let Some(pawn) = board.pieces(color, Role::Pawn).last() else {
                    return true;
                };
                [Role::Queen, Role::Knight].into_iter().all(|role| {
                    let mut promoted = board.clone();
                    promoted.set(pawn, role.of(color));
                    horde_insufficient_material(&promoted, color)
                })
            } else if hr == 1 {
                !(pp >= 2
                    || (pr >= 1 && pp >= 1)
                    || (pr >= 1 && pn >= 1)
                    || (pp >= 1 && pn >= 1))
            } else if hb == 1 {
                !(pieces_bishops(other_bishop_color) >= 2
                    || (pieces_bishops(other_bishop_color) >= 1 && pp >= 1)
                    || pp >= 2)
            } else if hn == 1 {
                !(pieces_num >= 4
                    && (pn >= 2
                        || pp >= 2
                        || (pr >= 1 && pn >= 1)
                        || (pr >= 1 && pb >= 1)
                        || (pn >= 1 && pb >= 1)
                        || (pr >= 1 && pp >= 1)
                        || (pn >= 1 && pp >= 1)
                        || (pb >= 1 && pp >= 1)
                        || (has_bishop_pair(!color) && pp >= 1))
                    && (pieces_bishops(SquareSet::DARK_SQUARES) < 2
                        || pieces_except(pieces_bishops(SquareSet::DARK_SQUARES)) >= 3)
                    && (pieces_bishops(SquareSet::LIGHT_SQUARES) < 2
                        || pieces_except(pieces_bishops(SquareSet::LIGHT_SQUARES)) >= 3))
            } else {
                true
            }
        }
        2 => {
            if pieces_num == 1 {
                true
            } else if hn == 2 {
                pp + pb + pn < 1
            } else if has_bishop_pair(color) {
                !(pp >= 1 || pb >= 1 || (pn >= 1 && pr + pq >= 1))
            } else if hb >= 1 && hn >= 1 {
                !(pp >= 1
                    || pieces_bishops(other_bishop_color) >= 1
                    || pieces_except(pieces_bishops(horde_bishop_color)) >= 3)
            } else {
                !((pp >= 1 && pieces_bishops(other_bishop_color) >= 1)
                    || (pp >= 1 && pn >= 1)
                    || (pieces_bishops(other_bishop_color) >= 1 && pn >= 1)
                    || pieces_bishops(other_bishop_color) >= 2
                    || pn >= 2
                    || pp >= 2)
            }
        }
        3 => {
            if (hn == 2 && hb == 1) || hn == 3 || has_bishop_pair(color) {
                false
            } else {
                pieces_num == 1
            }
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{perft, Rules};
    use chess_core::{parse_fen, Move, Square};

    fn position(fen: &str) -> Position {
        Position::from_setup(&parse_fen(fen).unwrap(), Rules::Horde).unwrap()
    }

    #[test]
    fn start() {
        let pos = Position::new(Rules::Horde);
        assert!(!pos.castles().has_color(Color::White));
        assert!(pos.castles().has_color(Color::Black));
        assert_eq!(perft(&pos, 1), 8);
        assert_eq!(perft(&pos, 2), 128);
        assert_eq!(perft(&pos, 3), 1274);
    }

    #[test]
    fn start_from_fen() {
        let fen = "rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP w kq - 0 1";
        assert_eq!(position(fen), Position::new(Rules::Horde));
    }

    #[test]
    fn first_rank_pawns_double_step() {
        let pos = position("4k3/8/8/8/8/8/8/P7 w - - 0 1");
        let ctx = pos.ctx();
        assert_eq!(pos.dests(Square::A1, &ctx).size(), 2);
    }

    #[test]
    fn validation() {
        let two_kings = parse_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            Position::from_setup(&two_kings, Rules::Horde),
            Err(PositionError::Kings)
        );
        let black_pawn_home = parse_fen("4k3/8/8/8/8/8/8/p6P w - - 0 1").unwrap();
        assert_eq!(
            Position::from_setup(&black_pawn_home, Rules::Horde),
            Err(PositionError::PawnsOnBackrank)
        );
        let white_pawn_far = parse_fen("P3k3/8/8/8/8/8/8/7P w - - 0 1").unwrap();
        assert_eq!(
            Position::from_setup(&white_pawn_far, Rules::Horde),
            Err(PositionError::PawnsOnBackrank)
        );
    }

    #[test]
    fn capturing_the_horde_wins() {
        let mut pos = position("4k3/8/8/8/8/8/3P4/8 b - - 0 1");
        pos.play(&Move::from_uci("e8e7").unwrap());
        pos.play(&Move::from_uci("d2d4").unwrap());
        pos.play(&Move::from_uci("e7e6").unwrap());
        pos.play(&Move::from_uci("d4d5").unwrap());
        pos.play(&Move::from_uci("e6d5").unwrap());
        let ctx = pos.ctx();
        assert!(ctx.variant_end);
        assert_eq!(
            pos.outcome(&ctx),
            Some(Outcome::Decisive {
                winner: Color::Black
            })
        );
    }

    #[test]
    fn insufficient_material() {
        // The king side can always win in principle.
        assert!(!position("4k3/8/8/8/8/8/8/N7 w - - 0 1").has_insufficient_material(Color::Black));
        // A lone knight cannot mate a lone king.
        assert!(position("4k3/8/8/8/8/8/8/N7 w - - 0 1").has_insufficient_material(Color::White));
        // A queen can mate only when the king is hemmed in by its own rook
        // or pawns.
        assert!(position("4kq2/8/8/8/8/8/8/Q7 w - - 0 1").has_insufficient_material(Color::White));
        assert!(!position("4kr2/8/8/8/8/8/8/Q7 w - - 0 1").has_insufficient_material(Color::White));
        // A lone pawn is judged by what it promotes to.
        assert!(position("4k3/8/8/8/8/8/P7/8 w - - 0 1").has_insufficient_material(Color::White));
        assert!(!position("4kr2/8/8/8/8/8/P7/8 w - - 0 1").has_insufficient_material(Color::White));
        // Enough horde material is never insufficient.
        assert!(!position("4k3/8/8/8/8/8/PPPP4/8 w - - 0 1").has_insufficient_material(Color::White));
    }
}

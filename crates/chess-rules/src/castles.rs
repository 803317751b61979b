//! Castling rights.

use crate::AttackTables;
use chess_core::{Board, ByColor, Color, File, Rank, Square, SquareSet};
use std::fmt;

/// The side of the board a castling rook starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastlingSide {
    /// Towards the a-file (long castling in standard chess).
    A,
    /// Towards the h-file (short castling in standard chess).
    H,
}

impl CastlingSide {
    pub const ALL: [CastlingSide; 2] = [CastlingSide::A, CastlingSide::H];

    /// The file the king lands on.
    pub const fn king_to_file(self) -> File {
        match self {
            CastlingSide::A => File::C,
            CastlingSide::H => File::G,
        }
    }

    /// The file the rook lands on.
    pub const fn rook_to_file(self) -> File {
        match self {
            CastlingSide::A => File::D,
            CastlingSide::H => File::F,
        }
    }

    /// Where the king of `color` ends up.
    pub const fn king_to(self, color: Color) -> Square {
        Square::new(self.king_to_file(), back_rank(color))
    }

    /// Where the rook of `color` ends up.
    pub const fn rook_to(self, color: Color) -> Square {
        Square::new(self.rook_to_file(), back_rank(color))
    }
}

impl fmt::Display for CastlingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastlingSide::A => write!(f, "a-side"),
            CastlingSide::H => write!(f, "h-side"),
        }
    }
}

const fn back_rank(color: Color) -> Rank {
    match color {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct BySide<T> {
    a: T,
    h: T,
}

impl<T> BySide<T> {
    fn get(&self, side: CastlingSide) -> &T {
        match side {
            CastlingSide::A => &self.a,
            CastlingSide::H => &self.h,
        }
    }

    fn get_mut(&mut self, side: CastlingSide) -> &mut T {
        match side {
            CastlingSide::A => &mut self.a,
            CastlingSide::H => &mut self.h,
        }
    }
}

/// Castling rights with the rook that castles and the squares that must be
/// vacant, per color and side.
///
/// A rook slot is filled only while its square is in `unmoved_rooks` and
/// was, when the rights were set up, on its color's back rank on the
/// correct side of that color's king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Castles {
    unmoved_rooks: SquareSet,
    rook: ByColor<BySide<Option<Square>>>,
    path: ByColor<BySide<SquareSet>>,
}

impl Castles {
    /// No castling rights at all.
    pub const EMPTY: Castles = Castles {
        unmoved_rooks: SquareSet::EMPTY,
        rook: ByColor {
            white: BySide { a: None, h: None },
            black: BySide { a: None, h: None },
        },
        path: ByColor {
            white: BySide {
                a: SquareSet::EMPTY,
                h: SquareSet::EMPTY,
            },
            black: BySide {
                a: SquareSet::EMPTY,
                h: SquareSet::EMPTY,
            },
        },
    };

    /// Full rights for the standard starting position.
    pub fn new(tables: &AttackTables) -> Castles {
        Castles::from_setup(tables, &Board::new(), SquareSet::CORNERS)
    }

    /// Derives rights from a board and the set of rooks that have not moved.
    ///
    /// For each color whose king stands on its back rank, the a-side rook is
    /// the first unmoved rook below the king and the h-side rook is the last
    /// one above it. Other unmoved rooks are dropped.
    pub fn from_setup(tables: &AttackTables, board: &Board, unmoved_rooks: SquareSet) -> Castles {
        let mut castles = Castles::EMPTY;
        let rooks = unmoved_rooks & board.rooks();
        for color in Color::ALL {
            let backrank = SquareSet::backrank(color);
            let king = match board.king_of(color) {
                Some(king) if backrank.has(king) => king,
                _ => continue,
            };
            let side = rooks & board.by_color(color) & backrank;
            if let Some(rook) = side.first().filter(|rook| rook.index() < king.index()) {
                castles.add(tables, color, CastlingSide::A, king, rook);
            }
            if let Some(rook) = side.last().filter(|rook| king.index() < rook.index()) {
                castles.add(tables, color, CastlingSide::H, king, rook);
            }
        }
        castles
    }

    fn add(
        &mut self,
        tables: &AttackTables,
        color: Color,
        side: CastlingSide,
        king: Square,
        rook: Square,
    ) {
        let king_to = side.king_to(color);
        let rook_to = side.rook_to(color);
        self.unmoved_rooks = self.unmoved_rooks.with(rook);
        *self.rook.get_mut(color).get_mut(side) = Some(rook);
        *self.path.get_mut(color).get_mut(side) = (tables.between(rook, rook_to).with(rook_to)
            | tables.between(king, king_to).with(king_to))
        .without(king)
        .without(rook);
    }

    /// Rooks that still carry castling rights.
    #[inline]
    pub fn unmoved_rooks(&self) -> SquareSet {
        self.unmoved_rooks
    }

    /// The rook that castles on `side`, if the right still exists.
    #[inline]
    pub fn rook(&self, color: Color, side: CastlingSide) -> Option<Square> {
        *self.rook.get(color).get(side)
    }

    /// Squares other than the king and rook that must be vacant.
    #[inline]
    pub fn path(&self, color: Color, side: CastlingSide) -> SquareSet {
        *self.path.get(color).get(side)
    }

    pub fn has(&self, color: Color, side: CastlingSide) -> bool {
        self.rook(color, side).is_some()
    }

    pub fn has_color(&self, color: Color) -> bool {
        CastlingSide::ALL.into_iter().any(|side| self.has(color, side))
    }

    pub fn is_empty(&self) -> bool {
        self.unmoved_rooks.is_empty()
    }

    /// Revokes the right tied to a rook that moved or was captured.
    pub fn discard_rook(&mut self, sq: Square) {
        if !self.unmoved_rooks.has(sq) {
            return;
        }
        self.unmoved_rooks = self.unmoved_rooks.without(sq);
        for color in Color::ALL {
            for side in CastlingSide::ALL {
                let slot = self.rook.get_mut(color).get_mut(side);
                if *slot == Some(sq) {
                    *slot = None;
                }
            }
        }
    }

    /// Revokes both rights of `color`.
    pub fn discard_side(&mut self, color: Color) {
        self.unmoved_rooks = self.unmoved_rooks - SquareSet::backrank(color);
        *self.rook.get_mut(color) = BySide { a: None, h: None };
    }
}

impl Default for Castles {
    fn default() -> Self {
        Castles::new(&crate::ATTACKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ATTACKS;
    use chess_core::{parse_fen, Role};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn standard_rights() {
        let castles = Castles::new(&ATTACKS);
        assert_eq!(castles.unmoved_rooks(), SquareSet::CORNERS);
        assert_eq!(castles.rook(Color::White, CastlingSide::A), Some(Square::A1));
        assert_eq!(castles.rook(Color::White, CastlingSide::H), Some(Square::H1));
        assert_eq!(castles.rook(Color::Black, CastlingSide::H), Some(Square::H8));
        assert_eq!(
            castles.path(Color::White, CastlingSide::H),
            SquareSet::from_iter([Square::F1, Square::G1])
        );
        assert_eq!(
            castles.path(Color::White, CastlingSide::A),
            SquareSet::from_iter([Square::B1, Square::C1, Square::D1])
        );
    }

    #[test]
    fn destinations() {
        assert_eq!(CastlingSide::A.king_to(Color::White), Square::C1);
        assert_eq!(CastlingSide::H.king_to(Color::White), Square::G1);
        assert_eq!(CastlingSide::A.rook_to(Color::Black), Square::D8);
        assert_eq!(CastlingSide::H.rook_to(Color::Black), Square::F8);
    }

    #[test]
    fn chess960_rights() {
        let setup =
            parse_fen("bqnb1rkr/pp3ppp/3ppn2/2p5/5P2/P2P4/NPP1P1PP/BQ1BNRKR w HFhf - 2 9").unwrap();
        let castles = Castles::from_setup(&ATTACKS, &setup.board, setup.unmoved_rooks);
        assert_eq!(castles.rook(Color::White, CastlingSide::A), Some(sq("f1")));
        assert_eq!(castles.rook(Color::White, CastlingSide::H), Some(Square::H1));
        // King g1 to c1 and rook f1 to d1: c1, d1 and e1 must be vacant.
        assert_eq!(
            castles.path(Color::White, CastlingSide::A),
            SquareSet::from_iter([Square::C1, Square::D1, Square::E1])
        );
        // King g1 stays, rook h1 to f1: nothing but f1 itself, which is the other rook.
        assert_eq!(
            castles.path(Color::White, CastlingSide::H),
            SquareSet::from_square(Square::F1)
        );
    }

    #[test]
    fn rights_need_king_on_back_rank() {
        let setup = parse_fen("r3k2r/8/8/8/4K3/8/8/R6R w KQkq - 0 1").unwrap();
        let castles = Castles::from_setup(&ATTACKS, &setup.board, setup.unmoved_rooks);
        assert!(!castles.has_color(Color::White));
        assert!(castles.has(Color::Black, CastlingSide::A));
        assert!(!castles.unmoved_rooks().has(Square::A1));
    }

    #[test]
    fn discard() {
        let mut castles = Castles::new(&ATTACKS);
        castles.discard_rook(Square::H1);
        assert!(!castles.has(Color::White, CastlingSide::H));
        assert!(castles.has(Color::White, CastlingSide::A));
        castles.discard_rook(sq("e4"));
        castles.discard_side(Color::Black);
        assert!(!castles.has_color(Color::Black));
        assert_eq!(castles.unmoved_rooks(), SquareSet::from_square(Square::A1));
        assert!(!castles.is_empty());
    }

    #[test]
    fn unmoved_rooks_are_rooks() {
        let mut board = Board::new();
        board.take(Square::A1);
        board.set(Square::A1, Role::Knight.of(Color::White));
        let castles = Castles::from_setup(&ATTACKS, &board, SquareSet::CORNERS);
        assert!(!castles.has(Color::White, CastlingSide::A));
        assert!(castles.has(Color::White, CastlingSide::H));
    }
}

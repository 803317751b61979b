//! Piece placement.

use crate::{ByColor, Color, Piece, Role, Square, SquareSet};

/// Piece positions as parallel bitboards.
///
/// Every occupied square is in exactly one color set and exactly one role
/// set, and `promoted` is a subset of `occupied`. The fields are private so
/// that [`Board::set`] and [`Board::take`] are the only writers.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    by_role: [SquareSet; 6],
    by_color: ByColor<SquareSet>,
    occupied: SquareSet,
    promoted: SquareSet,
}

impl Board {
    /// Creates an empty board.
    pub const fn empty() -> Board {
        Board {
            by_role: [SquareSet::EMPTY; 6],
            by_color: ByColor {
                white: SquareSet::EMPTY,
                black: SquareSet::EMPTY,
            },
            occupied: SquareSet::EMPTY,
            promoted: SquareSet::EMPTY,
        }
    }

    /// The standard starting position.
    pub const fn new() -> Board {
        Board {
            by_role: [
                SquareSet::new(0x00ff_0000_0000_ff00),
                SquareSet::new(0x4200_0000_0000_0042),
                SquareSet::new(0x2400_0000_0000_0024),
                SquareSet::new(0x8100_0000_0000_0081),
                SquareSet::new(0x0800_0000_0000_0008),
                SquareSet::new(0x1000_0000_0000_0010),
            ],
            by_color: ByColor {
                white: SquareSet::new(0xffff),
                black: SquareSet::new(0xffff_0000_0000_0000),
            },
            occupied: SquareSet::new(0xffff_0000_0000_ffff),
            promoted: SquareSet::EMPTY,
        }
    }

    /// Racing kings: `8/8/8/8/8/8/krbnNBRK/qrbnNBRQ`.
    pub const fn racing_kings() -> Board {
        Board {
            by_role: [
                SquareSet::EMPTY,
                SquareSet::new(0x1818),
                SquareSet::new(0x2424),
                SquareSet::new(0x4242),
                SquareSet::new(0x0081),
                SquareSet::new(0x8100),
            ],
            by_color: ByColor {
                white: SquareSet::new(0xf0f0),
                black: SquareSet::new(0x0f0f),
            },
            occupied: SquareSet::new(0xffff),
            promoted: SquareSet::EMPTY,
        }
    }

    /// Horde: `rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP`.
    pub const fn horde() -> Board {
        Board {
            by_role: [
                SquareSet::new(0x00ff_0066_ffff_ffff),
                SquareSet::new(0x4200_0000_0000_0000),
                SquareSet::new(0x2400_0000_0000_0000),
                SquareSet::new(0x8100_0000_0000_0000),
                SquareSet::new(0x0800_0000_0000_0000),
                SquareSet::new(0x1000_0000_0000_0000),
            ],
            by_color: ByColor {
                white: SquareSet::new(0x0000_0066_ffff_ffff),
                black: SquareSet::new(0xffff_0000_0000_0000),
            },
            occupied: SquareSet::new(0xffff_0066_ffff_ffff),
            promoted: SquareSet::EMPTY,
        }
    }

    #[inline]
    pub const fn occupied(&self) -> SquareSet {
        self.occupied
    }

    #[inline]
    pub const fn promoted(&self) -> SquareSet {
        self.promoted
    }

    #[inline]
    pub const fn by_color(&self, color: Color) -> SquareSet {
        *self.by_color.get(color)
    }

    #[inline]
    pub const fn by_role(&self, role: Role) -> SquareSet {
        self.by_role[role.index()]
    }

    #[inline]
    pub const fn white(&self) -> SquareSet {
        self.by_color.white
    }

    #[inline]
    pub const fn black(&self) -> SquareSet {
        self.by_color.black
    }

    #[inline]
    pub const fn pawns(&self) -> SquareSet {
        self.by_role(Role::Pawn)
    }

    #[inline]
    pub const fn knights(&self) -> SquareSet {
        self.by_role(Role::Knight)
    }

    #[inline]
    pub const fn bishops(&self) -> SquareSet {
        self.by_role(Role::Bishop)
    }

    #[inline]
    pub const fn rooks(&self) -> SquareSet {
        self.by_role(Role::Rook)
    }

    #[inline]
    pub const fn queens(&self) -> SquareSet {
        self.by_role(Role::Queen)
    }

    #[inline]
    pub const fn kings(&self) -> SquareSet {
        self.by_role(Role::King)
    }

    /// Pieces of the given color and role.
    #[inline]
    pub const fn pieces(&self, color: Color, role: Role) -> SquareSet {
        self.by_color(color).intersect(self.by_role(role))
    }

    #[inline]
    pub const fn rooks_and_queens(&self) -> SquareSet {
        self.rooks().union(self.queens())
    }

    #[inline]
    pub const fn bishops_and_queens(&self) -> SquareSet {
        self.bishops().union(self.queens())
    }

    /// The king of `color`, if there is exactly one.
    #[inline]
    pub const fn king_of(&self, color: Color) -> Option<Square> {
        self.pieces(color, Role::King).single_square()
    }

    #[inline]
    pub const fn has(&self, sq: Square) -> bool {
        self.occupied.has(sq)
    }

    pub fn color_at(&self, sq: Square) -> Option<Color> {
        if self.by_color.white.has(sq) {
            Some(Color::White)
        } else if self.by_color.black.has(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn role_at(&self, sq: Square) -> Option<Role> {
        if !self.occupied.has(sq) {
            return None;
        }
        Role::ALL.into_iter().find(|role| self.by_role[role.index()].has(sq))
    }

    /// Returns the piece at the given square, if any.
    pub fn get(&self, sq: Square) -> Option<Piece> {
        let color = self.color_at(sq)?;
        let role = self.role_at(sq)?;
        Some(Piece {
            role,
            color,
            promoted: self.promoted.has(sq),
        })
    }

    /// Removes and returns the piece at `sq`.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        let piece = self.get(sq)?;
        let color = self.by_color.get_mut(piece.color);
        *color = color.without(sq);
        self.by_role[piece.role.index()] = self.by_role[piece.role.index()].without(sq);
        self.occupied = self.occupied.without(sq);
        self.promoted = self.promoted.without(sq);
        Some(piece)
    }

    /// Clears `sq`, returning whether a piece stood there.
    pub fn remove(&mut self, sq: Square) -> bool {
        self.take(sq).is_some()
    }

    /// Places `piece` on `sq`, returning the piece it replaced.
    pub fn set(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        let prior = self.take(sq);
        let color = self.by_color.get_mut(piece.color);
        *color = color.with(sq);
        self.by_role[piece.role.index()] = self.by_role[piece.role.index()].with(sq);
        self.occupied = self.occupied.with(sq);
        if piece.promoted {
            self.promoted = self.promoted.with(sq);
        }
        prior
    }

    /// Drops the promoted marker from every square outside `keep`.
    pub fn retain_promoted(&mut self, keep: SquareSet) {
        self.promoted = self.promoted.intersect(keep);
    }

    /// Iterates over all pieces, ascending by square.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied
            .into_iter()
            .filter_map(move |sq| self.get(sq).map(|piece| (sq, piece)))
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let c = Square::from_coords(file, rank)
                    .and_then(|sq| self.get(sq))
                    .map_or('.', Piece::to_fen_char);
                write!(f, "{}", c)?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

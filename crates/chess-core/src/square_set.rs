//! Bitboard representation of square sets.
//!
//! A square set is a 64-bit integer where each bit represents a square on
//! the chess board. Every operation returns a new value, so sets can be
//! copied freely between positions.

use crate::{Color, File, Rank, Square};
use std::fmt;
use std::iter::FusedIterator;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Sub};

/// A set of squares.
///
/// Bit 0 = a1, bit 1 = b1, ..., bit 63 = h8 (little-endian rank-file mapping).
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SquareSet(u64);

impl SquareSet {
    /// Empty set (no squares).
    pub const EMPTY: SquareSet = SquareSet(0);

    /// Full set (all squares).
    pub const FULL: SquareSet = SquareSet(!0);

    /// a1, h1, a8 and h8.
    pub const CORNERS: SquareSet = SquareSet(0x8100_0000_0000_0081);

    /// d4, e4, d5 and e5.
    pub const CENTER: SquareSet = SquareSet(0x0000_0018_1800_0000);

    /// The first and the eighth rank.
    pub const BACKRANKS: SquareSet = SquareSet(0xff00_0000_0000_00ff);

    pub const LIGHT_SQUARES: SquareSet = SquareSet(0x55aa_55aa_55aa_55aa);
    pub const DARK_SQUARES: SquareSet = SquareSet(0xaa55_aa55_aa55_aa55);

    // File masks
    pub const FILE_A: SquareSet = SquareSet(0x0101_0101_0101_0101);
    pub const FILE_H: SquareSet = SquareSet(0x8080_8080_8080_8080);

    // Rank masks
    pub const RANK_1: SquareSet = SquareSet(0x0000_0000_0000_00FF);
    pub const RANK_8: SquareSet = SquareSet(0xFF00_0000_0000_0000);

    /// Creates a set from a raw u64.
    #[inline]
    pub const fn new(bits: u64) -> Self {
        SquareSet(bits)
    }

    /// Creates a set from its low (a1-h4) and high (a5-h8) halves.
    #[inline]
    pub const fn from_halves(lo: u32, hi: u32) -> Self {
        SquareSet(lo as u64 | (hi as u64) << 32)
    }

    /// Returns the raw bits.
    #[inline]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Squares 0-31.
    #[inline]
    pub const fn lo(self) -> u32 {
        self.0 as u32
    }

    /// Squares 32-63.
    #[inline]
    pub const fn hi(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Creates a set with a single square.
    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        SquareSet(1u64 << sq.index())
    }

    /// All squares of a rank.
    #[inline]
    pub const fn from_rank(rank: Rank) -> Self {
        SquareSet(0xff << (8 * rank.index()))
    }

    /// All squares of a file.
    #[inline]
    pub const fn from_file(file: File) -> Self {
        SquareSet(Self::FILE_A.0 << file.index())
    }

    /// The home rank of `color`.
    #[inline]
    pub const fn backrank(color: Color) -> Self {
        match color {
            Color::White => Self::RANK_1,
            Color::Black => Self::RANK_8,
        }
    }

    /// Returns true if the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the set is not empty.
    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Returns the number of squares (population count).
    #[inline]
    pub const fn size(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if the given square is in the set.
    #[inline]
    pub const fn has(self, sq: Square) -> bool {
        (self.0 & (1u64 << sq.index())) != 0
    }

    #[inline]
    pub const fn union(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0 | other.0)
    }

    #[inline]
    pub const fn intersect(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0 & other.0)
    }

    /// Squares in `self` but not in `other`.
    #[inline]
    pub const fn diff(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0 & !other.0)
    }

    #[inline]
    pub const fn xor(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0 ^ other.0)
    }

    #[inline]
    pub const fn complement(self) -> SquareSet {
        SquareSet(!self.0)
    }

    #[inline]
    pub const fn intersects(self, other: SquareSet) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub const fn is_disjoint(self, other: SquareSet) -> bool {
        self.0 & other.0 == 0
    }

    /// Returns a copy with the given square added.
    #[inline]
    pub const fn with(self, sq: Square) -> SquareSet {
        SquareSet(self.0 | 1u64 << sq.index())
    }

    /// Returns a copy with the given square removed.
    #[inline]
    pub const fn without(self, sq: Square) -> SquareSet {
        SquareSet(self.0 & !(1u64 << sq.index()))
    }

    /// Returns a copy with the given square flipped.
    #[inline]
    pub const fn toggle(self, sq: Square) -> SquareSet {
        SquareSet(self.0 ^ 1u64 << sq.index())
    }

    /// Returns a copy with the lowest square removed.
    #[inline]
    pub const fn without_first(self) -> SquareSet {
        SquareSet(self.0 & self.0.wrapping_sub(1))
    }

    /// The lowest square in the set.
    #[inline]
    pub const fn first(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square::from_index_masked(self.0.trailing_zeros() as u8))
        }
    }

    /// The highest square in the set.
    #[inline]
    pub const fn last(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Some(Square::from_index_masked(63 - self.0.leading_zeros() as u8))
        }
    }

    /// The only square in the set, or `None` unless exactly one is set.
    #[inline]
    pub const fn single_square(self) -> Option<Square> {
        if self.more_than_one() {
            None
        } else {
            self.first()
        }
    }

    #[inline]
    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    /// 64-bit left shift; bits shifted past h8 are lost.
    #[inline]
    pub const fn shl(self, shift: u32) -> SquareSet {
        if shift >= 64 {
            SquareSet(0)
        } else {
            SquareSet(self.0 << shift)
        }
    }

    /// 64-bit right shift; bits shifted past a1 are lost.
    #[inline]
    pub const fn shr(self, shift: u32) -> SquareSet {
        if shift >= 64 {
            SquareSet(0)
        } else {
            SquareSet(self.0 >> shift)
        }
    }

    /// Mirrors the set vertically (rank 1 <-> rank 8).
    #[inline]
    pub const fn swap_bytes(self) -> SquareSet {
        SquareSet(self.0.swap_bytes())
    }

    /// Rotates the set by 180 degrees (a1 <-> h8).
    #[inline]
    pub const fn reverse_bits(self) -> SquareSet {
        SquareSet(self.0.reverse_bits())
    }

    /// Wrapping 64-bit subtraction.
    #[inline]
    pub const fn minus(self, other: SquareSet) -> SquareSet {
        SquareSet(self.0.wrapping_sub(other.0))
    }

    /// Iterates over every subset of this set, starting with the empty set.
    #[inline]
    pub fn subsets(self) -> Subsets {
        Subsets {
            mask: self.0,
            next: Some(0),
        }
    }
}

impl BitAnd for SquareSet {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 & rhs.0)
    }
}

impl BitAndAssign for SquareSet {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for SquareSet {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for SquareSet {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXor for SquareSet {
    type Output = Self;
    #[inline]
    fn bitxor(self, rhs: Self) -> Self::Output {
        SquareSet(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for SquareSet {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Sub for SquareSet {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.diff(rhs)
    }
}

impl Not for SquareSet {
    type Output = Self;
    #[inline]
    fn not(self) -> Self::Output {
        SquareSet(!self.0)
    }
}

impl From<Square> for SquareSet {
    #[inline]
    fn from(sq: Square) -> SquareSet {
        SquareSet::from_square(sq)
    }
}

impl FromIterator<Square> for SquareSet {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        iter.into_iter().fold(SquareSet::EMPTY, SquareSet::with)
    }
}

impl fmt::Debug for SquareSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SquareSet({:#018x})", self.0)?;
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let sq = rank * 8 + file;
                if (self.0 >> sq) & 1 == 1 {
                    write!(f, "X ")?;
                } else {
                    write!(f, ". ")?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")
    }
}

/// Iterator over the squares of a set, ascending from the front and
/// descending from the back.
#[derive(Debug, Clone)]
pub struct SquareSetIter(u64);

impl Iterator for SquareSetIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let sq = self.0.trailing_zeros() as u8;
            self.0 &= self.0 - 1;
            Some(Square::from_index_masked(sq))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.count_ones() as usize;
        (count, Some(count))
    }
}

impl DoubleEndedIterator for SquareSetIter {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let sq = 63 - self.0.leading_zeros() as u8;
            self.0 ^= 1 << sq;
            Some(Square::from_index_masked(sq))
        }
    }
}

impl ExactSizeIterator for SquareSetIter {}

impl FusedIterator for SquareSetIter {}

impl IntoIterator for SquareSet {
    type Item = Square;
    type IntoIter = SquareSetIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        SquareSetIter(self.0)
    }
}

/// Carry-rippler enumeration of all submasks. See [`SquareSet::subsets`].
#[derive(Debug, Clone)]
pub struct Subsets {
    mask: u64,
    next: Option<u64>,
}

impl Iterator for Subsets {
    type Item = SquareSet;

    fn next(&mut self) -> Option<SquareSet> {
        let current = self.next?;
        let following = current.wrapping_sub(self.mask) & self.mask;
        self.next = if following == 0 { None } else { Some(following) };
        Some(SquareSet(current))
    }
}

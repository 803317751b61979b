//! Attack tables for all piece types.
//!
//! Step pieces (king, knight, pawn) use per-square lookup tables. Sliders
//! use hyperbola quintessence over per-square line masks: byte swapping
//! mirrors files and diagonals, bit reversal mirrors ranks. Everything is
//! computed at compile time into [`ATTACKS`].

use chess_core::{Board, Color, Piece, Role, Square, SquareSet};
use std::fmt;

const KING_DELTAS: [i8; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];
const KNIGHT_DELTAS: [i8; 8] = [-17, -15, -10, -6, 6, 10, 15, 17];
const WHITE_PAWN_DELTAS: [i8; 2] = [7, 9];
const BLACK_PAWN_DELTAS: [i8; 2] = [-7, -9];

/// The compile-time attack tables.
pub static ATTACKS: AttackTables = AttackTables::new();

/// Precomputed attack and line tables.
pub struct AttackTables {
    king: [SquareSet; 64],
    knight: [SquareSet; 64],
    pawn: [[SquareSet; 64]; 2],
    file: [SquareSet; 64],
    rank: [SquareSet; 64],
    diag: [SquareSet; 64],
    anti_diag: [SquareSet; 64],
}

impl AttackTables {
    /// Computes all tables.
    pub const fn new() -> AttackTables {
        let mut tables = AttackTables {
            king: [SquareSet::EMPTY; 64],
            knight: [SquareSet::EMPTY; 64],
            pawn: [[SquareSet::EMPTY; 64]; 2],
            file: [SquareSet::EMPTY; 64],
            rank: [SquareSet::EMPTY; 64],
            diag: [SquareSet::EMPTY; 64],
            anti_diag: [SquareSet::EMPTY; 64],
        };

        let mut sq = 0u8;
        while sq < 64 {
            let i = sq as usize;
            tables.king[i] = step_attacks(sq, &KING_DELTAS);
            tables.knight[i] = step_attacks(sq, &KNIGHT_DELTAS);
            tables.pawn[0][i] = step_attacks(sq, &WHITE_PAWN_DELTAS);
            tables.pawn[1][i] = step_attacks(sq, &BLACK_PAWN_DELTAS);

            let file = sq % 8;
            let rank = sq / 8;
            let mut file_bits = 0u64;
            let mut rank_bits = 0u64;
            let mut diag_bits = 0u64;
            let mut anti_bits = 0u64;
            let mut other = 0u8;
            while other < 64 {
                if other != sq {
                    let f = other % 8;
                    let r = other / 8;
                    if f == file {
                        file_bits |= 1 << other;
                    }
                    if r == rank {
                        rank_bits |= 1 << other;
                    }
                    if f as i8 - r as i8 == file as i8 - rank as i8 {
                        diag_bits |= 1 << other;
                    }
                    if f + r == file + rank {
                        anti_bits |= 1 << other;
                    }
                }
                other += 1;
            }
            tables.file[i] = SquareSet::new(file_bits);
            tables.rank[i] = SquareSet::new(rank_bits);
            tables.diag[i] = SquareSet::new(diag_bits);
            tables.anti_diag[i] = SquareSet::new(anti_bits);

            sq += 1;
        }
        tables
    }

    /// King attacks from the given square.
    #[inline]
    pub fn king(&self, sq: Square) -> SquareSet {
        self.king[usize::from(sq.index())]
    }

    /// Knight attacks from the given square.
    #[inline]
    pub fn knight(&self, sq: Square) -> SquareSet {
        self.knight[usize::from(sq.index())]
    }

    /// Squares attacked by a pawn of `color` standing on `sq`.
    #[inline]
    pub fn pawn(&self, color: Color, sq: Square) -> SquareSet {
        self.pawn[color.index()][usize::from(sq.index())]
    }

    #[inline]
    pub fn file_range(&self, sq: Square) -> SquareSet {
        self.file[usize::from(sq.index())]
    }

    #[inline]
    pub fn rank_range(&self, sq: Square) -> SquareSet {
        self.rank[usize::from(sq.index())]
    }

    #[inline]
    pub fn diag_range(&self, sq: Square) -> SquareSet {
        self.diag[usize::from(sq.index())]
    }

    #[inline]
    pub fn anti_diag_range(&self, sq: Square) -> SquareSet {
        self.anti_diag[usize::from(sq.index())]
    }

    fn file_attacks(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        hyperbola(SquareSet::from_square(sq), self.file_range(sq), occupied)
    }

    fn rank_attacks(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        let range = self.rank_range(sq);
        let bit = SquareSet::from_square(sq);
        let forward = occupied & range;
        let reverse = forward.reverse_bits();
        let forward = forward.minus(bit);
        let reverse = reverse.minus(bit.reverse_bits());
        (forward ^ reverse.reverse_bits()) & range
    }

    /// Bishop attacks given the occupancy. Blockers are included.
    pub fn bishop(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        let bit = SquareSet::from_square(sq);
        hyperbola(bit, self.diag_range(sq), occupied)
            ^ hyperbola(bit, self.anti_diag_range(sq), occupied)
    }

    /// Rook attacks given the occupancy. Blockers are included.
    pub fn rook(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        self.file_attacks(sq, occupied) ^ self.rank_attacks(sq, occupied)
    }

    /// Queen attacks given the occupancy. Blockers are included.
    pub fn queen(&self, sq: Square, occupied: SquareSet) -> SquareSet {
        self.bishop(sq, occupied) ^ self.rook(sq, occupied)
    }

    /// Attacks of `piece` standing on `sq`.
    pub fn piece(&self, piece: Piece, sq: Square, occupied: SquareSet) -> SquareSet {
        match piece.role {
            Role::Pawn => self.pawn(piece.color, sq),
            Role::Knight => self.knight(sq),
            Role::Bishop => self.bishop(sq, occupied),
            Role::Rook => self.rook(sq, occupied),
            Role::Queen => self.queen(sq, occupied),
            Role::King => self.king(sq),
        }
    }

    /// The full line through `a` and `b` (both included), or the empty set
    /// if they share no rank, file or diagonal.
    pub fn ray(&self, a: Square, b: Square) -> SquareSet {
        for range in [
            self.rank_range(a),
            self.anti_diag_range(a),
            self.diag_range(a),
            self.file_range(a),
        ] {
            if range.has(b) {
                return range.with(a);
            }
        }
        SquareSet::EMPTY
    }

    /// Squares strictly between `a` and `b` on a shared line.
    pub fn between(&self, a: Square, b: Square) -> SquareSet {
        let span = SquareSet::FULL.shl(u32::from(a.index())) ^ SquareSet::FULL.shl(u32::from(b.index()));
        (self.ray(a, b) & span).without_first()
    }

    /// Pieces of `attacker` that attack `sq` given the occupancy.
    pub fn attacks_to(
        &self,
        sq: Square,
        attacker: Color,
        board: &Board,
        occupied: SquareSet,
    ) -> SquareSet {
        board.by_color(attacker)
            & ((self.rook(sq, occupied) & board.rooks_and_queens())
                | (self.bishop(sq, occupied) & board.bishops_and_queens())
                | (self.knight(sq) & board.knights())
                | (self.king(sq) & board.kings())
                | (self.pawn(!attacker, sq) & board.pawns()))
    }
}

impl Default for AttackTables {
    fn default() -> Self {
        AttackTables::new()
    }
}

impl fmt::Debug for AttackTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttackTables").finish_non_exhaustive()
    }
}

const fn step_attacks(sq: u8, deltas: &[i8]) -> SquareSet {
    let mut bits = 0u64;
    let mut i = 0;
    while i < deltas.len() {
        let to = sq as i16 + deltas[i] as i16;
        if to >= 0 && to < 64 {
            let df = (sq % 8).abs_diff(to as u8 % 8);
            let dr = (sq / 8).abs_diff(to as u8 / 8);
            // Wrapped around the board edge otherwise.
            if df <= 2 && dr <= 2 {
                bits |= 1 << to;
            }
        }
        i += 1;
    }
    SquareSet::new(bits)
}

#[inline]
fn hyperbola(bit: SquareSet, range: SquareSet, occupied: SquareSet) -> SquareSet {
    let forward = occupied & range;
    let reverse = forward.swap_bytes();
    let forward = forward.minus(bit);
    let reverse = reverse.minus(bit.swap_bytes());
    (forward ^ reverse.swap_bytes()) & range
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{File, Rank};
    use proptest::prelude::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    /// Walks each direction square by square until it leaves the board or
    /// hits an occupied square.
    fn slow_slider(from: Square, occupied: SquareSet, dirs: &[(i8, i8)]) -> SquareSet {
        let mut attacks = SquareSet::EMPTY;
        for &(df, dr) in dirs {
            let mut file = from.file().index() as i8;
            let mut rank = from.rank().index() as i8;
            loop {
                file += df;
                rank += dr;
                if !(0..8).contains(&file) || !(0..8).contains(&rank) {
                    break;
                }
                let to = Square::from_coords(file as u8, rank as u8).unwrap();
                attacks = attacks.with(to);
                if occupied.has(to) {
                    break;
                }
            }
        }
        attacks
    }

    const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

    #[test]
    fn knight_attacks() {
        assert_eq!(ATTACKS.knight(Square::new(File::D, Rank::R4)).size(), 8);
        assert_eq!(ATTACKS.knight(Square::A1).size(), 2);
        assert_eq!(ATTACKS.knight(Square::new(File::A, Rank::R4)).size(), 4);
        assert_eq!(
            ATTACKS.knight(Square::G1),
            SquareSet::from_iter([sq("e2"), sq("f3"), sq("h3")])
        );
    }

    #[test]
    fn king_attacks() {
        assert_eq!(ATTACKS.king(Square::new(File::D, Rank::R4)).size(), 8);
        assert_eq!(ATTACKS.king(Square::A1).size(), 3);
        assert_eq!(ATTACKS.king(Square::new(File::A, Rank::R4)).size(), 5);
        assert!(!ATTACKS.king(Square::H1).has(Square::A2));
    }

    #[test]
    fn pawn_attacks() {
        assert_eq!(
            ATTACKS.pawn(Color::White, sq("e4")),
            SquareSet::from_iter([sq("d5"), sq("f5")])
        );
        assert_eq!(
            ATTACKS.pawn(Color::Black, sq("e4")),
            SquareSet::from_iter([sq("d3"), sq("f3")])
        );
        assert_eq!(ATTACKS.pawn(Color::White, Square::A2), SquareSet::from_square(sq("b3")));
        assert_eq!(ATTACKS.pawn(Color::White, Square::H8), SquareSet::EMPTY);
    }

    #[test]
    fn line_masks_exclude_origin() {
        for index in 0..64 {
            let s = Square::from_index(index).unwrap();
            assert!(!ATTACKS.file_range(s).has(s));
            assert!(!ATTACKS.rank_range(s).has(s));
            assert!(!ATTACKS.diag_range(s).has(s));
            assert!(!ATTACKS.anti_diag_range(s).has(s));
            assert_eq!(ATTACKS.file_range(s).size(), 7);
            assert_eq!(ATTACKS.rank_range(s).size(), 7);
        }
        assert_eq!(ATTACKS.diag_range(Square::A1).size(), 7);
        assert_eq!(ATTACKS.anti_diag_range(Square::A1).size(), 0);
    }

    #[test]
    fn sliders_on_empty_board() {
        assert_eq!(ATTACKS.rook(sq("d4"), SquareSet::EMPTY).size(), 14);
        assert_eq!(ATTACKS.bishop(sq("d4"), SquareSet::EMPTY).size(), 13);
        assert_eq!(ATTACKS.queen(sq("d4"), SquareSet::EMPTY).size(), 27);
        assert_eq!(ATTACKS.bishop(Square::A1, SquareSet::EMPTY).size(), 7);
    }

    #[test]
    fn sliders_stop_at_blockers() {
        let occupied = SquareSet::from_iter([sq("d6"), sq("f4"), sq("b2")]);
        let rook = ATTACKS.rook(sq("d4"), occupied);
        assert!(rook.has(sq("d6")));
        assert!(!rook.has(sq("d7")));
        assert!(rook.has(sq("f4")));
        assert!(!rook.has(sq("g4")));
        let bishop = ATTACKS.bishop(sq("d4"), occupied);
        assert!(bishop.has(sq("b2")));
        assert!(!bishop.has(Square::A1));
    }

    #[test]
    fn ray_and_between() {
        assert_eq!(
            ATTACKS.between(Square::A1, sq("d4")),
            SquareSet::from_iter([sq("b2"), sq("c3")])
        );
        assert_eq!(
            ATTACKS.between(Square::E1, Square::H1),
            SquareSet::from_iter([Square::F1, Square::G1])
        );
        assert_eq!(ATTACKS.between(Square::E1, Square::F1), SquareSet::EMPTY);
        assert_eq!(ATTACKS.between(Square::A1, sq("b3")), SquareSet::EMPTY);
        assert_eq!(ATTACKS.ray(Square::A1, sq("b3")), SquareSet::EMPTY);
        assert_eq!(ATTACKS.ray(Square::A1, Square::A1), SquareSet::EMPTY);
        assert!(ATTACKS.ray(Square::E1, Square::E8).has(sq("e4")));
        assert_eq!(ATTACKS.ray(Square::A1, Square::H8).size(), 8);
    }

    #[test]
    fn attacks_to_start_position() {
        let board = Board::new();
        let attackers = ATTACKS.attacks_to(sq("f3"), Color::White, &board, board.occupied());
        assert_eq!(
            attackers,
            SquareSet::from_iter([sq("e2"), sq("g2"), Square::G1])
        );
        assert!(ATTACKS
            .attacks_to(sq("e4"), Color::White, &board, board.occupied())
            .is_empty());
    }

    proptest! {
        #[test]
        fn hyperbola_matches_ray_walk(index in 0u8..64, bits in any::<u64>()) {
            let from = Square::from_index(index).unwrap();
            let occupied = SquareSet::new(bits);
            prop_assert_eq!(ATTACKS.rook(from, occupied), slow_slider(from, occupied, &ROOK_DIRS));
            prop_assert_eq!(ATTACKS.bishop(from, occupied), slow_slider(from, occupied, &BISHOP_DIRS));
        }

        #[test]
        fn between_is_symmetric(a in 0u8..64, b in 0u8..64) {
            let a = Square::from_index(a).unwrap();
            let b = Square::from_index(b).unwrap();
            prop_assert_eq!(ATTACKS.between(a, b), ATTACKS.between(b, a));
            prop_assert!(ATTACKS.between(a, b).is_disjoint(SquareSet::from_iter([a, b])));
            let ray = ATTACKS.ray(a, b);
            prop_assert!((ATTACKS.between(a, b) - ray).is_empty());
        }
    }

    #[test]
    fn hyperbola_matches_ray_walk_on_every_subset_of_a_line() {
        let from = sq("d4");
        let line = ATTACKS.file_range(from) | ATTACKS.rank_range(from);
        for occupied in line.subsets() {
            assert_eq!(ATTACKS.rook(from, occupied), slow_slider(from, occupied, &ROOK_DIRS));
        }
    }
}

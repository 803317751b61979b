//! Unvalidated position data.

use crate::{Board, ByColor, Color, Role, Square, SquareSet};

/// Piece counts for one side, indexed by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialSide {
    counts: [u8; 6],
}

impl MaterialSide {
    pub const fn new() -> Self {
        MaterialSide { counts: [0; 6] }
    }

    #[inline]
    pub const fn count(&self, role: Role) -> u8 {
        self.counts[role.index()]
    }

    #[inline]
    pub fn set(&mut self, role: Role, count: u8) {
        self.counts[role.index()] = count;
    }

    #[inline]
    pub fn add(&mut self, role: Role) {
        self.counts[role.index()] = self.counts[role.index()].saturating_add(1);
    }

    /// Decrements the count for `role`. Returns false if it was already zero.
    pub fn remove(&mut self, role: Role) -> bool {
        let slot = &mut self.counts[role.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Total number of pieces.
    pub fn size(&self) -> u32 {
        self.counts.iter().map(|&c| u32::from(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    pub fn has_pawns(&self) -> bool {
        self.count(Role::Pawn) > 0
    }

    pub fn has_non_pawns(&self) -> bool {
        Role::ALL[1..].iter().any(|&role| self.count(role) > 0)
    }

    /// Roles with a nonzero count, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Role, u8)> + '_ {
        Role::ALL
            .into_iter()
            .map(|role| (role, self.count(role)))
            .filter(|&(_, count)| count > 0)
    }
}

/// Per-color piece counts. Used for crazyhouse pockets.
pub type Material = ByColor<MaterialSide>;

impl Material {
    /// Counts the pieces on a board.
    pub fn from_board(board: &Board) -> Material {
        ByColor::new_with(|color| {
            let mut side = MaterialSide::new();
            for role in Role::ALL {
                side.set(role, board.pieces(color, role).size() as u8);
            }
            side
        })
    }

    pub fn size(&self) -> u32 {
        self.white.size() + self.black.size()
    }

    pub fn count(&self, color: Color, role: Role) -> u8 {
        self.get(color).count(role)
    }
}

/// Checks each side still has to give in three-check. Zero means the side
/// has delivered its last check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemainingChecks(pub ByColor<u8>);

impl RemainingChecks {
    pub const fn new(white: u8, black: u8) -> Self {
        RemainingChecks(ByColor { white, black })
    }

    #[inline]
    pub const fn get(&self, color: Color) -> u8 {
        *self.0.get(color)
    }

    /// Records a check given by `color`.
    pub fn decrement(&mut self, color: Color) {
        let slot = self.0.get_mut(color);
        *slot = slot.saturating_sub(1);
    }
}

impl Default for RemainingChecks {
    fn default() -> Self {
        RemainingChecks::new(3, 3)
    }
}

/// A position as read from text, before any legality checks.
///
/// Produced by the FEN parser and by `Position::to_setup`, consumed by
/// validated position construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Setup {
    pub board: Board,
    pub pockets: Option<Material>,
    pub turn: Color,
    pub unmoved_rooks: SquareSet,
    pub ep_square: Option<Square>,
    pub remaining_checks: Option<RemainingChecks>,
    pub halfmoves: u32,
    pub fullmoves: u32,
}

impl Setup {
    /// A setup with no pieces, white to move.
    pub const fn empty() -> Setup {
        Setup {
            board: Board::empty(),
            pockets: None,
            turn: Color::White,
            unmoved_rooks: SquareSet::EMPTY,
            ep_square: None,
            remaining_checks: None,
            halfmoves: 0,
            fullmoves: 1,
        }
    }
}

impl Default for Setup {
    /// The standard starting position.
    fn default() -> Setup {
        Setup {
            board: Board::new(),
            unmoved_rooks: SquareSet::CORNERS,
            ..Setup::empty()
        }
    }
}

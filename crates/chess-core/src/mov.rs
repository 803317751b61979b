//! Move representation.

use crate::{Role, Square};
use std::fmt;

/// A chess move.
///
/// Castling is written as the king moving onto its own rook
/// (`Normal { from: e1, to: h1 }`), which stays unambiguous in chess960.
/// Positions also accept the two-square king displacement.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Normal {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
    /// A piece taken from the pocket and placed on an empty square.
    Drop { role: Role, to: Square },
}

impl Move {
    /// Creates a normal move without promotion.
    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Move::Normal {
            from,
            to,
            promotion: None,
        }
    }

    /// Returns the source square, or `None` for drops.
    #[inline]
    pub const fn from(self) -> Option<Square> {
        match self {
            Move::Normal { from, .. } => Some(from),
            Move::Drop { .. } => None,
        }
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        match self {
            Move::Normal { to, .. } | Move::Drop { to, .. } => to,
        }
    }

    #[inline]
    pub const fn promotion(self) -> Option<Role> {
        match self {
            Move::Normal { promotion, .. } => promotion,
            Move::Drop { .. } => None,
        }
    }

    #[inline]
    pub const fn is_drop(self) -> bool {
        matches!(self, Move::Drop { .. })
    }

    /// Returns the UCI notation for this move (e.g., "e2e4", "e7e8q", "N@f3").
    pub fn to_uci(self) -> String {
        match self {
            Move::Normal {
                from,
                to,
                promotion,
            } => match promotion {
                Some(role) => format!("{}{}{}", from, to, role.char()),
                None => format!("{}{}", from, to),
            },
            Move::Drop { role, to } => {
                format!("{}@{}", role.char().to_ascii_uppercase(), to)
            }
        }
    }

    /// Parses a move from UCI notation.
    ///
    /// Only the syntax is checked. Whether the move is legal is up to the
    /// position it is played in.
    pub fn from_uci(s: &str) -> Option<Self> {
        if !s.is_ascii() {
            return None;
        }
        if s.len() == 4 && s.as_bytes()[1] == b'@' {
            let role = Role::from_char(char::from(s.as_bytes()[0]))?;
            let to = Square::from_algebraic(&s[2..4])?;
            return Some(Move::Drop { role, to });
        }
        if s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(&s[0..2])?;
        let to = Square::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) => match Role::from_char(c)? {
                Role::Pawn => return None,
                role => Some(role),
            },
            None => None,
        };
        Some(Move::Normal {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

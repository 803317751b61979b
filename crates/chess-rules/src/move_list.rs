use chess_core::{Move, Square};

/// A list of moves with a fixed maximum capacity.
///
/// Standard chess has at most 218 legal moves in a position. Crazyhouse
/// drops raise the bound, so the capacity is sized for those, and the list
/// still never allocates during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of legal moves in any supported variant.
    pub const MAX_MOVES: usize = 768;

    const FILLER: Move = Move::normal(Square::A1, Square::A1);

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Self::FILLER; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    pub fn contains(&self, m: &Move) -> bool {
        self.as_slice().contains(m)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uci(m: &str) -> Move {
        Move::from_uci(m).unwrap()
    }

    #[test]
    fn push_and_index() {
        let mut moves = MoveList::new();
        assert!(moves.is_empty());
        moves.push(uci("e2e4"));
        moves.push(uci("N@f3"));
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[1], uci("N@f3"));
        assert!(moves.contains(&uci("e2e4")));
        assert_eq!(format!("{:?}", moves), "[Move(e2e4), Move(N@f3)]");
    }

    #[test]
    fn retain_keeps_order() {
        let mut moves = MoveList::new();
        for m in ["a2a3", "b2b4", "c2c3", "d2d4"] {
            moves.push(uci(m));
        }
        moves.retain(|m| m.to().rank() == chess_core::Rank::R4);
        assert_eq!(moves.as_slice(), &[uci("b2b4"), uci("d2d4")]);
        moves.clear();
        assert_eq!(moves.iter().count(), 0);
    }
}

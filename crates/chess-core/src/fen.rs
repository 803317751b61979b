//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! Besides plain FEN this accepts the extensions used by chess variants:
//! - `~` after a piece marks it as promoted (crazyhouse)
//! - pockets as a bracketed suffix `[Qn]` or as a ninth rank `/Qn`
//! - Shredder and X-FEN castling (`HAha`, file letters for inner rooks)
//! - remaining checks as `3+3` before the clocks, or lichess style `+1+0`
//!   (checks already given) after them
//!
//! Missing trailing fields take their defaults.

use crate::{Board, Color, Material, Piece, RemainingChecks, Role, Setup, Square, SquareSet};
use std::fmt::Write;
use thiserror::Error;

/// The standard starting position.
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// An empty board, white to move.
pub const EMPTY_FEN: &str = "8/8/8/8/8/8/8/8 w - - 0 1";

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid pockets: {0}")]
    InvalidPockets(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid remaining checks: {0}")]
    InvalidRemainingChecks(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),

    #[error("unexpected trailing field: {0}")]
    UnexpectedField(String),
}

/// Parses a full FEN string.
pub fn parse_fen(fen: &str) -> Result<Setup, FenError> {
    let mut parts = fen
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty());

    let (board, pockets) = parse_board_and_pockets(parts.next().unwrap_or(""))?;

    let turn = match parts.next() {
        None | Some("w") => Color::White,
        Some("b") => Color::Black,
        Some(other) => return Err(FenError::InvalidActiveColor(other.to_string())),
    };

    let unmoved_rooks = match parts.next() {
        Some(castling) => parse_castling(&board, castling)?,
        None => SquareSet::EMPTY,
    };

    let ep_square = match parts.next() {
        None | Some("-") => None,
        Some(ep) => Some(
            Square::from_algebraic(ep)
                .ok_or_else(|| FenError::InvalidEnPassantSquare(ep.to_string()))?,
        ),
    };

    let mut halfmove_part = parts.next();
    let mut early_checks = None;
    if let Some(part) = halfmove_part.filter(|part| part.contains('+')) {
        early_checks = Some(parse_remaining_checks(part)?);
        halfmove_part = parts.next();
    }

    let halfmoves = match halfmove_part {
        Some(part) => parse_small_uint(part)
            .ok_or_else(|| FenError::InvalidHalfmoveClock(part.to_string()))?,
        None => 0,
    };

    let fullmoves = match parts.next() {
        Some(part) => parse_small_uint(part)
            .ok_or_else(|| FenError::InvalidFullmoveNumber(part.to_string()))?,
        None => 1,
    };

    let remaining_checks = match parts.next() {
        Some(part) if early_checks.is_some() => {
            return Err(FenError::InvalidRemainingChecks(part.to_string()))
        }
        Some(part) => Some(parse_remaining_checks(part)?),
        None => early_checks,
    };

    if let Some(extra) = parts.next() {
        return Err(FenError::UnexpectedField(extra.to_string()));
    }

    Ok(Setup {
        board,
        pockets,
        turn,
        unmoved_rooks,
        ep_square,
        remaining_checks,
        halfmoves,
        fullmoves: fullmoves.max(1),
    })
}

/// Parses the placement field together with optional pockets.
fn parse_board_and_pockets(part: &str) -> Result<(Board, Option<Material>), FenError> {
    if let Some(stripped) = part.strip_suffix(']') {
        let (board_part, pocket_part) = stripped.split_once('[').ok_or_else(|| {
            FenError::InvalidPockets(format!("unmatched ']' in '{}'", part))
        })?;
        return Ok((parse_board(board_part)?, Some(parse_pockets(pocket_part)?)));
    }
    match part.match_indices('/').nth(7) {
        Some((index, _)) => Ok((
            parse_board(&part[..index])?,
            Some(parse_pockets(&part[index + 1..])?),
        )),
        None => Ok((parse_board(part)?, None)),
    }
}

/// Parses the piece placement field, ranks 8 down to 1.
pub fn parse_board(part: &str) -> Result<Board, FenError> {
    let mut board = Board::empty();
    let mut rank: u8 = 7;
    let mut file: u8 = 0;
    let mut chars = part.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '/' && file == 8 {
            if rank == 0 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "too many ranks in '{}'",
                    part
                )));
            }
            file = 0;
            rank -= 1;
            continue;
        }
        if let Some(step) = c.to_digit(10).filter(|&d| d > 0) {
            file = file.saturating_add(step as u8);
            continue;
        }
        let sq = Square::from_coords(file, rank).ok_or_else(|| {
            FenError::InvalidPiecePlacement(format!("rank {} is too long", rank + 1))
        })?;
        let mut piece = Piece::from_fen_char(c).ok_or_else(|| {
            FenError::InvalidPiecePlacement(format!(
                "invalid character '{}' in rank {}",
                c,
                rank + 1
            ))
        })?;
        if chars.peek() == Some(&'~') {
            piece.promoted = true;
            chars.next();
        }
        board.set(sq, piece);
        file += 1;
    }

    if rank != 0 || file != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 full ranks in '{}'",
            part
        )));
    }
    Ok(board)
}

fn parse_pockets(part: &str) -> Result<Material, FenError> {
    if part.chars().count() > 64 {
        return Err(FenError::InvalidPockets(format!(
            "{} pieces in hand",
            part.chars().count()
        )));
    }
    let mut pockets = Material::default();
    for c in part.chars() {
        let piece = Piece::from_fen_char(c)
            .ok_or_else(|| FenError::InvalidPockets(format!("invalid character '{}'", c)))?;
        pockets.get_mut(piece.color).add(piece.role);
    }
    Ok(pockets)
}

/// Parses castling rights into the set of rooks that may still castle.
///
/// `K`/`Q` pick the outermost rook on the back rank, falling back to the
/// corner when the king is further out than any rook. File letters name
/// the rook directly.
pub fn parse_castling(board: &Board, part: &str) -> Result<SquareSet, FenError> {
    let mut rooks = SquareSet::EMPTY;
    if part == "-" {
        return Ok(rooks);
    }
    for c in part.chars() {
        let lower = c.to_ascii_lowercase();
        let color = if c == lower { Color::Black } else { Color::White };
        let rank = color.back_rank();
        let invalid = || FenError::InvalidCastlingRights(format!("invalid character '{}'", c));
        let sq = match lower {
            'a'..='h' => Square::from_coords(lower as u8 - b'a', rank).ok_or_else(invalid)?,
            'k' | 'q' => {
                let candidates = board.by_color(color)
                    & SquareSet::backrank(color)
                    & (board.rooks() | board.kings());
                let outermost = if lower == 'k' {
                    candidates.last()
                } else {
                    candidates.first()
                };
                match outermost.filter(|&sq| board.rooks().has(sq)) {
                    Some(sq) => sq,
                    None => {
                        let corner = if lower == 'k' { 7 } else { 0 };
                        Square::from_coords(corner, rank).ok_or_else(invalid)?
                    }
                }
            }
            _ => return Err(invalid()),
        };
        rooks = rooks.with(sq);
    }
    for color in Color::ALL {
        if (SquareSet::backrank(color) & rooks).size() > 2 {
            return Err(FenError::InvalidCastlingRights(format!(
                "more than two castling rooks for {} in '{}'",
                color, part
            )));
        }
    }
    Ok(rooks)
}

/// Parses `3+3` (checks remaining) or `+1+2` (checks given).
fn parse_remaining_checks(part: &str) -> Result<RemainingChecks, FenError> {
    let invalid = || FenError::InvalidRemainingChecks(part.to_string());
    let fields: Vec<&str> = part.split('+').collect();
    let (white, black) = match fields.as_slice() {
        ["", white, black] => {
            let white = parse_small_uint(white).filter(|&n| n <= 3).ok_or_else(invalid)?;
            let black = parse_small_uint(black).filter(|&n| n <= 3).ok_or_else(invalid)?;
            (3 - white, 3 - black)
        }
        [white, black] => {
            let white = parse_small_uint(white).filter(|&n| n <= 3).ok_or_else(invalid)?;
            let black = parse_small_uint(black).filter(|&n| n <= 3).ok_or_else(invalid)?;
            (white, black)
        }
        _ => return Err(invalid()),
    };
    Ok(RemainingChecks::new(white as u8, black as u8))
}

/// One to four decimal digits.
fn parse_small_uint(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Writes the piece placement field.
pub fn make_board(board: &Board) -> String {
    let mut fen = String::with_capacity(72);
    for rank in (0..8).rev() {
        let mut empty = 0;
        for file in 0..8 {
            match Square::from_coords(file, rank).and_then(|sq| board.get(sq)) {
                Some(piece) => {
                    if empty > 0 {
                        let _ = write!(fen, "{}", empty);
                        empty = 0;
                    }
                    fen.push(piece.to_fen_char());
                    if piece.promoted {
                        fen.push('~');
                    }
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            let _ = write!(fen, "{}", empty);
        }
        if rank > 0 {
            fen.push('/');
        }
    }
    fen
}

fn make_pockets(pockets: &Material) -> String {
    let mut fen = String::from("[");
    for color in Color::ALL {
        for (role, count) in pockets.get(color).iter() {
            for _ in 0..count {
                fen.push(role.to_fen_char(color));
            }
        }
    }
    fen.push(']');
    fen
}

/// Writes castling rights, preferring `KQkq` and falling back to file
/// letters for rooks that are not the outermost on their side.
pub fn make_castling(board: &Board, unmoved_rooks: SquareSet) -> String {
    let mut fen = String::new();
    for color in Color::ALL {
        let king = board.king_of(color);
        let candidates = board.pieces(color, Role::Rook) & SquareSet::backrank(color);
        for rook in (unmoved_rooks & candidates).into_iter().rev() {
            let c = match king {
                Some(king) if Some(rook) == candidates.first() && rook.index() < king.index() => 'q',
                Some(king) if Some(rook) == candidates.last() && king.index() < rook.index() => 'k',
                _ => rook.file().to_char(),
            };
            fen.push(match color {
                Color::White => c.to_ascii_uppercase(),
                Color::Black => c,
            });
        }
    }
    if fen.is_empty() {
        fen.push('-');
    }
    fen
}

/// Writes a full FEN string. Remaining checks, if any, are written in
/// the `3+3` form between the en passant square and the clocks.
pub fn make_fen(setup: &Setup) -> String {
    let mut fen = make_board(&setup.board);
    if let Some(pockets) = &setup.pockets {
        fen.push_str(&make_pockets(pockets));
    }
    let _ = write!(
        fen,
        " {} {} {}",
        setup.turn.to_char(),
        make_castling(&setup.board, setup.unmoved_rooks),
        setup
            .ep_square
            .map_or_else(|| "-".to_string(), Square::to_algebraic),
    );
    if let Some(checks) = setup.remaining_checks {
        let _ = write!(fen, " {}+{}", checks.get(Color::White), checks.get(Color::Black));
    }
    let _ = write!(fen, " {} {}", setup.halfmoves, setup.fullmoves);
    fen
}

impl Setup {
    /// Parses a FEN string. See [`parse_fen`].
    pub fn from_fen(fen: &str) -> Result<Setup, FenError> {
        parse_fen(fen)
    }

    /// Writes this setup as FEN. See [`make_fen`].
    pub fn to_fen(&self) -> String {
        make_fen(self)
    }
}

impl std::str::FromStr for Setup {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Setup, FenError> {
        parse_fen(s)
    }
}

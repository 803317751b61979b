//! Validated positions and the move-generation state machine.
//!
//! A [`Position`] is built from a [`Setup`] only after the active rules
//! accept it, and afterwards changes only through [`Position::play`]. All
//! variant behaviour is delegated to the [`RuleSet`](crate::RuleSet) the
//! position's [`Rules`] tag maps to.

use crate::rules::{RuleSet, Rules};
use crate::{AttackTables, Castles, CastlingSide, MoveList, ATTACKS};
use chess_core::{Board, Color, Material, Move, Piece, RemainingChecks, Role, Setup, Square, SquareSet};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Reasons a setup is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("empty board")]
    Empty,

    #[error("missing king or too many kings")]
    Kings,

    #[error("side not to move is in check")]
    OppositeCheck,

    #[error("pawns on back rank")]
    PawnsOnBackrank,

    #[error("impossible check")]
    ImpossibleCheck,

    #[error("position not allowed by the variant rules")]
    Variant,

    #[error("unknown variant: {0}")]
    UnknownVariant(String),
}

/// Options for [`Position::from_setup_with`].
#[derive(Debug, Clone, Copy)]
pub struct SetupOptions {
    /// Accept check configurations no legal game could reach.
    pub ignore_impossible_check: bool,
    /// The attack tables the position will use.
    pub tables: &'static AttackTables,
}

impl Default for SetupOptions {
    fn default() -> Self {
        SetupOptions {
            ignore_impossible_check: false,
            tables: &ATTACKS,
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// No legal moves and not in check.
    Stalemate,
    /// Neither side can win.
    InsufficientMaterial,
    /// A variant ending without a winner, such as both kings reaching the
    /// goal in racing kings.
    VariantEnd,
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Decisive { winner: Color },
    Draw(DrawReason),
}

impl Outcome {
    pub const fn winner(self) -> Option<Color> {
        match self {
            Outcome::Decisive { winner } => Some(winner),
            Outcome::Draw(_) => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Decisive {
                winner: Color::White,
            } => "1-0",
            Outcome::Decisive {
                winner: Color::Black,
            } => "0-1",
            Outcome::Draw(_) => "1/2-1/2",
        })
    }
}

/// Facts about the side to move, computed once per position.
///
/// Stale as soon as the position changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub king: Option<Square>,
    /// Pieces standing alone between the king and an enemy slider.
    pub blockers: SquareSet,
    pub checkers: SquareSet,
    pub variant_end: bool,
    pub must_capture: bool,
}

/// A legal position under some [`Rules`].
#[derive(Clone)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    pub(crate) castles: Castles,
    pub(crate) ep_square: Option<Square>,
    pub(crate) pockets: Option<Material>,
    pub(crate) remaining_checks: Option<RemainingChecks>,
    pub(crate) halfmoves: u32,
    pub(crate) fullmoves: u32,
    pub(crate) rules: Rules,
    pub(crate) tables: &'static AttackTables,
}

impl Position {
    /// The starting position of `rules`.
    pub fn new(rules: Rules) -> Position {
        Position::build(&rules.policy().initial_setup(), rules, &ATTACKS)
    }

    /// Validates `setup` under `rules` with default options.
    pub fn from_setup(setup: &Setup, rules: Rules) -> Result<Position, PositionError> {
        Position::from_setup_with(setup, rules, SetupOptions::default())
    }

    /// Validates `setup` under `rules`.
    ///
    /// Promoted markers, pockets and remaining checks are kept only when
    /// the rules use them. An en passant square that no pawn could have
    /// just crossed is dropped silently.
    pub fn from_setup_with(
        setup: &Setup,
        rules: Rules,
        options: SetupOptions,
    ) -> Result<Position, PositionError> {
        let pos = Position::build(setup, rules, options.tables);
        match rules.policy().validate(&pos, &options) {
            Ok(()) => Ok(pos),
            Err(err) => {
                debug!(rules = %rules, error = %err, "rejected setup");
                Err(err)
            }
        }
    }

    fn build(setup: &Setup, rules: Rules, tables: &'static AttackTables) -> Position {
        let policy = rules.policy();
        let mut board = setup.board.clone();
        let keep_promoted = if policy.tracks_promoted() {
            board.occupied() - board.kings() - board.pawns()
        } else {
            SquareSet::EMPTY
        };
        board.retain_promoted(keep_promoted);

        let mut pos = Position {
            castles: policy.castles(tables, &board, setup.unmoved_rooks),
            board,
            turn: setup.turn,
            ep_square: None,
            pockets: policy.pockets(setup),
            remaining_checks: policy.remaining_checks(setup),
            halfmoves: setup.halfmoves,
            fullmoves: setup.fullmoves,
            rules,
            tables,
        };
        pos.ep_square = setup.ep_square.filter(|&ep| pos.is_valid_ep_square(ep));
        pos
    }

    /// An en passant square must sit behind an enemy pawn that just made a
    /// double step, with the square in front of it vacant.
    fn is_valid_ep_square(&self, ep: Square) -> bool {
        let (ep_rank, forward) = match self.turn {
            Color::White => (5, 8),
            Color::Black => (2, -8),
        };
        if ep.rank().index() != ep_rank {
            return false;
        }
        let (Some(ahead), Some(pushed)) = (ep.offset(forward), ep.offset(-forward)) else {
            return false;
        };
        !self.board.has(ahead) && self.board.pieces(!self.turn, Role::Pawn).has(pushed)
    }

    /// Exports the position. Clocks are clamped to sane ranges and the en
    /// passant square is kept only if a capture there is legal.
    pub fn to_setup(&self) -> Setup {
        Setup {
            board: self.board.clone(),
            pockets: self.pockets,
            turn: self.turn,
            unmoved_rooks: self.castles.unmoved_rooks(),
            ep_square: self.legal_ep_square(),
            remaining_checks: self.remaining_checks,
            halfmoves: self.halfmoves.min(150),
            fullmoves: self.fullmoves.clamp(1, 9999),
        }
    }

    fn legal_ep_square(&self) -> Option<Square> {
        let ep = self.ep_square?;
        let ctx = self.ctx();
        let candidates = self.board.pieces(self.turn, Role::Pawn) & self.tables.pawn(!self.turn, ep);
        candidates
            .into_iter()
            .any(|from| self.dests(from, &ctx).has(ep))
            .then_some(ep)
    }

    #[inline]
    pub(crate) fn policy(&self) -> &'static dyn RuleSet {
        self.rules.policy()
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    #[inline]
    pub fn castles(&self) -> &Castles {
        &self.castles
    }

    /// The en passant square, if the last move was a double step. It may
    /// not be capturable; see [`Position::to_setup`].
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    #[inline]
    pub fn pockets(&self) -> Option<&Material> {
        self.pockets.as_ref()
    }

    #[inline]
    pub fn remaining_checks(&self) -> Option<&RemainingChecks> {
        self.remaining_checks.as_ref()
    }

    #[inline]
    pub fn halfmoves(&self) -> u32 {
        self.halfmoves
    }

    #[inline]
    pub fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    #[inline]
    pub fn rules(&self) -> Rules {
        self.rules
    }

    #[inline]
    pub fn tables(&self) -> &'static AttackTables {
        self.tables
    }

    /// Computes the context of the side to move.
    pub fn ctx(&self) -> Context {
        let policy = self.policy();
        let mut ctx = Context {
            king: None,
            blockers: SquareSet::EMPTY,
            checkers: SquareSet::EMPTY,
            variant_end: policy.is_variant_end(self),
            must_capture: false,
        };
        if let Some(king) = self.board.king_of(self.turn) {
            let snipers = ((self.tables.rook(king, SquareSet::EMPTY) & self.board.rooks_and_queens())
                | (self.tables.bishop(king, SquareSet::EMPTY) & self.board.bishops_and_queens()))
                & self.board.by_color(!self.turn);
            for sniper in snipers {
                let between = self.tables.between(king, sniper) & self.board.occupied();
                if !between.more_than_one() {
                    ctx.blockers |= between;
                }
            }
            ctx.king = Some(king);
            ctx.checkers = self.king_attackers(king, !self.turn, self.board.occupied());
        }
        ctx.must_capture = policy.must_capture(self, &ctx);
        ctx
    }

    /// Pieces of `attacker` giving check to a king on `sq`, given the
    /// occupancy.
    pub fn king_attackers(&self, sq: Square, attacker: Color, occupied: SquareSet) -> SquareSet {
        self.policy().king_attackers(self, sq, attacker, occupied)
    }

    /// Pieces giving check to the side to move.
    pub fn checkers(&self) -> SquareSet {
        self.board
            .king_of(self.turn)
            .map_or(SquareSet::EMPTY, |king| {
                self.king_attackers(king, !self.turn, self.board.occupied())
            })
    }

    pub fn is_check(&self) -> bool {
        self.checkers().is_not_empty()
    }

    /// Legal destinations of the piece on `sq`. Castling is included as
    /// the square of the castling rook.
    pub fn dests(&self, sq: Square, ctx: &Context) -> SquareSet {
        self.policy().dests(self, sq, ctx)
    }

    /// Squares a piece from the pocket may be dropped on.
    pub fn drop_dests(&self, ctx: &Context) -> SquareSet {
        self.policy().drop_dests(self, ctx)
    }

    /// All origins with at least one legal destination.
    pub fn all_dests(&self, ctx: &Context) -> Vec<(Square, SquareSet)> {
        if ctx.variant_end {
            return Vec::new();
        }
        self.board
            .by_color(self.turn)
            .into_iter()
            .map(|from| (from, self.dests(from, ctx)))
            .filter(|(_, dests)| dests.is_not_empty())
            .collect()
    }

    pub fn has_dests(&self, ctx: &Context) -> bool {
        self.board
            .by_color(self.turn)
            .into_iter()
            .any(|from| self.dests(from, ctx).is_not_empty())
            || self.drop_dests(ctx).is_not_empty()
    }

    /// Every legal move: promotions expanded, castling as king takes rook,
    /// and drops from the pocket.
    pub fn legal_moves(&self) -> MoveList {
        self.legal_moves_with(&self.ctx())
    }

    /// Like [`Position::legal_moves`], reusing a computed context.
    pub fn legal_moves_with(&self, ctx: &Context) -> MoveList {
        let mut moves = MoveList::new();
        let promotions = self.policy().promotion_roles();
        let promotion_rank = SquareSet::backrank(!self.turn);
        for (from, dests) in self.all_dests(ctx) {
            let is_pawn = self.board.pawns().has(from);
            for to in dests {
                if is_pawn && promotion_rank.has(to) {
                    for &role in promotions {
                        moves.push(Move::Normal {
                            from,
                            to,
                            promotion: Some(role),
                        });
                    }
                } else {
                    moves.push(Move::normal(from, to));
                }
            }
        }
        if let Some(pockets) = &self.pockets {
            let drops = self.drop_dests(ctx);
            for (role, _) in pockets.get(self.turn).iter() {
                let targets = if role == Role::Pawn {
                    drops - SquareSet::BACKRANKS
                } else {
                    drops
                };
                for to in targets {
                    moves.push(Move::Drop { role, to });
                }
            }
        }
        moves
    }

    /// Tests a move for legality. Castling may be given either as king
    /// takes rook or as the two-square king move.
    pub fn is_legal(&self, m: &Move, ctx: &Context) -> bool {
        match *m {
            Move::Drop { role, to } => {
                let Some(pockets) = &self.pockets else {
                    return false;
                };
                pockets.count(self.turn, role) > 0
                    && !(role == Role::Pawn && SquareSet::BACKRANKS.has(to))
                    && self.drop_dests(ctx).has(to)
            }
            Move::Normal {
                from,
                to,
                promotion,
            } => {
                if let Some(role) = promotion {
                    if !self.policy().promotion_roles().contains(&role) {
                        return false;
                    }
                }
                let promotes = self.board.pawns().has(from) && SquareSet::BACKRANKS.has(to);
                if promotion.is_some() != promotes {
                    return false;
                }
                let dests = self.dests(from, ctx);
                dests.has(to) || dests.has(self.normalize_move(m).to())
            }
        }
    }

    /// The castling side `m` would castle to, if it is a king move onto an
    /// own piece or a two-square king move.
    pub fn castling_side(&self, m: &Move) -> Option<CastlingSide> {
        let Move::Normal { from, to, .. } = *m else {
            return None;
        };
        let delta = i16::from(to.index()) - i16::from(from.index());
        if delta.abs() != 2 && !self.board.by_color(self.turn).has(to) {
            return None;
        }
        if !self.board.kings().has(from) {
            return None;
        }
        Some(if delta > 0 {
            CastlingSide::H
        } else {
            CastlingSide::A
        })
    }

    /// Rewrites a two-square castling move as king takes rook.
    pub fn normalize_move(&self, m: &Move) -> Move {
        match (*m, self.castling_side(m)) {
            (Move::Normal { from, to, .. }, Some(side)) => Move::Normal {
                from,
                to: self.castles.rook(self.turn, side).unwrap_or(to),
                promotion: None,
            },
            _ => *m,
        }
    }

    /// Plays a move without checking legality.
    ///
    /// Playing an illegal move leaves the position in an unspecified but
    /// memory-safe state.
    pub fn play(&mut self, m: &Move) {
        let turn = self.turn;
        let ep_square = self.ep_square.take();
        let castling = self.castling_side(m);

        self.halfmoves = self.halfmoves.saturating_add(1);
        if turn == Color::Black {
            self.fullmoves = self.fullmoves.saturating_add(1);
        }
        self.turn = !turn;

        match *m {
            Move::Drop { role, to } => {
                self.board.set(to, role.of(turn));
                if let Some(pockets) = &mut self.pockets {
                    pockets.get_mut(turn).remove(role);
                }
                if role == Role::Pawn {
                    self.halfmoves = 0;
                }
            }
            Move::Normal {
                from,
                to,
                promotion,
            } => {
                let Some(mut piece) = self.board.take(from) else {
                    return;
                };
                let mut ep_capture = None;
                match piece.role {
                    Role::Pawn => {
                        self.halfmoves = 0;
                        if Some(to) == ep_square {
                            let behind = to.offset(-8 * turn.pawn_direction());
                            ep_capture = behind.and_then(|sq| self.board.take(sq));
                        }
                        if from.index().abs_diff(to.index()) == 16 && (8..=55).contains(&from.index()) {
                            self.ep_square = Square::from_index((from.index() + to.index()) / 2);
                        }
                        if let Some(role) = promotion {
                            piece.role = role;
                            piece.promoted = self.policy().tracks_promoted();
                        }
                    }
                    Role::Rook => self.castles.discard_rook(from),
                    Role::King => {
                        if let Some(side) = castling {
                            if let Some(rook_from) = self.castles.rook(turn, side) {
                                let rook = self.board.take(rook_from);
                                self.board.set(side.king_to(turn), piece);
                                if let Some(rook) = rook {
                                    self.board.set(side.rook_to(turn), rook);
                                }
                            }
                        }
                        self.castles.discard_side(turn);
                    }
                    _ => {}
                }
                if castling.is_none() {
                    if let Some(captured) = self.board.set(to, piece).or(ep_capture) {
                        self.play_capture_at(to, captured);
                    }
                }
            }
        }

        if self.remaining_checks.is_some() && self.is_check() {
            if let Some(checks) = &mut self.remaining_checks {
                checks.decrement(turn);
            }
        }
    }

    fn play_capture_at(&mut self, sq: Square, captured: Piece) {
        self.halfmoves = 0;
        if captured.role == Role::Rook {
            self.castles.discard_rook(sq);
        }
        if let Some(pockets) = &mut self.pockets {
            let role = if captured.promoted {
                Role::Pawn
            } else {
                captured.role
            };
            pockets.get_mut(!captured.color).add(role);
        }
        self.policy().on_capture(self, sq, captured);
    }

    pub fn is_variant_end(&self) -> bool {
        self.policy().is_variant_end(self)
    }

    /// The result of a variant-specific ending, if any.
    pub fn variant_outcome(&self, ctx: &Context) -> Option<Outcome> {
        self.policy().variant_outcome(self, ctx)
    }

    /// True if `color` cannot win by any sequence of legal moves.
    pub fn has_insufficient_material(&self, color: Color) -> bool {
        self.policy().has_insufficient_material(self, color)
    }

    pub fn is_insufficient_material(&self) -> bool {
        Color::ALL
            .into_iter()
            .all(|color| self.has_insufficient_material(color))
    }

    pub fn is_checkmate(&self, ctx: &Context) -> bool {
        !ctx.variant_end && ctx.checkers.is_not_empty() && !self.has_dests(ctx)
    }

    pub fn is_stalemate(&self, ctx: &Context) -> bool {
        !ctx.variant_end && ctx.checkers.is_empty() && !self.has_dests(ctx)
    }

    pub fn is_end(&self, ctx: &Context) -> bool {
        ctx.variant_end || self.is_insufficient_material() || !self.has_dests(ctx)
    }

    /// The game result, checked in order: variant ending, checkmate,
    /// insufficient material, stalemate.
    pub fn outcome(&self, ctx: &Context) -> Option<Outcome> {
        if let Some(outcome) = self.variant_outcome(ctx) {
            return Some(outcome);
        }
        if self.is_checkmate(ctx) {
            Some(Outcome::Decisive { winner: !self.turn })
        } else if self.is_insufficient_material() {
            Some(Outcome::Draw(DrawReason::InsufficientMaterial))
        } else if self.is_stalemate(ctx) {
            Some(Outcome::Draw(DrawReason::Stalemate))
        } else {
            None
        }
    }

    /// Legal destinations under the standard rules of movement.
    pub(crate) fn legal_dests(&self, sq: Square, ctx: &Context) -> SquareSet {
        if ctx.variant_end {
            return SquareSet::EMPTY;
        }
        let Some(piece) = self.board.get(sq).filter(|piece| piece.color == self.turn) else {
            return SquareSet::EMPTY;
        };

        let mut legal = SquareSet::EMPTY;
        let mut pseudo = if piece.role == Role::Pawn {
            if let Some(ep) = self.ep_square {
                if self.can_capture_ep(sq, ctx) {
                    legal = SquareSet::from_square(ep);
                }
            }
            self.pawn_dests(sq, self.board.by_color(!self.turn))
        } else {
            self.tables.piece(piece, sq, self.board.occupied()) - self.board.by_color(self.turn)
        };

        if let Some(king) = ctx.king {
            if piece.role == Role::King {
                let occupied = self.board.occupied().without(sq);
                for to in pseudo {
                    if self.king_attackers(to, !self.turn, occupied).is_not_empty() {
                        pseudo = pseudo.without(to);
                    }
                }
                return pseudo
                    | self.castling_dest(CastlingSide::A, ctx)
                    | self.castling_dest(CastlingSide::H, ctx);
            }
            if ctx.checkers.is_not_empty() {
                let Some(checker) = ctx.checkers.single_square() else {
                    return SquareSet::EMPTY;
                };
                pseudo &= self.tables.between(checker, king).with(checker);
            }
            if ctx.blockers.has(sq) {
                pseudo &= self.tables.ray(sq, king);
            }
        }
        pseudo | legal
    }

    /// Destinations ignoring whether the own king ends up attacked.
    pub(crate) fn pseudo_dests(&self, sq: Square, ctx: &Context) -> SquareSet {
        if ctx.variant_end {
            return SquareSet::EMPTY;
        }
        let Some(piece) = self.board.get(sq).filter(|piece| piece.color == self.turn) else {
            return SquareSet::EMPTY;
        };
        if piece.role == Role::Pawn {
            let mut targets = self.board.by_color(!self.turn);
            if let Some(ep) = self.ep_square {
                targets = targets.with(ep);
            }
            return self.pawn_dests(sq, targets);
        }
        let pseudo =
            self.tables.piece(piece, sq, self.board.occupied()) - self.board.by_color(self.turn);
        if Some(sq) == ctx.king {
            pseudo
                | self.castling_dest(CastlingSide::A, ctx)
                | self.castling_dest(CastlingSide::H, ctx)
        } else {
            pseudo
        }
    }

    /// Pawn captures onto `targets` plus single and double pushes. Pawns on
    /// their first two ranks may double-step, which lets horde pawns on the
    /// first rank advance two squares.
    fn pawn_dests(&self, sq: Square, targets: SquareSet) -> SquareSet {
        let mut dests = self.tables.pawn(self.turn, sq) & targets;
        let delta = 8 * self.turn.pawn_direction();
        if let Some(step) = sq.offset(delta).filter(|&step| !self.board.has(step)) {
            dests = dests.with(step);
            let can_double_step = match self.turn {
                Color::White => sq.index() < 16,
                Color::Black => sq.index() >= 48,
            };
            if can_double_step {
                if let Some(double) = step.offset(delta).filter(|&double| !self.board.has(double)) {
                    dests = dests.with(double);
                }
            }
        }
        dests
    }

    fn can_capture_ep(&self, from: Square, ctx: &Context) -> bool {
        let Some(ep) = self.ep_square else {
            return false;
        };
        if !self.tables.pawn(self.turn, from).has(ep) {
            return false;
        }
        let Some(king) = ctx.king else {
            return true;
        };
        let Some(captured) = ep.offset(-8 * self.turn.pawn_direction()) else {
            return false;
        };
        let occupied = self.board.occupied().toggle(from).toggle(captured).with(ep);
        self.king_attackers(king, !self.turn, occupied)
            .without(captured)
            .is_empty()
    }

    /// The castling rook's square if castling to `side` is legal: the path
    /// is vacant, no square the king crosses is attacked, and the king is
    /// safe on its destination once the rook has moved too.
    pub(crate) fn castling_dest(&self, side: CastlingSide, ctx: &Context) -> SquareSet {
        let Some(king) = ctx.king else {
            return SquareSet::EMPTY;
        };
        if ctx.checkers.is_not_empty() {
            return SquareSet::EMPTY;
        }
        let Some(rook) = self.castles.rook(self.turn, side) else {
            return SquareSet::EMPTY;
        };
        if self.castles.path(self.turn, side).intersects(self.board.occupied()) {
            return SquareSet::EMPTY;
        }

        // The destination is only tested once the rook has moved, since in
        // atomic the relocated rook may shield it.
        let king_to = side.king_to(self.turn);
        let occupied = self.board.occupied().without(king);
        for sq in self.tables.between(king, king_to) {
            if self.king_attackers(sq, !self.turn, occupied).is_not_empty() {
                return SquareSet::EMPTY;
            }
        }

        let rook_to = side.rook_to(self.turn);
        let after = self.board.occupied().toggle(king).toggle(rook).toggle(rook_to);
        if self.king_attackers(king_to, !self.turn, after).is_not_empty() {
            return SquareSet::EMPTY;
        }
        SquareSet::from_square(rook)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(Rules::Chess)
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.turn == other.turn
            && self.castles == other.castles
            && self.ep_square == other.ep_square
            && self.pockets == other.pockets
            && self.remaining_checks == other.remaining_checks
            && self.halfmoves == other.halfmoves
            && self.fullmoves == other.fullmoves
            && self.rules == other.rules
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("rules", &self.rules)
            .field("fen", &chess_core::make_fen(&self.to_setup()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::parse_fen;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn position(fen: &str) -> Position {
        Position::from_setup(&parse_fen(fen).unwrap(), Rules::Chess).unwrap()
    }

    fn uci(m: &str) -> Move {
        Move::from_uci(m).unwrap()
    }

    #[test]
    fn start_position() {
        let pos = Position::new(Rules::Chess);
        assert_eq!(pos.turn(), Color::White);
        assert_eq!(pos.legal_moves().len(), 20);
        assert!(!pos.is_check());
        assert_eq!(pos.to_setup(), Setup::default());
        assert_eq!(pos, Position::default());
    }

    #[test]
    fn setup_errors() {
        let check = |fen: &str| Position::from_setup(&parse_fen(fen).unwrap(), Rules::Chess);
        assert_eq!(check("8/8/8/8/8/8/8/8 w - - 0 1"), Err(PositionError::Empty));
        assert_eq!(check("8/8/8/8/8/8/8/4K3 w - - 0 1"), Err(PositionError::Kings));
        assert_eq!(check("4k3/8/8/8/8/8/8/3KK3 w - - 0 1"), Err(PositionError::Kings));
        assert_eq!(
            check("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1"),
            Err(PositionError::OppositeCheck)
        );
        assert_eq!(
            check("3Pk3/8/8/8/8/8/8/4K3 b - - 0 1"),
            Err(PositionError::PawnsOnBackrank)
        );
        // Three checkers.
        assert_eq!(
            check("4k3/8/8/8/1b6/3n4/8/r3K3 w - - 0 1"),
            Err(PositionError::ImpossibleCheck)
        );
        // A reachable double check.
        assert_eq!(
            check("4k3/8/8/8/8/2b5/8/r3K3 w - - 0 1").map(|_| ()),
            Ok(())
        );
        // Two sliders on one line through the king.
        assert_eq!(
            check("4k3/8/8/8/8/8/8/r3K2r w - - 0 1"),
            Err(PositionError::ImpossibleCheck)
        );
    }

    #[test]
    fn impossible_check_can_be_ignored() {
        let setup = parse_fen("4k3/8/8/8/8/8/8/r3K2r w - - 0 1").unwrap();
        let options = SetupOptions {
            ignore_impossible_check: true,
            ..SetupOptions::default()
        };
        let pos = Position::from_setup_with(&setup, Rules::Chess, options).unwrap();
        assert!(pos.is_check());
    }

    #[test]
    fn check_after_double_step() {
        // The pushed pawn gives check itself.
        assert!(Position::from_setup(
            &parse_fen("8/8/8/4k3/3P4/8/8/4K3 b - d3 0 1").unwrap(),
            Rules::Chess
        )
        .is_ok());
        // Discovered check through the square the pawn left.
        assert!(Position::from_setup(
            &parse_fen("8/8/8/6k1/3P4/8/8/2B1K3 b - d3 0 1").unwrap(),
            Rules::Chess
        )
        .is_ok());
        // A knight check cannot come from a double step.
        assert_eq!(
            Position::from_setup(
                &parse_fen("8/8/8/8/3P4/5k2/8/4K1N1 b - d3 0 1").unwrap(),
                Rules::Chess
            ),
            Err(PositionError::ImpossibleCheck)
        );
    }

    #[test]
    fn invalid_ep_square_is_dropped() {
        let pos = position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e6 0 1");
        assert_eq!(pos.ep_square(), None);
        let pos = position("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        assert_eq!(pos.ep_square(), Some(sq("e3")));
        // Valid but not capturable: omitted on export.
        assert_eq!(pos.to_setup().ep_square, None);
    }

    #[test]
    fn en_passant_capture() {
        let mut pos = position("rnbqkbnr/pppppppp/8/4P3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2");
        pos.play(&uci("d7d5"));
        assert_eq!(pos.ep_square(), Some(sq("d6")));
        assert_eq!(pos.to_setup().ep_square, Some(sq("d6")));
        let ctx = pos.ctx();
        assert!(pos.dests(sq("e5"), &ctx).has(sq("d6")));
        pos.play(&uci("e5d6"));
        assert_eq!(pos.board().get(sq("d5")), None);
        assert_eq!(pos.board().get(sq("d6")), Some(Role::Pawn.of(Color::White)));
        assert_eq!(pos.halfmoves(), 0);
    }

    #[test]
    fn en_passant_exposing_king_is_illegal() {
        // Capturing would clear the fifth rank between the king and rook.
        let pos = position("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1");
        let ctx = pos.ctx();
        assert!(!pos.dests(sq("e5"), &ctx).has(sq("d6")));
        assert_eq!(pos.to_setup().ep_square, None);
    }

    #[test]
    fn pinned_piece_moves_along_pin() {
        let pos = position("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1");
        let ctx = pos.ctx();
        assert!(ctx.blockers.has(sq("e2")));
        let dests = pos.dests(sq("e2"), &ctx);
        assert!(dests.has(sq("e7")));
        assert!(!dests.has(sq("d2")));
        assert_eq!(
            dests,
            ["e3", "e4", "e5", "e6", "e7"].into_iter().map(sq).collect::<SquareSet>()
        );
    }

    #[test]
    fn check_evasions() {
        let pos = position("4k3/8/8/8/8/8/3q4/R3K3 w - - 0 1");
        let ctx = pos.ctx();
        assert_eq!(ctx.checkers, SquareSet::from_square(sq("d2")));
        let king = pos.dests(Square::E1, &ctx);
        assert!(king.has(sq("d2")));
        assert!(!king.has(sq("e2")));
        assert!(!king.has(Square::D1));
        // Rook cannot block a contact check, and castling is out.
        assert_eq!(pos.dests(Square::A1, &ctx), SquareSet::EMPTY);
    }

    #[test]
    fn castling() {
        let mut pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let ctx = pos.ctx();
        let king = pos.dests(Square::E1, &ctx);
        assert!(king.has(Square::A1));
        assert!(king.has(Square::H1));
        assert!(pos.is_legal(&uci("e1g1"), &ctx));
        assert!(pos.is_legal(&uci("e1h1"), &ctx));
        assert_eq!(pos.normalize_move(&uci("e1g1")), uci("e1h1"));
        assert_eq!(pos.castling_side(&uci("e1c1")), Some(CastlingSide::A));

        pos.play(&uci("e1g1"));
        assert_eq!(pos.board().get(Square::G1), Some(Role::King.of(Color::White)));
        assert_eq!(pos.board().get(Square::F1), Some(Role::Rook.of(Color::White)));
        assert_eq!(pos.board().get(Square::H1), None);
        assert!(!pos.castles().has_color(Color::White));

        pos.play(&uci("e8a8"));
        assert_eq!(pos.board().get(Square::C8), Some(Role::King.of(Color::Black)));
        assert_eq!(pos.board().get(Square::D8), Some(Role::Rook.of(Color::Black)));
        assert_eq!(pos.fullmoves(), 2);
    }

    #[test]
    fn castling_through_attack_is_illegal() {
        let pos = position("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1");
        let ctx = pos.ctx();
        let king = pos.dests(Square::E1, &ctx);
        assert!(!king.has(Square::H1));
        assert!(king.has(Square::A1));
    }

    #[test]
    fn castling_onto_attack_is_illegal() {
        let pos = position("r3k2r/8/8/8/8/8/6r1/R3K2R w KQkq - 0 1");
        let ctx = pos.ctx();
        let king = pos.dests(Square::E1, &ctx);
        assert!(!king.has(Square::H1));
        assert!(!pos.is_legal(&uci("e1g1"), &ctx));
        assert!(king.has(Square::A1));
    }

    #[test]
    fn double_check_leaves_only_king_moves() {
        let pos = position("4r1k1/8/8/8/8/3n4/8/R2QK3 w - - 0 1");
        let ctx = pos.ctx();
        assert_eq!(ctx.checkers.size(), 2);
        for from in pos.board().white().without(Square::E1) {
            assert_eq!(pos.dests(from, &ctx), SquareSet::EMPTY, "{} can move", from);
        }
        assert!(pos.dests(Square::E1, &ctx).is_not_empty());
        assert!(pos.legal_moves().iter().all(|m| m.from() == Some(Square::E1)));
    }

    #[test]
    fn rook_capture_revokes_castling() {
        let mut pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        pos.play(&uci("a1a8"));
        assert!(!pos.castles().has(Color::Black, CastlingSide::A));
        assert!(!pos.castles().has(Color::White, CastlingSide::A));
        assert!(pos.castles().has(Color::White, CastlingSide::H));
        assert_eq!(pos.halfmoves(), 0);
    }

    #[test]
    fn promotion() {
        let mut pos = position("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let ctx = pos.ctx();
        assert!(!pos.is_legal(&uci("a7a8"), &ctx));
        assert!(pos.is_legal(&uci("a7a8n"), &ctx));
        assert!(!pos.is_legal(&uci("a7a8k"), &ctx));
        assert_eq!(pos.legal_moves().len(), 4 + 3);
        pos.play(&uci("a7a8q"));
        assert_eq!(pos.board().get(Square::A8), Some(Role::Queen.of(Color::White)));
    }

    #[test]
    fn checkmate_and_stalemate() {
        let mate = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        let ctx = mate.ctx();
        assert!(mate.is_checkmate(&ctx));
        assert!(mate.is_end(&ctx));
        assert_eq!(
            mate.outcome(&ctx),
            Some(Outcome::Decisive {
                winner: Color::Black
            })
        );

        let stalemate = position("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let ctx = stalemate.ctx();
        assert!(stalemate.is_stalemate(&ctx));
        assert_eq!(
            stalemate.outcome(&ctx),
            Some(Outcome::Draw(DrawReason::Stalemate))
        );
        assert_eq!(format!("{}", stalemate.outcome(&ctx).unwrap()), "1/2-1/2");
    }

    #[test]
    fn insufficient_material() {
        assert!(position("8/8/4k3/8/8/2K5/8/8 w - - 0 1").is_insufficient_material());
        assert!(position("8/8/4k3/8/8/2KN4/8/8 w - - 0 1").is_insufficient_material());
        // Bishops on same-colored squares.
        assert!(position("8/8/4k3/5b2/8/2KB4/8/8 w - - 0 1").is_insufficient_material());
        assert!(!position("8/8/4kb2/8/8/2KB4/8/8 w - - 0 1").is_insufficient_material());
        assert!(!position("8/8/4k3/8/8/2KR4/8/8 w - - 0 1").is_insufficient_material());
        // A knight can still mate when the defender has something to block with.
        let pos = position("8/8/4kn2/8/8/2KN4/8/8 w - - 0 1");
        assert!(!pos.has_insufficient_material(Color::White));
        let pos = position("8/8/4k3/8/8/2KN4/8/8 w - - 0 1");
        assert!(pos.has_insufficient_material(Color::White));
        let ctx = pos.ctx();
        assert_eq!(
            pos.outcome(&ctx),
            Some(Outcome::Draw(DrawReason::InsufficientMaterial))
        );
    }

    #[test]
    fn to_setup_clamps_clocks() {
        let mut setup = Setup::default();
        setup.halfmoves = 500;
        setup.fullmoves = 12_000;
        let pos = Position::from_setup(&setup, Rules::Chess).unwrap();
        let out = pos.to_setup();
        assert_eq!(out.halfmoves, 150);
        assert_eq!(out.fullmoves, 9999);
    }

    #[test]
    fn drops_are_illegal_without_pockets() {
        let pos = Position::new(Rules::Chess);
        let ctx = pos.ctx();
        assert!(!pos.is_legal(&uci("N@e4"), &ctx));
        assert_eq!(pos.drop_dests(&ctx), SquareSet::EMPTY);
    }
}

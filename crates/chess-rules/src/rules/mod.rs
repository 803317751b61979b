//! Rule set abstraction for chess variants.
//!
//! A [`Position`] carries a [`Rules`] tag and delegates every
//! variant-dependent decision to the [`RuleSet`] that tag maps to. The
//! trait's default methods are the standard rules, so a variant only
//! overrides what it changes.

mod antichess;
mod atomic;
mod crazyhouse;
mod horde;
mod king_of_the_hill;
mod racing_kings;
pub(crate) mod standard;
mod three_check;

pub use antichess::Antichess;
pub use atomic::Atomic;
pub use crazyhouse::Crazyhouse;
pub use horde::Horde;
pub use king_of_the_hill::KingOfTheHill;
pub use racing_kings::RacingKings;
pub use standard::Standard;
pub use three_check::ThreeCheck;

use crate::{AttackTables, Castles, Context, Outcome, Position, PositionError, SetupOptions};
use chess_core::{Board, Color, Material, Piece, RemainingChecks, Role, Setup, Square, SquareSet};
use std::fmt;
use std::str::FromStr;

pub(crate) const STANDARD_PROMOTIONS: [Role; 4] =
    [Role::Queen, Role::Rook, Role::Bishop, Role::Knight];

/// The supported rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rules {
    /// Standard chess, including Chess960 starting positions.
    #[default]
    Chess,
    Antichess,
    KingOfTheHill,
    ThreeCheck,
    Atomic,
    Horde,
    RacingKings,
    Crazyhouse,
}

impl Rules {
    pub const ALL: [Rules; 8] = [
        Rules::Chess,
        Rules::Antichess,
        Rules::KingOfTheHill,
        Rules::ThreeCheck,
        Rules::Atomic,
        Rules::Horde,
        Rules::RacingKings,
        Rules::Crazyhouse,
    ];

    /// The rule set implementing this variant.
    pub fn policy(self) -> &'static dyn RuleSet {
        match self {
            Rules::Chess => &Standard,
            Rules::Antichess => &Antichess,
            Rules::KingOfTheHill => &KingOfTheHill,
            Rules::ThreeCheck => &ThreeCheck,
            Rules::Atomic => &Atomic,
            Rules::Horde => &Horde,
            Rules::RacingKings => &RacingKings,
            Rules::Crazyhouse => &Crazyhouse,
        }
    }

    /// Short identifier, as used by lichess.
    pub const fn name(self) -> &'static str {
        match self {
            Rules::Chess => "chess",
            Rules::Antichess => "antichess",
            Rules::KingOfTheHill => "kingofthehill",
            Rules::ThreeCheck => "3check",
            Rules::Atomic => "atomic",
            Rules::Horde => "horde",
            Rules::RacingKings => "racingkings",
            Rules::Crazyhouse => "crazyhouse",
        }
    }
}

impl fmt::Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rules {
    type Err = PositionError;

    /// Accepts the short identifiers and common aliases, ignoring case,
    /// dashes and underscores.
    fn from_str(s: &str) -> Result<Rules, PositionError> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match key.as_str() {
            "chess" | "standard" | "chess960" | "fromposition" => Rules::Chess,
            "antichess" | "giveaway" | "suicide" => Rules::Antichess,
            "kingofthehill" | "koth" => Rules::KingOfTheHill,
            "3check" | "threecheck" => Rules::ThreeCheck,
            "atomic" => Rules::Atomic,
            "horde" => Rules::Horde,
            "racingkings" => Rules::RacingKings,
            "crazyhouse" | "zh" => Rules::Crazyhouse,
            _ => return Err(PositionError::UnknownVariant(s.to_owned())),
        })
    }
}

/// Variant hooks consulted by [`Position`].
///
/// Every method has the standard-chess behaviour as its default.
pub trait RuleSet: Sync {
    /// The starting setup.
    fn initial_setup(&self) -> Setup {
        Setup::default()
    }

    /// Castling rights for a new position.
    fn castles(&self, tables: &AttackTables, board: &Board, unmoved_rooks: SquareSet) -> Castles {
        Castles::from_setup(tables, board, unmoved_rooks)
    }

    /// Pockets for a new position, if the variant has them.
    fn pockets(&self, _setup: &Setup) -> Option<Material> {
        None
    }

    /// Check counters for a new position, if the variant has them.
    fn remaining_checks(&self, _setup: &Setup) -> Option<RemainingChecks> {
        None
    }

    /// Whether promoted pieces are remembered.
    fn tracks_promoted(&self) -> bool {
        false
    }

    /// Accepts or rejects a freshly built position.
    fn validate(&self, pos: &Position, options: &SetupOptions) -> Result<(), PositionError> {
        standard::validate(pos, options)
    }

    /// Pieces of `attacker` that check a king on `sq`.
    fn king_attackers(
        &self,
        pos: &Position,
        sq: Square,
        attacker: Color,
        occupied: SquareSet,
    ) -> SquareSet {
        pos.tables().attacks_to(sq, attacker, pos.board(), occupied)
    }

    /// Legal destinations of the piece on `sq`.
    fn dests(&self, pos: &Position, sq: Square, ctx: &Context) -> SquareSet {
        pos.legal_dests(sq, ctx)
    }

    /// Whether the side to move is forced to capture.
    fn must_capture(&self, _pos: &Position, _ctx: &Context) -> bool {
        false
    }

    /// Squares a pocket piece may be dropped on.
    fn drop_dests(&self, _pos: &Position, _ctx: &Context) -> SquareSet {
        SquareSet::EMPTY
    }

    /// Called after `captured` was taken on `sq` and pockets were updated.
    fn on_capture(&self, _pos: &mut Position, _sq: Square, _captured: Piece) {}

    fn has_insufficient_material(&self, pos: &Position, color: Color) -> bool {
        standard::has_insufficient_material(pos.board(), color)
    }

    /// Whether a variant-specific ending has been reached.
    fn is_variant_end(&self, _pos: &Position) -> bool {
        false
    }

    fn variant_outcome(&self, _pos: &Position, _ctx: &Context) -> Option<Outcome> {
        None
    }

    /// Roles a pawn may promote to.
    fn promotion_roles(&self) -> &'static [Role] {
        &STANDARD_PROMOTIONS
    }
}

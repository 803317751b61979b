//! Three-check: giving check three times wins.

use super::RuleSet;
use crate::{Context, Outcome, Position};
use chess_core::{Color, RemainingChecks, Role, Setup};

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeCheck;

impl RuleSet for ThreeCheck {
    fn initial_setup(&self) -> Setup {
        Setup {
            remaining_checks: Some(RemainingChecks::default()),
            ..Setup::default()
        }
    }

    fn remaining_checks(&self, setup: &Setup) -> Option<RemainingChecks> {
        Some(setup.remaining_checks.unwrap_or_default())
    }

    /// Any piece besides the king can give check.
    fn has_insufficient_material(&self, pos: &Position, color: Color) -> bool {
        pos.board().pieces(color, Role::King) == pos.board().by_color(color)
    }

    fn is_variant_end(&self, pos: &Position) -> bool {
        checked_out(pos).is_some()
    }

    fn variant_outcome(&self, pos: &Position, _ctx: &Context) -> Option<Outcome> {
        checked_out(pos).map(|winner| Outcome::Decisive { winner })
    }
}

/// The first color, white before black, that has no checks left to give.
fn checked_out(pos: &Position) -> Option<Color> {
    let remaining = pos.remaining_checks()?;
    Color::ALL
        .into_iter()
        .find(|&color| remaining.get(color) == 0)
}

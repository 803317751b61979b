//! Perft (performance test) for move generator validation.
//!
//! Perft counts the leaf nodes of the legal move tree to a given depth,
//! which can be compared against known-correct values.

use crate::Position;
use chess_core::SquareSet;
use tracing::trace;

/// Counts the number of leaf nodes at the given depth.
///
/// At the last ply the destination sets are counted directly instead of
/// playing each move, unless drops are available.
pub fn perft(pos: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let ctx = pos.ctx();
    if depth == 1 && pos.drop_dests(&ctx).is_empty() {
        let promotions = pos.policy().promotion_roles().len() as u64;
        let promotion_rank = SquareSet::backrank(!pos.turn());
        return pos
            .all_dests(&ctx)
            .into_iter()
            .map(|(from, dests)| {
                let mut nodes = u64::from(dests.size());
                if pos.board().pawns().has(from) {
                    nodes += u64::from((dests & promotion_rank).size()) * (promotions - 1);
                }
                nodes
            })
            .sum();
    }

    let moves = pos.legal_moves_with(&ctx);
    let mut nodes = 0u64;
    for m in &moves {
        let mut child = pos.clone();
        child.play(m);
        nodes += perft(&child, depth - 1);
    }
    nodes
}

/// Perft with divide: the node count below each root move, sorted by the
/// move's UCI notation. Useful for finding which move a wrong count
/// comes from.
pub fn perft_divide(pos: &Position, depth: u32) -> Vec<(String, u64)> {
    let moves = pos.legal_moves();
    let mut results = Vec::with_capacity(moves.len());

    for m in &moves {
        let mut child = pos.clone();
        child.play(m);
        let nodes = if depth > 1 {
            perft(&child, depth - 1)
        } else {
            1
        };
        trace!(mv = %m, nodes, "divide");
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

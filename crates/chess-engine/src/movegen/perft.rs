//! Perft: leaf counts of the legal move tree, compared against published
//! totals to validate move generation and make/unmake.

use super::generate_moves;
use crate::Position;
use chess_core::Move;

/// Counts leaf nodes `depth` plies below `position`.
pub fn perft(position: &Position, depth: u32) -> u64 {
    let mut scratch = position.clone();
    perft_in_place(&mut scratch, depth)
}

fn perft_in_place(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for &m in &moves {
        let undo = position.make_move(m);
        nodes += perft_in_place(position, depth - 1);
        position.unmake_move(m, undo);
    }
    nodes
}

/// Per-root-move leaf counts, sorted by move text.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(Move, u64)> {
    let mut scratch = position.clone();
    let moves = generate_moves(position);
    let mut results: Vec<(Move, u64)> = moves
        .as_slice()
        .iter()
        .map(|&m| {
            let undo = scratch.make_move(m);
            let nodes = perft_in_place(&mut scratch, depth.saturating_sub(1));
            scratch.unmake_move(m, undo);
            (m, nodes)
        })
        .collect();

    results.sort_by_key(|(m, _)| m.to_uci());
    results
}

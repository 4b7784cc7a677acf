//! Move generation.
//!
//! Moves are first generated pseudo-legally from the attack tables, then
//! filtered: each candidate is made on a scratch copy of the position and
//! dropped if it leaves the mover's king attacked. Every generated [`Move`]
//! carries the moved piece and the captured piece, so applying and undoing it
//! never has to look at the board.

mod attacks;
mod magics;
pub mod perft;

use crate::{Bitboard, Position};
use chess_core::{Color, Move, MoveFlag, Piece, Square};

pub use attacks::{king_attacks, knight_attacks, pawn_attacks};
pub use magics::{bishop_attacks, queen_attacks, rook_attacks};

/// A list of moves with a fixed maximum capacity.
///
/// No chess position has more than 218 legal moves, so the list lives on the
/// stack.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

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

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Keeps only the moves for which `f` returns true, preserving order.
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

/// Generates all legal moves for the side to move.
pub fn generate_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, &mut moves);
    retain_legal(position, &mut moves);
    moves
}

/// Generates legal captures and promotions only.
pub fn generate_captures(position: &Position) -> MoveList {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, &mut moves);
    moves.retain(|m| m.is_tactical());
    retain_legal(position, &mut moves);
    moves
}

/// Legal moves in search order. See [`order_moves`].
pub fn generate_ordered_moves(position: &Position, hint: Option<Move>) -> MoveList {
    let mut moves = generate_moves(position);
    order_moves(&mut moves, hint);
    moves
}

/// Sorts moves for search: the hint first (if present in the list), then
/// captures by most valuable victim and least valuable attacker, then
/// promotions by promoted piece, then quiet moves. Moves with equal priority
/// keep their generation order.
pub fn order_moves(moves: &mut MoveList, hint: Option<Move>) {
    let mut keys = [0i32; MoveList::MAX_MOVES];
    let slice = moves.as_mut_slice();
    for (key, m) in keys.iter_mut().zip(slice.iter()) {
        *key = ordering_key(*m, hint);
    }

    // Insertion sort keeps equal keys in place and allocates nothing.
    for i in 1..slice.len() {
        let (m, key) = (slice[i], keys[i]);
        let mut j = i;
        while j > 0 && keys[j - 1] < key {
            slice[j] = slice[j - 1];
            keys[j] = keys[j - 1];
            j -= 1;
        }
        slice[j] = m;
        keys[j] = key;
    }
}

/// Ordering values, indexed by `Piece::index`.
const ORDER_VALUE: [i32; 6] = [1, 3, 3, 5, 9, 20];

fn ordering_key(m: Move, hint: Option<Move>) -> i32 {
    if Some(m) == hint {
        return i32::MAX;
    }
    let promotion_bonus = m.promotion().map_or(0, |p| ORDER_VALUE[p.index()] * 10);
    match m.captured() {
        Some(victim) => {
            2_000 + ORDER_VALUE[victim.index()] * 100 - ORDER_VALUE[m.piece().index()]
                + promotion_bonus
        }
        None if promotion_bonus > 0 => 1_000 + promotion_bonus,
        None => 0,
    }
}

/// True if the side to move has at least one legal move. Stops at the first
/// one found, so it is cheaper than generating the full list.
pub fn has_legal_move(position: &Position) -> bool {
    let mut moves = MoveList::new();
    generate_pseudo_legal(position, &mut moves);
    let us = position.side_to_move;
    let mut scratch = position.clone();
    moves.as_slice().iter().any(|&m| {
        let undo = scratch.make_move(m);
        let legal = !scratch.is_in_check(us);
        scratch.unmake_move(m, undo);
        legal
    })
}

fn retain_legal(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let mut scratch = position.clone();
    moves.retain(|m| {
        let undo = scratch.make_move(*m);
        let legal = !scratch.is_in_check(us);
        scratch.unmake_move(*m, undo);
        legal
    });
}

/// Appends every pseudo-legal move: moves that follow piece movement rules
/// but may leave the mover's own king attacked.
pub fn generate_pseudo_legal(position: &Position, moves: &mut MoveList) {
    generate_pawn_moves(position, moves);
    for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
        generate_piece_moves(position, piece, moves);
    }
    generate_castling_moves(position, moves);
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, captured: Option<Piece>) {
    if to.rank_index() == 0 || to.rank_index() == 7 {
        for promoted in Piece::PROMOTIONS {
            if let Some(flag) = MoveFlag::promotion(promoted) {
                moves.push(Move::new(from, to, Piece::Pawn, captured, flag));
            }
        }
    } else {
        moves.push(Move::normal(from, to, Piece::Pawn, captured));
    }
}

fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let them = us.opposite();
    let theirs = position.pieces(them);
    let empty = !position.occupied();
    let pawns = position.pieces_of(Piece::Pawn, us);

    let (double_rank, step): (Bitboard, i8) = match us {
        Color::White => (Bitboard::rank(3), -1),
        Color::Black => (Bitboard::rank(4), 1),
    };
    let single = pawns.forward(us) & empty;
    let double = single.forward(us) & empty & double_rank;

    for to in single {
        if let Some(from) = to.shift_rank(step) {
            push_pawn_move(moves, from, to, None);
        }
    }
    for to in double {
        if let Some(from) = to.shift_rank(2 * step) {
            moves.push(Move::new(from, to, Piece::Pawn, None, MoveFlag::DoublePush));
        }
    }

    for from in pawns {
        for to in pawn_attacks(from, us) & theirs {
            let captured = position.piece_at(to).map(|(piece, _)| piece);
            push_pawn_move(moves, from, to, captured);
        }
    }

    if let Some(ep) = position.en_passant {
        for from in pawn_attacks(ep, them) & pawns {
            moves.push(Move::new(
                from,
                ep,
                Piece::Pawn,
                Some(Piece::Pawn),
                MoveFlag::EnPassant,
            ));
        }
    }
}

fn generate_piece_moves(position: &Position, piece: Piece, moves: &mut MoveList) {
    let us = position.side_to_move;
    let ours = position.pieces(us);
    let occupied = position.occupied();

    for from in position.pieces_of(piece, us) {
        let targets = match piece {
            Piece::Knight => knight_attacks(from),
            Piece::Bishop => bishop_attacks(from, occupied),
            Piece::Rook => rook_attacks(from, occupied),
            Piece::Queen => queen_attacks(from, occupied),
            Piece::King => king_attacks(from),
            Piece::Pawn => Bitboard::EMPTY,
        } & !ours;

        for to in targets {
            let captured = position.piece_at(to).map(|(victim, _)| victim);
            moves.push(Move::normal(from, to, piece, captured));
        }
    }
}

/// One castling option: the squares that must be empty, the squares the king
/// crosses or lands on (which must not be attacked), and the move itself.
struct CastlePath {
    flag: MoveFlag,
    rook_home: Square,
    empty: Bitboard,
    king_path: [Square; 2],
    king_to: Square,
}

fn castle_paths(us: Color) -> [CastlePath; 2] {
    let base = us.back_rank() * 8;
    let at = |file: u8| Square::from_index_masked(base + file);
    let squares = |files: &[u8]| {
        files
            .iter()
            .fold(Bitboard::EMPTY, |bb, &f| bb | Bitboard::from_square(at(f)))
    };
    [
        CastlePath {
            flag: MoveFlag::CastleKingside,
            rook_home: at(7),
            empty: squares(&[5, 6]),
            king_path: [at(5), at(6)],
            king_to: at(6),
        },
        CastlePath {
            flag: MoveFlag::CastleQueenside,
            rook_home: at(0),
            empty: squares(&[1, 2, 3]),
            king_path: [at(3), at(2)],
            king_to: at(2),
        },
    ]
}

fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let them = us.opposite();
    let king_home = Square::from_index_masked(us.back_rank() * 8 + 4);

    if position.piece_at(king_home) != Some((Piece::King, us)) || position.is_in_check(us) {
        return;
    }

    let occupied = position.occupied();
    let rooks = position.pieces_of(Piece::Rook, us);

    for path in castle_paths(us) {
        let allowed = match path.flag {
            MoveFlag::CastleKingside => position.castling.can_castle_kingside(us),
            _ => position.castling.can_castle_queenside(us),
        };
        if allowed
            && rooks.contains(path.rook_home)
            && (occupied & path.empty).is_empty()
            && !path
                .king_path
                .iter()
                .any(|&sq| position.is_square_attacked(sq, them))
        {
            moves.push(Move::new(king_home, path.king_to, Piece::King, None, path.flag));
        }
    }
}

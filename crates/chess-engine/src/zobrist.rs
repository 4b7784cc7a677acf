//! Zobrist fingerprints.
//!
//! A position's fingerprint is the XOR of one random key per component of
//! its state:
//! - each piece on each square (6 kinds × 2 colors × 64 squares)
//! - each castling right still held (4 keys)
//! - the en passant file, when an en passant square is set (8 keys)
//! - Black to move
//!
//! Because XOR is its own inverse, applying a move only touches the keys of
//! the components the move changes. [`update_fingerprint`] does exactly that
//! and must agree bit-for-bit with [`initial_fingerprint`] computed on the
//! resulting position.
//!
//! Different positions can share a fingerprint. The probability is about
//! 2^-64 per pair and is accepted rather than checked.

use chess_core::{Color, Move, MoveFlag, Piece, Square};

use crate::position::{castle_rook_squares, double_push_target, en_passant_victim};
use crate::{CastlingRights, Position};

/// The random keys.
pub struct ZobristKeys {
    /// `[color][piece][square]`
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// One key per castling-rights bit.
    castling: [u64; 4],
    /// One key per file.
    en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Generates the keys at compile time with xorshift64 from a fixed seed,
    /// so fingerprints are stable across runs and builds.
    const fn new() -> Self {
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[color][piece][square] = state;
                    square += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 4 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.pieces[color.index()][piece.index()][sq.index() as usize]
    }

    #[inline]
    pub fn side(&self) -> u64 {
        self.black_to_move
    }

    /// XOR of the keys for every right held.
    #[inline]
    pub fn castling(&self, rights: CastlingRights) -> u64 {
        let mut key = 0;
        for (bit, value) in self.castling.iter().enumerate() {
            if rights.raw() & (1 << bit) != 0 {
                key ^= value;
            }
        }
        key
    }

    /// Key for an en passant square, or 0 when none is set.
    #[inline]
    pub fn en_passant(&self, sq: Option<Square>) -> u64 {
        match sq {
            Some(sq) => self.en_passant[sq.file_index() as usize],
            None => 0,
        }
    }
}

/// Global key set, built at compile time.
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

/// The parts of a position that a move overwrites and that the incremental
/// update needs to know the old value of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorState {
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
}

impl PriorState {
    pub fn of(position: &Position) -> Self {
        PriorState {
            side_to_move: position.side_to_move,
            castling: position.castling,
            en_passant: position.en_passant,
        }
    }
}

/// Computes a fingerprint from scratch.
///
/// Used when a position is built from notation, and by tests to check the
/// incremental path.
pub fn initial_fingerprint(position: &Position) -> u64 {
    let mut key = 0u64;
    for color in Color::ALL {
        for piece in Piece::ALL {
            for sq in position.pieces_of(piece, color) {
                key ^= ZOBRIST.piece(color, piece, sq);
            }
        }
    }
    key ^= ZOBRIST.castling(position.castling);
    key ^= ZOBRIST.en_passant(position.en_passant);
    if position.side_to_move == Color::Black {
        key ^= ZOBRIST.side();
    }
    key
}

/// Derives the fingerprint after `m` from the fingerprint before it.
///
/// `prior` is the state of the position the move is played from. The new
/// castling rights and en passant square are derived from the move the same
/// way [`Position::make_move`] derives them.
pub fn update_fingerprint(old: u64, m: Move, prior: &PriorState) -> u64 {
    let us = prior.side_to_move;
    let them = us.opposite();
    let (from, to) = (m.from(), m.to());
    let mut key = old;

    key ^= ZOBRIST.piece(us, m.piece(), from);
    key ^= ZOBRIST.piece(us, m.promotion().unwrap_or(m.piece()), to);

    if let Some(captured) = m.captured() {
        let victim_sq = if m.flag() == MoveFlag::EnPassant {
            en_passant_victim(to, us)
        } else {
            to
        };
        key ^= ZOBRIST.piece(them, captured, victim_sq);
    }

    if let Some((rook_from, rook_to)) = castle_rook_squares(m.flag(), us) {
        key ^= ZOBRIST.piece(us, Piece::Rook, rook_from);
        key ^= ZOBRIST.piece(us, Piece::Rook, rook_to);
    }

    let castling = prior.castling.after_move(from, to);
    key ^= ZOBRIST.castling(prior.castling) ^ ZOBRIST.castling(castling);

    key ^= ZOBRIST.en_passant(prior.en_passant);
    if m.flag() == MoveFlag::DoublePush {
        key ^= ZOBRIST.en_passant(Some(double_push_target(from, to)));
    }

    key ^ ZOBRIST.side()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_moves;

    #[test]
    fn keys_are_distinct() {
        let a = ZOBRIST.piece(Color::White, Piece::Pawn, Square::A1);
        let b = ZOBRIST.piece(Color::White, Piece::Pawn, Square::B1);
        let c = ZOBRIST.piece(Color::Black, Piece::Pawn, Square::A1);
        let d = ZOBRIST.piece(Color::White, Piece::Knight, Square::A1);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(ZOBRIST.side(), 0);
    }

    #[test]
    fn castling_key_is_xor_of_bits() {
        let all = ZOBRIST.castling(CastlingRights::ALL);
        let split = ZOBRIST.castling(CastlingRights::new(0b0011))
            ^ ZOBRIST.castling(CastlingRights::new(0b1100));
        assert_eq!(all, split);
        assert_eq!(ZOBRIST.castling(CastlingRights::NONE), 0);
    }

    #[test]
    fn side_to_move_changes_fingerprint() {
        let white = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let black = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(white.hash ^ black.hash, ZOBRIST.side());
    }

    #[test]
    fn every_move_from_kiwipete_updates_consistently() {
        let position = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let prior = PriorState::of(&position);
        for m in &generate_moves(&position) {
            let next = position.simulate(*m);
            assert_eq!(
                update_fingerprint(position.hash, *m, &prior),
                initial_fingerprint(&next),
                "mismatch after {}",
                m
            );
        }
    }

    #[test]
    fn en_passant_capture_updates_consistently() {
        let position =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let ep = generate_moves(&position)
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.flag() == MoveFlag::EnPassant)
            .unwrap();
        let next = position.simulate(ep);
        assert_eq!(next.hash, initial_fingerprint(&next));
    }
}

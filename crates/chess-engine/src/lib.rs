//! Bitboard board representation, legal move generation and Zobrist hashing.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets
//! - [`Position`] - full game state with in-place make/unmake and a
//!   functional [`Position::simulate`]
//! - legal move generation and search ordering ([`generate_moves`],
//!   [`generate_ordered_moves`])
//! - [`zobrist`] fingerprints kept up to date incrementally
//! - [`perft`](movegen::perft) for validating all of the above
//!
//! # Example
//!
//! ```
//! use chess_engine::{generate_moves, Position};
//!
//! let mut position = Position::startpos();
//! let moves = generate_moves(&position);
//! assert_eq!(moves.len(), 20);
//!
//! let e4 = position.parse_uci_move("e2e4").unwrap();
//! let undo = position.make_move(e4);
//! assert_eq!(position.to_fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
//! position.unmake_move(e4, undo);
//! assert_eq!(position, Position::startpos());
//! ```

mod bitboard;
pub mod movegen;
mod position;
pub mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    bishop_attacks, generate_captures, generate_moves, generate_ordered_moves,
    generate_pseudo_legal, has_legal_move, king_attacks, knight_attacks, order_moves,
    pawn_attacks, queen_attacks, rook_attacks, MoveList,
};
pub use position::{CastlingRights, MoveParseError, Position, UndoState};

//! Move representation.

use crate::{Piece, Square};
use std::fmt;

/// Kind of move, distinguishing the special cases that need extra board work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    /// Plain move or capture.
    Normal = 0,
    /// Pawn double push from its starting rank.
    DoublePush = 1,
    /// Kingside castling (O-O).
    CastleKingside = 2,
    /// Queenside castling (O-O-O).
    CastleQueenside = 3,
    /// En passant capture.
    EnPassant = 4,
    /// Pawn promotion to knight.
    PromoteKnight = 5,
    /// Pawn promotion to bishop.
    PromoteBishop = 6,
    /// Pawn promotion to rook.
    PromoteRook = 7,
    /// Pawn promotion to queen.
    PromoteQueen = 8,
}

impl MoveFlag {
    const ALL: [MoveFlag; 9] = [
        MoveFlag::Normal,
        MoveFlag::DoublePush,
        MoveFlag::CastleKingside,
        MoveFlag::CastleQueenside,
        MoveFlag::EnPassant,
        MoveFlag::PromoteKnight,
        MoveFlag::PromoteBishop,
        MoveFlag::PromoteRook,
        MoveFlag::PromoteQueen,
    ];

    /// Promotion flag for the given target piece.
    #[inline]
    pub const fn promotion(piece: Piece) -> Option<Self> {
        match piece {
            Piece::Knight => Some(MoveFlag::PromoteKnight),
            Piece::Bishop => Some(MoveFlag::PromoteBishop),
            Piece::Rook => Some(MoveFlag::PromoteRook),
            Piece::Queen => Some(MoveFlag::PromoteQueen),
            _ => None,
        }
    }

    /// Returns the promotion piece if this is a promotion move.
    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self {
            MoveFlag::PromoteKnight => Some(Piece::Knight),
            MoveFlag::PromoteBishop => Some(Piece::Bishop),
            MoveFlag::PromoteRook => Some(Piece::Rook),
            MoveFlag::PromoteQueen => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns true if this is a promotion move.
    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion_piece().is_some()
    }

    /// Returns true if this is a castling move.
    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 6;
const FLAG_SHIFT: u32 = 12;
const PIECE_SHIFT: u32 = 16;
const CAPTURED_SHIFT: u32 = 19;
const NO_CAPTURE: u32 = 7;

/// An immutable move value.
///
/// Packed into 32 bits: origin (6), destination (6), flag (4), moved
/// piece (3) and captured piece (3, 7 meaning none). The captured piece of an
/// en passant move is the pawn removed beside the destination.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u32);

impl Move {
    /// Placeholder that is never a legal move.
    pub const NULL: Move = Move(u32::MAX);

    /// Packs a move. `captured` is the piece removed by the move, if any.
    #[inline]
    pub const fn new(
        from: Square,
        to: Square,
        piece: Piece,
        captured: Option<Piece>,
        flag: MoveFlag,
    ) -> Self {
        let captured = match captured {
            Some(p) => p as u32,
            None => NO_CAPTURE,
        };
        Move(
            ((from.index() as u32) << FROM_SHIFT)
                | ((to.index() as u32) << TO_SHIFT)
                | ((flag as u32) << FLAG_SHIFT)
                | ((piece as u32) << PIECE_SHIFT)
                | (captured << CAPTURED_SHIFT),
        )
    }

    /// A move with no special flag.
    #[inline]
    pub const fn normal(from: Square, to: Square, piece: Piece, captured: Option<Piece>) -> Self {
        Self::new(from, to, piece, captured, MoveFlag::Normal)
    }

    /// Returns the origin square.
    #[inline]
    pub const fn from(self) -> Square {
        Square::from_index_masked((self.0 >> FROM_SHIFT) as u8)
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index_masked((self.0 >> TO_SHIFT) as u8)
    }

    /// Returns the move flag.
    #[inline]
    pub const fn flag(self) -> MoveFlag {
        let raw = ((self.0 >> FLAG_SHIFT) & 0xF) as usize;
        if raw < MoveFlag::ALL.len() {
            MoveFlag::ALL[raw]
        } else {
            MoveFlag::Normal
        }
    }

    /// The piece standing on the origin square before the move.
    #[inline]
    pub const fn piece(self) -> Piece {
        match Piece::from_index(((self.0 >> PIECE_SHIFT) & 0x7) as u8) {
            Some(p) => p,
            None => Piece::Pawn,
        }
    }

    /// Returns the captured piece, if any.
    #[inline]
    pub const fn captured(self) -> Option<Piece> {
        Piece::from_index(((self.0 >> CAPTURED_SHIFT) & 0x7) as u8)
    }

    /// Returns the piece promoted to, if this is a promotion.
    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        self.flag().promotion_piece()
    }

    /// Returns true if the move removes an enemy piece.
    #[inline]
    pub const fn is_capture(self) -> bool {
        self.captured().is_some()
    }

    /// Captures and promotions.
    #[inline]
    pub const fn is_tactical(self) -> bool {
        self.is_capture() || self.flag().is_promotion()
    }

    /// Returns true for [`Move::NULL`].
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    /// Long algebraic notation used by engine protocols ("e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(p) => format!("{}{}{}", self.from(), self.to(), p.to_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::NULL
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

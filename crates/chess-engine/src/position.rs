//! Bit-level board state and its mutation primitives.

use std::fmt;

use chess_core::{Color, Fen, FenError, Move, MoveFlag, Piece, Square};

use crate::movegen::{
    bishop_attacks, generate_moves, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};
use crate::zobrist::{self, PriorState};
use crate::Bitboard;

/// Castling rights, one bit per side and wing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates castling rights from the low four flag bits.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    #[inline]
    const fn kingside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    #[inline]
    const fn queenside_flag(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    /// Returns true if the given side can castle kingside.
    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        self.0 & Self::kingside_flag(color) != 0
    }

    /// Returns true if the given side can castle queenside.
    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        self.0 & Self::queenside_flag(color) != 0
    }

    /// Removes the given side's kingside right.
    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        self.0 &= !Self::kingside_flag(color);
    }

    /// Removes the given side's queenside right.
    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        self.0 &= !Self::queenside_flag(color);
    }

    /// Rights left after a move between `from` and `to`.
    ///
    /// A king leaving its home square drops both of its rights; anything
    /// leaving or landing on a rook's home square drops that rook's right.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & !(revoked_by(from) | revoked_by(to)))
    }

    /// The same rights with White and Black exchanged.
    #[inline]
    pub const fn mirror(self) -> Self {
        CastlingRights(((self.0 & 0b0011) << 2) | ((self.0 & 0b1100) >> 2))
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

const fn revoked_by(sq: Square) -> u8 {
    match sq.index() {
        0 => CastlingRights::WHITE_QUEENSIDE,
        4 => CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        7 => CastlingRights::WHITE_KINGSIDE,
        56 => CastlingRights::BLACK_QUEENSIDE,
        60 => CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE,
        63 => CastlingRights::BLACK_KINGSIDE,
        _ => 0,
    }
}

/// Rook origin and destination for a castling move, `None` otherwise.
#[inline]
pub(crate) const fn castle_rook_squares(flag: MoveFlag, us: Color) -> Option<(Square, Square)> {
    match (flag, us) {
        (MoveFlag::CastleKingside, Color::White) => Some((Square::H1, Square::F1)),
        (MoveFlag::CastleQueenside, Color::White) => Some((Square::A1, Square::D1)),
        (MoveFlag::CastleKingside, Color::Black) => Some((Square::H8, Square::F8)),
        (MoveFlag::CastleQueenside, Color::Black) => Some((Square::A8, Square::D8)),
        _ => None,
    }
}

/// Square of the pawn removed by an en passant capture landing on `to`.
#[inline]
pub(crate) const fn en_passant_victim(to: Square, us: Color) -> Square {
    match us {
        Color::White => Square::from_index_masked(to.index().wrapping_sub(8)),
        Color::Black => Square::from_index_masked(to.index() + 8),
    }
}

/// En passant target square created by a double push.
#[inline]
pub(crate) const fn double_push_target(from: Square, to: Square) -> Square {
    Square::from_index_masked((from.index() + to.index()) / 2)
}

/// State that [`Position::make_move`] overwrites and
/// [`Position::unmake_move`] restores. The moved and captured pieces travel
/// in the [`Move`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub hash: u64,
}

/// A complete chess position.
///
/// Twelve occupancy masks, `boards[color][piece]`, are the source of truth;
/// `occupancy[color]` caches the union of a color's six masks. No square is
/// set in more than one of the twelve masks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    boards: [[Bitboard; 6]; 2],
    occupancy: [Bitboard; 2],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    /// Half-moves since the last capture or pawn move.
    pub halfmove_clock: u32,
    /// Starts at 1 and increments after each Black move.
    pub fullmove_number: u32,
    /// Zobrist fingerprint, maintained incrementally.
    pub hash: u64,
}

impl Position {
    /// A board with no pieces, White to move.
    pub fn empty() -> Self {
        Position {
            boards: [[Bitboard::EMPTY; 6]; 2],
            occupancy: [Bitboard::EMPTY; 2],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    /// The standard starting position.
    pub fn startpos() -> Self {
        let mut position = Position::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.into_iter().enumerate() {
            let file = file as u8;
            position.put_piece(Color::White, piece, Square::from_index_masked(file));
            position.put_piece(Color::White, Piece::Pawn, Square::from_index_masked(8 + file));
            position.put_piece(Color::Black, Piece::Pawn, Square::from_index_masked(48 + file));
            position.put_piece(Color::Black, piece, Square::from_index_masked(56 + file));
        }
        position.castling = CastlingRights::ALL;
        position.hash = zobrist::initial_fingerprint(&position);
        position
    }

    /// Builds and validates a position from FEN.
    ///
    /// Castling rights whose king or rook is not on its home square, and an
    /// en passant square with no double-pushed pawn in front of it, are
    /// dropped rather than rejected.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed = Fen::parse(fen)?;
        let mut position = Position::empty();

        for (rank_idx, rank_str) in parsed.piece_placement.split('/').enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as u8;
                } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                    let sq = Square::from_coords(file, rank).ok_or_else(|| {
                        FenError::InvalidPiecePlacement(format!("rank {} overflows", rank + 1))
                    })?;
                    position.put_piece(color, piece, sq);
                    file += 1;
                }
            }
        }

        position.side_to_move = parsed.active_color;
        let mut castling = 0u8;
        for c in parsed.castling.chars() {
            castling |= match c {
                'K' => CastlingRights::WHITE_KINGSIDE,
                'Q' => CastlingRights::WHITE_QUEENSIDE,
                'k' => CastlingRights::BLACK_KINGSIDE,
                'q' => CastlingRights::BLACK_QUEENSIDE,
                _ => 0,
            };
        }
        position.castling = CastlingRights::new(castling);
        position.en_passant = parsed.en_passant;
        position.halfmove_clock = parsed.halfmove_clock;
        position.fullmove_number = parsed.fullmove_number;

        position.validate()?;
        position.sanitize_castling();
        position.sanitize_en_passant();
        position.hash = zobrist::initial_fingerprint(&position);
        Ok(position)
    }

    fn validate(&self) -> Result<(), FenError> {
        for color in Color::ALL {
            let kings = self.pieces_of(Piece::King, color).count();
            if kings != 1 {
                return Err(FenError::InvalidPosition(format!(
                    "{} has {} kings",
                    color, kings
                )));
            }
        }
        let pawns = self.boards[0][Piece::Pawn.index()] | self.boards[1][Piece::Pawn.index()];
        if (pawns & Bitboard::BACK_RANKS).any() {
            return Err(FenError::InvalidPosition(
                "pawn on first or last rank".to_string(),
            ));
        }
        let waiting = self.side_to_move.opposite();
        if self.is_in_check(waiting) {
            return Err(FenError::InvalidPosition(format!(
                "{} is in check but not to move",
                waiting
            )));
        }
        Ok(())
    }

    fn sanitize_castling(&mut self) {
        for color in Color::ALL {
            let home = if color == Color::White { 0 } else { 56 };
            let king_home = Square::from_index_masked(home + 4);
            let rooks = self.pieces_of(Piece::Rook, color);
            if self.piece_at(king_home) != Some((Piece::King, color)) {
                self.castling.remove_kingside(color);
                self.castling.remove_queenside(color);
            }
            if !rooks.contains(Square::from_index_masked(home + 7)) {
                self.castling.remove_kingside(color);
            }
            if !rooks.contains(Square::from_index_masked(home)) {
                self.castling.remove_queenside(color);
            }
        }
    }

    fn sanitize_en_passant(&mut self) {
        let Some(ep) = self.en_passant else {
            return;
        };
        let mover = self.side_to_move;
        let expected_rank = if mover == Color::White { 5 } else { 2 };
        let pusher = en_passant_victim(ep, mover);
        let pushed = ep.rank_index() == expected_rank
            && self.piece_at(pusher) == Some((Piece::Pawn, mover.opposite()))
            && self.piece_at(ep).is_none();
        if !pushed {
            self.en_passant = None;
        }
    }

    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8u8).rev() {
            let mut empty_count = 0;
            for file in 0..8u8 {
                let sq = Square::from_index_masked(rank * 8 + file);
                match self.piece_at(sq) {
                    Some((piece, color)) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(self.side_to_move.to_fen_char());

        fen.push(' ');
        if self.castling.raw() == 0 {
            fen.push('-');
        } else {
            for (held, c) in [
                (self.castling.can_castle_kingside(Color::White), 'K'),
                (self.castling.can_castle_queenside(Color::White), 'Q'),
                (self.castling.can_castle_kingside(Color::Black), 'k'),
                (self.castling.can_castle_queenside(Color::Black), 'q'),
            ] {
                if held {
                    fen.push(c);
                }
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(
            " {} {}",
            self.halfmove_clock, self.fullmove_number
        ));
        fen
    }

    /// The piece and owner on `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        let color = self.color_at(sq)?;
        Piece::ALL
            .into_iter()
            .find(|piece| self.boards[color.index()][piece.index()].contains(sq))
            .map(|piece| (piece, color))
    }

    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        if self.occupancy[0].contains(sq) {
            Some(Color::White)
        } else if self.occupancy[1].contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }

    /// All squares holding a piece of `color`.
    #[inline]
    pub fn pieces(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.boards[color.index()][piece.index()]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(Piece::King, color).first()
    }

    #[inline]
    fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        debug_assert!(!self.occupied().contains(sq), "{} already occupied", sq);
        self.boards[color.index()][piece.index()].insert(sq);
        self.occupancy[color.index()].insert(sq);
    }

    #[inline]
    fn remove_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        debug_assert!(self.boards[color.index()][piece.index()].contains(sq));
        self.boards[color.index()][piece.index()].remove(sq);
        self.occupancy[color.index()].remove(sq);
    }

    /// Returns true if any piece of `by` attacks `sq`.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let occupied = self.occupied();
        let queens = self.pieces_of(Piece::Queen, by);

        (pawn_attacks(sq, by.opposite()) & self.pieces_of(Piece::Pawn, by)).any()
            || (knight_attacks(sq) & self.pieces_of(Piece::Knight, by)).any()
            || (king_attacks(sq) & self.pieces_of(Piece::King, by)).any()
            || (bishop_attacks(sq, occupied) & (self.pieces_of(Piece::Bishop, by) | queens))
                .any()
            || (rook_attacks(sq, occupied) & (self.pieces_of(Piece::Rook, by) | queens))
                .any()
    }

    /// Returns true if `color`'s king is attacked.
    pub fn is_in_check(&self, color: Color) -> bool {
        match self.king_square(color) {
            Some(king) => self.is_square_attacked(king, color.opposite()),
            None => false,
        }
    }

    /// Applies a move in place and returns what [`unmake_move`] needs to
    /// reverse it.
    ///
    /// The move must have been generated for this position: its moved and
    /// captured pieces are trusted.
    ///
    /// [`unmake_move`]: Position::unmake_move
    pub fn make_move(&mut self, m: Move) -> UndoState {
        let undo = UndoState {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        };

        let us = self.side_to_move;
        let them = us.opposite();
        let (from, to, piece) = (m.from(), m.to(), m.piece());

        self.hash = zobrist::update_fingerprint(self.hash, m, &PriorState::of(self));

        if let Some(captured) = m.captured() {
            let victim_sq = if m.flag() == MoveFlag::EnPassant {
                en_passant_victim(to, us)
            } else {
                to
            };
            self.remove_piece(them, captured, victim_sq);
        }

        self.remove_piece(us, piece, from);
        self.put_piece(us, m.promotion().unwrap_or(piece), to);

        if let Some((rook_from, rook_to)) = castle_rook_squares(m.flag(), us) {
            self.remove_piece(us, Piece::Rook, rook_from);
            self.put_piece(us, Piece::Rook, rook_to);
        }

        self.castling = self.castling.after_move(from, to);
        self.en_passant = if m.flag() == MoveFlag::DoublePush {
            Some(double_push_target(from, to))
        } else {
            None
        };

        if piece == Piece::Pawn || m.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;

        undo
    }

    /// Reverses [`make_move`](Position::make_move). Afterwards the position
    /// is identical to the one `m` was made from.
    pub fn unmake_move(&mut self, m: Move, undo: UndoState) {
        let them = self.side_to_move;
        let us = them.opposite();
        let (from, to, piece) = (m.from(), m.to(), m.piece());

        if let Some((rook_from, rook_to)) = castle_rook_squares(m.flag(), us) {
            self.remove_piece(us, Piece::Rook, rook_to);
            self.put_piece(us, Piece::Rook, rook_from);
        }

        self.remove_piece(us, m.promotion().unwrap_or(piece), to);
        self.put_piece(us, piece, from);

        if let Some(captured) = m.captured() {
            let victim_sq = if m.flag() == MoveFlag::EnPassant {
                en_passant_victim(to, us)
            } else {
                to
            };
            self.put_piece(them, captured, victim_sq);
        }

        self.side_to_move = us;
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.hash = undo.hash;
    }

    /// Returns the position after `m`, leaving `self` untouched.
    pub fn simulate(&self, m: Move) -> Position {
        let mut next = self.clone();
        next.make_move(m);
        next
    }

    /// The color-swapped counterpart: every piece changes owner and moves to
    /// the vertically mirrored square, and the other side is to move.
    pub fn mirror(&self) -> Position {
        let mut mirrored = Position::empty();
        for color in Color::ALL {
            let other = color.opposite().index();
            for piece in Piece::ALL {
                mirrored.boards[other][piece.index()] =
                    self.boards[color.index()][piece.index()].flip_vertical();
            }
            mirrored.occupancy[other] = self.occupancy[color.index()].flip_vertical();
        }
        mirrored.side_to_move = self.side_to_move.opposite();
        mirrored.castling = self.castling.mirror();
        mirrored.en_passant = self.en_passant.map(Square::flip_vertical);
        mirrored.halfmove_clock = self.halfmove_clock;
        mirrored.fullmove_number = self.fullmove_number;
        mirrored.hash = zobrist::initial_fingerprint(&mirrored);
        mirrored
    }

    /// Resolves long algebraic notation ("e2e4", "e7e8q") to the matching
    /// legal move.
    pub fn parse_uci_move(&self, text: &str) -> Result<Move, MoveParseError> {
        let malformed = || MoveParseError::Malformed(text.to_string());
        if !text.is_ascii() || text.len() < 4 || text.len() > 5 {
            return Err(malformed());
        }
        let from = Square::from_algebraic(&text[0..2]).ok_or_else(malformed)?;
        let to = Square::from_algebraic(&text[2..4]).ok_or_else(malformed)?;
        let promotion = match text[4..].chars().next() {
            Some(c) => match Piece::from_char(c.to_ascii_lowercase()) {
                Some(p) if Piece::PROMOTIONS.contains(&p) => Some(p),
                _ => return Err(malformed()),
            },
            None => None,
        };

        generate_moves(self)
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion() == promotion)
            .ok_or_else(|| MoveParseError::Illegal(text.to_string()))
    }
}

/// Errors from [`Position::parse_uci_move`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveParseError {
    #[error("malformed move: {0}")]
    Malformed(String),
    #[error("illegal move in this position: {0}")]
    Illegal(String),
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let sq = Square::from_index_masked(rank * 8 + file);
                let c = self
                    .piece_at(sq)
                    .map_or('.', |(piece, color)| piece.to_fen_char(color));
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_matches_fen() {
        let built = Position::startpos();
        let parsed = Position::from_fen(Fen::STARTPOS).unwrap();
        assert_eq!(built, parsed);
        assert_eq!(built.to_fen(), Fen::STARTPOS);
    }

    #[test]
    fn fen_roundtrip() {
        for fen in [
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w - - 0 1",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn rejects_impossible_boards() {
        assert!(matches!(
            Position::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPosition(_))
        ));
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1"),
            Err(FenError::InvalidPosition(_))
        ));
        assert!(matches!(
            Position::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::InvalidPosition(_))
        ));
        // Black king in check with White to move.
        assert!(matches!(
            Position::from_fen("4k3/4R3/8/8/8/8/8/4K3 w - - 0 1"),
            Err(FenError::InvalidPosition(_))
        ));
    }

    #[test]
    fn sanitizes_unusable_rights() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert!(pos.castling.can_castle_kingside(Color::White));
        assert!(!pos.castling.can_castle_queenside(Color::White));
        assert!(!pos.castling.can_castle_kingside(Color::Black));

        let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(pos.en_passant, None);
    }

    #[test]
    fn piece_queries() {
        let pos = Position::startpos();
        assert_eq!(pos.piece_at(Square::E1), Some((Piece::King, Color::White)));
        assert_eq!(pos.piece_at(Square::D8), Some((Piece::Queen, Color::Black)));
        assert_eq!(pos.piece_at(sq("e4")), None);
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.pieces_of(Piece::Pawn, Color::Black).count(), 8);
        assert_eq!(pos.king_square(Color::Black), Some(Square::E8));
    }

    #[test]
    fn twelve_masks_are_disjoint_and_cover_occupancy() {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let mut union = Bitboard::EMPTY;
        let mut total = 0;
        for color in Color::ALL {
            for piece in Piece::ALL {
                let bb = pos.pieces_of(piece, color);
                union |= bb;
                total += bb.count();
            }
        }
        assert_eq!(union, pos.occupied());
        assert_eq!(total, pos.occupied().count());
    }

    #[test]
    fn castling_rights_after_moves() {
        let rights = CastlingRights::ALL;
        let after_king = rights.after_move(Square::E1, Square::F1);
        assert!(!after_king.can_castle_kingside(Color::White));
        assert!(!after_king.can_castle_queenside(Color::White));
        assert!(after_king.can_castle_kingside(Color::Black));

        let rook_taken = rights.after_move(sq("b7"), Square::H8);
        assert!(!rook_taken.can_castle_kingside(Color::Black));
        assert!(rook_taken.can_castle_queenside(Color::Black));

        assert_eq!(CastlingRights::new(0b0001).mirror(), CastlingRights::new(0b0100));
    }

    #[test]
    fn make_and_unmake_castle() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10").unwrap();
        let before = pos.clone();
        let castle = pos.parse_uci_move("e1g1").unwrap();
        assert_eq!(castle.flag(), MoveFlag::CastleKingside);

        let undo = pos.make_move(castle);
        assert_eq!(pos.piece_at(Square::G1), Some((Piece::King, Color::White)));
        assert_eq!(pos.piece_at(Square::F1), Some((Piece::Rook, Color::White)));
        assert_eq!(pos.piece_at(Square::H1), None);
        assert!(!pos.castling.can_castle_kingside(Color::White));
        assert!(pos.castling.can_castle_queenside(Color::Black));
        assert_eq!(pos.halfmove_clock, 4);

        pos.unmake_move(castle, undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn make_and_unmake_en_passant() {
        let mut pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let before = pos.clone();
        let ep = pos.parse_uci_move("e5f6").unwrap();
        assert_eq!(ep.flag(), MoveFlag::EnPassant);
        assert_eq!(ep.captured(), Some(Piece::Pawn));

        let undo = pos.make_move(ep);
        assert_eq!(pos.piece_at(sq("f5")), None);
        assert_eq!(pos.piece_at(sq("f6")), Some((Piece::Pawn, Color::White)));
        assert_eq!(pos.en_passant, None);

        pos.unmake_move(ep, undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn make_and_unmake_promotion_capture() {
        let mut pos = Position::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 5 40").unwrap();
        let before = pos.clone();
        let promo = pos.parse_uci_move("a7b8n").unwrap();
        assert_eq!(promo.captured(), Some(Piece::Rook));

        let undo = pos.make_move(promo);
        assert_eq!(pos.piece_at(sq("b8")), Some((Piece::Knight, Color::White)));
        assert_eq!(pos.pieces_of(Piece::Pawn, Color::White).count(), 0);
        assert_eq!(pos.halfmove_clock, 0);

        pos.unmake_move(promo, undo);
        assert_eq!(pos, before);
    }

    #[test]
    fn double_push_sets_en_passant() {
        let pos = Position::startpos();
        let push = pos.parse_uci_move("e2e4").unwrap();
        let next = pos.simulate(push);
        assert_eq!(next.en_passant, Some(sq("e3")));
        assert_eq!(next.side_to_move, Color::Black);
        assert_eq!(next.hash, zobrist::initial_fingerprint(&next));
        // simulate leaves the original alone
        assert_eq!(pos, Position::startpos());
    }

    #[test]
    fn attack_queries() {
        let pos = Position::startpos();
        assert!(pos.is_square_attacked(sq("e3"), Color::White));
        assert!(!pos.is_square_attacked(sq("e4"), Color::White));
        assert!(!pos.is_in_check(Color::White));

        let checked = Position::from_fen("4k3/8/8/8/8/8/8/r3K3 w - - 0 1").unwrap();
        assert!(checked.is_in_check(Color::White));
        assert!(!checked.is_in_check(Color::Black));
    }

    #[test]
    fn mirror_swaps_everything() {
        let pos =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b Kq e3 0 1")
                .unwrap();
        let mirrored = pos.mirror();
        assert_eq!(
            mirrored.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/8/8/PPPPPPPP/RNBQKBNR w Qk e6 0 1"
        );
        assert_eq!(mirrored.mirror(), pos);
    }

    #[test]
    fn uci_parse_errors() {
        let pos = Position::startpos();
        assert!(matches!(
            pos.parse_uci_move("e2"),
            Err(MoveParseError::Malformed(_))
        ));
        assert!(matches!(
            pos.parse_uci_move("e7e8x"),
            Err(MoveParseError::Malformed(_))
        ));
        assert!(matches!(
            pos.parse_uci_move("e2e5"),
            Err(MoveParseError::Illegal(_))
        ));
    }
}

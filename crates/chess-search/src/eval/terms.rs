//! Positional terms layered on top of material and piece-square scoring.
//!
//! Every term scores one color at a time with rules that only depend on
//! ranks relative to that color, so swapping the colors of a position swaps
//! the two per-color scores exactly.

use chess_core::{Color, Piece, Square};
use chess_engine::{
    bishop_attacks, knight_attacks, queen_attacks, rook_attacks, Bitboard, Position,
};

use serde::{Deserialize, Serialize};

use super::EvalTerm;

/// Rank counted from `color`'s own back rank.
#[inline]
fn relative_rank(sq: Square, color: Color) -> u8 {
    match color {
        Color::White => sq.rank_index(),
        Color::Black => 7 - sq.rank_index(),
    }
}

/// Files adjacent to `file`, not including it.
#[inline]
fn adjacent_files(file: u8) -> Bitboard {
    let mut files = Bitboard::EMPTY;
    if file > 0 {
        files |= Bitboard::file(file - 1);
    }
    if file < 7 {
        files |= Bitboard::file(file + 1);
    }
    files
}

/// Squares strictly in front of `sq` from `color`'s point of view, on any
/// file.
#[inline]
fn ranks_ahead(sq: Square, color: Color) -> Bitboard {
    let rank = sq.rank_index();
    match color {
        Color::White if rank < 7 => Bitboard(!0u64 << (8 * (rank + 1))),
        Color::Black if rank > 0 => Bitboard(!0u64 >> (8 * (8 - rank))),
        _ => Bitboard::EMPTY,
    }
}

/// Weights of the positional terms in [`Evaluator::standard`](super::Evaluator::standard),
/// read from the `[eval.terms]` table of the engine config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermWeights {
    pub pawn_structure: PawnStructure,
    pub mobility: Mobility,
    pub king_safety: KingSafety,
}

/// Doubled, isolated and passed pawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PawnStructure {
    pub doubled_penalty: i32,
    pub isolated_penalty: i32,
    /// Bonus for a passed pawn, by relative rank.
    pub passed_bonus: [i32; 8],
}

impl Default for PawnStructure {
    fn default() -> Self {
        PawnStructure {
            doubled_penalty: 15,
            isolated_penalty: 12,
            passed_bonus: [0, 5, 10, 20, 35, 60, 100, 0],
        }
    }
}

impl EvalTerm for PawnStructure {
    fn name(&self) -> &'static str {
        "pawn structure"
    }

    fn evaluate(&self, position: &Position, color: Color) -> i32 {
        let ours = position.pieces_of(Piece::Pawn, color);
        let theirs = position.pieces_of(Piece::Pawn, color.opposite());
        let mut score = 0;

        for file in 0..8 {
            let on_file = (ours & Bitboard::file(file)).count() as i32;
            if on_file > 1 {
                score -= self.doubled_penalty * (on_file - 1);
            }
            if on_file > 0 && (ours & adjacent_files(file)).is_empty() {
                score -= self.isolated_penalty * on_file;
            }
        }

        for sq in ours {
            let file = sq.file_index();
            let front_span = ranks_ahead(sq, color) & (Bitboard::file(file) | adjacent_files(file));
            if (theirs & front_span).is_empty() {
                score += self.passed_bonus[relative_rank(sq, color) as usize];
            }
        }

        score
    }
}

/// Reachable squares for minor and major pieces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mobility {
    /// Per-square weight for knight, bishop, rook and queen.
    pub weights: [i32; 4],
}

impl Default for Mobility {
    fn default() -> Self {
        Mobility {
            weights: [4, 4, 2, 1],
        }
    }
}

impl EvalTerm for Mobility {
    fn name(&self) -> &'static str {
        "mobility"
    }

    fn evaluate(&self, position: &Position, color: Color) -> i32 {
        let occupied = position.occupied();
        let available = !position.pieces(color);
        let pieces = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

        pieces
            .iter()
            .zip(self.weights)
            .map(|(&piece, weight)| {
                position
                    .pieces_of(piece, color)
                    .into_iter()
                    .map(|sq| {
                        let reach = match piece {
                            Piece::Knight => knight_attacks(sq),
                            Piece::Bishop => bishop_attacks(sq, occupied),
                            Piece::Rook => rook_attacks(sq, occupied),
                            _ => queen_attacks(sq, occupied),
                        };
                        (reach & available).count() as i32 * weight
                    })
                    .sum::<i32>()
            })
            .sum()
    }
}

/// Pawns sheltering a king that is still near its back rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KingSafety {
    /// Bonus per pawn on the three squares directly in front of the king.
    pub shield_near: i32,
    /// Bonus per pawn one rank further up on the same three files.
    pub shield_far: i32,
}

impl Default for KingSafety {
    fn default() -> Self {
        KingSafety {
            shield_near: 12,
            shield_far: 6,
        }
    }
}

impl EvalTerm for KingSafety {
    fn name(&self) -> &'static str {
        "king safety"
    }

    fn evaluate(&self, position: &Position, color: Color) -> i32 {
        let Some(king) = position.king_square(color) else {
            return 0;
        };
        if relative_rank(king, color) > 1 {
            return 0;
        }

        let files = Bitboard::file(king.file_index()) | adjacent_files(king.file_index());
        let pawns = position.pieces_of(Piece::Pawn, color) & files;
        let step: i8 = match color {
            Color::White => 1,
            Color::Black => -1,
        };
        let rank_of = |delta: i8| {
            king.shift_rank(step * delta)
                .map_or(Bitboard::EMPTY, |sq| Bitboard::rank(sq.rank_index()))
        };

        (pawns & rank_of(1)).count() as i32 * self.shield_near
            + (pawns & rank_of(2)).count() as i32 * self.shield_far
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score<T: EvalTerm>(term: &T, fen: &str, color: Color) -> i32 {
        term.evaluate(&Position::from_fen(fen).unwrap(), color)
    }

    #[test]
    fn ranks_ahead_by_color() {
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(ranks_ahead(e4, Color::White).count(), 32);
        assert_eq!(ranks_ahead(e4, Color::Black).count(), 24);
        assert!(ranks_ahead(Square::H8, Color::White).is_empty());
        assert!(ranks_ahead(Square::A1, Color::Black).is_empty());
    }

    #[test]
    fn startpos_pawns_are_neutral() {
        let term = PawnStructure::default();
        assert_eq!(score(&term, chess_core::Fen::STARTPOS, Color::White), 0);
        assert_eq!(score(&term, chess_core::Fen::STARTPOS, Color::Black), 0);
    }

    #[test]
    fn doubled_isolated_and_passed() {
        let term = PawnStructure::default();
        // Two isolated a-pawns for White, nothing for Black.
        let fen = "4k3/8/8/8/P7/P7/8/4K3 w - - 0 1";
        let expected = -term.doubled_penalty - 2 * term.isolated_penalty
            + term.passed_bonus[3]
            + term.passed_bonus[2];
        assert_eq!(score(&term, fen, Color::White), expected);

        // An enemy pawn on an adjacent file in front stops it being passed.
        let blocked = "4k3/1p6/8/8/P7/8/8/4K3 w - - 0 1";
        assert_eq!(
            score(&term, blocked, Color::White),
            -term.isolated_penalty
        );
    }

    #[test]
    fn mobility_counts_reachable_squares() {
        let term = Mobility::default();
        // Knight on d4 reaches 8 squares, none blocked.
        let fen = "4k3/8/8/8/3N4/8/8/4K3 w - - 0 1";
        assert_eq!(score(&term, fen, Color::White), 8 * term.weights[0]);
        assert_eq!(score(&term, fen, Color::Black), 0);
    }

    #[test]
    fn king_shield_counts_pawns_in_front() {
        let term = KingSafety::default();
        let sheltered = "6k1/5ppp/8/8/8/8/5PPP/6K1 w - - 0 1";
        assert_eq!(score(&term, sheltered, Color::White), 3 * term.shield_near);
        assert_eq!(score(&term, sheltered, Color::Black), 3 * term.shield_near);

        let wandering = "8/8/8/4k3/8/8/5PPP/6K1 w - - 0 1";
        assert_eq!(score(&term, wandering, Color::Black), 0);
    }
}

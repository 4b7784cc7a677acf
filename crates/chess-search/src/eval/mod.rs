//! Static evaluation.
//!
//! Scores are centipawns from White's point of view: positive favours White,
//! negative favours Black, regardless of who is to move.

mod tables;
mod terms;

use chess_core::{Color, Piece};
use chess_engine::Position;

pub use tables::{EvalConfig, PieceSquareTables, PieceValues, SquareTable};
pub use terms::{KingSafety, Mobility, PawnStructure, TermWeights};

/// An additional evaluation feature.
///
/// Implementations score a single color. The evaluator adds White's score and
/// subtracts Black's, so a term that applies the same rules to both colors
/// keeps the evaluation symmetric.
pub trait EvalTerm: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, position: &Position, color: Color) -> i32;
}

/// Material, piece-square tables and any number of [`EvalTerm`]s.
pub struct Evaluator {
    values: [i32; 6],
    tables: [[i32; 64]; 6],
    terms: Vec<Box<dyn EvalTerm>>,
}

impl Evaluator {
    /// Material and piece-square tables only.
    pub fn new(config: EvalConfig) -> Self {
        Evaluator {
            values: config.piece_values.to_array(),
            tables: config.piece_square.to_array(),
            terms: Vec::new(),
        }
    }

    /// `config` plus pawn structure, mobility and king safety, weighted by
    /// `config.terms`.
    pub fn standard(config: EvalConfig) -> Self {
        let TermWeights {
            pawn_structure,
            mobility,
            king_safety,
        } = config.terms.clone();
        Evaluator::new(config)
            .with_term(Box::new(pawn_structure))
            .with_term(Box::new(mobility))
            .with_term(Box::new(king_safety))
    }

    pub fn with_term(mut self, term: Box<dyn EvalTerm>) -> Self {
        self.terms.push(term);
        self
    }

    pub fn term_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.terms.iter().map(|term| term.name())
    }

    /// Material value of a piece kind.
    #[inline]
    pub fn piece_value(&self, piece: Piece) -> i32 {
        self.values[piece.index()]
    }

    pub fn evaluate(&self, position: &Position) -> i32 {
        let mut score = 0;
        for color in Color::ALL {
            score += color.sign() * self.side_score(position, color);
        }
        score
    }

    /// Everything one color contributes, before the sign is applied.
    fn side_score(&self, position: &Position, color: Color) -> i32 {
        let mut score = 0;
        for piece in Piece::ALL {
            let table = &self.tables[piece.index()];
            let value = self.values[piece.index()];
            for sq in position.pieces_of(piece, color) {
                let index = match color {
                    Color::White => sq.index() ^ 56,
                    Color::Black => sq.index(),
                };
                score += value + table[index as usize];
            }
        }
        for term in &self.terms {
            score += term.evaluate(position, color);
        }
        score
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::standard(EvalConfig::default())
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("values", &self.values)
            .field("terms", &self.term_names().collect::<Vec<_>>())
            .finish()
    }
}

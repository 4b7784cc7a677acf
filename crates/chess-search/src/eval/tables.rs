//! Evaluation parameters: piece values and piece-square tables.
//!
//! Tables are written the way a board is printed, rank 8 first, from White's
//! point of view. White looks up `square ^ 56`; Black looks up `square`
//! directly, which is the same table mirrored vertically.

use serde::{Deserialize, Serialize};

use super::terms::TermWeights;

/// Material values in centipawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceValues {
    pub pawn: i32,
    pub knight: i32,
    pub bishop: i32,
    pub rook: i32,
    pub queen: i32,
    pub king: i32,
}

impl Default for PieceValues {
    fn default() -> Self {
        PieceValues {
            pawn: 100,
            knight: 320,
            bishop: 330,
            rook: 500,
            queen: 900,
            king: 0,
        }
    }
}

impl PieceValues {
    /// Values indexed by `Piece::index`.
    pub fn to_array(self) -> [i32; 6] {
        [
            self.pawn,
            self.knight,
            self.bishop,
            self.rook,
            self.queen,
            self.king,
        ]
    }
}

/// A 64-entry table, rank 8 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct SquareTable(pub [i32; 64]);

impl TryFrom<Vec<i32>> for SquareTable {
    type Error = String;

    fn try_from(values: Vec<i32>) -> Result<Self, Self::Error> {
        let len = values.len();
        values
            .try_into()
            .map(SquareTable)
            .map_err(|_| format!("square table needs 64 entries, got {}", len))
    }
}

impl From<SquareTable> for Vec<i32> {
    fn from(table: SquareTable) -> Self {
        table.0.to_vec()
    }
}

/// One table per piece kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceSquareTables {
    pub pawn: SquareTable,
    pub knight: SquareTable,
    pub bishop: SquareTable,
    pub rook: SquareTable,
    pub queen: SquareTable,
    pub king: SquareTable,
}

impl PieceSquareTables {
    /// Tables indexed by `Piece::index`.
    pub fn to_array(&self) -> [[i32; 64]; 6] {
        [
            self.pawn.0,
            self.knight.0,
            self.bishop.0,
            self.rook.0,
            self.queen.0,
            self.king.0,
        ]
    }
}

impl Default for PieceSquareTables {
    fn default() -> Self {
        PieceSquareTables {
            pawn: SquareTable(PAWN),
            knight: SquareTable(KNIGHT),
            bishop: SquareTable(BISHOP),
            rook: SquareTable(ROOK),
            queen: SquareTable(QUEEN),
            king: SquareTable(KING),
        }
    }
}

/// Everything the evaluator is parameterised by. Built once and handed to
/// [`Evaluator::new`](super::Evaluator::new) by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub piece_values: PieceValues,
    pub piece_square: PieceSquareTables,
    pub terms: TermWeights,
}

#[rustfmt::skip]
const PAWN: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
    50,  50,  50,  50,  50,  50,  50,  50,
    10,  10,  20,  30,  30,  20,  10,  10,
     5,   5,  10,  25,  25,  10,   5,   5,
     0,   0,   0,  20,  20,   0,   0,   0,
     5,  -5, -10,   0,   0, -10,  -5,   5,
     5,  10,  10, -20, -20,  10,  10,   5,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     5,  10,  10,  10,  10,  10,  10,   5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
     0,   0,   0,   5,   5,   0,   0,   0,
];

#[rustfmt::skip]
const QUEEN: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING: [i32; 64] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_follow_piece_order() {
        assert_eq!(PieceValues::default().to_array(), [100, 320, 330, 500, 900, 0]);
    }

    #[test]
    fn pawn_table_rewards_advancement() {
        let tables = PieceSquareTables::default().to_array();
        // rank 7 row (second printed row) vs rank 2 row
        assert_eq!(tables[0][8], 50);
        assert_eq!(tables[0][48 + 3], -20);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: EvalConfig = toml::from_str(
            r#"
[piece_values]
queen = 950
"#,
        )
        .unwrap();
        assert_eq!(config.piece_values.queen, 950);
        assert_eq!(config.piece_values.rook, 500);
        assert_eq!(config.piece_square, PieceSquareTables::default());
        assert_eq!(config.terms, TermWeights::default());
    }

    #[test]
    fn term_weights_from_toml() {
        let config: EvalConfig = toml::from_str(
            r#"
[terms.pawn_structure]
doubled_penalty = 40

[terms.mobility]
weights = [8, 8, 4, 2]
"#,
        )
        .unwrap();
        assert_eq!(config.terms.pawn_structure.doubled_penalty, 40);
        assert_eq!(config.terms.pawn_structure.isolated_penalty, 12);
        assert_eq!(config.terms.mobility.weights, [8, 8, 4, 2]);
        assert_eq!(config.terms.king_safety, Default::default());
    }

    #[test]
    fn short_table_is_rejected() {
        let result: Result<EvalConfig, _> = toml::from_str(
            r#"
[piece_square]
pawn = [1, 2, 3]
"#,
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("64 entries"), "{}", err);
    }
}

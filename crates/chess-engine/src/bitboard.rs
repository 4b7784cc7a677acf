//! 64-bit square sets.
//!
//! Bit `n` is the square with index `n` (a1 = 0, b1 = 1, ..., h8 = 63).

use chess_core::{Color, Square};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A set of squares.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    /// Ranks 1 and 8.
    pub const BACK_RANKS: Bitboard = Bitboard(0xFF00_0000_0000_00FF);

    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(sq.bit())
    }

    /// Every square on `file` (0 = a).
    #[inline]
    pub const fn file(file: u8) -> Self {
        Bitboard(Self::FILE_A.0 << (file & 7))
    }

    /// Every square on `rank` (0 = rank 1).
    #[inline]
    pub const fn rank(rank: u8) -> Self {
        Bitboard(0xFF << (8 * (rank & 7)))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn any(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.0 & sq.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, sq: Square) {
        self.0 |= sq.bit();
    }

    #[inline]
    pub fn remove(&mut self, sq: Square) {
        self.0 &= !sq.bit();
    }

    /// The square with the lowest index.
    #[inline]
    pub const fn first(self) -> Option<Square> {
        match self.0 {
            0 => None,
            bits => Some(Square::from_index_masked(bits.trailing_zeros() as u8)),
        }
    }

    #[inline]
    pub fn pop_first(&mut self) -> Option<Square> {
        let sq = self.first()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    /// Rank 1 swapped with rank 8, rank 2 with rank 7, and so on.
    #[inline]
    pub const fn flip_vertical(self) -> Bitboard {
        Bitboard(self.0.swap_bytes())
    }

    /// Every square moved one rank towards the far side of `color`. Squares
    /// pushed off the board are dropped.
    #[inline]
    pub const fn forward(self, color: Color) -> Bitboard {
        match color {
            Color::White => Bitboard(self.0 << 8),
            Color::Black => Bitboard(self.0 >> 8),
        }
    }
}

macro_rules! bitwise_ops {
    ($($op:ident :: $method:ident, $assign:ident :: $assign_method:ident, $sym:tt;)*) => {$(
        impl $op for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn $method(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $sym rhs.0)
            }
        }

        impl $assign for Bitboard {
            #[inline]
            fn $assign_method(&mut self, rhs: Bitboard) {
                *self = *self $sym rhs;
            }
        }
    )*};
}

bitwise_ops! {
    BitAnd::bitand, BitAndAssign::bitand_assign, &;
    BitOr::bitor, BitOrAssign::bitor_assign, |;
    BitXor::bitxor, BitXorAssign::bitxor_assign, ^;
}

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    /// Board diagram, rank 8 at the top.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard({:#018x})", self.0)?;
        for rank in (0..8u8).rev() {
            let row: String = (0..8u8)
                .map(|file| {
                    if self.0 >> (rank * 8 + file) & 1 == 1 {
                        '1'
                    } else {
                        '.'
                    }
                })
                .collect();
            writeln!(f, "{} {}", rank + 1, row)?;
        }
        write!(f, "  abcdefgh")
    }
}

/// Squares of a [`Bitboard`] in index order.
pub struct Squares(Bitboard);

impl Iterator for Squares {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_first()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Squares {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Squares;

    #[inline]
    fn into_iter(self) -> Squares {
        Squares(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn insert_and_remove() {
        let mut bb = Bitboard::EMPTY;
        bb.insert(sq("e4"));
        bb.insert(sq("a1"));
        assert_eq!(bb.0, 1 | 1 << 28);
        assert!(bb.contains(sq("e4")));
        bb.remove(sq("e4"));
        assert!(!bb.contains(sq("e4")));
        assert_eq!(bb, Bitboard::from_square(Square::A1));
    }

    #[test]
    fn files_and_ranks() {
        assert_eq!(Bitboard::file(3).count(), 8);
        assert!(Bitboard::file(7).contains(Square::H8));
        assert_eq!(Bitboard::rank(0) | Bitboard::rank(7), Bitboard::BACK_RANKS);
        assert!((Bitboard::file(2) & Bitboard::rank(5)).contains(sq("c6")));
    }

    #[test]
    fn forward_drops_off_board_squares() {
        let bb = Bitboard::from_square(sq("e2")) | Bitboard::from_square(sq("h8"));
        assert_eq!(bb.forward(Color::White), Bitboard::from_square(sq("e3")));
        assert_eq!(
            Bitboard::from_square(Square::A1).forward(Color::Black),
            Bitboard::EMPTY
        );
    }

    #[test]
    fn vertical_flip() {
        assert_eq!(Bitboard::rank(1).flip_vertical(), Bitboard::rank(6));
        assert_eq!(
            Bitboard::from_square(sq("e4")).flip_vertical(),
            Bitboard::from_square(sq("e5"))
        );
    }

    #[test]
    fn squares_in_index_order() {
        let squares: Vec<Square> = Bitboard::FILE_A.into_iter().collect();
        assert_eq!(squares.len(), 8);
        assert_eq!(squares.first(), Some(&Square::A1));
        assert_eq!(squares.last(), Some(&Square::A8));

        let mut bb = Bitboard(0b1010);
        assert_eq!(bb.into_iter().len(), 2);
        assert_eq!(bb.pop_first().map(|s| s.index()), Some(1));
        assert_eq!(bb.pop_first().map(|s| s.index()), Some(3));
        assert_eq!(bb.pop_first(), None);
        assert!(!bb.any());
    }
}

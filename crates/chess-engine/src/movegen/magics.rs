//! Sliding piece attacks through magic bitboards.
//!
//! For each square, the squares that can block a slider (its ray squares
//! minus the board edge) form a mask. Multiplying the masked occupancy by a
//! per-square magic number and keeping the top bits yields a collision-free
//! index into a table of precomputed attack sets.
//!
//! The magics are found on first use by a seeded random search, which takes
//! a few milliseconds and always produces the same tables.

use std::sync::OnceLock;

use crate::Bitboard;
use chess_core::Square;

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Lookup data for one slider on one square.
struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    attacks: Box<[Bitboard]>,
}

impl MagicEntry {
    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        ((occupied & self.mask).0.wrapping_mul(self.magic) >> self.shift) as usize
    }

    #[inline]
    fn attacks(&self, occupied: Bitboard) -> Bitboard {
        self.attacks[self.index(occupied)]
    }
}

struct SliderTables {
    rook: Vec<MagicEntry>,
    bishop: Vec<MagicEntry>,
}

static SLIDER_TABLES: OnceLock<SliderTables> = OnceLock::new();

fn tables() -> &'static SliderTables {
    SLIDER_TABLES.get_or_init(|| {
        let mut rng = SparseRng(0x2545_F491_4F6C_DD1D);
        let rook = (0..64)
            .map(|sq| find_magic(Square::from_index_masked(sq), &ROOK_DIRECTIONS, &mut rng))
            .collect();
        let bishop = (0..64)
            .map(|sq| find_magic(Square::from_index_masked(sq), &BISHOP_DIRECTIONS, &mut rng))
            .collect();
        SliderTables { rook, bishop }
    })
}

#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().rook[sq.index() as usize].attacks(occupied)
}

#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().bishop[sq.index() as usize].attacks(occupied)
}

#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

/// xorshift64, AND-ed three times to produce magic candidates with few set
/// bits, which hash well.
struct SparseRng(u64);

impl SparseRng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        self.0.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn sparse(&mut self) -> u64 {
        self.next() & self.next() & self.next()
    }
}

fn find_magic(sq: Square, directions: &[(i8, i8)], rng: &mut SparseRng) -> MagicEntry {
    let mask = blocker_mask(sq, directions);
    let bits = mask.count();
    let shift = 64 - bits;

    let subsets: Vec<Bitboard> = subsets_of(mask).collect();
    let reference: Vec<Bitboard> = subsets
        .iter()
        .map(|&blockers| slow_attacks(sq, directions, blockers))
        .collect();

    let mut table = vec![Bitboard::EMPTY; 1 << bits];
    let mut filled = vec![0u32; 1 << bits];
    let mut attempt = 0u32;

    loop {
        let magic = rng.sparse();
        if (mask.0.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        attempt += 1;

        let collision = subsets.iter().zip(&reference).any(|(&blockers, &attacks)| {
            let index = (blockers.0.wrapping_mul(magic) >> shift) as usize;
            if filled[index] != attempt {
                filled[index] = attempt;
                table[index] = attacks;
                false
            } else {
                table[index] != attacks
            }
        });

        if !collision {
            return MagicEntry {
                mask,
                magic,
                shift,
                attacks: table.into_boxed_slice(),
            };
        }
    }
}

/// Every subset of `mask`, starting with the empty set.
fn subsets_of(mask: Bitboard) -> impl Iterator<Item = Bitboard> {
    let mut next = Some(0u64);
    std::iter::from_fn(move || {
        let current = next?;
        let following = current.wrapping_sub(mask.0) & mask.0;
        next = (following != 0).then_some(following);
        Some(Bitboard(current))
    })
}

/// Ray squares from `sq`, excluding the last square of each ray. An edge
/// square never changes how far a slider reaches.
fn blocker_mask(sq: Square, directions: &[(i8, i8)]) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for &(df, dr) in directions {
        let ray = ray_squares(sq, df, dr);
        for &target in ray.iter().take(ray.len().saturating_sub(1)) {
            mask.insert(target);
        }
    }
    mask
}

/// Attacks found by walking each ray until the first blocker.
fn slow_attacks(sq: Square, directions: &[(i8, i8)], blockers: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in directions {
        for target in ray_squares(sq, df, dr) {
            attacks.insert(target);
            if blockers.contains(target) {
                break;
            }
        }
    }
    attacks
}

fn ray_squares(sq: Square, df: i8, dr: i8) -> Vec<Square> {
    let mut squares = Vec::with_capacity(7);
    let (mut f, mut r) = (sq.file_index() as i8 + df, sq.rank_index() as i8 + dr);
    while (0..8).contains(&f) && (0..8).contains(&r) {
        squares.push(Square::from_index_masked((r * 8 + f) as u8));
        f += df;
        r += dr;
    }
    squares
}

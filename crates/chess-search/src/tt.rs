//! Transposition table.
//!
//! A fixed array of `2^n` slots indexed by the low bits of the Zobrist key.
//! Each slot holds at most one entry; the full key is stored and compared on
//! probe, and two positions sharing a full key are treated as the same
//! position.
//!
//! Mate scores depend on the distance from the root. They are stored relative
//! to the node instead, so an entry found at a different ply still reports the
//! right distance to mate.

use chess_core::Move;

use crate::search::{MATE, MAX_PLY};

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The score is the exact minimax value.
    Exact,
    /// The true value is at least the score (the node failed high).
    Lower,
    /// The true value is at most the score (the node failed low).
    Upper,
}

#[derive(Debug, Clone, Copy)]
struct TtEntry {
    key: u64,
    best_move: Move,
    score: i32,
    depth: u8,
    bound: Bound,
    generation: u8,
}

/// A usable probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtHit {
    pub score: i32,
    pub depth: u8,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

pub struct TranspositionTable {
    slots: Vec<Option<TtEntry>>,
    mask: usize,
    generation: u8,
    used: usize,
}

impl TranspositionTable {
    /// A table of at most `size_mb` megabytes, rounded down to a power of two
    /// number of slots.
    pub fn new(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let fit = bytes / std::mem::size_of::<Option<TtEntry>>();
        Self::with_slots(fit)
    }

    /// A table with `slots` rounded down to a power of two (at least one).
    pub fn with_slots(slots: usize) -> Self {
        let count = if slots.is_power_of_two() {
            slots
        } else {
            (slots.max(2).next_power_of_two()) / 2
        };
        TranspositionTable {
            slots: vec![None; count],
            mask: count - 1,
            generation: 0,
            used: 0,
        }
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        key as usize & self.mask
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Occupancy of the first thousand slots written during the current
    /// search, in permille.
    pub fn hashfull(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let filled = self.slots[..sample]
            .iter()
            .filter(|slot| matches!(slot, Some(entry) if entry.generation == self.generation))
            .count();
        (filled * 1000 / sample) as u32
    }

    /// Marks the start of a new search. Entries from earlier searches stay
    /// probe-able but become preferred victims for replacement.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.used = 0;
        self.generation = 0;
    }

    /// Looks up `key` for a search of `depth` plies with window
    /// `(alpha, beta)` at distance `ply` from the root.
    ///
    /// Returns a hit only when the entry is deep enough and its score settles
    /// the node: exact scores always do, lower bounds when they reach `beta`,
    /// upper bounds when they do not exceed `alpha`.
    pub fn probe(&self, key: u64, depth: u8, ply: u8, alpha: i32, beta: i32) -> Option<TtHit> {
        let entry = self.slots[self.index(key)].filter(|entry| entry.key == key)?;
        if entry.depth < depth {
            return None;
        }

        let score = score_from_tt(entry.score, ply);
        let usable = match entry.bound {
            Bound::Exact => true,
            Bound::Lower => score >= beta,
            Bound::Upper => score <= alpha,
        };
        usable.then_some(TtHit {
            score,
            depth: entry.depth,
            bound: entry.bound,
            best_move: (!entry.best_move.is_null()).then_some(entry.best_move),
        })
    }

    /// The stored best move for `key`, whatever its depth. Used to order moves.
    pub fn best_move(&self, key: u64) -> Option<Move> {
        self.slots[self.index(key)]
            .filter(|entry| entry.key == key && !entry.best_move.is_null())
            .map(|entry| entry.best_move)
    }

    /// Records a search result.
    ///
    /// The slot is overwritten when it is empty, already holds `key`, holds an
    /// entry from an earlier search, or holds an entry no deeper than `depth`.
    /// Otherwise the existing entry is kept.
    pub fn store(
        &mut self,
        key: u64,
        depth: u8,
        ply: u8,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
    ) {
        let index = self.index(key);
        let generation = self.generation;
        let slot = &mut self.slots[index];

        let previous_move = match slot {
            Some(old) if old.key == key => Some(old.best_move),
            _ => None,
        };
        let replace = match slot {
            None => true,
            Some(old) => old.key == key || old.generation != generation || depth >= old.depth,
        };
        if !replace {
            return;
        }
        if slot.is_none() {
            self.used += 1;
        }

        *slot = Some(TtEntry {
            key,
            best_move: best_move.or(previous_move).unwrap_or(Move::NULL),
            score: score_to_tt(score, ply),
            depth,
            bound,
            generation,
        });
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("capacity", &self.slots.len())
            .field("used", &self.used)
            .field("generation", &self.generation)
            .finish()
    }
}

const MATE_THRESHOLD: i32 = MATE - MAX_PLY as i32;

/// Root-relative score to node-relative.
#[inline]
pub fn score_to_tt(score: i32, ply: u8) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Node-relative score back to root-relative.
#[inline]
pub fn score_from_tt(score: i32, ply: u8) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

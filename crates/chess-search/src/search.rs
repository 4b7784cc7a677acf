//! Alpha-beta search with iterative deepening.
//!
//! Scores are always from White's point of view. White nodes maximize and
//! Black nodes minimize; each node reports its score together with the
//! [`Bound`] that score carries relative to the window it was searched with.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chess_core::{Color, Move};
use chess_engine::{
    generate_captures, generate_ordered_moves, has_legal_move, order_moves, Position,
};
use tracing::{debug, info};

use crate::config::{EngineConfig, SearchConfig};
use crate::eval::Evaluator;
use crate::tt::{Bound, TranspositionTable};

/// Score of a side that is checkmated at the root. A mate `n` plies from the
/// root scores `MATE - n`.
pub const MATE: i32 = 100_000;

/// Larger than any score a node can return.
pub const INFINITY: i32 = 1_000_000;

/// Hard limit on search path length.
pub const MAX_PLY: u8 = 128;

/// Score for the side to move being checkmated `ply` plies from the root.
#[inline]
pub fn mated_score(side: Color, ply: u8) -> i32 {
    -(MATE - ply as i32) * side.sign()
}

/// Score of a position with no legal moves: mated if in check, otherwise
/// stalemate.
fn terminal_score(position: &Position, ply: u8) -> i32 {
    let us = position.side_to_move;
    if position.is_in_check(us) {
        mated_score(us, ply)
    } else {
        0
    }
}

/// When to stop searching. Unset fields impose no limit; the configured
/// `max_depth` always applies.
#[derive(Debug, Clone, Default)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub movetime: Option<Duration>,
    pub nodes: Option<u64>,
    /// Raised by another thread to end the search early.
    pub stop: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> Self {
        SearchLimits {
            depth: Some(depth),
            ..Default::default()
        }
    }

    pub fn movetime(movetime: Duration) -> Self {
        SearchLimits {
            movetime: Some(movetime),
            ..Default::default()
        }
    }

    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only when the root has no legal moves.
    pub best_move: Option<Move>,
    pub score: i32,
    /// Depth of the last completed iteration; 0 if none completed.
    pub depth: u8,
    pub nodes: u64,
    pub bound: Bound,
    pub elapsed: Duration,
}

impl SearchResult {
    pub fn is_mate(&self) -> bool {
        self.score.abs() >= MATE - MAX_PLY as i32
    }

    /// Full moves until mate: positive when White delivers it, negative when
    /// Black does.
    pub fn mate_in(&self) -> Option<i32> {
        if !self.is_mate() {
            return None;
        }
        let moves = (MATE - self.score.abs() + 1) / 2;
        Some(if self.score > 0 { moves } else { -moves })
    }
}

#[derive(Debug, Clone, Copy)]
struct NodeResult {
    score: i32,
    best_move: Option<Move>,
    bound: Bound,
}

impl NodeResult {
    const ABORTED: NodeResult = NodeResult {
        score: 0,
        best_move: None,
        bound: Bound::Upper,
    };

    fn exact(score: i32) -> Self {
        NodeResult {
            score,
            best_move: None,
            bound: Bound::Exact,
        }
    }
}

/// Owns the evaluator and transposition table across searches.
pub struct SearchEngine {
    config: SearchConfig,
    evaluator: Evaluator,
    tt: TranspositionTable,
    history: Vec<u64>,
}

impl SearchEngine {
    /// An engine with the standard evaluator built from `config.eval`.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_evaluator(config.search, Evaluator::standard(config.eval))
    }

    pub fn with_evaluator(config: SearchConfig, evaluator: Evaluator) -> Self {
        SearchEngine {
            tt: TranspositionTable::new(config.tt_size_mb),
            config,
            evaluator,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Fingerprints of the positions played before the next search root,
    /// oldest first. Positions that recur inside the search score as draws.
    pub fn set_history(&mut self, hashes: &[u64]) {
        self.history.clear();
        self.history.extend_from_slice(hashes);
    }

    /// Forgets everything learned from earlier games.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.history.clear();
        debug!("transposition table cleared");
    }

    /// Iterative deepening from depth 1 until a limit is reached.
    ///
    /// The result comes from the deepest iteration that completed; an
    /// iteration cut short by the deadline, node limit or stop flag is thrown
    /// away.
    pub fn search(&mut self, position: &Position, limits: SearchLimits) -> SearchResult {
        let max_depth = limits
            .depth
            .unwrap_or(self.config.max_depth)
            .min(self.config.max_depth)
            .max(1);

        self.tt.new_search();
        let mut searcher = self.searcher(&limits);
        let mut root = position.clone();
        let mut completed: Option<SearchResult> = None;

        for depth in 1..=max_depth {
            if searcher.limit_reached() {
                break;
            }
            let node = searcher.minimax(&mut root, depth, 0, -INFINITY, INFINITY);
            if searcher.stopped {
                debug!(depth, nodes = searcher.nodes, "search aborted, iteration discarded");
                break;
            }

            let result = SearchResult {
                best_move: node.best_move,
                score: node.score,
                depth,
                nodes: searcher.nodes,
                bound: node.bound,
                elapsed: searcher.start.elapsed(),
            };
            let pv = node.best_move.map(Move::to_uci).unwrap_or_default();
            info!(
                depth,
                score = result.score,
                nodes = result.nodes,
                elapsed_ms = result.elapsed.as_millis() as u64,
                pv = %pv,
                "iteration complete"
            );

            let finished = node.best_move.is_none() || result.is_mate();
            completed = Some(result);
            if finished {
                break;
            }
        }

        let (nodes, elapsed) = (searcher.nodes, searcher.start.elapsed());
        match completed {
            Some(mut result) => {
                result.nodes = nodes;
                result.elapsed = elapsed;
                result
            }
            None => self.fallback(position, nodes, elapsed),
        }
    }

    /// A single alpha-beta pass to exactly `depth` plies, with no time or
    /// node limit.
    pub fn search_depth(&mut self, position: &Position, depth: u8) -> SearchResult {
        self.tt.new_search();
        let depth = depth.clamp(1, MAX_PLY - 1);
        let mut searcher = self.searcher(&SearchLimits::default());
        let mut root = position.clone();
        let node = searcher.minimax(&mut root, depth, 0, -INFINITY, INFINITY);

        SearchResult {
            best_move: node.best_move,
            score: node.score,
            depth,
            nodes: searcher.nodes,
            bound: node.bound,
            elapsed: searcher.start.elapsed(),
        }
    }

    fn searcher(&mut self, limits: &SearchLimits) -> Searcher<'_> {
        let start = Instant::now();
        Searcher {
            evaluator: &self.evaluator,
            tt: if self.config.use_tt {
                Some(&mut self.tt)
            } else {
                None
            },
            quiescence: self.config.quiescence,
            check_interval: self.config.check_interval.max(1),
            start,
            deadline: limits.movetime.map(|movetime| start + movetime),
            node_limit: limits.nodes,
            stop: limits.stop.clone(),
            nodes: 0,
            stopped: false,
            path: self.history.clone(),
        }
    }

    /// Result when not even depth 1 finished: the first move in search order
    /// and the static score.
    fn fallback(&self, position: &Position, nodes: u64, elapsed: Duration) -> SearchResult {
        let hint = self.tt.best_move(position.hash);
        let moves = generate_ordered_moves(position, hint);
        let score = if moves.is_empty() {
            terminal_score(position, 0)
        } else {
            self.evaluator.evaluate(position)
        };

        SearchResult {
            best_move: moves.as_slice().first().copied(),
            score,
            depth: 0,
            nodes,
            bound: Bound::Exact,
            elapsed,
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        SearchEngine::new(EngineConfig::default())
    }
}

/// State for one call to [`SearchEngine::search`].
struct Searcher<'a> {
    evaluator: &'a Evaluator,
    tt: Option<&'a mut TranspositionTable>,
    quiescence: bool,
    check_interval: u64,
    start: Instant,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    stop: Option<Arc<AtomicBool>>,
    nodes: u64,
    stopped: bool,
    /// Fingerprints of the game history followed by every ancestor of the
    /// current node.
    path: Vec<u64>,
}

impl Searcher<'_> {
    fn limit_reached(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.load(Ordering::Relaxed))
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
            || self.node_limit.is_some_and(|limit| self.nodes >= limit)
    }

    /// Counts a node and, every `check_interval` nodes, checks the limits.
    #[inline]
    fn enter_node(&mut self) -> bool {
        self.nodes += 1;
        if !self.stopped && self.nodes % self.check_interval == 0 {
            self.stopped = self.limit_reached();
        }
        self.stopped
    }

    /// True if `position` already occurred since the last irreversible move.
    fn is_repetition(&self, position: &Position) -> bool {
        self.path
            .iter()
            .rev()
            .take(position.halfmove_clock as usize)
            .skip(1)
            .step_by(2)
            .any(|&hash| hash == position.hash)
    }

    fn minimax(
        &mut self,
        position: &mut Position,
        depth: u8,
        ply: u8,
        mut alpha: i32,
        mut beta: i32,
    ) -> NodeResult {
        if self.enter_node() {
            return NodeResult::ABORTED;
        }

        let key = position.hash;
        if ply > 0 {
            if self.is_repetition(position) {
                return NodeResult::exact(0);
            }
            // A mate delivered by the hundredth reversible halfmove still counts.
            if position.halfmove_clock >= 100 {
                let score = if position.is_in_check(position.side_to_move)
                    && !has_legal_move(position)
                {
                    mated_score(position.side_to_move, ply)
                } else {
                    0
                };
                return NodeResult::exact(score);
            }
            let hit = self
                .tt
                .as_deref()
                .and_then(|tt| tt.probe(key, depth, ply, alpha, beta));
            if let Some(hit) = hit {
                return NodeResult {
                    score: hit.score,
                    best_move: hit.best_move,
                    bound: hit.bound,
                };
            }
        }

        if depth == 0 || ply >= MAX_PLY {
            let score = if self.quiescence {
                self.quiesce(position, ply, alpha, beta)
            } else if !has_legal_move(position) {
                terminal_score(position, ply)
            } else {
                self.evaluator.evaluate(position)
            };
            return NodeResult::exact(score);
        }

        let us = position.side_to_move;
        let hint = self.tt.as_deref().and_then(|tt| tt.best_move(key));
        let moves = generate_ordered_moves(position, hint);
        if moves.is_empty() {
            return NodeResult::exact(terminal_score(position, ply));
        }

        let maximizing = us == Color::White;
        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut best = NodeResult {
            score: if maximizing { -INFINITY } else { INFINITY },
            best_move: None,
            bound: Bound::Exact,
        };

        self.path.push(key);
        for &m in &moves {
            let undo = position.make_move(m);
            let child = self.minimax(position, depth - 1, ply + 1, alpha, beta);
            position.unmake_move(m, undo);
            if self.stopped {
                self.path.pop();
                return NodeResult::ABORTED;
            }

            if maximizing {
                if child.score > best.score {
                    best.score = child.score;
                    best.best_move = Some(m);
                }
                alpha = alpha.max(best.score);
            } else {
                if child.score < best.score {
                    best.score = child.score;
                    best.best_move = Some(m);
                }
                beta = beta.min(best.score);
            }
            if alpha >= beta {
                break;
            }
        }
        self.path.pop();

        best.bound = if best.score >= beta_orig {
            Bound::Lower
        } else if best.score <= alpha_orig {
            Bound::Upper
        } else {
            Bound::Exact
        };

        if let Some(tt) = self.tt.as_deref_mut() {
            tt.store(key, depth, ply, best.score, best.bound, best.best_move);
        }
        best
    }

    /// Resolves captures and promotions until the position is quiet. The
    /// side to move may always decline to capture, so the static score bounds
    /// the result from its side. Mate and stalemate are scored before that.
    fn quiesce(&mut self, position: &mut Position, ply: u8, mut alpha: i32, mut beta: i32) -> i32 {
        if !has_legal_move(position) {
            return terminal_score(position, ply);
        }
        let stand_pat = self.evaluator.evaluate(position);
        if ply >= MAX_PLY {
            return stand_pat;
        }

        let maximizing = position.side_to_move == Color::White;
        let mut best = stand_pat;
        if maximizing {
            if best >= beta {
                return best;
            }
            alpha = alpha.max(best);
        } else {
            if best <= alpha {
                return best;
            }
            beta = beta.min(best);
        }

        let mut captures = generate_captures(position);
        order_moves(&mut captures, None);
        for &m in &captures {
            if self.enter_node() {
                return 0;
            }
            let undo = position.make_move(m);
            let score = self.quiesce(position, ply + 1, alpha, beta);
            position.unmake_move(m, undo);
            if self.stopped {
                return 0;
            }

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_engine() -> SearchEngine {
        SearchEngine::new(EngineConfig {
            search: SearchConfig {
                tt_size_mb: 1,
                quiescence: false,
                ..SearchConfig::default()
            },
            ..EngineConfig::default()
        })
    }

    #[test]
    fn mated_scores_by_side() {
        assert_eq!(mated_score(Color::White, 3), -(MATE - 3));
        assert_eq!(mated_score(Color::Black, 3), MATE - 3);
    }

    #[test]
    fn mate_in_counts_full_moves() {
        let result = |score| SearchResult {
            best_move: None,
            score,
            depth: 1,
            nodes: 0,
            bound: Bound::Exact,
            elapsed: Duration::ZERO,
        };
        assert_eq!(result(MATE - 1).mate_in(), Some(1));
        assert_eq!(result(MATE - 3).mate_in(), Some(2));
        assert_eq!(result(-(MATE - 2)).mate_in(), Some(-1));
        assert_eq!(result(250).mate_in(), None);
    }

    #[test]
    fn repetition_within_reversible_moves() {
        let mut engine = quiet_engine();
        let mut position = Position::startpos();
        let mut hashes = Vec::new();
        for uci in ["g1f3", "g8f6", "f3g1"] {
            hashes.push(position.hash);
            let m = position.parse_uci_move(uci).unwrap();
            position.make_move(m);
        }
        engine.set_history(&hashes);

        let back = position.simulate(position.parse_uci_move("f6g8").unwrap());
        let forward = position.simulate(position.parse_uci_move("e7e5").unwrap());

        let mut searcher = engine.searcher(&SearchLimits::default());
        searcher.path.push(position.hash);
        assert!(searcher.is_repetition(&back));
        assert!(!searcher.is_repetition(&forward));
    }

    #[test]
    fn fifty_move_rule_draws_children() {
        let mut engine = quiet_engine();
        let fresh = Position::from_fen("7k/8/8/8/8/8/8/R6K w - - 0 80").unwrap();
        let stale = Position::from_fen("7k/8/8/8/8/8/8/R6K w - - 99 80").unwrap();

        assert!(engine.search_depth(&fresh, 2).score > 300);
        assert_eq!(engine.search_depth(&stale, 2).score, 0);
    }

    #[test]
    fn fifty_move_limit_does_not_hide_mate() {
        let mut engine = quiet_engine();
        let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 99 80").unwrap();
        for depth in [1, 2] {
            let result = engine.search_depth(&position, depth);
            assert_eq!(result.score, MATE - 1);
            assert_eq!(result.best_move.map(Move::to_uci).as_deref(), Some("a1a8"));
        }
    }

    #[test]
    fn horizon_nodes_resolve_mate_and_stalemate() {
        for quiescence in [false, true] {
            let mut engine = SearchEngine::new(EngineConfig {
                search: SearchConfig {
                    tt_size_mb: 1,
                    quiescence,
                    ..SearchConfig::default()
                },
                ..EngineConfig::default()
            });
            let mut searcher = engine.searcher(&SearchLimits::default());

            let mut mated = Position::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
            let node = searcher.minimax(&mut mated, 0, 1, -INFINITY, INFINITY);
            assert_eq!(node.score, MATE - 1, "quiescence {}", quiescence);

            let mut stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
            let node = searcher.minimax(&mut stalemate, 0, 1, -INFINITY, INFINITY);
            assert_eq!(node.score, 0, "quiescence {}", quiescence);
        }
    }

    #[test]
    fn stop_flag_before_start_returns_fallback() {
        let mut engine = quiet_engine();
        let stop = Arc::new(AtomicBool::new(true));
        let result = engine.search(
            &Position::startpos(),
            SearchLimits::default().with_stop(stop),
        );
        assert_eq!(result.depth, 0);
        let legal = chess_engine::generate_moves(&Position::startpos());
        assert!(result.best_move.is_some_and(|m| legal.contains(m)));
    }

    #[test]
    fn node_limit_ends_search() {
        let mut engine = SearchEngine::new(EngineConfig {
            search: SearchConfig {
                tt_size_mb: 1,
                check_interval: 64,
                ..SearchConfig::default()
            },
            ..EngineConfig::default()
        });
        let limits = SearchLimits {
            nodes: Some(2_000),
            ..Default::default()
        };
        let result = engine.search(&Position::startpos(), limits);
        assert!(result.depth >= 1);
        assert!(result.depth < 10);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn new_game_clears_table() {
        let mut engine = quiet_engine();
        engine.search_depth(&Position::startpos(), 2);
        assert!(!engine.tt().is_empty());
        engine.new_game();
        assert!(engine.tt().is_empty());
    }
}

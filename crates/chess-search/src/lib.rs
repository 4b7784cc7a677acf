//! Evaluation and alpha-beta search on top of `chess-engine`.
//!
//! - [`Evaluator`] - material, piece-square tables and pluggable [`EvalTerm`]s
//! - [`TranspositionTable`] - fixed-size cache of search results
//! - [`SearchEngine`] - iterative deepening with time, node and stop limits
//! - [`EngineConfig`] - TOML configuration for all of the above
//!
//! # Example
//!
//! ```
//! use chess_engine::Position;
//! use chess_search::{EngineConfig, SearchEngine, SearchLimits};
//!
//! let mut engine = SearchEngine::new(EngineConfig::default());
//! let position = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
//! let result = engine.search(&position, SearchLimits::depth(3));
//! assert_eq!(result.best_move.unwrap().to_uci(), "a1a8");
//! assert_eq!(result.mate_in(), Some(1));
//! ```

pub mod config;
pub mod eval;
pub mod search;
pub mod tt;

pub use config::{ConfigError, EngineConfig, SearchConfig};
pub use eval::{EvalConfig, EvalTerm, Evaluator};
pub use search::{mated_score, SearchEngine, SearchLimits, SearchResult, INFINITY, MATE, MAX_PLY};
pub use tt::{Bound, TranspositionTable, TtHit};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use chess_core::Fen;
use chess_engine::{perft, perft_divide, Position};
use chess_search::{EngineConfig, Evaluator, SearchEngine, SearchLimits};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-cli")]
#[command(about = "Perft, search and evaluation over FEN positions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(long, default_value = Fen::STARTPOS)]
        fen: String,
        #[arg(short, long, default_value = "4")]
        depth: u32,
    },
    /// Perft split by root move
    Divide {
        #[arg(long, default_value = Fen::STARTPOS)]
        fen: String,
        #[arg(short, long, default_value = "3")]
        depth: u32,
    },
    /// Find the best move
    Search {
        #[arg(long, default_value = Fen::STARTPOS)]
        fen: String,
        /// Moves in UCI notation played from the FEN before searching
        #[arg(long, num_args = 1..)]
        moves: Vec<String>,
        #[arg(short, long)]
        depth: Option<u8>,
        #[arg(long)]
        movetime_ms: Option<u64>,
        /// Engine configuration file (defaults to engine.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the static evaluation
    Eval {
        #[arg(long, default_value = Fen::STARTPOS)]
        fen: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Perft { fen, depth } => {
            let position = parse_position(&fen)?;
            let start = Instant::now();
            let nodes = perft(&position, depth);
            let elapsed = start.elapsed();
            println!("perft({}) = {}", depth, nodes);
            println!("{} ms, {} nps", elapsed.as_millis(), nps(nodes, elapsed));
        }
        Commands::Divide { fen, depth } => {
            let position = parse_position(&fen)?;
            let results = perft_divide(&position, depth);
            let total: u64 = results.iter().map(|(_, nodes)| nodes).sum();
            for (m, nodes) in &results {
                println!("{}: {}", m, nodes);
            }
            println!();
            println!("Moves: {}", results.len());
            println!("Nodes: {}", total);
        }
        Commands::Search {
            fen,
            moves,
            depth,
            movetime_ms,
            config,
        } => {
            let config = load_config(config)?;
            let mut position = parse_position(&fen)?;
            let mut history = Vec::with_capacity(moves.len());
            for text in &moves {
                let m = position
                    .parse_uci_move(text)
                    .with_context(|| format!("cannot play {} in {}", text, position.to_fen()))?;
                history.push(position.hash);
                position.make_move(m);
            }

            let mut engine = SearchEngine::new(config);
            engine.set_history(&history);
            let limits = SearchLimits {
                depth,
                movetime: movetime_ms.map(Duration::from_millis),
                ..Default::default()
            };
            let result = engine.search(&position, limits);

            match result.best_move {
                Some(m) => println!("bestmove {}", m),
                None => println!("bestmove (none)"),
            }
            match result.mate_in() {
                Some(moves) => println!("score mate {}", moves),
                None => println!("score cp {}", result.score),
            }
            println!(
                "depth {} nodes {} time {} ms hashfull {}",
                result.depth,
                result.nodes,
                result.elapsed.as_millis(),
                engine.tt().hashfull()
            );
        }
        Commands::Eval { fen, config } => {
            let config = load_config(config)?;
            let position = parse_position(&fen)?;
            let evaluator = Evaluator::standard(config.eval);
            println!("{}", position);
            println!("eval {} (positive favours White)", evaluator.evaluate(&position));
        }
    }
    Ok(())
}

fn parse_position(fen: &str) -> anyhow::Result<Position> {
    Position::from_fen(fen).with_context(|| format!("invalid FEN \"{}\"", fen))
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<EngineConfig> {
    let path = path.unwrap_or_else(EngineConfig::default_path);
    let config = EngineConfig::load(&path)
        .with_context(|| format!("failed to load engine config from {}", path.display()))?;
    tracing::debug!(path = %path.display(), "engine config loaded");
    Ok(config)
}

fn nps(nodes: u64, elapsed: Duration) -> u64 {
    let micros = elapsed.as_micros().max(1) as u64;
    nodes.saturating_mul(1_000_000) / micros
}

//! Threes-TD: self-play training for a Threes-style tile game.
//!
//! ## Usage
//!
//! - `threes-td train --total 10000 --play "alpha=0.1 save=weights.bin"` - Train
//! - `threes-td train --player greedy` - Measure a baseline player
//! - `threes-td train --player deep-greedy --play seed=1` - Baseline with lookahead
//! - `threes-td demo` - Play one game and show the final board

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::info;

use threes_td::agent::{Agent, TdlAgent};
use threes_td::board::tile_value;
use threes_td::constants::{DEFAULT_BLOCK, DEFAULT_TOTAL};
use threes_td::episode::play_episode;
use threes_td::lookup::init_tables;
use threes_td::players::{DeepGreedyPlayer, GreedyPlayer, RandomEnv, RandomPlayer};
use threes_td::statistics::Statistics;

/// Threes-TD: n-tuple network TD learning for Threes
#[derive(Parser)]
#[command(name = "threes-td")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play many episodes and log statistics; the TD player learns as it plays
    Train(TrainArgs),
    /// Play a single game with the greedy player
    Demo {
        /// Seed for the environment
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Args)]
struct TrainArgs {
    /// Number of episodes to play
    #[arg(long, default_value_t = DEFAULT_TOTAL)]
    total: usize,

    /// Episodes per statistics block
    #[arg(long, default_value_t = DEFAULT_BLOCK)]
    block: usize,

    /// Which player to run
    #[arg(long, value_enum, default_value_t = PlayerKind::Tdl)]
    player: PlayerKind,

    /// Player options, e.g. "alpha=0.1 load=w.bin save=w.bin"
    #[arg(long, default_value = "")]
    play: String,

    /// Environment options, e.g. "seed=1"
    #[arg(long, default_value = "")]
    evil: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlayerKind {
    Tdl,
    Random,
    Greedy,
    DeepGreedy,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    init_tables();

    match cli.command {
        Some(Commands::Train(args)) => train(args),
        Some(Commands::Demo { seed }) => demo(seed),
        None => demo(None),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let mut env = RandomEnv::new(&args.evil)?;
    match args.player {
        PlayerKind::Tdl => {
            let mut player = TdlAgent::new(&args.play)?;
            run_episodes(&mut player, &mut env, args.total, args.block);
            player.save_weights();
        }
        PlayerKind::Random => {
            let mut player = RandomPlayer::new(&args.play)?;
            run_episodes(&mut player, &mut env, args.total, args.block);
        }
        PlayerKind::Greedy => {
            let mut player = GreedyPlayer::new(&args.play)?;
            run_episodes(&mut player, &mut env, args.total, args.block);
        }
        PlayerKind::DeepGreedy => {
            let mut player = DeepGreedyPlayer::new(&args.play)?;
            run_episodes(&mut player, &mut env, args.total, args.block);
        }
    }
    Ok(())
}

fn run_episodes(player: &mut dyn Agent, env: &mut RandomEnv, total: usize, block: usize) {
    info!(
        "{} ({}) vs {} ({}): {total} episodes",
        player.name(),
        player.role(),
        env.name(),
        env.role()
    );
    let mut stats = Statistics::new(block);
    for _ in 0..total {
        let result = play_episode(player, env);
        if let Some(summary) = stats.push(result) {
            info!("{summary}");
        }
    }
    if let Some(summary) = stats.flush() {
        info!("{summary}");
    }
}

fn demo(seed: Option<u64>) -> Result<()> {
    println!("Threes-TD: greedy player demo\n");

    let evil = seed.map(|s| format!("seed={s}")).unwrap_or_default();
    let mut env = RandomEnv::new(&evil)?;
    let mut player = GreedyPlayer::new("")?;

    let result = play_episode(&mut player, &mut env);
    println!("{}", result.board);
    println!("Score: {}", result.score);
    println!("Moves: {}", result.moves);
    println!("Max tile: {}", tile_value(result.max_tile));
    Ok(())
}

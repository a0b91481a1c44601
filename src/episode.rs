//! A single game between a player and the environment.

use std::time::{Duration, Instant};

use crate::action::Action;
use crate::agent::Agent;
use crate::board::{Board, Direction};
use crate::constants::{ILLEGAL, INIT_TILES};
use crate::players::RandomEnv;

/// Outcome of a finished episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeResult {
    /// Final board.
    pub board: Board,
    /// Sum of slide rewards.
    pub score: u64,
    /// Number of slides played.
    pub moves: usize,
    /// Highest tile code on the final board.
    pub max_tile: u8,
    pub elapsed: Duration,
}

/// Play one episode: the environment lays out the opening tiles, then player
/// and environment alternate until one of them has no legal action.
///
/// The player's `open_episode`/`close_episode` hooks bracket the game, so a
/// learning player updates itself before this returns.
pub fn play_episode(player: &mut dyn Agent, env: &mut RandomEnv) -> EpisodeResult {
    let start = Instant::now();
    player.open_episode();
    env.open_episode();

    let mut board = Board::new();
    for step in 0..INIT_TILES {
        env.init_action(step).apply(&mut board);
    }

    let mut score = 0u64;
    let mut moves = 0;
    let mut last: Option<Direction> = None;
    loop {
        let action = player.take_action(&board, last);
        let reward = action.apply(&mut board);
        if reward == ILLEGAL {
            break;
        }
        score += reward as u64;
        moves += 1;
        last = action.direction();

        let spawn: Action = env.take_action(&board, last);
        if spawn.apply(&mut board) == ILLEGAL {
            break;
        }
    }

    player.close_episode();
    env.close_episode();

    EpisodeResult {
        board,
        score,
        moves,
        max_tile: board.max_tile(),
        elapsed: start.elapsed(),
    }
}

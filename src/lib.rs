//! Threes-TD: a temporal-difference learner for Threes-style sliding tiles.
//!
//! This crate provides a bit-packed board engine and an n-tuple network value
//! function trained by TD(0) from self-play.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, rewards, and learning defaults
//! - [`lookup`] - Precomputed row transforms
//! - [`board`] - Packed board and slide resolution
//! - [`action`] - Player and environment actions
//! - [`pattern`] - N-tuple patterns with shared symmetric weights
//! - [`config`] - `key=value` agent configuration
//! - [`agent`] - Weight agent and TD learning agent
//! - [`players`] - Baseline players and the random environment
//! - [`episode`] - One game from opening to end
//! - [`statistics`] - Block summaries over many episodes
//!
//! ## Example
//!
//! ```
//! use threes_td::agent::TdlAgent;
//! use threes_td::config::AgentConfig;
//! use threes_td::episode::play_episode;
//! use threes_td::players::RandomEnv;
//!
//! // A small net keeps the example light; `TdlAgent::new` builds the full one.
//! let config = AgentConfig::parse_with("tdl", "player", "alpha=0.1").unwrap();
//! let net: [&[usize]; 2] = [&[0, 1, 2, 3], &[4, 5, 6, 7]];
//! let mut player = TdlAgent::with_tuples(config, &net);
//! let mut env = RandomEnv::new("seed=1").unwrap();
//!
//! let result = play_episode(&mut player, &mut env);
//! println!("score {} after {} moves", result.score, result.moves);
//! ```

pub mod action;
pub mod agent;
pub mod board;
pub mod config;
pub mod constants;
pub mod episode;
pub mod lookup;
pub mod pattern;
pub mod players;
pub mod statistics;

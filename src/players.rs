//! Baseline players and the tile-spawning environment.

use anyhow::Result;

use crate::action::Action;
use crate::agent::Agent;
use crate::board::{Board, Direction};
use crate::config::AgentConfig;
use crate::constants::{CELLS, ILLEGAL, Reward, SEARCH_DEPTH, SPAWN_EDGES, SPAWN_TILES};

fn make_rng(config: &AgentConfig) -> fastrand::Rng {
    config
        .seed
        .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed)
}

/// Shuffled bag of spawn tiles; every tile comes out once per refill.
#[derive(Clone, Debug)]
struct TileBag {
    tiles: [u8; SPAWN_TILES.len()],
    next: usize,
}

impl TileBag {
    fn new() -> Self {
        Self {
            tiles: SPAWN_TILES,
            next: SPAWN_TILES.len(),
        }
    }

    fn reset(&mut self) {
        self.next = self.tiles.len();
    }

    fn draw(&mut self, rng: &mut fastrand::Rng) -> u8 {
        if self.next == self.tiles.len() {
            rng.shuffle(&mut self.tiles);
            self.next = 0;
        }
        let tile = self.tiles[self.next];
        self.next += 1;
        tile
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Environment that fills the board at the start of an episode and then adds
/// one tile after every slide, on the edge the tiles slid away from.
pub struct RandomEnv {
    config: AgentConfig,
    rng: fastrand::Rng,
    init_space: [usize; CELLS],
    bag: TileBag,
}

impl RandomEnv {
    pub fn new(args: &str) -> Result<Self> {
        let config = AgentConfig::parse_with("random", "environment", args)?;
        Ok(Self {
            rng: make_rng(&config),
            config,
            init_space: std::array::from_fn(|i| i),
            bag: TileBag::new(),
        })
    }

    /// Placement number `step` of the initial board. Step 0 starts a fresh
    /// order of cells and a fresh bag.
    pub fn init_action(&mut self, step: usize) -> Action {
        if step == 0 {
            self.bag.reset();
            self.rng.shuffle(&mut self.init_space);
        }
        Action::Place {
            pos: self.init_space[step % CELLS],
            tile: self.bag.draw(&mut self.rng),
        }
    }
}

impl Agent for RandomEnv {
    fn take_action(&mut self, board: &Board, last: Option<Direction>) -> Action {
        let mut cells: Vec<usize> = match last {
            Some(dir) => SPAWN_EDGES[dir.opcode()].to_vec(),
            None => (0..CELLS).collect(),
        };
        self.rng.shuffle(&mut cells);
        match cells.into_iter().find(|&pos| board.get(pos) == 0) {
            Some(pos) => Action::Place {
                pos,
                tile: self.bag.draw(&mut self.rng),
            },
            None => Action::Null,
        }
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn role(&self) -> &str {
        &self.config.role
    }
}

/// Environment used inside lookahead rollouts. It spawns on the same edges as
/// [`RandomEnv`], but draws each tile uniformly from a bag that the caller
/// controls with [`SearchEnv::reset`] and [`SearchEnv::remove`].
pub struct SearchEnv {
    config: AgentConfig,
    rng: fastrand::Rng,
    bag: Vec<u8>,
}

impl SearchEnv {
    pub fn new(args: &str) -> Result<Self> {
        let config = AgentConfig::parse_with("search_env", "environment", args)?;
        Ok(Self {
            rng: make_rng(&config),
            config,
            bag: SPAWN_TILES.to_vec(),
        })
    }

    /// Tiles that may still be drawn.
    pub fn bag(&self) -> &[u8] {
        &self.bag
    }

    /// Refill the bag with every spawn tile.
    pub fn reset(&mut self) {
        self.bag = SPAWN_TILES.to_vec();
    }

    /// Take `tile` out of the bag. An empty bag is refilled first.
    pub fn remove(&mut self, tile: u8) {
        if self.bag.is_empty() {
            self.reset();
        }
        self.bag.retain(|&t| t != tile);
    }
}

impl Agent for SearchEnv {
    fn take_action(&mut self, board: &Board, last: Option<Direction>) -> Action {
        let mut cells: Vec<usize> = match last {
            Some(dir) => SPAWN_EDGES[dir.opcode()].to_vec(),
            None => (0..CELLS).collect(),
        };
        self.rng.shuffle(&mut cells);
        let Some(pos) = cells.into_iter().find(|&pos| board.get(pos) == 0) else {
            return Action::Null;
        };
        if self.bag.is_empty() {
            self.reset();
        }
        let tile = self.bag[self.rng.usize(..self.bag.len())];
        Action::Place { pos, tile }
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn role(&self) -> &str {
        &self.config.role
    }
}

// =============================================================================
// Baseline players
// =============================================================================

/// Plays a uniformly random legal slide.
pub struct RandomPlayer {
    config: AgentConfig,
    rng: fastrand::Rng,
}

impl RandomPlayer {
    pub fn new(args: &str) -> Result<Self> {
        let config = AgentConfig::parse_with("dummy", "player", args)?;
        Ok(Self {
            rng: make_rng(&config),
            config,
        })
    }
}

impl Agent for RandomPlayer {
    fn take_action(&mut self, board: &Board, _last: Option<Direction>) -> Action {
        let mut dirs = Direction::ALL;
        self.rng.shuffle(&mut dirs);
        dirs.into_iter()
            .find(|&dir| {
                let mut after = *board;
                after.slide(dir) != ILLEGAL
            })
            .map_or(Action::Null, Action::Slide)
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn role(&self) -> &str {
        &self.config.role
    }
}

/// Plays the slide with the highest immediate reward.
pub struct GreedyPlayer {
    config: AgentConfig,
}

impl GreedyPlayer {
    pub fn new(args: &str) -> Result<Self> {
        let config = AgentConfig::parse_with("greedy", "player", args)?;
        Ok(Self { config })
    }
}

impl Agent for GreedyPlayer {
    fn take_action(&mut self, board: &Board, _last: Option<Direction>) -> Action {
        let mut best: Option<(Direction, i32)> = None;
        for dir in Direction::ALL {
            let mut after = *board;
            let reward = after.slide(dir);
            if reward != ILLEGAL && best.is_none_or(|(_, r)| reward > r) {
                best = Some((dir, reward));
            }
        }
        best.map_or(Action::Null, |(dir, _)| Action::Slide(dir))
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn role(&self) -> &str {
        &self.config.role
    }
}

/// Greedy player with a short lookahead. Up, right and down are each scored
/// by their own reward plus the rewards of a rollout that alternates a
/// [`SearchEnv`] spawn and a greedy slide for up to [`SEARCH_DEPTH`] plies.
/// Left is never rolled out; when legal it scores 0.
pub struct DeepGreedyPlayer {
    config: AgentConfig,
    greedy: GreedyPlayer,
    env: SearchEnv,
}

impl DeepGreedyPlayer {
    pub fn new(args: &str) -> Result<Self> {
        let config = AgentConfig::parse_with("deep_greedy", "player", args)?;
        let env = SearchEnv {
            config: AgentConfig::parse_with("search_env", "environment", "")?,
            rng: make_rng(&config),
            bag: SPAWN_TILES.to_vec(),
        };
        Ok(Self {
            greedy: GreedyPlayer::new("")?,
            env,
            config,
        })
    }

    /// Score of sliding `board` in `dir`, or `None` if the slide is illegal.
    fn rollout(&mut self, board: &Board, dir: Direction) -> Option<Reward> {
        let mut cur = *board;
        let mut total = cur.slide(dir);
        if total == ILLEGAL {
            return None;
        }
        if dir == Direction::Left {
            return Some(0);
        }
        self.env.reset();
        let mut last = dir;
        for _ in 0..SEARCH_DEPTH {
            self.env.take_action(&cur, Some(last)).apply(&mut cur);
            let action = self.greedy.take_action(&cur, Some(last));
            let reward = action.apply(&mut cur);
            if reward == ILLEGAL {
                break;
            }
            total += reward;
            match action.direction() {
                Some(d) => last = d,
                None => break,
            }
        }
        Some(total)
    }
}

impl Agent for DeepGreedyPlayer {
    fn take_action(&mut self, board: &Board, _last: Option<Direction>) -> Action {
        let mut best: Option<(Direction, Reward)> = None;
        for dir in Direction::ALL {
            let Some(score) = self.rollout(board, dir) else {
                continue;
            };
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((dir, score));
            }
        }
        best.map_or(Action::Null, |(dir, _)| Action::Slide(dir))
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn role(&self) -> &str {
        &self.config.role
    }
}

//! Learning agents.
//!
//! - [`Agent`] is the narrow interface the episode loop drives.
//! - [`WeightAgent`] owns an n-tuple network and its weight file.
//! - [`TdlAgent`] plays greedily on reward + estimated after-state value and
//!   learns with TD(0) by replaying each finished episode backwards.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info, warn};

use crate::action::Action;
use crate::board::{Board, Direction};
use crate::config::AgentConfig;
use crate::constants::{ILLEGAL, TRAJECTORY_CAPACITY, TUPLES};
use crate::pattern::Pattern;

/// Anything that picks actions during an episode.
pub trait Agent {
    /// Called before the first action of an episode.
    fn open_episode(&mut self) {}

    /// Called after the last action of an episode.
    fn close_episode(&mut self) {}

    /// Choose an action for `board`. `last` is the previous slide, if any.
    fn take_action(&mut self, board: &Board, last: Option<Direction>) -> Action;

    fn name(&self) -> &str;

    fn role(&self) -> &str;
}

// =============================================================================
// Weight agent
// =============================================================================

/// An ensemble of patterns whose estimates add up to a state value.
pub struct WeightAgent {
    config: AgentConfig,
    net: Vec<Pattern>,
}

impl WeightAgent {
    /// Build a net with one pattern per tuple, then load weights if the
    /// configuration names a file.
    pub fn new(config: AgentConfig, tuples: &[&[usize]]) -> Self {
        let net = tuples.iter().map(|t| Pattern::new(t)).collect();
        let mut agent = Self { config, net };
        agent.load_weights();
        agent
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn net(&self) -> &[Pattern] {
        &self.net
    }

    pub fn alpha(&self) -> f32 {
        self.config.alpha
    }

    /// Total value of `b` over the whole net.
    pub fn estimate(&self, b: &Board) -> f32 {
        self.net.iter().map(|p| p.estimate(b)).sum()
    }

    /// Split `u` evenly over the net, apply it, and return the new value of
    /// `b`.
    pub fn update(&mut self, b: &Board, u: f32) -> f32 {
        let u_split = u / self.net.len() as f32;
        self.net.iter_mut().map(|p| p.update(b, u_split)).sum()
    }

    /// Load from the configured `load` path. A missing or malformed file
    /// leaves every weight at zero.
    pub fn load_weights(&mut self) {
        let Some(path) = self.config.load.clone() else {
            return;
        };
        if !path.exists() {
            info!("weight file {} not found, starting from zero", path.display());
            return;
        }
        match self.read_weights(&path) {
            Ok(()) => info!("loaded weights from {}", path.display()),
            Err(e) => {
                warn!("ignoring weight file {}: {e:#}", path.display());
                self.net.iter_mut().for_each(Pattern::clear);
            }
        }
    }

    /// Save to the configured `save` path. Nothing happens if no path is
    /// configured; write failures are logged and otherwise ignored.
    pub fn save_weights(&self) {
        let Some(path) = &self.config.save else {
            return;
        };
        match self.write_weights(path) {
            Ok(()) => info!("saved weights to {}", path.display()),
            Err(e) => warn!("could not save weights: {e:#}"),
        }
    }

    /// Read the whole net from `path`.
    pub fn read_weights(&mut self, path: &Path) -> Result<()> {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        self.read_from(&mut BufReader::new(file))
    }

    /// Write the whole net to `path`, replacing any existing file.
    pub fn write_weights(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        self.write_to(&mut w)?;
        w.flush()
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Read a `u32` pattern count followed by each pattern's table.
    pub fn read_from<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let count = r.read_u32::<LittleEndian>()? as usize;
        if count != self.net.len() {
            bail!("expected {} patterns, file has {}", self.net.len(), count);
        }
        for p in &mut self.net {
            p.read_from(r)?;
        }
        Ok(())
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.net.len() as u32)?;
        for p in &self.net {
            p.write_to(w)?;
        }
        Ok(())
    }
}

// =============================================================================
// TD learning agent
// =============================================================================

/// One ply of an episode as seen by the learner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub before: Board,
    pub after: Board,
    /// `None` marks the terminal record (no legal move).
    pub direction: Option<Direction>,
    pub reward: f32,
    /// `reward + estimate(after)` at selection time.
    pub value: f32,
}

impl Step {
    fn terminal(before: Board) -> Self {
        Self {
            before,
            after: before,
            direction: None,
            reward: 0.0,
            value: 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.direction.is_none()
    }
}

/// Player that learns an after-state value function by TD(0).
pub struct TdlAgent {
    weights: WeightAgent,
    path: Vec<Step>,
}

impl TdlAgent {
    /// Create an agent with the standard four 6-tuple net from `args`
    /// (`key=value` tokens, see [`AgentConfig`]).
    pub fn new(args: &str) -> Result<Self> {
        let config = AgentConfig::parse_with("tdl", "player", args)?;
        let tuples: Vec<&[usize]> = TUPLES.iter().map(|t| t.as_slice()).collect();
        Ok(Self::with_tuples(config, &tuples))
    }

    /// Create an agent with a custom net.
    pub fn with_tuples(config: AgentConfig, tuples: &[&[usize]]) -> Self {
        Self {
            weights: WeightAgent::new(config, tuples),
            path: Vec::with_capacity(TRAJECTORY_CAPACITY),
        }
    }

    pub fn weights(&self) -> &WeightAgent {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut WeightAgent {
        &mut self.weights
    }

    /// Steps recorded since the last update.
    pub fn trajectory(&self) -> &[Step] {
        &self.path
    }

    /// Best legal move for `before`, scored as reward + estimated value of the
    /// after-state. Ties go to the earliest direction in `Direction::ALL`.
    pub fn select(&self, before: &Board) -> Option<Step> {
        let mut best: Option<Step> = None;
        for dir in Direction::ALL {
            let mut after = *before;
            let reward = after.slide(dir);
            if reward == ILLEGAL {
                continue;
            }
            let reward = reward as f32;
            let value = reward + self.weights.estimate(&after);
            if best.is_none_or(|b| value > b.value) {
                best = Some(Step {
                    before: *before,
                    after,
                    direction: Some(dir),
                    reward,
                    value,
                });
            }
        }
        best
    }

    /// Replay the recorded episode backwards, moving each after-state value
    /// toward the reward of the next move plus the value of the next
    /// after-state. The terminal record is dropped first and the final
    /// after-state is bootstrapped from 0.
    pub fn update_episode(&mut self) {
        if self.path.last().is_some_and(Step::is_terminal) {
            self.path.pop();
        }
        let alpha = self.weights.alpha();
        let mut exact = 0.0;
        while let Some(step) = self.path.pop() {
            let error = exact - (step.value - step.reward);
            exact = step.reward + self.weights.update(&step.after, alpha * error);
        }
    }

    pub fn save_weights(&self) {
        self.weights.save_weights();
    }
}

impl Agent for TdlAgent {
    fn open_episode(&mut self) {
        self.path.clear();
    }

    fn close_episode(&mut self) {
        debug!("updating from {} recorded steps", self.path.len());
        self.update_episode();
    }

    fn take_action(&mut self, board: &Board, _last: Option<Direction>) -> Action {
        match self.select(board) {
            Some(step) => {
                self.path.push(step);
                step.direction.map_or(Action::Null, Action::Slide)
            }
            None => {
                self.path.push(Step::terminal(*board));
                Action::Null
            }
        }
    }

    fn name(&self) -> &str {
        &self.weights.config.name
    }

    fn role(&self) -> &str {
        &self.weights.config.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: [&[usize]; 2] = [&[0, 1, 2, 3], &[4, 5, 6, 7]];
    const TOP_ROW: [&[usize]; 1] = [&[0, 1, 2, 3]];

    fn small_agent(alpha: f32) -> TdlAgent {
        let config = AgentConfig {
            alpha,
            ..AgentConfig::default()
        };
        TdlAgent::with_tuples(config, &SMALL)
    }

    #[test]
    fn test_estimate_sums_patterns() {
        let mut agent = small_agent(0.1);
        let b = Board::from_cells([1, 2, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let w = agent.weights_mut();
        let v = w.update(&b, 2.0);
        let sum: f32 = w.net().iter().map(|p| p.estimate(&b)).sum();
        assert_eq!(v, sum);
        assert_eq!(w.estimate(&b), sum);
    }

    #[test]
    fn test_update_raises_estimate() {
        let mut agent = small_agent(0.1);
        let b = Board::from_cells([1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let before = agent.weights().estimate(&b);
        agent.weights_mut().update(&b, 0.5);
        assert!(agent.weights().estimate(&b) > before);
    }

    #[test]
    fn test_select_prefers_reward() {
        let agent = small_agent(0.1);
        let b = Board::from_cells([1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let step = agent.select(&b).unwrap();
        assert_eq!(step.direction, Some(Direction::Left));
        assert_eq!(step.reward, 3.0);
        assert_eq!(step.value, 3.0);
        assert_eq!(step.after.get(0), 3);
    }

    #[test]
    fn test_select_breaks_ties_in_order() {
        let agent = small_agent(0.1);
        let mut b = Board::new();
        b.set(5, 1);
        let step = agent.select(&b).unwrap();
        assert_eq!(step.direction, Some(Direction::Up));
    }

    #[test]
    fn test_no_legal_move_records_terminal() {
        let mut agent = small_agent(0.1);
        // alternating 1s and 3s block every slide
        let b = Board::from_cells([1, 3, 1, 3, 3, 1, 3, 1, 1, 3, 1, 3, 3, 1, 3, 1]);
        assert!(agent.select(&b).is_none());
        assert_eq!(agent.take_action(&b, None), Action::Null);
        assert!(agent.trajectory()[0].is_terminal());

        agent.close_episode();
        assert!(agent.trajectory().is_empty());
    }

    #[test]
    fn test_update_episode_backs_up_rewards() {
        let config = AgentConfig {
            alpha: 0.5,
            ..AgentConfig::default()
        };
        let mut agent = TdlAgent::with_tuples(config, &TOP_ROW);
        assert_eq!(agent.weights().net()[0].tuple(), &[0, 1, 2, 3]);
        assert_eq!(agent.weights().config().alpha, 0.5);

        // [0 1 2 0] -> right (r=0) -> [0 0 1 2] -> right (r=3) -> [0 0 0 3]
        let start = Board::from_cells([0, 1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        agent.open_episode();
        let mut b = start;
        for expected in [0, 3] {
            let action = agent.take_action(&b, None);
            assert_eq!(action, Action::Slide(Direction::Right));
            assert_eq!(action.apply(&mut b), expected);
        }
        let first = agent.trajectory()[0].after;
        let second = agent.trajectory()[1].after;
        assert_eq!(agent.trajectory()[1].value, 3.0);
        assert_eq!(second, b);
        agent.path.push(Step::terminal(b));
        agent.close_episode();
        assert!(agent.trajectory().is_empty());

        // The last move was valued exactly, so only the first after-state
        // moves: alpha * (3 - 0) = 1.5 on each of its 8 views. Four views of
        // [0 0 1 2] read an all-zero edge and share weights[0].
        let w = agent.weights().net()[0].weights();
        assert_eq!(w[0], 6.0);
        assert_eq!(w.iter().filter(|&&x| x != 0.0).count(), 5);
        assert_eq!(w.iter().filter(|&&x| x == 1.5).count(), 4);
        assert_eq!(agent.weights().estimate(&first), 4.0 * 6.0 + 4.0 * 1.5);
        assert_eq!(agent.weights().estimate(&second), 4.0 * 6.0);
    }
}

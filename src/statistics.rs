//! Block statistics over finished episodes.

use std::fmt;
use std::time::Duration;

use crate::board::tile_value;
use crate::episode::EpisodeResult;

/// Collects episode results and summarizes them every `block` episodes.
pub struct Statistics {
    block: usize,
    total: usize,
    current: Vec<EpisodeResult>,
}

impl Statistics {
    pub fn new(block: usize) -> Self {
        let block = block.max(1);
        Self {
            block,
            total: 0,
            current: Vec::with_capacity(block),
        }
    }

    /// Episodes recorded so far.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Record an episode. Returns the block summary when this episode
    /// completes a block.
    pub fn push(&mut self, result: EpisodeResult) -> Option<BlockSummary> {
        self.total += 1;
        self.current.push(result);
        if self.current.len() < self.block {
            return None;
        }
        let summary = BlockSummary::new(self.total, &self.current);
        self.current.clear();
        Some(summary)
    }

    /// Summary of a trailing partial block, if any.
    pub fn flush(&mut self) -> Option<BlockSummary> {
        if self.current.is_empty() {
            return None;
        }
        let summary = BlockSummary::new(self.total, &self.current);
        self.current.clear();
        Some(summary)
    }
}

/// Aggregate of one block of episodes.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSummary {
    /// Episodes played up to and including this block.
    pub total: usize,
    pub episodes: usize,
    pub mean_score: f64,
    pub max_score: u64,
    /// Slides per second over the block.
    pub ops: f64,
    /// Number of episodes ending with each max tile code, highest code last.
    pub tiles: Vec<(u8, usize)>,
}

impl BlockSummary {
    fn new(total: usize, results: &[EpisodeResult]) -> Self {
        let episodes = results.len();
        let sum: u64 = results.iter().map(|r| r.score).sum();
        let max_score = results.iter().map(|r| r.score).max().unwrap_or(0);
        let moves: usize = results.iter().map(|r| r.moves).sum();
        let elapsed: Duration = results.iter().map(|r| r.elapsed).sum();

        let mut counts = [0usize; 16];
        for r in results {
            counts[r.max_tile as usize] += 1;
        }
        let tiles = counts
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(code, &n)| (code as u8, n))
            .collect();

        let secs = elapsed.as_secs_f64();
        Self {
            total,
            episodes,
            mean_score: sum as f64 / episodes.max(1) as f64,
            max_score,
            ops: if secs > 0.0 { moves as f64 / secs } else { 0.0 },
            tiles,
        }
    }
}

impl fmt::Display for BlockSummary {
    /// Header line, then one line per max tile: the tile value, the share of
    /// episodes that reached at least that tile, and the share that ended on it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\tavg = {:.0}, max = {}, ops = {:.0}",
            self.total, self.mean_score, self.max_score, self.ops
        )?;
        let n = self.episodes.max(1) as f64;
        let mut reached = self.episodes;
        for &(code, count) in &self.tiles {
            write!(
                f,
                "\n\t{}\t{}%\t({}%)",
                tile_value(code),
                round(reached as f64 * 100.0 / n),
                round(count as f64 * 100.0 / n)
            )?;
            reached -= count;
        }
        Ok(())
    }
}

/// Percentages to at most one decimal.
fn round(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn result(score: u64, max_tile: u8) -> EpisodeResult {
        EpisodeResult {
            board: Board::new(),
            score,
            moves: 10,
            max_tile,
            elapsed: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_summary_every_block() {
        let mut stats = Statistics::new(2);
        assert!(stats.push(result(10, 4)).is_none());
        let s = stats.push(result(30, 5)).unwrap();
        assert_eq!(s.total, 2);
        assert_eq!(s.episodes, 2);
        assert_eq!(s.mean_score, 20.0);
        assert_eq!(s.max_score, 30);
        assert_eq!(s.tiles, vec![(4, 1), (5, 1)]);
        assert!(stats.flush().is_none());
    }

    #[test]
    fn test_flush_partial_block() {
        let mut stats = Statistics::new(10);
        stats.push(result(12, 4));
        let s = stats.flush().unwrap();
        assert_eq!(s.total, 1);
        assert_eq!(stats.total(), 1);
    }

    #[test]
    fn test_display() {
        let mut stats = Statistics::new(4);
        let summaries: Vec<BlockSummary> = [(6, 4), (12, 5), (12, 5), (30, 6)]
            .into_iter()
            .filter_map(|(score, tile)| stats.push(result(score, tile)))
            .collect();
        assert_eq!(summaries.len(), 1);
        let text = summaries[0].to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("4\tavg = 15, max = 30, ops = "));
        assert_eq!(lines[1], "\t6\t100%\t(25%)");
        assert_eq!(lines[2], "\t12\t75%\t(50%)");
        assert_eq!(lines[3], "\t24\t25%\t(25%)");
    }
}

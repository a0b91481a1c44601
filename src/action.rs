//! Actions exchanged between agents and the board.

use std::fmt;

use crate::board::{Board, Direction};
use crate::constants::{ILLEGAL, Reward};

/// A move by the player (slide) or the environment (place), or no move at all.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Slide every row or column in a direction.
    Slide(Direction),
    /// Put `tile` on the empty cell `pos`.
    Place { pos: usize, tile: u8 },
    /// No legal action exists; applying it ends the episode.
    Null,
}

impl Action {
    /// Apply the action to `board` and return the reward, or [`ILLEGAL`] if
    /// the board was not changed.
    pub fn apply(self, board: &mut Board) -> Reward {
        match self {
            Action::Slide(dir) => board.slide(dir),
            Action::Place { pos, tile } => board.place(pos, tile),
            Action::Null => ILLEGAL,
        }
    }

    /// Direction of a slide, if this is one.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Action::Slide(dir) => Some(dir),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Slide(dir) => write!(f, "#{dir}"),
            Action::Place { pos, tile } => write!(f, "{pos}@{tile}"),
            Action::Null => write!(f, "null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_then_slide() {
        let mut b = Board::new();
        assert_eq!(Action::Place { pos: 0, tile: 1 }.apply(&mut b), 0);
        assert_eq!(Action::Place { pos: 1, tile: 2 }.apply(&mut b), 0);
        assert_eq!(Action::Slide(Direction::Left).apply(&mut b), 3);
        assert_eq!(b.get(0), 3);
        assert_eq!(b.empty_count(), 15);
    }

    #[test]
    fn test_null_is_illegal() {
        let mut b = Board::new();
        assert_eq!(Action::Null.apply(&mut b), ILLEGAL);
        assert_eq!(b, Board::new());
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::Slide(Direction::Up).to_string(), "#up");
        assert_eq!(Action::Place { pos: 7, tile: 3 }.to_string(), "7@3");
        assert_eq!(Action::Null.to_string(), "null");
    }
}

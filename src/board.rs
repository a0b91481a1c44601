//! Bit-packed 4x4 board.
//!
//! The whole grid lives in one `u64`, four bits per cell. Sliding left is
//! resolved row by row through the [`RowTable`](crate::lookup::RowTable); the
//! other directions reflect or transpose the board, slide left, and undo the
//! transformation. All reflections are mask-and-shift permutations of the 16
//! nibbles.

use std::fmt;

use crate::constants::{CELLS, ILLEGAL, MAX_CODE, Reward, TILE_BITS};
use crate::lookup::row_table;

/// Slide direction, in opcode order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in enumeration order. Ties between moves are broken by
    /// this order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Opcode of the direction (up=0, right=1, down=2, left=3).
    #[inline]
    pub fn opcode(self) -> usize {
        self as usize
    }

    /// Direction for an opcode; only the two low bits are used.
    #[inline]
    pub fn from_opcode(op: usize) -> Self {
        Self::ALL[op & 0b11]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(s)
    }
}

/// Packed game state: 16 cells of 4-bit tile codes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board(u64);

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// Build a board from 16 codes in row-major order.
    pub fn from_cells(cells: [u8; CELLS]) -> Self {
        let mut b = Self::new();
        for (i, &c) in cells.iter().enumerate() {
            b.set(i, c);
        }
        b
    }

    /// Row `i` as a 16-bit value, column 0 in the low nibble.
    #[inline]
    pub fn row(self, i: usize) -> u16 {
        ((self.0 >> (i << 4)) & 0xffff) as u16
    }

    /// Tile code at cell `i`.
    #[inline]
    pub fn get(self, i: usize) -> u8 {
        debug_assert!(i < CELLS);
        ((self.0 >> (i as u32 * TILE_BITS)) & 0x0f) as u8
    }

    /// Overwrite cell `i` with `code` (masked to four bits).
    #[inline]
    pub fn set(&mut self, i: usize, code: u8) {
        debug_assert!(i < CELLS);
        let shift = i as u32 * TILE_BITS;
        self.0 = (self.0 & !(0x0fu64 << shift)) | (((code & MAX_CODE) as u64) << shift);
    }

    /// Put a new tile on an empty cell. The caller guarantees the cell is
    /// empty. Placing never earns a reward.
    pub fn place(&mut self, pos: usize, tile: u8) -> Reward {
        debug_assert!(pos < CELLS && (1..=3).contains(&tile));
        self.set(pos, tile);
        0
    }

    /// Highest tile code on the board.
    pub fn max_tile(self) -> u8 {
        (0..CELLS).map(|i| self.get(i)).max().unwrap_or(0)
    }

    /// Number of empty cells.
    pub fn empty_count(self) -> usize {
        (0..CELLS).filter(|&i| self.get(i) == 0).count()
    }

    /// Slide in `dir`. Returns the reward, or [`ILLEGAL`] if nothing moved (in
    /// which case the board is left as it was).
    pub fn slide(&mut self, dir: Direction) -> Reward {
        match dir {
            Direction::Up => self.slide_up(),
            Direction::Right => self.slide_right(),
            Direction::Down => self.slide_down(),
            Direction::Left => self.slide_left(),
        }
    }

    pub fn slide_left(&mut self) -> Reward {
        let table = row_table();
        let prev = self.0;
        let mut cur = 0u64;
        let mut reward = 0;
        for i in 0..4 {
            let t = table.find(self.row(i));
            cur |= (t.left as u64) << (i << 4);
            reward += t.reward;
        }
        self.0 = cur;
        if cur != prev { reward } else { ILLEGAL }
    }

    pub fn slide_right(&mut self) -> Reward {
        self.mirror();
        let reward = self.slide_left();
        self.mirror();
        reward
    }

    pub fn slide_up(&mut self) -> Reward {
        self.transpose();
        let reward = self.slide_left();
        self.transpose();
        reward
    }

    pub fn slide_down(&mut self) -> Reward {
        self.transpose();
        let reward = self.slide_right();
        self.transpose();
        reward
    }

    /// Swap rows and columns.
    ///
    /// ```text
    /// a b c d      a e i m
    /// e f g h  ->  b f j n
    /// i j k l      c g k o
    /// m n o p      d h l p
    /// ```
    pub fn transpose(&mut self) {
        let mut x = self.0;
        x = (x & 0xf0f0_0f0f_f0f0_0f0f)
            | ((x & 0x0000_f0f0_0000_f0f0) << 12)
            | ((x & 0x0f0f_0000_0f0f_0000) >> 12);
        x = (x & 0xff00_ff00_00ff_00ff)
            | ((x & 0x0000_0000_ff00_ff00) << 24)
            | ((x & 0x00ff_00ff_0000_0000) >> 24);
        self.0 = x;
    }

    /// Reverse every row (left-right reflection).
    pub fn mirror(&mut self) {
        let x = self.0;
        self.0 = ((x & 0x000f_000f_000f_000f) << 12)
            | ((x & 0x00f0_00f0_00f0_00f0) << 4)
            | ((x & 0x0f00_0f00_0f00_0f00) >> 4)
            | ((x & 0xf000_f000_f000_f000) >> 12);
    }

    /// Reverse the order of rows (top-bottom reflection).
    pub fn flip(&mut self) {
        let x = self.0;
        self.0 = ((x & 0x0000_0000_0000_ffff) << 48)
            | ((x & 0x0000_0000_ffff_0000) << 16)
            | ((x & 0x0000_ffff_0000_0000) >> 16)
            | ((x & 0xffff_0000_0000_0000) >> 48);
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_clockwise(&mut self) {
        self.transpose();
        self.mirror();
    }

    /// Rotate 90 degrees counterclockwise.
    pub fn rotate_counterclockwise(&mut self) {
        self.transpose();
        self.flip();
    }

    /// Rotate clockwise `r` quarter turns (negative turns counterclockwise).
    pub fn rotate(&mut self, r: i32) {
        match r.rem_euclid(4) {
            1 => self.rotate_clockwise(),
            2 => {
                self.mirror();
                self.flip();
            }
            3 => self.rotate_counterclockwise(),
            _ => {}
        }
    }
}

/// Displayed value of a tile code: 1-3 as is, then 6, 12, 24, ...
pub fn tile_value(code: u8) -> u32 {
    if code <= 3 {
        code as u32
    } else {
        (1u32 << (code - 1)) - (1u32 << (code - 3))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------------------------+")?;
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, "{:>6}", tile_value(self.get(r * 4 + c)))?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "+------------------------+")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        Board::from_cells([1, 2, 3, 4, 0, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15])
    }

    #[test]
    fn test_get_set() {
        let mut b = Board::new();
        b.set(0, 3);
        b.set(15, 15);
        b.set(7, 9);
        assert_eq!(b.get(0), 3);
        assert_eq!(b.get(15), 15);
        assert_eq!(b.get(7), 9);
        assert_eq!(b.get(8), 0);

        b.set(7, 0);
        assert_eq!(b.get(7), 0);
        assert_eq!(b.raw(), 0xf000_0000_0000_0003);
    }

    #[test]
    fn test_transforms_are_involutions() {
        let b = sample();
        for op in [Board::transpose, Board::mirror, Board::flip] {
            let mut x = b;
            op(&mut x);
            assert_ne!(x, b);
            op(&mut x);
            assert_eq!(x, b);
        }
    }

    #[test]
    fn test_transpose_moves_cells() {
        let mut b = sample();
        b.transpose();
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(b.get(r * 4 + c), sample().get(c * 4 + r));
            }
        }
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        let mut b = sample();
        for _ in 0..4 {
            b.rotate_clockwise();
        }
        assert_eq!(b, sample());

        let mut b = sample();
        b.rotate(1);
        b.rotate(-1);
        assert_eq!(b, sample());
    }

    #[test]
    fn test_rotate_clockwise_moves_corner() {
        let mut b = Board::new();
        b.set(0, 1);
        b.rotate_clockwise();
        assert_eq!(b.get(3), 1);
        assert_eq!(b.empty_count(), 15);
    }

    #[test]
    fn test_max_tile() {
        assert_eq!(Board::new().max_tile(), 0);
        assert_eq!(sample().max_tile(), 15);
    }

    #[test]
    fn test_slide_directions() {
        // one tile in the middle moves one step in every direction
        let mut base = Board::new();
        base.set(5, 1);

        let expected = [
            (Direction::Up, 1),
            (Direction::Right, 6),
            (Direction::Down, 9),
            (Direction::Left, 4),
        ];
        for (dir, pos) in expected {
            let mut b = base;
            assert_eq!(b.slide(dir), 0, "{dir}");
            assert_eq!(b.get(pos), 1, "{dir}");
            assert_eq!(b.empty_count(), 15, "{dir}");
        }
    }

    #[test]
    fn test_illegal_slide_leaves_board() {
        let mut b = Board::new();
        b.set(0, 1);
        assert_eq!(b.slide(Direction::Left), ILLEGAL);
        assert_eq!(b.slide(Direction::Up), ILLEGAL);
        assert_eq!(b.get(0), 1);
        assert_eq!(b.empty_count(), 15);
    }

    #[test]
    fn test_tile_value() {
        let values: Vec<u32> = (0..=8).map(tile_value).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 6, 12, 24, 48, 96]);
    }

    #[test]
    fn test_display() {
        let mut b = Board::new();
        b.set(0, 1);
        b.set(5, 4);
        let s = b.to_string();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "|     1     0     0     0|");
        assert_eq!(lines[2], "|     0     6     0     0|");
    }
}

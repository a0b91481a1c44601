//! Precomputed row transforms.
//!
//! Every row of the board is a 16-bit value holding four tile codes, so there
//! are only 65536 distinct rows. The table stores, for each of them, the row
//! obtained by sliding left once and the reward earned by that slide. Boards
//! resolve every direction through this single table.
//!
//! The table is built on first use behind a `OnceLock` and is immutable
//! afterwards, so it can be read from any number of threads.

use std::sync::OnceLock;

use crate::constants::{BASE_MERGE_REWARD, MAX_CODE, N, ROW_COUNT, Reward, TILE_BITS};

/// Result of sliding one row to the left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowTransform {
    /// Row after the slide.
    pub left: u16,
    /// Reward earned by the slide (0 for a plain shift or no change).
    pub reward: Reward,
}

/// Table of left-slide results for all 16-bit rows.
pub struct RowTable {
    entries: Box<[RowTransform]>,
}

impl Default for RowTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RowTable {
    /// Build the table by sliding every possible row.
    pub fn new() -> Self {
        let entries = (0..ROW_COUNT)
            .map(|row| slide_row_left(row as u16))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self { entries }
    }

    /// Look up the transform of a single row.
    #[inline]
    pub fn find(&self, row: u16) -> RowTransform {
        self.entries[row as usize]
    }
}

static ROW_TABLE: OnceLock<RowTable> = OnceLock::new();

/// Shared row table, built on first call.
#[inline]
pub fn row_table() -> &'static RowTable {
    ROW_TABLE.get_or_init(RowTable::new)
}

/// Build the shared table eagerly (e.g. before timing a run).
pub fn init_tables() {
    row_table();
}

/// Slide a single row to the left.
///
/// Scanning from the left, the first of these events is applied and the scan
/// stops:
/// - an empty cell followed by a tile: the tile moves into the gap
/// - a 1 next to a 2 (either order): they merge into a 3, reward 3
/// - two equal tiles of code 3 or above: they merge into `code + 1`, reward
///   `3 * 2^(code + 1 - 3)`
///
/// Every cell right of the event shifts one step left and the last cell
/// becomes empty. At most one event happens per row.
pub fn slide_row_left(row: u16) -> RowTransform {
    let mut cells: [u8; N] =
        std::array::from_fn(|i| ((row >> (i as u32 * TILE_BITS)) & 0x0f) as u8);
    let mut reward = 0;
    let mut moved = None;

    for c in 0..N - 1 {
        let (a, b) = (cells[c], cells[c + 1]);
        if a == 0 && b != 0 {
            cells[c] = b;
        } else if a <= 2 && a + b == 3 {
            cells[c] = 3;
            reward = BASE_MERGE_REWARD;
        } else if a > 2 && a == b && a < MAX_CODE {
            cells[c] = a + 1;
            reward = BASE_MERGE_REWARD << (a + 1 - 3);
        } else {
            continue;
        }
        moved = Some(c);
        break;
    }

    if let Some(m) = moved {
        for c in m + 1..N {
            cells[c] = if c == N - 1 { 0 } else { cells[c + 1] };
        }
    }

    let left = cells
        .iter()
        .enumerate()
        .fold(0u16, |acc, (i, &t)| acc | ((t as u16) << (i as u32 * TILE_BITS)));
    RowTransform { left, reward }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack four codes into a row, leftmost first.
    fn row(cells: [u16; 4]) -> u16 {
        cells[0] | (cells[1] << 4) | (cells[2] << 8) | (cells[3] << 12)
    }

    #[test]
    fn test_empty_row_is_unchanged() {
        assert_eq!(slide_row_left(0), RowTransform { left: 0, reward: 0 });
    }

    #[test]
    fn test_single_shift_per_slide() {
        let t = slide_row_left(row([0, 0, 0, 1]));
        assert_eq!(t.left, row([0, 0, 1, 0]));
        assert_eq!(t.reward, 0);

        let t = slide_row_left(row([0, 2, 0, 3]));
        assert_eq!(t.left, row([2, 0, 3, 0]));
        assert_eq!(t.reward, 0);
    }

    #[test]
    fn test_one_and_two_merge_into_three() {
        let t = slide_row_left(row([1, 2, 0, 0]));
        assert_eq!(t.left, row([3, 0, 0, 0]));
        assert_eq!(t.reward, 3);

        let t = slide_row_left(row([2, 1, 3, 5]));
        assert_eq!(t.left, row([3, 3, 5, 0]));
        assert_eq!(t.reward, 3);
    }

    #[test]
    fn test_small_equal_tiles_do_not_merge() {
        for code in [1, 2] {
            let r = row([code, code, code, code]);
            assert_eq!(slide_row_left(r), RowTransform { left: r, reward: 0 });
        }
    }

    #[test]
    fn test_large_equal_tiles_merge_once() {
        let t = slide_row_left(row([3, 3, 3, 3]));
        assert_eq!(t.left, row([4, 3, 3, 0]));
        assert_eq!(t.reward, 6);

        let t = slide_row_left(row([5, 6, 6, 1]));
        assert_eq!(t.left, row([5, 7, 1, 0]));
        assert_eq!(t.reward, 3 << 4);
    }

    #[test]
    fn test_max_code_does_not_overflow() {
        let r = row([15, 15, 0, 0]);
        assert_eq!(slide_row_left(r), RowTransform { left: r, reward: 0 });
    }

    #[test]
    fn test_table_matches_direct_computation() {
        let table = row_table();
        for r in [0u16, 0x0021, 0x3300, 0xffff, 0x1234, 0x0f0f] {
            assert_eq!(table.find(r), slide_row_left(r));
        }
    }
}

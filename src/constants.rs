//! Constants for board geometry, rewards, and learning parameters.
//!
//! The board is a 4x4 grid packed into a single `u64`: cell `i` occupies
//! bits `4*i..4*i+4`, so row `r` is the 16-bit slice starting at bit `16*r`
//! and column 0 is the lowest nibble of each row.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board width and height.
pub const N: usize = 4;

/// Number of cells on the board.
pub const CELLS: usize = N * N;

/// Bits used by a single tile code.
pub const TILE_BITS: u32 = 4;

/// Largest tile code representable in a cell.
pub const MAX_CODE: u8 = 0x0f;

/// Number of distinct 16-bit rows (size of the row transform table).
pub const ROW_COUNT: usize = 1 << 16;

/// Identity board: cell `i` holds code `i`. Used to derive cell permutations.
pub const IDENTITY_BOARD: u64 = 0xfedc_ba98_7654_3210;

// =============================================================================
// Rewards
// =============================================================================

/// Reward type returned by slides and placements.
pub type Reward = i32;

/// Reward sentinel meaning "the board did not change".
pub const ILLEGAL: Reward = -1;

/// Reward for merging a 1 and a 2 into a 3.
pub const BASE_MERGE_REWARD: Reward = 3;

// =============================================================================
// Game Flow
// =============================================================================

/// Number of tiles placed by the environment before the first player move.
pub const INIT_TILES: usize = 9;

/// Tile codes drawn by the environment.
pub const SPAWN_TILES: [u8; 3] = [1, 2, 3];

/// Cells eligible for a spawn, indexed by the opcode of the last slide.
/// The new tile always enters from the edge opposite the slide.
pub const SPAWN_EDGES: [[usize; N]; 4] = [
    [12, 13, 14, 15], // after up: bottom row
    [0, 4, 8, 12],    // after right: left column
    [0, 1, 2, 3],     // after down: top row
    [3, 7, 11, 15],   // after left: right column
];

/// Greedy plies simulated after each candidate slide by the lookahead player.
pub const SEARCH_DEPTH: usize = 3;

// =============================================================================
// Value Function
// =============================================================================

/// Number of board symmetries (4 rotations x 2 reflections).
pub const ISOMORPHISMS: usize = 8;

/// Cell tuples of the n-tuple network, in serialization order.
pub const TUPLES: [[usize; 6]; 4] = [
    [0, 1, 2, 3, 4, 5],
    [4, 5, 6, 7, 8, 9],
    [0, 1, 2, 4, 5, 6],
    [4, 5, 6, 8, 9, 10],
];

/// Default TD learning rate.
pub const DEFAULT_ALPHA: f32 = 0.1;

/// Initial capacity of an episode trajectory.
pub const TRAJECTORY_CAPACITY: usize = 20_000;

/// Default number of training episodes.
pub const DEFAULT_TOTAL: usize = 1000;

/// Default number of episodes per statistics block.
pub const DEFAULT_BLOCK: usize = 100;

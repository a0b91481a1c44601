//! N-tuple patterns.
//!
//! A pattern watches a fixed tuple of cells. The tile codes found at those
//! cells are packed, four bits per cell, into an index into a weight table of
//! `16^k` entries. Each pattern is evaluated under all 8 symmetries of the
//! board (4 rotations, each optionally mirrored), and all 8 views index the
//! same table, so whatever is learned about a shape applies equally to its
//! rotations and reflections.

use std::io::{Read, Write};

use anyhow::{Result, bail};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::board::Board;
use crate::constants::{CELLS, IDENTITY_BOARD, ISOMORPHISMS, TILE_BITS};

/// Largest tuple accepted; larger tables would not fit in memory.
const MAX_TUPLE_LEN: usize = 7;

/// A weight table shared by the 8 symmetric views of a cell tuple.
#[derive(Clone, Debug)]
pub struct Pattern {
    /// Cell tuple as given at construction.
    tuple: Vec<usize>,
    /// Cell tuple under each symmetry. `isomorphisms[0]` equals `tuple`.
    isomorphisms: [Vec<usize>; ISOMORPHISMS],
    weights: Vec<f32>,
}

impl Pattern {
    /// Create a pattern over `tuple` with all weights at zero.
    ///
    /// # Panics
    /// If the tuple is empty, longer than 7 cells, or names a cell >= 16.
    pub fn new(tuple: &[usize]) -> Self {
        assert!(
            !tuple.is_empty() && tuple.len() <= MAX_TUPLE_LEN,
            "pattern must watch 1..={MAX_TUPLE_LEN} cells, got {}",
            tuple.len()
        );
        assert!(
            tuple.iter().all(|&t| t < CELLS),
            "pattern cell out of range: {tuple:?}"
        );

        let isomorphisms = std::array::from_fn(|i| {
            let mut idx = Board::from_raw(IDENTITY_BOARD);
            if i >= 4 {
                idx.mirror();
            }
            idx.rotate(i as i32);
            tuple.iter().map(|&t| idx.get(t) as usize).collect()
        });

        Self {
            tuple: tuple.to_vec(),
            isomorphisms,
            weights: vec![0.0; 1 << (TILE_BITS as usize * tuple.len())],
        }
    }

    /// The watched cells.
    pub fn tuple(&self) -> &[usize] {
        &self.tuple
    }

    /// Number of weights in the table.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Reset every weight to zero.
    pub fn clear(&mut self) {
        self.weights.fill(0.0);
    }

    /// Pack the codes at `cells` into a table index, first cell lowest.
    #[inline]
    fn index_of(cells: &[usize], b: &Board) -> usize {
        cells
            .iter()
            .enumerate()
            .fold(0, |acc, (k, &c)| acc | ((b.get(c) as usize) << (TILE_BITS as usize * k)))
    }

    /// Table index of `b` under each of the 8 symmetries.
    pub fn indexes(&self, b: &Board) -> [usize; ISOMORPHISMS] {
        std::array::from_fn(|i| Self::index_of(&self.isomorphisms[i], b))
    }

    /// Value of `b`: the sum of the 8 symmetric lookups.
    pub fn estimate(&self, b: &Board) -> f32 {
        self.indexes(b).iter().map(|&i| self.weights[i]).sum()
    }

    /// Add `delta` to the weight behind each of the 8 symmetric lookups and
    /// return the updated value of `b`.
    pub fn update(&mut self, b: &Board, delta: f32) -> f32 {
        for i in self.indexes(b) {
            self.weights[i] += delta;
        }
        self.estimate(b)
    }

    /// Read the table: a `u32` entry count followed by that many `f32`.
    /// The count must match this pattern's table size.
    pub fn read_from<R: Read>(&mut self, r: &mut R) -> Result<()> {
        let count = r.read_u32::<LittleEndian>()? as usize;
        if count != self.weights.len() {
            bail!(
                "pattern {:?}: expected {} weights, file has {}",
                self.tuple,
                self.weights.len(),
                count
            );
        }
        r.read_f32_into::<LittleEndian>(&mut self.weights)?;
        Ok(())
    }

    /// Write the table in the format read by [`Pattern::read_from`].
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.weights.len() as u32)?;
        for &x in &self.weights {
            w.write_f32::<LittleEndian>(x)?;
        }
        Ok(())
    }
}

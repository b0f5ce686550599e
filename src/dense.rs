//! The dense triangular co-occurrence store: the subset of the V×V rank grid
//! with `x*y < max_product`, addressed through a row-offset lookup table
//! rather than a full V×V allocation.

use crate::error::{Error, Result};
use crate::record::Crec;
use std::io::Write;

/// Row-offset lookup array `L[0..=V]`: row `x` occupies
/// `bigram_table[L[x-1]-1 .. L[x]-1]`, one-indexed per the cell formula
/// `L[x-1] + y - 2`. `L[0] = 1` is a sentinel, not an offset into row 0.
pub struct Lookup {
    l: Vec<i64>,
}

impl Lookup {
    pub fn build(v: i64, max_product: i64) -> Self {
        let mut l = vec![0i64; (v + 1).max(1) as usize];
        l[0] = 1;
        for x in 1..=v {
            let width = if x == 0 { 0 } else { v.min(max_product / x) };
            l[x as usize] = l[(x - 1) as usize] + width;
        }
        Lookup { l }
    }

    pub fn width(&self, x: i64) -> i64 {
        self.l[x as usize] - self.l[(x - 1) as usize]
    }

    /// Total number of dense cells, `L[V]`.
    pub fn total(&self) -> i64 {
        *self.l.last().unwrap_or(&1) - 1
    }

    fn index(&self, x: i64, y: i64) -> usize {
        (self.l[(x - 1) as usize] + y - 2) as usize
    }
}

pub struct DenseTable {
    lookup: Lookup,
    cells: Vec<f64>,
    max_product: i64,
}

impl DenseTable {
    pub fn new(v: i64, max_product: i64) -> Result<Self> {
        let lookup = Lookup::build(v, max_product);
        let total = lookup.total().max(0) as usize;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(total)
            .map_err(|e| Error::ResourceExhausted(format!("dense table of {total} cells: {e}")))?;
        cells.resize(total, 0.0);
        Ok(DenseTable {
            lookup,
            cells,
            max_product,
        })
    }

    /// Whether the ordered pair `(x, y)` falls in the dense region. The
    /// product is symmetric, so this also answers for `(y, x)`.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x * y < self.max_product
    }

    pub fn add(&mut self, x: i64, y: i64, val: f64) {
        let idx = self.lookup.index(x, y);
        self.cells[idx] += val;
    }

    /// Walks the dense array in row-major rank order and writes every
    /// nonzero cell to `out`, which is inherently sorted by `(w1, w2)` with
    /// no duplicates.
    pub fn emit_sorted<W: Write>(&self, v: i64, out: &mut W) -> Result<()> {
        for x in 1..=v {
            let width = self.lookup.width(x);
            for y in 1..=width {
                let idx = self.lookup.index(x, y);
                let val = self.cells[idx];
                if val != 0.0 {
                    Crec::new(x as i32, y as i32, val).write_to(out)?;
                }
            }
        }
        Ok(())
    }
}

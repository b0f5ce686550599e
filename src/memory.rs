//! Translates a soft memory budget M (gigabytes) into the record-capacity
//! numbers the co-occurrence and shuffle stages size their buffers from.
//!
//! ~85% of M is reserved for the dense triangular array, the rest split
//! between the overflow buffer and bookkeeping tables.

use crate::record::RECORD_SIZE;

/// Harmonic-sum remainder used when solving for `max_product` (see
/// `solve_max_product`).
const GAMMA: f64 = 0.1544313298;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CooccurBudget {
    pub max_product: i64,
    pub overflow_length: i64,
}

/// Largest `P` such that `P * (ln P + GAMMA) <= r`, found by fixed-point
/// iteration `n <- r / (ln n + GAMMA)` starting at `10^5`.
fn solve_max_product(r: f64) -> i64 {
    if r <= 0.0 {
        return 0;
    }
    let mut n: f64 = 1e5;
    for _ in 0..1000 {
        let next = r / (n.ln() + GAMMA);
        if (next - n).abs() < 1e-3 {
            n = next;
            break;
        }
        n = next;
    }
    n.floor().max(1.0) as i64
}

pub fn cooccur_budget(
    memory_gb: f64,
    max_product_override: Option<i64>,
    overflow_length_override: Option<i64>,
) -> CooccurBudget {
    let m = memory_gb * 1024.0 * 1024.0 * 1024.0;
    let r = 0.85 * m / RECORD_SIZE as f64;

    let max_product = max_product_override.unwrap_or_else(|| solve_max_product(r));
    let overflow_length = overflow_length_override.unwrap_or_else(|| (r / 6.0) as i64);

    CooccurBudget {
        max_product,
        overflow_length,
    }
}

/// Block size `S` for the shuffle stage's pass 1, `floor(0.95*M/sizeof(CREC))`.
pub fn shuffle_block_size(memory_gb: f64, array_size_override: Option<i64>) -> usize {
    if let Some(v) = array_size_override {
        return v.max(1) as usize;
    }
    let m = memory_gb * 1024.0 * 1024.0 * 1024.0;
    let s = (0.95 * m / RECORD_SIZE as f64) as i64;
    s.max(1) as usize
}

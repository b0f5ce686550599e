//! Fisher–Yates shuffle, generic over any `rand::Rng` so the shuffle
//! library functions can be driven by a seeded, reproducible generator in
//! tests and an OS-entropy-backed one in the `shuffle` binary.
//!
//! Runs the full `0..=i` range at every swap, so every slot (including the
//! last two) is reachable as a swap target and the result is an unbiased
//! permutation of the whole slice.

use rand::Rng;

/// Shuffles `slice` in place: for each index `i` from the top down, swaps
/// it with a uniformly chosen `j` in `[0, i]`.
pub fn fisher_yates<T, R: Rng>(slice: &mut [T], rng: &mut R) {
    if slice.len() < 2 {
        return;
    }
    for i in (1..slice.len()).rev() {
        let j = rng.gen_range(0..=i);
        slice.swap(i, j);
    }
}

//! `shuffle`: the two-pass external-memory stream shuffler. Reads a
//! CREC stream on stdin, writes a shuffled CREC stream to stdout.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufWriter, Write};

use glovetools::config::ShuffleConfig;
use glovetools::memory::shuffle_block_size;
use glovetools::shuffle_engine::{pass1_block_shuffle, pass2_merge_shuffle};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cfg = ShuffleConfig::from_args(&args[1..]).context("parsing shuffle options")?;

    let block_size = shuffle_block_size(cfg.memory_gb, cfg.array_size);
    if cfg.verbose.at_least(1) {
        eprintln!("SHUFFLING COOCCURRENCES");
        eprintln!("memory budget {:.2} GB -> block size {} records", cfg.memory_gb, block_size);
    }

    // Seeded from OS entropy so repeated runs over the same input produce
    // different orderings; library shuffle functions stay generic over
    // `Rng` so tests can inject a seeded, reproducible one.
    let mut rng = StdRng::from_entropy();

    let stdin = io::stdin();
    let paths = pass1_block_shuffle(stdin.lock(), block_size, &cfg.temp_file, &mut rng)
        .context("pass 1: block shuffle")?;

    if cfg.verbose.at_least(1) {
        eprintln!("wrote {} block temp file(s)", paths.len());
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    pass2_merge_shuffle(&paths, block_size, &mut out, &mut rng).context("pass 2: merge shuffle")?;
    out.flush()?;
    Ok(())
}

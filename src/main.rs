//! `vocab_build`: streaming token counter producing a frequency-ranked
//! vocabulary. Reads the corpus on stdin, writes `word count` lines
//! to stdout.

use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};

use glovetools::config::VocabConfig;
use glovetools::vocab_builder::{build_vocabulary, write_vocabulary};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cfg = VocabConfig::from_args(&args[1..]).context("parsing vocab_build options")?;

    if cfg.verbose.at_least(1) {
        eprintln!("BUILDING VOCABULARY FROM CORPUS");
        eprintln!(
            "max-vocab: {}",
            cfg.max_vocab.map(|v| v.to_string()).unwrap_or_else(|| "unlimited".to_string())
        );
        eprintln!("min-count: {}", cfg.min_count);
    }

    let stdin = io::stdin();
    let entries = build_vocabulary(stdin.lock(), &cfg).context("counting corpus tokens")?;

    if cfg.verbose.at_least(1) {
        eprintln!("{} distinct words after min-count/max-vocab filtering", entries.len());
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_vocabulary(&entries, &mut out).context("writing vocabulary")?;
    out.flush()?;
    Ok(())
}

//! `cooccur`: the co-occurrence accumulator. Reads the corpus on
//! stdin against a pre-built vocabulary file, writes a sorted, de-duplicated
//! CREC stream to stdout.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

use glovetools::config::CooccurConfig;
use glovetools::cooccur_engine::{CooccurBuilder, Vocab};
use glovetools::memory::cooccur_budget;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cfg = CooccurConfig::from_args(&args[1..]).context("parsing cooccur options")?;

    if cfg.verbose.at_least(1) {
        eprintln!("COUNTING COOCCURRENCES");
        eprintln!("window size: {}", cfg.window_size);
        eprintln!("context: {}", if cfg.symmetric { "symmetric" } else { "asymmetric" });
        eprintln!("vocab file: {}", cfg.vocab_file.display());
    }

    let vocab_file = File::open(&cfg.vocab_file)
        .with_context(|| format!("opening vocabulary file {}", cfg.vocab_file.display()))?;
    let mut vocab = Vocab::load(BufReader::new(vocab_file)).context("loading vocabulary")?;

    if cfg.verbose.at_least(1) {
        eprintln!("{} words in vocabulary", vocab.v);
    }

    let budget = cooccur_budget(cfg.memory_gb, cfg.max_product, cfg.overflow_length);
    if cfg.verbose.at_least(1) {
        eprintln!(
            "memory budget {:.2} GB -> max product {}, overflow length {}",
            cfg.memory_gb, budget.max_product, budget.overflow_length
        );
    }

    let builder = CooccurBuilder::new(cfg, &vocab, budget).context("allocating dense co-occurrence table")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    builder
        .run(stdin.lock(), &mut vocab, &mut out)
        .context("accumulating and merging co-occurrences")?;
    out.flush()?;
    Ok(())
}

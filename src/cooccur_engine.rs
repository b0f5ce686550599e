//! The co-occurrence accumulator: loads ranks from a vocabulary file,
//! streams the corpus once, routing frequent-pair weight into a dense
//! triangular array and rare-pair weight into sorted overflow runs, then
//! k-way merges everything into one sorted, de-duplicated CREC stream.

use std::fs::File;
use std::io::{BufRead, BufWriter, Read, Write};
use std::path::PathBuf;

use crate::config::CooccurConfig;
use crate::dense::DenseTable;
use crate::error::{Error, Result};
use crate::memory::CooccurBudget;
use crate::merge::merge_sorted_runs;
use crate::record::{coalesce_sorted, Crec};
use crate::tokenize::{for_each_token, Token};
use crate::vocab_hash::VocabHash;

/// Word ranks loaded from a vocabulary file; `v` is the vocabulary
/// size, the upper bound every emitted rank must satisfy.
pub struct Vocab {
    ranks: VocabHash<i64>,
    pub v: i64,
}

impl Vocab {
    pub fn load<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut ranks = VocabHash::new();
        let mut v: i64 = 0;
        let mut line = Vec::new();
        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line)?;
            if n == 0 {
                break;
            }
            while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }
            let space = line
                .iter()
                .rposition(|&b| b == b' ')
                .ok_or_else(|| Error::InvalidVocabulary("vocabulary line missing a count".to_string()))?;
            v += 1;
            ranks.insert_if_absent(&line[..space], v);
        }
        if v == 0 {
            return Err(Error::InvalidVocabulary("vocabulary file is empty".to_string()));
        }
        Ok(Vocab { ranks, v })
    }

    /// Looks up `word`'s 1-based rank; `None` means out-of-vocabulary.
    pub fn rank(&mut self, word: &[u8]) -> Option<i64> {
        self.ranks.get(word).copied()
    }
}

pub struct CooccurBuilder {
    cfg: CooccurConfig,
    dense: DenseTable,
    overflow: Vec<Crec>,
    overflow_flush_threshold: i64,
    temp_paths: Vec<PathBuf>,
    next_temp_idx: u32,
}

impl CooccurBuilder {
    pub fn new(cfg: CooccurConfig, vocab: &Vocab, budget: CooccurBudget) -> Result<Self> {
        let dense = DenseTable::new(vocab.v, budget.max_product)?;
        let overflow_cap = budget.overflow_length.max(1);
        let overflow_flush_threshold = (overflow_cap - cfg.window_size as i64).max(1);
        Ok(CooccurBuilder {
            cfg,
            dense,
            overflow: Vec::new(),
            overflow_flush_threshold,
            temp_paths: Vec::new(),
            next_temp_idx: 1,
        })
    }

    /// Runs the full accumulator: streaming pass, final overflow flush,
    /// dense-region dump, then the k-way merge to `out`.
    pub fn run<R: Read, W: Write>(mut self, input: R, vocab: &mut Vocab, out: &mut W) -> Result<()> {
        let v = vocab.v;
        self.streaming_pass(input, vocab)?;
        self.flush_overflow()?;
        self.emit_dense(v)?;
        merge_sorted_runs(&self.temp_paths, out)
    }

    fn streaming_pass<R: Read>(&mut self, input: R, vocab: &mut Vocab) -> Result<()> {
        let window = self.cfg.window_size;
        let history_len = window.max(1);
        let mut history = vec![0i64; history_len];
        let mut j: usize = 0;
        let threshold = self.overflow_flush_threshold;

        for_each_token(input, |tok| {
            match tok {
                Token::Newline => {
                    j = 0;
                    Ok(())
                }
                Token::Word(word) => {
                    let w2 = match vocab.rank(word) {
                        Some(r) => r,
                        None => return Ok(()),
                    };
                    let lo = j.saturating_sub(window);
                    for k in lo..j {
                        let w1 = history[k % history_len];
                        let d = (j - k) as f64;
                        let contrib = 1.0 / d;
                        if self.dense.contains(w1, w2) {
                            self.dense.add(w1, w2, contrib);
                            if self.cfg.symmetric {
                                self.dense.add(w2, w1, contrib);
                            }
                        } else {
                            self.overflow.push(Crec::new(w1 as i32, w2 as i32, contrib));
                            if self.cfg.symmetric {
                                self.overflow.push(Crec::new(w2 as i32, w1 as i32, contrib));
                            }
                        }
                    }
                    history[j % history_len] = w2;
                    j += 1;
                    if self.overflow.len() as i64 >= threshold {
                        self.flush_overflow()?;
                    }
                    Ok(())
                }
            }
        })
    }

    fn flush_overflow(&mut self) -> Result<()> {
        if self.overflow.is_empty() {
            return Ok(());
        }
        self.overflow.sort_by_key(|r| r.key());
        coalesce_sorted(&mut self.overflow);

        let path = self.temp_path(self.next_temp_idx);
        let mut f = BufWriter::new(File::create(&path).map_err(|e| Error::io(&path, e))?);
        for rec in &self.overflow {
            rec.write_to(&mut f)?;
        }
        f.flush()?;

        self.temp_paths.push(path);
        self.next_temp_idx += 1;
        self.overflow.clear();
        Ok(())
    }

    /// File 0000 is reserved for the dense-region dump; written
    /// last but first in the merge list, which has no bearing on
    /// correctness since the merge re-sorts by key regardless.
    fn emit_dense(&mut self, v: i64) -> Result<()> {
        let path = self.temp_path(0);
        let mut f = BufWriter::new(File::create(&path).map_err(|e| Error::io(&path, e))?);
        self.dense.emit_sorted(v, &mut f)?;
        f.flush()?;
        self.temp_paths.insert(0, path);
        Ok(())
    }

    fn temp_path(&self, idx: u32) -> PathBuf {
        PathBuf::from(format!("{}_{:04}.bin", self.cfg.overflow_file, idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CooccurConfig;
    use crate::memory::cooccur_budget;

    fn make_vocab(lines: &[&str]) -> Vocab {
        let text = lines.join("\n") + "\n";
        Vocab::load(text.as_bytes()).unwrap()
    }

    fn run_cooccur(corpus: &str, vocab_lines: &[&str], window: usize, symmetric: bool, tag: &str) -> Vec<(i32, i32, f64)> {
        let mut vocab = make_vocab(vocab_lines);
        let cfg = CooccurConfig {
            window_size: window,
            symmetric,
            overflow_file: std::env::temp_dir()
                .join(format!("cooccur_test_{tag}"))
                .to_string_lossy()
                .into_owned(),
            ..CooccurConfig::default()
        };
        let budget = cooccur_budget(cfg.memory_gb, Some(1_000_000), Some(1_000));
        let builder = CooccurBuilder::new(cfg, &vocab, budget).unwrap();
        let mut out = Vec::new();
        builder.run(corpus.as_bytes(), &mut vocab, &mut out).unwrap();

        let mut cursor = &out[..];
        let mut recs = Vec::new();
        while let Some(r) = Crec::read_from(&mut cursor).unwrap() {
            recs.push((r.w1, r.w2, r.val));
        }
        recs
    }

    /// A direct O(n*W) re-implementation of the windowing rule, kept
    /// independent of the dense/overflow machinery, for cross-checking
    /// the accumulator against an unoptimized oracle.
    fn brute_force_oracle(corpus: &str, ranks: &[(&str, i32)], window: usize, symmetric: bool) -> Vec<(i32, i32, f64)> {
        use std::collections::HashMap;
        let rank_of = |w: &str| ranks.iter().find(|(name, _)| *name == w).map(|(_, r)| *r);
        let mut totals: HashMap<(i32, i32), f64> = HashMap::new();
        for line in corpus.split('\n') {
            let toks: Vec<i32> = line.split_whitespace().filter_map(rank_of).collect();
            for j in 0..toks.len() {
                let lo = j.saturating_sub(window);
                for k in lo..j {
                    let d = (j - k) as f64;
                    let contrib = 1.0 / d;
                    *totals.entry((toks[k], toks[j])).or_insert(0.0) += contrib;
                    if symmetric {
                        *totals.entry((toks[j], toks[k])).or_insert(0.0) += contrib;
                    }
                }
            }
        }
        let mut out: Vec<(i32, i32, f64)> = totals.into_iter().map(|((a, b), v)| (a, b, v)).collect();
        out.sort_by_key(|&(a, b, _)| (a, b));
        out
    }

    #[test]
    fn s1_basic_symmetric_window_two_matches_brute_force_oracle() {
        let recs = run_cooccur("a b a b a", &["a 3", "b 2"], 2, true, "s1");
        let oracle = brute_force_oracle("a b a b a", &[("a", 1), ("b", 2)], 2, true);
        assert_eq!(recs, oracle);
    }

    #[test]
    fn brute_force_oracle_matches_across_varied_inputs() {
        let cases: &[(&str, &[(&str, i32)], usize, bool)] = &[
            ("a b a b a", &[("a", 1), ("b", 2)], 2, true),
            ("a b a b a", &[("a", 1), ("b", 2)], 2, false),
            ("a b c a b c a b c", &[("a", 1), ("b", 2), ("c", 3)], 3, true),
            ("q r q", &[("q", 1), ("r", 2)], 1, false),
            ("x y\nz w", &[("x", 1), ("y", 2), ("z", 3), ("w", 4)], 2, true),
        ];
        for (i, &(corpus, ranks, window, symmetric)) in cases.iter().enumerate() {
            let vocab_lines: Vec<String> = ranks.iter().map(|(w, _)| format!("{w} 1")).collect();
            let vocab_refs: Vec<&str> = vocab_lines.iter().map(String::as_str).collect();
            let recs = run_cooccur(corpus, &vocab_refs, window, symmetric, &format!("oracle{i}"));
            let oracle = brute_force_oracle(corpus, ranks, window, symmetric);
            assert_eq!(recs, oracle, "case {i}: {corpus:?} window={window} symmetric={symmetric}");
        }
    }

    #[test]
    fn s2_no_cross_line_contributions() {
        let recs = run_cooccur("x y\nz w", &["x 1", "y 1", "z 1", "w 1"], 2, true, "s2");
        assert_eq!(
            recs,
            vec![(1, 2, 1.0), (2, 1, 1.0), (3, 4, 1.0), (4, 3, 1.0)]
        );
    }

    #[test]
    fn s3_asymmetric_window_one() {
        let recs = run_cooccur("q r q", &["q 2", "r 1"], 1, false, "s3");
        assert_eq!(recs, vec![(1, 2, 1.0), (2, 1, 1.0)]);
    }

    #[test]
    fn sort_plus_dedup_invariant_holds() {
        let recs = run_cooccur("a b c a b c a b c", &["a 3", "b 3", "c 3"], 3, true, "dedup");
        for w in recs.windows(2) {
            let (a, b) = (w[0], w[1]);
            assert!((a.0, a.1) < (b.0, b.1));
        }
    }

    #[test]
    fn out_of_vocabulary_tokens_are_skipped_without_advancing_position() {
        // "zzz" is OOV; the window for the second "a" must still only see
        // the first "a", not be pushed further away by the skipped token.
        let recs = run_cooccur("a zzz a", &["a 2"], 5, false, "oov");
        assert_eq!(recs, vec![(1, 1, 1.0)]);
    }

    #[test]
    fn window_bound_is_never_exceeded() {
        let recs = run_cooccur("a b c d e f", &["a 1", "b 1", "c 1", "d 1", "e 1", "f 1"], 2, false, "bound");
        // With W=2, the max distance contribution is 1/2; nothing accumulates from distance 3+.
        assert!(recs.iter().all(|&(_, _, val)| val == 1.0 || val == 0.5));
    }

    #[test]
    fn tiny_max_product_forces_everything_through_overflow_and_still_sorts() {
        let mut vocab = make_vocab(&["a 3", "b 2", "c 1"]);
        let cfg = CooccurConfig {
            window_size: 2,
            symmetric: true,
            overflow_file: std::env::temp_dir()
                .join("cooccur_test_overflow_forced")
                .to_string_lossy()
                .into_owned(),
            ..CooccurConfig::default()
        };
        // max_product=1 means no pair (x,y >= 1) ever satisfies x*y<1, so the
        // dense region is empty and every pair flushes through overflow runs.
        let budget = cooccur_budget(cfg.memory_gb, Some(1), Some(2));
        let builder = CooccurBuilder::new(cfg, &vocab, budget).unwrap();
        let mut out = Vec::new();
        builder.run("a b c a b c a b c".as_bytes(), &mut vocab, &mut out).unwrap();

        let mut cursor = &out[..];
        let mut recs = Vec::new();
        while let Some(r) = Crec::read_from(&mut cursor).unwrap() {
            recs.push((r.w1, r.w2, r.val));
        }
        for w in recs.windows(2) {
            assert!((w[0].0, w[0].1) < (w[1].0, w[1].1));
        }
        assert!(!recs.is_empty());
    }
}

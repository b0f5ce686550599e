//! Streaming token counter that produces the frequency-ranked vocabulary
//! consumed by `cooccur`.

use std::io::{Read, Write};

use crate::config::VocabConfig;
use crate::error::{Error, Result};
use crate::tokenize::{for_each_token, Token};
use crate::vocab_hash::VocabHash;

pub type VocabEntry = (Box<[u8]>, u64);

const RESERVED_UNK: &[u8] = b"<unk>";

/// Counts every whitespace-delimited token in `input`, then sorts and
/// truncates/filters. Does not yet write anything.
pub fn build_vocabulary<R: Read>(input: R, cfg: &VocabConfig) -> Result<Vec<VocabEntry>> {
    let mut table: VocabHash<u64> = VocabHash::new();

    for_each_token(input, |tok| {
        if let Token::Word(word) = tok {
            if word == RESERVED_UNK {
                return Err(Error::InvalidArgument(
                    "corpus contains the reserved token <unk>".to_string(),
                ));
            }
            table.bump_or_insert(word, || 1u64, |count| *count += 1);
        }
        Ok(())
    })?;

    let mut entries: Vec<VocabEntry> = table.into_entries();

    if let Some(max) = cfg.max_vocab {
        if (entries.len() as u64) > max {
            // Count-only sort first (ties unordered), matching the reference
            // sources' pseudo-random alphabet spread under truncation.
            entries.sort_by(|a, b| b.1.cmp(&a.1));
            entries.truncate(max as usize);
        }
    }

    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.retain(|(_, count)| *count >= cfg.min_count);

    Ok(entries)
}

/// Writes `word<space>count<LF>` per entry, in the order given (callers
/// pass the already frequency-sorted slice from `build_vocabulary`).
pub fn write_vocabulary<W: Write>(entries: &[VocabEntry], mut out: W) -> Result<()> {
    for (word, count) in entries {
        out.write_all(word)?;
        out.write_all(b" ")?;
        out.write_all(count.to_string().as_bytes())?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> VocabConfig {
        VocabConfig::default()
    }

    fn words(entries: &[VocabEntry]) -> Vec<(String, u64)> {
        entries
            .iter()
            .map(|(w, c)| (String::from_utf8_lossy(w).into_owned(), *c))
            .collect()
    }

    #[test]
    fn s4_min_count_filters_rare_words() {
        let mut c = cfg();
        c.min_count = 2;
        let entries = build_vocabulary("the the the cat".as_bytes(), &c).unwrap();
        assert_eq!(words(&entries), vec![("the".to_string(), 3)]);
    }

    #[test]
    fn s5_max_vocab_truncates_to_n_lines() {
        let mut c = cfg();
        c.max_vocab = Some(2);
        let entries = build_vocabulary("a b c".as_bytes(), &c).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|(_, count)| *count == 1));
        let mut sorted_by_bytes = entries.clone();
        sorted_by_bytes.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(entries, sorted_by_bytes);
    }

    #[test]
    fn total_ordering_is_count_desc_then_lex_asc() {
        let entries = build_vocabulary("b a a c c c".as_bytes(), &cfg()).unwrap();
        assert_eq!(
            words(&entries),
            vec![("c".to_string(), 3), ("a".to_string(), 2), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn unk_token_is_rejected() {
        let err = build_vocabulary("a <unk> b".as_bytes(), &cfg()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn write_vocabulary_formats_one_line_per_word() {
        let entries: Vec<VocabEntry> = vec![
            (b"the".to_vec().into_boxed_slice(), 3),
            (b"cat".to_vec().into_boxed_slice(), 1),
        ];
        let mut out = Vec::new();
        write_vocabulary(&entries, &mut out).unwrap();
        assert_eq!(out, b"the 3\ncat 1\n");
    }
}

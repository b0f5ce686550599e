//! The two-pass external-memory shuffler: pass 1 buffers and
//! block-shuffles the input into numbered temp files; pass 2 interleaves
//! bounded slices from every temp file and shuffles each assembled batch.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use rand::Rng;

use crate::error::{Error, Result};
use crate::record::Crec;
use crate::rng::fisher_yates;

/// Reads `input` into `block_size`-record blocks, Fisher–Yates shuffling
/// each before writing it to its own numbered temp file. Returns the temp
/// file paths in write order.
pub fn pass1_block_shuffle<R: Read, Rn: Rng>(
    mut input: R,
    block_size: usize,
    temp_prefix: &str,
    rng: &mut Rn,
) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let mut idx: u32 = 0;

    loop {
        let mut block = Vec::with_capacity(block_size.min(1 << 20));
        while block.len() < block_size {
            match Crec::read_from(&mut input)? {
                Some(rec) => block.push(rec),
                None => break,
            }
        }
        if block.is_empty() {
            break;
        }
        let reached_eof = block.len() < block_size;

        fisher_yates(&mut block, rng);

        let path = PathBuf::from(format!("{temp_prefix}_{idx:04}.bin"));
        let mut f = BufWriter::new(File::create(&path).map_err(|e| Error::io(&path, e))?);
        for rec in &block {
            rec.write_to(&mut f)?;
        }
        f.flush()?;
        paths.push(path);
        idx += 1;

        if reached_eof {
            break;
        }
    }
    Ok(paths)
}

/// Drains `paths` round by round: each round draws up to
/// `block_size / paths.len()` consecutive records from every still-open
/// file, shuffles the assembled batch, and writes it to `out`. Deletes
/// every temp file on success.
pub fn pass2_merge_shuffle<W: Write, Rn: Rng>(
    paths: &[PathBuf],
    block_size: usize,
    out: &mut W,
    rng: &mut Rn,
) -> Result<()> {
    let mut readers: Vec<Option<BufReader<File>>> = paths
        .iter()
        .map(|p| File::open(p).map(BufReader::new).map(Some).map_err(|e| Error::io(p, e)))
        .collect::<Result<_>>()?;

    let k = paths.len().max(1);
    let per_file = (block_size / k).max(1);

    loop {
        let mut batch = Vec::new();
        for reader_slot in readers.iter_mut() {
            if let Some(reader) = reader_slot {
                for _ in 0..per_file {
                    match Crec::read_from(reader)? {
                        Some(rec) => batch.push(rec),
                        None => {
                            *reader_slot = None;
                            break;
                        }
                    }
                }
            }
        }
        if batch.is_empty() {
            break;
        }
        fisher_yates(&mut batch, rng);
        for rec in &batch {
            rec.write_to(out)?;
        }
    }

    drop(readers);
    for p in paths {
        fs::remove_file(p).map_err(|e| Error::io(p, e))?;
    }
    Ok(())
}

//! K-way merge of sorted, duplicate-free CREC runs into one sorted,
//! duplicate-free stream, coalescing equal `(w1, w2)` keys across runs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::record::Crec;

struct HeapEntry {
    rec: Crec,
    source: usize,
}

/// Reversed so `BinaryHeap` (a max-heap) pops the smallest `(w1, w2)` key
/// first.
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.rec.key().cmp(&self.rec.key())
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.rec.key() == other.rec.key()
    }
}
impl Eq for HeapEntry {}

/// Merges the sorted runs at `paths` into `out`, summing `val` for records
/// that share a `(w1, w2)` key. Deletes every input path on success; leaves
/// them untouched if any read or write fails.
pub fn merge_sorted_runs<W: Write>(paths: &[impl AsRef<Path>], out: &mut W) -> Result<()> {
    let mut readers: Vec<BufReader<File>> = paths
        .iter()
        .map(|p| File::open(p).map(BufReader::new).map_err(|e| crate::error::Error::io(p.as_ref(), e)))
        .collect::<Result<_>>()?;

    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(readers.len());
    for (source, reader) in readers.iter_mut().enumerate() {
        if let Some(rec) = Crec::read_from(reader)? {
            heap.push(HeapEntry { rec, source });
        }
    }

    let mut held: Option<Crec> = None;
    while let Some(HeapEntry { rec, source }) = heap.pop() {
        match &mut held {
            Some(h) if h.key() == rec.key() => h.val += rec.val,
            Some(h) => {
                h.write_to(out)?;
                held = Some(rec);
            }
            None => held = Some(rec),
        }
        if let Some(next) = Crec::read_from(&mut readers[source])? {
            heap.push(HeapEntry { rec: next, source });
        }
    }
    if let Some(h) = held {
        h.write_to(out)?;
    }

    drop(readers);
    for p in paths {
        fs::remove_file(p).map_err(|e| crate::error::Error::io(p.as_ref(), e))?;
    }
    Ok(())
}

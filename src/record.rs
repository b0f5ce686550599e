//! The co-occurrence record (CREC) and its fixed binary layout.
//!
//! `(w1: i32, w2: i32, val: f64)`, native-endian, 16 bytes, no padding. Every
//! binary in this pipeline reads and writes this exact layout, which is what
//! lets `cooccur`'s output feed `shuffle` byte-for-byte.

use std::io::{self, Read, Write};

pub const RECORD_SIZE: usize = 4 + 4 + 8;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Crec {
    pub w1: i32,
    pub w2: i32,
    pub val: f64,
}

impl Crec {
    pub fn new(w1: i32, w2: i32, val: f64) -> Self {
        Crec { w1, w2, val }
    }

    /// Lexicographic key used for sorting and deduplication throughout the
    /// pipeline: (w1, w2) ascending.
    pub fn key(&self) -> (i32, i32) {
        (self.w1, self.w2)
    }

    pub fn to_bytes(self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.w1.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.w2.to_ne_bytes());
        buf[8..16].copy_from_slice(&self.val.to_ne_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Self {
        let w1 = i32::from_ne_bytes(buf[0..4].try_into().unwrap());
        let w2 = i32::from_ne_bytes(buf[4..8].try_into().unwrap());
        let val = f64::from_ne_bytes(buf[8..16].try_into().unwrap());
        Crec { w1, w2, val }
    }

    pub fn write_to<W: Write>(self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Reads one record. Returns `Ok(None)` on a clean EOF (zero bytes read
    /// before the record starts); a partial record at EOF is reported as
    /// `UnexpectedEof` since a truncated CREC is always an error, never a
    /// silently-dropped tail.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Option<Self>> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;
        loop {
            match r.read(&mut buf[filled..])? {
                0 if filled == 0 => return Ok(None),
                0 => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "truncated co-occurrence record",
                    ))
                }
                n => filled += n,
            }
            if filled == RECORD_SIZE {
                return Ok(Some(Crec::from_bytes(&buf)));
            }
        }
    }
}

/// Sums `val` for adjacent records sharing the same (w1, w2) key. `records`
/// must already be sorted by `Crec::key`.
pub fn coalesce_sorted(records: &mut Vec<Crec>) {
    if records.is_empty() {
        return;
    }
    let mut write = 0;
    for read in 1..records.len() {
        if records[read].key() == records[write].key() {
            records[write].val += records[read].val;
        } else {
            write += 1;
            records[write] = records[read];
        }
    }
    records.truncate(write + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let rec = Crec::new(3, 7, 1.5);
        let bytes = rec.to_bytes();
        assert_eq!(bytes.len(), RECORD_SIZE);
        assert_eq!(Crec::from_bytes(&bytes), rec);
    }

    #[test]
    fn read_write_stream_round_trip() {
        let recs = vec![Crec::new(1, 2, 0.5), Crec::new(2, 3, 2.0)];
        let mut buf = Vec::new();
        for r in &recs {
            r.write_to(&mut buf).unwrap();
        }
        let mut cursor = &buf[..];
        let mut out = Vec::new();
        while let Some(r) = Crec::read_from(&mut cursor).unwrap() {
            out.push(r);
        }
        assert_eq!(out, recs);
    }

    #[test]
    fn truncated_record_is_an_error() {
        let rec = Crec::new(1, 2, 0.5);
        let bytes = rec.to_bytes();
        let mut cursor = &bytes[..RECORD_SIZE - 3];
        let err = Crec::read_from(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn coalesce_sums_adjacent_duplicates() {
        let mut recs = vec![
            Crec::new(1, 1, 1.0),
            Crec::new(1, 2, 2.0),
            Crec::new(1, 2, 3.0),
            Crec::new(2, 1, 1.0),
        ];
        coalesce_sorted(&mut recs);
        assert_eq!(
            recs,
            vec![Crec::new(1, 1, 1.0), Crec::new(1, 2, 5.0), Crec::new(2, 1, 1.0)]
        );
    }
}

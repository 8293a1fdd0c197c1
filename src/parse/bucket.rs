//! Bucketed hash parser.
//!
//! Each hash slot widens into a fixed ring of entries filled round-robin,
//! so recent positions with the same prefix coexist instead of evicting
//! each other.  A query walks the ring, scoring every live candidate and
//! keeping the longest match, nearest offset on ties.  A ring entry equal
//! to the zero value terminates the walk early, and candidates that
//! cannot beat the current best are rejected on a single byte compare at
//! position `k - 1` before any full extension runs.

use std::io;

use crate::buf::types::prefix_mask;
use crate::buf::{BufConfig, ParserBuffer};
use crate::config::{BupConfig, Config};

use super::hash::{HashEntry, PRIME};
use super::types::{Block, Error, Seq};
use super::{effective_min_match, Parser, NO_TRAILING_LITERALS};

// ─────────────────────────────────────────────────────────────────────────────
// BucketTable
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct BucketTable {
    table: Vec<HashEntry>,
    /// Next round-robin insert index per bucket.
    next: Vec<u16>,
    bucket_size: usize,
    mask: u64,
    bits: u32,
    input_len: usize,
}

impl BucketTable {
    pub(crate) fn new(input_len: usize, bits: u32, bucket_size: usize) -> Self {
        let slots = 1usize << bits;
        BucketTable {
            table: vec![HashEntry::default(); slots * bucket_size],
            next: vec![0u16; slots],
            bucket_size,
            mask: prefix_mask(input_len),
            bits,
            input_len,
        }
    }

    #[inline]
    pub(crate) fn input_len(&self) -> usize {
        self.input_len
    }

    #[inline(always)]
    fn prefix(&self, x: u64) -> u64 {
        x & self.mask
    }

    #[inline(always)]
    fn slot(&self, prefix: u64) -> usize {
        if self.bits == 0 {
            0
        } else {
            (prefix.wrapping_mul(PRIME) >> (64 - self.bits)) as usize
        }
    }

    #[inline]
    fn insert(&mut self, i: usize, prefix: u64) {
        let s = self.slot(prefix);
        let at = s * self.bucket_size + self.next[s] as usize;
        self.table[at] = HashEntry {
            pos: i as u32,
            value: prefix as u32,
        };
        self.next[s] = ((self.next[s] as usize + 1) % self.bucket_size) as u16;
    }

    /// The live entries of the bucket for `prefix`: the ring up to the
    /// first all-zero entry.
    #[inline]
    fn bucket(&self, prefix: u64) -> &[HashEntry] {
        let s = self.slot(prefix);
        let ring = &self.table[s * self.bucket_size..(s + 1) * self.bucket_size];
        let end = ring
            .iter()
            .position(|e| *e == HashEntry::default())
            .unwrap_or(self.bucket_size);
        &ring[..end]
    }

    fn adapt(&mut self, delta: u32) {
        for e in &mut self.table {
            if *e == HashEntry::default() {
                continue;
            }
            if e.pos < delta {
                *e = HashEntry::default();
            } else {
                e.pos -= delta;
            }
        }
    }

    fn reset(&mut self) {
        self.table.fill(HashEntry::default());
        self.next.fill(0);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BucketHashParser (BUP)
// ─────────────────────────────────────────────────────────────────────────────

/// Greedy parser over a bucketed hash table.
#[derive(Debug)]
pub struct BucketHashParser {
    buf: ParserBuffer,
    table: BucketTable,
    cfg: BupConfig,
}

impl BucketHashParser {
    pub fn new(mut cfg: BupConfig) -> Result<Self, Error> {
        cfg.apply_defaults();
        cfg.verify()?;
        Ok(BucketHashParser {
            buf: ParserBuffer::new(cfg.buf_config())?,
            table: BucketTable::new(cfg.input_len, cfg.hash_bits, cfg.bucket_size),
            cfg,
        })
    }

    /// Best candidate in the bucket for cursor `i`: longest match, then
    /// nearest position.
    fn best_candidate(
        &self,
        i: usize,
        prefix: u64,
        a_end: usize,
        min_match: usize,
    ) -> Option<(usize, usize)> {
        let data = self.buf.data();
        let window_size = self.cfg.window_size;
        let mut best: Option<(usize, usize)> = None;
        for e in self.table.bucket(prefix) {
            if e.value != prefix as u32 {
                continue;
            }
            let j = e.pos as usize;
            if j >= i || i - j > window_size {
                continue;
            }
            if let Some((k, bj)) = best {
                // A candidate that disagrees at the best length's last
                // byte cannot be longer; skip it without extending.
                if j + k > data.len() || data[j + k - 1] != data[i + k - 1] {
                    continue;
                }
                let kk = self.buf.match_len(j, i, a_end);
                if kk > k || (kk == k && j > bj) {
                    best = Some((kk, j));
                }
            } else {
                let kk = self.buf.match_len(j, i, a_end);
                if kk >= min_match {
                    best = Some((kk, j));
                }
            }
        }
        best.map(|(k, j)| (j, k))
    }
}

impl Parser for BucketHashParser {
    fn parse(&mut self, block: Option<&mut Block>, flags: u32) -> Result<usize, Error> {
        let w = self.buf.w();
        let n = self.buf.buffered().min(self.buf.config().block_size);
        if n == 0 {
            return Err(Error::EmptyBuffer);
        }
        let a_end = w + n;
        let input_len = self.table.input_len();
        let input_end = (a_end + 1).saturating_sub(input_len).max(w);
        let min_match = effective_min_match(input_len, self.cfg.min_match_len);

        let block = match block {
            None => {
                for i in w..input_end {
                    let p = self.table.prefix(self.buf.load64(i));
                    self.table.insert(i, p);
                }
                self.buf.set_w(a_end);
                return Ok(n);
            }
            Some(b) => b,
        };
        block.clear();

        let mut i = w;
        let mut lit_index = w;
        while i < input_end {
            let prefix = self.table.prefix(self.buf.load64(i));
            let m = self.best_candidate(i, prefix, a_end, min_match);
            self.table.insert(i, prefix);
            let (j, k) = match m {
                None => {
                    i += 1;
                    continue;
                }
                Some(m) => m,
            };

            block.sequences.push(Seq {
                lit_len: (i - lit_index) as u32,
                match_len: k as u32,
                offset: (i - j) as u32,
                aux: 0,
            });
            block
                .literals
                .extend_from_slice(&self.buf.data()[lit_index..i]);
            lit_index = i + k;

            let rehash_end = lit_index.min(input_end);
            for p in i + 1..rehash_end {
                let prefix = self.table.prefix(self.buf.load64(p));
                self.table.insert(p, prefix);
            }
            i = lit_index;
        }

        let end = if flags & NO_TRAILING_LITERALS != 0 && !block.sequences.is_empty() {
            lit_index
        } else {
            block
                .literals
                .extend_from_slice(&self.buf.data()[lit_index..a_end]);
            a_end
        };
        self.buf.set_w(end);
        Ok(end - w)
    }

    fn reset(&mut self, prefill: Option<&[u8]>) -> Result<(), Error> {
        self.buf.reset(prefill)?;
        self.table.reset();
        let w = self.buf.w();
        let from = w.saturating_sub(self.cfg.window_size);
        let to = (self.buf.len() + 1)
            .saturating_sub(self.table.input_len())
            .min(w);
        for i in from..to {
            let p = self.table.prefix(self.buf.load64(i));
            self.table.insert(i, p);
        }
        Ok(())
    }

    fn shrink(&mut self) -> usize {
        let delta = self.buf.shrink();
        if delta > 0 {
            self.table.adapt(delta as u32);
        }
        delta
    }

    fn write(&mut self, p: &[u8]) -> Result<usize, Error> {
        self.buf.write(p)
    }

    fn read_from(&mut self, r: &mut dyn io::Read) -> io::Result<u64> {
        self.buf.read_from(r)
    }

    fn read_at(&self, p: &mut [u8], off: i64) -> Result<usize, Error> {
        self.buf.read_at(p, off)
    }

    fn byte_at(&self, off: i64) -> Result<u8, Error> {
        self.buf.byte_at(off)
    }

    fn buf_config(&self) -> BufConfig {
        self.buf.config()
    }

    fn parser_config(&self) -> Config {
        Config::Bup(self.cfg.clone())
    }
}

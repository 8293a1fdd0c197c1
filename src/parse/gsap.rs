//! Greedy suffix-array parser.
//!
//! Instead of hashing, the finder keeps a suffix array over the window
//! plus look-ahead and a bitmap of the ranks whose positions the cursor
//! has already passed.  The candidates for cursor `i` are the nearest
//! marked ranks on either side of `isa[i]`: lexicographic neighbours
//! share the longest prefixes, so one predecessor and one successor
//! probe replace a whole chain walk.  The arrays are rebuilt lazily
//! whenever the block window leaves the indexed span.

use std::io;

use crate::buf::{BufConfig, ParserBuffer};
use crate::config::{Config, GsapConfig};

use super::sa::{Bitset, SuffixArray};
use super::types::{Block, Error, Seq};
use super::{Parser, NO_TRAILING_LITERALS};

/// Greedy parser over a suffix array.
#[derive(Debug)]
pub struct GreedySuffixArrayParser {
    buf: ParserBuffer,
    cfg: GsapConfig,
    sa: SuffixArray,
    bits: Bitset,
    /// Arena index of `sa`'s first position; the arrays cover
    /// `data[sa_pos..sa_pos + sa.len()]`.
    sa_pos: usize,
}

impl GreedySuffixArrayParser {
    pub fn new(mut cfg: GsapConfig) -> Result<Self, Error> {
        cfg.apply_defaults();
        cfg.verify()?;
        Ok(GreedySuffixArrayParser {
            buf: ParserBuffer::new(cfg.buf_config())?,
            cfg,
            sa: SuffixArray::default(),
            bits: Bitset::default(),
            sa_pos: 0,
        })
    }

    /// True when the dictionary and `[w, a_end)` lie inside the indexed
    /// span.
    fn covered(&self, a_end: usize) -> bool {
        let dict_start = self.buf.w().saturating_sub(self.cfg.window_size);
        self.sa.len() > 0 && self.sa_pos <= dict_start && self.sa_pos + self.sa.len() >= a_end
    }

    /// Rebuild the arrays over the window plus the whole look-ahead and
    /// re-mark every already-parsed position inside the window.
    fn rebuild(&mut self) {
        let w = self.buf.w();
        self.sa_pos = w.saturating_sub(self.cfg.window_size);
        self.sa = SuffixArray::build(&self.buf.data()[self.sa_pos..]);
        self.bits = Bitset::new(self.sa.len());
        for p in self.sa_pos..w {
            self.bits.set(self.sa.isa[p - self.sa_pos] as usize);
        }
    }

    /// Best candidate for cursor `i`: the longer of the two marked rank
    /// neighbours, larger position on ties.
    fn best_candidate(&self, i: usize, a_end: usize) -> Option<(usize, usize)> {
        let r = self.sa.isa[i - self.sa_pos] as usize;
        let mut best: Option<(usize, usize)> = None;
        for rank in [self.bits.prev_set(r), self.bits.next_set(r)]
            .into_iter()
            .flatten()
        {
            let j = self.sa.sa[rank] as usize + self.sa_pos;
            // Ranks marked by a rolled-back literal tail may sit at or
            // past the cursor; only strictly earlier positions are
            // legal sources.
            if j >= i || i - j > self.cfg.window_size {
                continue;
            }
            let k = self
                .buf
                .match_len(j, i, a_end)
                .min(self.cfg.max_match_len);
            if k < self.cfg.min_match_len {
                continue;
            }
            match best {
                Some((bk, bj)) if k < bk || (k == bk && j < bj) => {}
                _ => best = Some((k, j)),
            }
        }
        best.map(|(k, j)| (j, k))
    }
}

impl Parser for GreedySuffixArrayParser {
    fn parse(&mut self, block: Option<&mut Block>, flags: u32) -> Result<usize, Error> {
        let w = self.buf.w();
        let n = self.buf.buffered().min(self.buf.config().block_size);
        if n == 0 {
            return Err(Error::EmptyBuffer);
        }
        let a_end = w + n;
        if !self.covered(a_end) || self.sa.len() == 0 {
            self.rebuild();
        }
        let input_end = (a_end + 1).saturating_sub(self.cfg.min_match_len).max(w);

        let block = match block {
            None => {
                for i in w..a_end {
                    self.bits.set(self.sa.isa[i - self.sa_pos] as usize);
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
            let m = self.best_candidate(i, a_end);
            self.bits.set(self.sa.isa[i - self.sa_pos] as usize);
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

            for p in i + 1..lit_index {
                self.bits.set(self.sa.isa[p - self.sa_pos] as usize);
            }
            i = lit_index;
        }
        // Mark the tail positions the match-length floor kept the loop from
        // visiting, so the next block can reference them.
        for p in i..a_end {
            self.bits.set(self.sa.isa[p - self.sa_pos] as usize);
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
        self.sa = SuffixArray::default();
        self.bits = Bitset::default();
        self.sa_pos = 0;
        Ok(())
    }

    fn shrink(&mut self) -> usize {
        let delta = self.buf.shrink();
        if delta > 0 {
            // Stored positions in the arrays would all shift; rebuilding on
            // the next parse is cheaper than patching sa, isa, lcp and the
            // bitmap in place.
            self.sa = SuffixArray::default();
            self.bits = Bitset::default();
            self.sa_pos = 0;
        }
        delta
    }

    fn write(&mut self, p: &[u8]) -> Result<usize, Error> {
        let r = self.buf.write(p)?;
        // New look-ahead invalidates the indexed span's tail.
        self.sa = SuffixArray::default();
        Ok(r)
    }

    fn read_from(&mut self, r: &mut dyn io::Read) -> io::Result<u64> {
        let n = self.buf.read_from(r)?;
        if n > 0 {
            self.sa = SuffixArray::default();
        }
        Ok(n)
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
        Config::Gsap(self.cfg.clone())
    }
}

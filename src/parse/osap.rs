//! Optimizing suffix-array parser.
//!
//! Where the greedy parsers commit to the first acceptable match, this
//! parser harvests *every* match candidate at every block position and
//! runs a shortest-path search over the block: node `p` is "the first
//! `p` bytes are encoded", a literal edge costs `cost(1, 0)`, and each
//! candidate `(m, o)` adds an edge `p → p + m` of weight `cost(m, o)`.
//! The cost function is caller-supplied so the tiling can mirror the
//! downstream entropy coder's actual bit budget.
//!
//! Candidates come from the suffix array: ranks adjacent to `isa[i]`
//! share the longest prefixes, and the running minimum over `lcp` while
//! scanning away from `isa[i]` is exactly the match length against each
//! visited rank.  The scan stops once that minimum falls below the
//! match-length floor; per length only the smallest offset is kept.

use std::io;

use crate::buf::{BufConfig, ParserBuffer};
use crate::config::{Config, OsapConfig};

use super::sa::SuffixArray;
use super::types::{Block, Error, Seq};
use super::{Parser, NO_TRAILING_LITERALS};

// ─────────────────────────────────────────────────────────────────────────────
// Cost model
// ─────────────────────────────────────────────────────────────────────────────

/// Bit-cost oracle for the shortest-path tiling.
///
/// `cost(1, 0)` prices a single literal byte; `cost(m, o)` with `o > 0`
/// prices a match record.
pub trait Cost {
    fn cost(&self, match_len: u32, offset: u32) -> u32;
}

/// Cost model mirroring the LZMA bit layout: 4, 5, or 10 bits for the
/// three length buckets, `2 + bit_len(offset − 1)` for the distance, and
/// a flat 9 bits per literal byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct XzCost;

impl Cost for XzCost {
    fn cost(&self, match_len: u32, offset: u32) -> u32 {
        if offset == 0 {
            return 9 * match_len;
        }
        let len_bits = if match_len < 10 {
            4
        } else if match_len < 18 {
            5
        } else {
            10
        };
        let dist_bits = 2 + (32 - (offset - 1).leading_zeros());
        len_bits + dist_bits
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// OptimizingSuffixArrayParser (OSAP)
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest-path parser over suffix-array candidates.
pub struct OptimizingSuffixArrayParser {
    buf: ParserBuffer,
    cfg: OsapConfig,
    cost: Box<dyn Cost>,
    sa: SuffixArray,
    sa_pos: usize,
}

impl OptimizingSuffixArrayParser {
    /// Build with the canonical [`XzCost`] model.
    pub fn new(cfg: OsapConfig) -> Result<Self, Error> {
        Self::with_cost(cfg, Box::new(XzCost))
    }

    /// Build with a caller-supplied cost model.
    pub fn with_cost(mut cfg: OsapConfig, cost: Box<dyn Cost>) -> Result<Self, Error> {
        cfg.apply_defaults();
        cfg.verify()?;
        Ok(OptimizingSuffixArrayParser {
            buf: ParserBuffer::new(cfg.buf_config())?,
            cfg,
            cost,
            sa: SuffixArray::default(),
            sa_pos: 0,
        })
    }

    fn covered(&self, a_end: usize) -> bool {
        let dict_start = self.buf.w().saturating_sub(self.cfg.window_size);
        self.sa.len() > 0 && self.sa_pos <= dict_start && self.sa_pos + self.sa.len() >= a_end
    }

    fn rebuild(&mut self) {
        self.sa_pos = self.buf.w().saturating_sub(self.cfg.window_size);
        self.sa = SuffixArray::build(&self.buf.data()[self.sa_pos..]);
    }

    /// All candidate matches at cursor `i`, deduplicated by length with
    /// the smallest offset retained.  `out[l - min_match_len]` is the
    /// offset for length `l`, or zero when no source reaches `l`.
    fn harvest(&self, i: usize, a_end: usize, out: &mut Vec<u32>) {
        out.clear();
        let min_match = self.cfg.min_match_len;
        let limit = (a_end - i).min(self.cfg.max_match_len);
        if limit < min_match {
            return;
        }
        let r = self.sa.isa[i - self.sa_pos] as usize;

        let consider = |rank: usize, h: usize, out: &mut Vec<u32>| {
            let j = self.sa.sa[rank] as usize + self.sa_pos;
            if j >= i || i - j > self.cfg.window_size {
                return;
            }
            let l = h.min(limit);
            if l < min_match {
                return;
            }
            let off = (i - j) as u32;
            let idx = l - min_match;
            if out.len() <= idx {
                out.resize(idx + 1, 0);
            }
            if out[idx] == 0 || off < out[idx] {
                out[idx] = off;
            }
        };

        // Predecessor ranks: the running lcp minimum shrinks as the scan
        // moves away and bounds every further match length.
        let mut h = usize::MAX;
        let mut t = r;
        while t > 0 {
            t -= 1;
            h = h.min(self.sa.lcp[t] as usize);
            if h < min_match {
                break;
            }
            consider(t, h, out);
        }

        // Successor ranks.
        let mut h = usize::MAX;
        let mut t = r;
        while t + 1 < self.sa.len() {
            h = h.min(self.sa.lcp[t] as usize);
            if h < min_match {
                break;
            }
            consider(t + 1, h, out);
            t += 1;
        }

        // A longer match's source also serves every shorter length, so
        // propagate the nearest offset downward.
        let mut best = 0u32;
        for slot in out.iter_mut().rev() {
            if best != 0 && (*slot == 0 || best < *slot) {
                *slot = best;
            }
            if *slot != 0 {
                best = *slot;
            }
        }
    }
}

impl Parser for OptimizingSuffixArrayParser {
    fn parse(&mut self, block: Option<&mut Block>, flags: u32) -> Result<usize, Error> {
        let w = self.buf.w();
        let n = self.buf.buffered().min(self.buf.config().block_size);
        if n == 0 {
            return Err(Error::EmptyBuffer);
        }
        let a_end = w + n;

        let block = match block {
            None => {
                // Nothing to emit and no incremental index to advance;
                // the arrays rebuild lazily from the new cursor.
                self.buf.set_w(a_end);
                return Ok(n);
            }
            Some(b) => b,
        };
        block.clear();
        if !self.covered(a_end) {
            self.rebuild();
        }

        let min_match = self.cfg.min_match_len;

        // Shortest path over block offsets 0..=n.
        const INF: u64 = u64::MAX;
        let mut d = vec![INF; n + 1];
        let mut step = vec![(0u32, 0u32); n + 1];
        d[0] = 0;
        let mut cands: Vec<u32> = Vec::new();
        for p in 0..n {
            let dp = d[p];
            debug_assert!(dp != INF);
            let lit = dp + self.cost.cost(1, 0) as u64;
            if lit < d[p + 1] {
                d[p + 1] = lit;
                step[p + 1] = (1, 0);
            }
            self.harvest(w + p, a_end, &mut cands);
            for (idx, &off) in cands.iter().enumerate() {
                if off == 0 {
                    continue;
                }
                let m = min_match + idx;
                let c = dp + self.cost.cost(m as u32, off) as u64;
                if c < d[p + m] {
                    d[p + m] = c;
                    step[p + m] = (m as u32, off);
                }
            }
        }

        // Recover the move sequence, then emit it front to back.
        let mut moves: Vec<(u32, u32)> = Vec::new();
        let mut at = n;
        while at > 0 {
            let (m, o) = step[at];
            moves.push((m, o));
            at -= m as usize;
        }
        moves.reverse();

        let mut p = w;
        let mut lit_index = w;
        for &(m, o) in &moves {
            if o == 0 {
                p += 1;
                continue;
            }
            block.sequences.push(Seq {
                lit_len: (p - lit_index) as u32,
                match_len: m,
                offset: o,
                aux: 0,
            });
            block
                .literals
                .extend_from_slice(&self.buf.data()[lit_index..p]);
            p += m as usize;
            lit_index = p;
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
        self.sa_pos = 0;
        Ok(())
    }

    fn shrink(&mut self) -> usize {
        let delta = self.buf.shrink();
        if delta > 0 {
            self.sa = SuffixArray::default();
            self.sa_pos = 0;
        }
        delta
    }

    fn write(&mut self, p: &[u8]) -> Result<usize, Error> {
        let r = self.buf.write(p)?;
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
        Config::Osap(self.cfg.clone())
    }
}

impl std::fmt::Debug for OptimizingSuffixArrayParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimizingSuffixArrayParser")
            .field("cfg", &self.cfg)
            .field("sa_pos", &self.sa_pos)
            .finish_non_exhaustive()
    }
}

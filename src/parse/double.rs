//! Dual-table hash parsers.
//!
//! Two independent hash tables index a short and a long prefix of each
//! cursor position, typically three and seven bytes.  The long table is
//! consulted first: a hit there already agrees on more bytes, so it wins
//! over whatever the short table offers.  Only when the long slot misses
//! does the short table supply the candidate.
//!
//! Both tables are fed at every cursor position.  After a match, the
//! skipped positions are partially re-indexed: both tables up to the long
//! table's input end, then the short table alone up to its own, so no
//! insertion is lost at the block tail.

use std::io;

use crate::buf::{BufConfig, ParserBuffer};
use crate::config::{BdhpConfig, Config, DhpConfig};

use super::hash::HashTable;
use super::types::{Block, Error, Seq};
use super::{effective_min_match, Parser, NO_TRAILING_LITERALS};

// ─────────────────────────────────────────────────────────────────────────────
// Shared dual-table loop
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct DoubleTables {
    /// Short-prefix table.
    t1: HashTable,
    /// Long-prefix table.
    t2: HashTable,
}

impl DoubleTables {
    fn new(input_len1: usize, hash_bits1: u32, input_len2: usize, hash_bits2: u32) -> Self {
        DoubleTables {
            t1: HashTable::new(input_len1, hash_bits1),
            t2: HashTable::new(input_len2, hash_bits2),
        }
    }

    fn adapt(&mut self, delta: u32) {
        self.t1.adapt(delta);
        self.t2.adapt(delta);
    }

    fn reset(&mut self) {
        self.t1.reset();
        self.t2.reset();
    }
}

fn parse_block(
    buf: &mut ParserBuffer,
    tables: &mut DoubleTables,
    min_match_len: usize,
    window_size: usize,
    block: Option<&mut Block>,
    flags: u32,
    backward: bool,
) -> Result<usize, Error> {
    let w = buf.w();
    let n = buf.buffered().min(buf.config().block_size);
    if n == 0 {
        return Err(Error::EmptyBuffer);
    }
    let a_end = w + n;
    let e1 = (a_end + 1).saturating_sub(tables.t1.input_len()).max(w);
    let e2 = (a_end + 1).saturating_sub(tables.t2.input_len()).max(w);
    debug_assert!(e2 <= e1);
    let min_match = effective_min_match(tables.t1.input_len(), min_match_len);

    let block = match block {
        None => {
            for i in w..e1 {
                let x = buf.load64(i);
                tables.t1.insert(i, tables.t1.prefix(x));
                if i < e2 {
                    tables.t2.insert(i, tables.t2.prefix(x));
                }
            }
            buf.set_w(a_end);
            return Ok(n);
        }
        Some(b) => b,
    };
    block.clear();

    let mut i = w;
    let mut lit_index = w;
    while i < e1 {
        let x = buf.load64(i);
        let p1 = tables.t1.prefix(x);
        let e1ent = tables.t1.get(p1);
        tables.t1.insert(i, p1);

        let mut m: Option<(usize, usize)> = None;
        if i < e2 {
            let p2 = tables.t2.prefix(x);
            let e2ent = tables.t2.get(p2);
            tables.t2.insert(i, p2);
            if e2ent.value == p2 as u32 {
                let j = e2ent.pos as usize;
                if j < i && i - j <= window_size {
                    let k = buf.match_len(j, i, a_end);
                    if k >= min_match {
                        m = Some((j, k));
                    }
                }
            }
        }
        if m.is_none() && e1ent.value == p1 as u32 {
            let j = e1ent.pos as usize;
            if j < i && i - j <= window_size {
                let k = buf.match_len(j, i, a_end);
                if k >= min_match {
                    m = Some((j, k));
                }
            }
        }
        let (j, mut k) = match m {
            None => {
                i += 1;
                continue;
            }
            Some(m) => m,
        };

        let mut m_start = i;
        if backward {
            let back = buf.suffix_len(j, i, (i - lit_index).min(j));
            m_start -= back;
            k += back;
        }
        block.sequences.push(Seq {
            lit_len: (m_start - lit_index) as u32,
            match_len: k as u32,
            offset: (i - j) as u32,
            aux: 0,
        });
        block.literals.extend_from_slice(&buf.data()[lit_index..m_start]);
        lit_index = m_start + k;

        // Partial re-index of the skipped positions: both tables while the
        // long prefix still fits, then the short table on its own.
        let both_end = lit_index.min(e2);
        let short_end = lit_index.min(e1);
        let mut p = i + 1;
        while p < both_end {
            let x = buf.load64(p);
            tables.t1.insert(p, tables.t1.prefix(x));
            tables.t2.insert(p, tables.t2.prefix(x));
            p += 1;
        }
        let mut p = p.max(i + 1);
        while p < short_end {
            tables.t1.insert(p, tables.t1.prefix(buf.load64(p)));
            p += 1;
        }
        i = lit_index;
    }

    let end = if flags & NO_TRAILING_LITERALS != 0 && !block.sequences.is_empty() {
        lit_index
    } else {
        block.literals.extend_from_slice(&buf.data()[lit_index..a_end]);
        a_end
    };
    buf.set_w(end);
    Ok(end - w)
}

fn index_dictionary(buf: &ParserBuffer, tables: &mut DoubleTables, window_size: usize) {
    let w = buf.w();
    let from = w.saturating_sub(window_size);
    let to1 = (buf.len() + 1).saturating_sub(tables.t1.input_len()).min(w);
    let to2 = (buf.len() + 1).saturating_sub(tables.t2.input_len()).min(w);
    for i in from..to1 {
        let x = buf.load64(i);
        tables.t1.insert(i, tables.t1.prefix(x));
        if i < to2 {
            tables.t2.insert(i, tables.t2.prefix(x));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DoubleHashParser (DHP)
// ─────────────────────────────────────────────────────────────────────────────

/// Greedy dual-hash parser.
#[derive(Debug)]
pub struct DoubleHashParser {
    buf: ParserBuffer,
    tables: DoubleTables,
    cfg: DhpConfig,
}

impl DoubleHashParser {
    pub fn new(mut cfg: DhpConfig) -> Result<Self, Error> {
        cfg.apply_defaults();
        cfg.verify()?;
        Ok(DoubleHashParser {
            buf: ParserBuffer::new(cfg.buf_config())?,
            tables: DoubleTables::new(
                cfg.input_len1,
                cfg.hash_bits1,
                cfg.input_len2,
                cfg.hash_bits2,
            ),
            cfg,
        })
    }
}

impl Parser for DoubleHashParser {
    fn parse(&mut self, block: Option<&mut Block>, flags: u32) -> Result<usize, Error> {
        parse_block(
            &mut self.buf,
            &mut self.tables,
            self.cfg.min_match_len,
            self.cfg.window_size,
            block,
            flags,
            false,
        )
    }

    fn reset(&mut self, prefill: Option<&[u8]>) -> Result<(), Error> {
        self.buf.reset(prefill)?;
        self.tables.reset();
        index_dictionary(&self.buf, &mut self.tables, self.cfg.window_size);
        Ok(())
    }

    fn shrink(&mut self) -> usize {
        let delta = self.buf.shrink();
        if delta > 0 {
            self.tables.adapt(delta as u32);
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
        Config::Dhp(self.cfg.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BackwardDoubleHashParser (BDHP)
// ─────────────────────────────────────────────────────────────────────────────

/// Dual-hash parser with backward match extension.
#[derive(Debug)]
pub struct BackwardDoubleHashParser {
    buf: ParserBuffer,
    tables: DoubleTables,
    cfg: BdhpConfig,
}

impl BackwardDoubleHashParser {
    pub fn new(mut cfg: BdhpConfig) -> Result<Self, Error> {
        cfg.apply_defaults();
        cfg.verify()?;
        Ok(BackwardDoubleHashParser {
            buf: ParserBuffer::new(cfg.buf_config())?,
            tables: DoubleTables::new(
                cfg.input_len1,
                cfg.hash_bits1,
                cfg.input_len2,
                cfg.hash_bits2,
            ),
            cfg,
        })
    }
}

impl Parser for BackwardDoubleHashParser {
    fn parse(&mut self, block: Option<&mut Block>, flags: u32) -> Result<usize, Error> {
        parse_block(
            &mut self.buf,
            &mut self.tables,
            self.cfg.min_match_len,
            self.cfg.window_size,
            block,
            flags,
            true,
        )
    }

    fn reset(&mut self, prefill: Option<&[u8]>) -> Result<(), Error> {
        self.buf.reset(prefill)?;
        self.tables.reset();
        index_dictionary(&self.buf, &mut self.tables, self.cfg.window_size);
        Ok(())
    }

    fn shrink(&mut self) -> usize {
        let delta = self.buf.shrink();
        if delta > 0 {
            self.tables.adapt(delta as u32);
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
        Config::Bdhp(self.cfg.clone())
    }
}

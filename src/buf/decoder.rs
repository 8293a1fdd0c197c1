//! Write-side inverse of the parser buffer.
//!
//! A [`DecoderBuffer`] reconstructs output from sequences: literal bytes
//! are appended verbatim, matches copy `match_len` bytes from `offset`
//! positions behind the write head.  Since `offset < match_len` is legal,
//! the match copy replicates the trailing run by doubling instead of a
//! single memmove.
//!
//! Sequence validation happens here.  A failing sequence leaves the
//! buffer at the byte boundary of the last fully-applied sequence so the
//! caller can log and discard the remainder of the block.

use crate::parse::types::{Block, Error};

use super::types::MAX_SIZE;

// ─────────────────────────────────────────────────────────────────────────────
// DecoderConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Sizing parameters of a [`DecoderBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum back-reference distance accepted by `write_match`.
    pub window_size: usize,
    /// Maximum arena size; writes beyond it fail with `FullBuffer`.
    pub buffer_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        let mut cfg = DecoderConfig {
            window_size: 0,
            buffer_size: 0,
        };
        cfg.apply_defaults();
        cfg
    }
}

impl DecoderConfig {
    pub fn apply_defaults(&mut self) {
        if self.window_size == 0 {
            self.window_size = 8 << 20;
        }
        if self.buffer_size == 0 {
            self.buffer_size = 2 * self.window_size;
        }
    }

    pub fn verify(&self) -> Result<(), Error> {
        if !(1..=MAX_SIZE).contains(&self.window_size) {
            return Err(Error::Config(format!(
                "window_size={} out of range [1, 2^31]",
                self.window_size
            )));
        }
        if !(self.window_size..=MAX_SIZE).contains(&self.buffer_size) {
            return Err(Error::Config(format!(
                "buffer_size={} out of range [window_size={}, 2^31]",
                self.buffer_size, self.window_size
            )));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DecoderBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// Reconstruction arena with a read cursor for draining decoded bytes.
#[derive(Debug)]
pub struct DecoderBuffer {
    data: Vec<u8>,
    /// Read cursor: `data[..r]` has been drained by the caller.
    r: usize,
    /// Absolute stream offset of `data[0]`.
    start: i64,
    cfg: DecoderConfig,
}

impl DecoderBuffer {
    pub fn new(mut cfg: DecoderConfig) -> Result<Self, Error> {
        cfg.apply_defaults();
        cfg.verify()?;
        Ok(DecoderBuffer {
            data: Vec::new(),
            r: 0,
            start: 0,
            cfg,
        })
    }

    #[inline]
    pub fn config(&self) -> DecoderConfig {
        self.cfg
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decoded bytes not yet drained by [`read`](Self::read).
    #[inline]
    pub fn buffered(&self) -> usize {
        self.data.len() - self.r
    }

    /// Free space before writes report `FullBuffer`.
    #[inline]
    pub fn available(&self) -> usize {
        self.cfg.buffer_size - self.data.len()
    }

    /// Absolute stream position of the write head.
    #[inline]
    pub fn pos(&self) -> i64 {
        self.start + self.data.len() as i64
    }

    /// Append literal bytes.  Atomic on overflow.
    pub fn write(&mut self, p: &[u8]) -> Result<usize, Error> {
        if p.len() > self.available() {
            return Err(Error::FullBuffer);
        }
        self.data.extend_from_slice(p);
        Ok(p.len())
    }

    /// Copy `match_len` bytes from `offset` positions behind the write
    /// head, replicating the tail run when the copy self-overlaps.
    ///
    /// Validation order: a zero offset with a non-zero length and an
    /// offset reaching behind the dictionary are `InvalidOffset`; a length
    /// beyond `window_size` is `InvalidMatchLen`; an overfull arena is
    /// `FullBuffer`.  All failures leave the buffer untouched.
    pub fn write_match(&mut self, match_len: usize, offset: usize) -> Result<(), Error> {
        if match_len == 0 {
            return if offset == 0 {
                Ok(())
            } else {
                Err(Error::InvalidOffset)
            };
        }
        if offset == 0 || offset > self.data.len().min(self.cfg.window_size) {
            return Err(Error::InvalidOffset);
        }
        if match_len > self.cfg.window_size {
            return Err(Error::InvalidMatchLen);
        }
        if match_len > self.available() {
            return Err(Error::FullBuffer);
        }
        let mut rest = match_len;
        let mut off = offset;
        while rest > off {
            let end = self.data.len();
            self.data.extend_from_within(end - off..end);
            rest -= off;
            off *= 2;
        }
        let end = self.data.len();
        self.data.extend_from_within(end - off..end - off + rest);
        Ok(())
    }

    /// Apply every sequence of `blk` in order, literals first, then the
    /// match copy, and finally the trailing literals past `Σ lit_len`.
    ///
    /// Each sequence is atomic: on failure the buffer rolls back to the
    /// boundary of the last fully-applied sequence and the error is
    /// returned.  Returns the number of bytes appended.
    pub fn write_block(&mut self, blk: &Block) -> Result<usize, Error> {
        let start_len = self.data.len();
        let mut lit = 0usize;
        for seq in &blk.sequences {
            let mark = self.data.len();
            let lit_len = seq.lit_len as usize;
            if lit_len > blk.literals.len() - lit {
                return Err(Error::InvalidLitLen);
            }
            if let Err(e) = self.write(&blk.literals[lit..lit + lit_len]) {
                self.data.truncate(mark);
                return Err(e);
            }
            if let Err(e) = self.write_match(seq.match_len as usize, seq.offset as usize) {
                self.data.truncate(mark);
                return Err(e);
            }
            lit += lit_len;
        }
        let mark = self.data.len();
        if let Err(e) = self.write(&blk.literals[lit..]) {
            self.data.truncate(mark);
            return Err(e);
        }
        Ok(self.data.len() - start_len)
    }

    /// Drain decoded bytes into `p`, advancing the read cursor.
    pub fn read(&mut self, p: &mut [u8]) -> usize {
        let n = p.len().min(self.buffered());
        p[..n].copy_from_slice(&self.data[self.r..self.r + n]);
        self.r += n;
        n
    }

    /// Copy bytes starting at the absolute stream offset `off` into `p`.
    pub fn read_at(&self, p: &mut [u8], off: i64) -> Result<usize, Error> {
        if off < self.start || off > self.pos() {
            return Err(Error::OutOfRange);
        }
        let i = (off - self.start) as usize;
        let n = p.len().min(self.data.len() - i);
        p[..n].copy_from_slice(&self.data[i..i + n]);
        Ok(n)
    }

    /// The byte at the absolute stream offset `off`.
    pub fn byte_at(&self, off: i64) -> Result<u8, Error> {
        if off < self.start || off >= self.pos() {
            return Err(Error::OutOfRange);
        }
        Ok(self.data[(off - self.start) as usize])
    }

    /// Compact: drop drained bytes that have also left the dictionary
    /// window.  Returns the number of bytes freed.
    pub fn shrink(&mut self) -> usize {
        let keep_window = self.data.len().saturating_sub(self.cfg.window_size);
        let delta = self.r.min(keep_window);
        if delta == 0 {
            return 0;
        }
        let len = self.data.len();
        self.data.copy_within(delta..len, 0);
        self.data.truncate(len - delta);
        self.r -= delta;
        self.start += delta as i64;
        delta
    }

    /// Drop all state, optionally adopting `prefill` as already-decoded
    /// dictionary content.
    pub fn reset(&mut self, prefill: Option<&[u8]>) -> Result<(), Error> {
        if let Some(p) = prefill {
            if p.len() > self.cfg.buffer_size {
                return Err(Error::Config(format!(
                    "prefill of {} bytes exceeds buffer_size={}",
                    p.len(),
                    self.cfg.buffer_size
                )));
            }
        }
        self.data.clear();
        self.r = 0;
        self.start = 0;
        if let Some(p) = prefill {
            self.data.extend_from_slice(p);
            self.r = p.len();
        }
        Ok(())
    }
}

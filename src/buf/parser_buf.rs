//! The sliding-window arena underneath every parser.
//!
//! A [`ParserBuffer`] owns one contiguous byte arena holding the live
//! dictionary window followed by the look-ahead region.  Three cursors
//! describe it: the write tail (`data.len()`), the parser cursor `w`, and
//! the absolute anchor `start` of `data[0]` in the overall input stream.
//! Stored positions everywhere above this layer are `u32` indexes into
//! `data`; only `start` is 64-bit, so the hot loops never touch 64-bit
//! arithmetic.
//!
//! Invariants between public calls:
//!
//! - `w <= data.len() <= buffer_size`
//! - capacity reserves [`TAIL_MARGIN`] initialized bytes past `data.len()`
//! - `start + w` never regresses
//! - `data[w.saturating_sub(window_size)..w]` is the live dictionary,
//!   `data[w..]` the look-ahead

use std::io;

use crate::parse::types::Error;

use super::types::{equal_prefix_bytes, load32_le, load64_le, KB, MAX_SIZE, TAIL_MARGIN};

// ─────────────────────────────────────────────────────────────────────────────
// BufConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Sizing parameters of a [`ParserBuffer`].  All sizes are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufConfig {
    /// Size of the live dictionary window.
    pub window_size: usize,
    /// Window bytes kept in front of the parser cursor by [`ParserBuffer::shrink`].
    pub shrink_size: usize,
    /// Maximum arena size; `write` fails with `FullBuffer` beyond it.
    pub buffer_size: usize,
    /// Granularity of a single `parse` call.
    pub block_size: usize,
}

impl Default for BufConfig {
    fn default() -> Self {
        let mut cfg = BufConfig {
            window_size: 0,
            shrink_size: 0,
            buffer_size: 0,
            block_size: 0,
        };
        cfg.apply_defaults();
        cfg
    }
}

impl BufConfig {
    /// Fill every zero field with its default value.
    pub fn apply_defaults(&mut self) {
        if self.window_size == 0 {
            self.window_size = 8 << 20;
        }
        if self.shrink_size == 0 {
            self.shrink_size = self.window_size / 2;
        }
        if self.buffer_size == 0 {
            self.buffer_size = 2 * self.window_size;
        }
        if self.block_size == 0 {
            self.block_size = 128 * KB;
        }
    }

    /// Check the config bounds.  All argument validation happens here, once,
    /// so the buffer operations themselves never fail on arguments.
    pub fn verify(&self) -> Result<(), Error> {
        if !(1..=MAX_SIZE).contains(&self.window_size) {
            return Err(Error::Config(format!(
                "window_size={} out of range [1, 2^31]",
                self.window_size
            )));
        }
        if self.shrink_size > self.window_size {
            return Err(Error::Config(format!(
                "shrink_size={} exceeds window_size={}",
                self.shrink_size, self.window_size
            )));
        }
        if !(self.window_size..=MAX_SIZE).contains(&self.buffer_size) {
            return Err(Error::Config(format!(
                "buffer_size={} out of range [window_size={}, 2^31]",
                self.buffer_size, self.window_size
            )));
        }
        if self.block_size == 0 {
            return Err(Error::Config("block_size must be positive".to_string()));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ParserBuffer
// ─────────────────────────────────────────────────────────────────────────────

/// Append-only byte arena with in-place compaction and a stable absolute
/// offset across compactions.
#[derive(Debug)]
pub struct ParserBuffer {
    data: Vec<u8>,
    /// Parser cursor: `data[..w]` has been parsed, `data[w..]` is look-ahead.
    w: usize,
    /// Absolute stream offset of `data[0]`.
    start: i64,
    cfg: BufConfig,
}

impl ParserBuffer {
    pub fn new(mut cfg: BufConfig) -> Result<Self, Error> {
        cfg.apply_defaults();
        cfg.verify()?;
        Ok(ParserBuffer {
            data: Vec::new(),
            w: 0,
            start: 0,
            cfg,
        })
    }

    #[inline]
    pub fn config(&self) -> BufConfig {
        self.cfg
    }

    /// The whole arena: dictionary plus look-ahead.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Parser cursor position within the arena.
    #[inline]
    pub fn w(&self) -> usize {
        self.w
    }

    /// Advance the parser cursor.  `new_w` must not move backwards and must
    /// stay inside the arena; violations are host contract violations.
    #[inline]
    pub(crate) fn set_w(&mut self, new_w: usize) {
        debug_assert!(self.w <= new_w && new_w <= self.data.len());
        self.w = new_w;
    }

    /// Look-ahead bytes not yet consumed by the parser.
    #[inline]
    pub fn buffered(&self) -> usize {
        self.data.len() - self.w
    }

    /// Free space before `write` reports `FullBuffer`.
    #[inline]
    pub fn available(&self) -> usize {
        self.cfg.buffer_size - self.data.len()
    }

    /// Absolute stream position of the parser cursor.
    #[inline]
    pub fn pos(&self) -> i64 {
        self.start + self.w as i64
    }

    /// Absolute stream offset of `data[0]`.
    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    // ── Tail-margin plumbing ─────────────────────────────────────────────

    /// Grow capacity so `new_len + TAIL_MARGIN` bytes fit, doubling from a
    /// 1 KiB floor and clamping at `buffer_size + TAIL_MARGIN`.
    fn ensure_capacity(&mut self, new_len: usize) {
        let need = new_len + TAIL_MARGIN;
        if self.data.capacity() >= need {
            return;
        }
        let mut cap = self.data.capacity().max(KB);
        while cap < need {
            cap *= 2;
        }
        cap = cap.min(self.cfg.buffer_size + TAIL_MARGIN).max(need);
        self.data.reserve_exact(cap - self.data.len());
        debug_assert!(self.data.capacity() >= need);
    }

    /// Zero the margin bytes past `len`.  Must run after every length
    /// change so that eight-byte loads never observe stale or
    /// uninitialized memory.
    fn seal_margin(&mut self) {
        debug_assert!(self.data.capacity() >= self.data.len() + TAIL_MARGIN);
        // SAFETY: capacity covers len + TAIL_MARGIN per ensure_capacity.
        unsafe {
            core::ptr::write_bytes(
                self.data.as_mut_ptr().add(self.data.len()),
                0,
                TAIL_MARGIN,
            );
        }
    }

    // ── Loads (margin-backed) ────────────────────────────────────────────

    /// Eight-byte little-endian load at `i < len`.
    #[inline(always)]
    pub(crate) fn load64(&self, i: usize) -> u64 {
        debug_assert!(i < self.data.len());
        // SAFETY: i < len and the arena keeps TAIL_MARGIN initialized
        // bytes past len, so i + 8 <= len + 7 is in bounds.
        unsafe { load64_le(self.data.as_ptr().add(i)) }
    }

    /// Four-byte little-endian load at `i < len`.
    #[inline(always)]
    #[allow(dead_code)]
    pub(crate) fn load32(&self, i: usize) -> u32 {
        debug_assert!(i < self.data.len());
        // SAFETY: as for load64; 4 <= TAIL_MARGIN + 1.
        unsafe { load32_le(self.data.as_ptr().add(i)) }
    }

    /// Length of the common prefix of `data[j..end]` and `data[i..end]`,
    /// compared eight bytes at a stride.  Requires `j < i <= end <= len`.
    pub(crate) fn match_len(&self, j: usize, i: usize, end: usize) -> usize {
        debug_assert!(j < i && i <= end && end <= self.data.len());
        let limit = end - i;
        let mut k = 0;
        while k < limit {
            let n = equal_prefix_bytes(self.load64(j + k), self.load64(i + k));
            k += n;
            if n < 8 {
                break;
            }
        }
        k.min(limit)
    }

    /// Length of the common suffix of `data[..j]` and `data[..i]`, walking
    /// backward at most `max_back` bytes.
    pub(crate) fn suffix_len(&self, j: usize, i: usize, max_back: usize) -> usize {
        debug_assert!(j <= i && max_back <= j);
        let d = &self.data;
        let mut b = 0;
        while b < max_back && d[j - 1 - b] == d[i - 1 - b] {
            b += 1;
        }
        b
    }

    // ── Public buffer operations ─────────────────────────────────────────

    /// Append `p` to the arena.  Atomic: if `p` does not fit inside
    /// `buffer_size`, nothing is written and `FullBuffer` is returned.
    pub fn write(&mut self, p: &[u8]) -> Result<usize, Error> {
        if p.len() > self.available() {
            return Err(Error::FullBuffer);
        }
        let new_len = self.data.len() + p.len();
        self.ensure_capacity(new_len);
        self.data.extend_from_slice(p);
        self.seal_margin();
        Ok(p.len())
    }

    /// Pump bytes from `r` until the arena is full or the reader is
    /// exhausted.  I/O errors pass through untransformed.
    pub fn read_from(&mut self, r: &mut dyn io::Read) -> io::Result<u64> {
        let mut total: u64 = 0;
        loop {
            let avail = self.available();
            if avail == 0 {
                return Ok(total);
            }
            let chunk = avail.min(32 * KB);
            let old_len = self.data.len();
            self.ensure_capacity(old_len + chunk);
            self.data.resize(old_len + chunk, 0);
            match r.read(&mut self.data[old_len..old_len + chunk]) {
                Ok(0) => {
                    self.data.truncate(old_len);
                    self.seal_margin();
                    return Ok(total);
                }
                Ok(n) => {
                    self.data.truncate(old_len + n);
                    self.seal_margin();
                    total += n as u64;
                }
                Err(e) => {
                    self.data.truncate(old_len);
                    self.seal_margin();
                    if e.kind() == io::ErrorKind::Interrupted {
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Compact the arena down to `shrink_size` bytes in front of the
    /// parser cursor.  Returns the position delta every index holder must
    /// subtract from its stored positions.
    pub fn shrink(&mut self) -> usize {
        let delta = self.w.saturating_sub(self.cfg.shrink_size);
        if delta == 0 {
            return 0;
        }
        let len = self.data.len();
        self.data.copy_within(delta..len, 0);
        self.data.truncate(len - delta);
        self.seal_margin();
        self.w -= delta;
        self.start += delta as i64;
        delta
    }

    /// Drop all state and adopt `prefill` as an already-parsed dictionary:
    /// the cursor lands at `prefill.len()` and `start` returns to zero.
    ///
    /// A prefill larger than `buffer_size` is a configuration error and
    /// leaves the buffer unmodified.
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
        self.w = 0;
        self.start = 0;
        if let Some(p) = prefill {
            self.ensure_capacity(p.len());
            self.data.extend_from_slice(p);
            self.w = p.len();
        } else {
            self.ensure_capacity(0);
        }
        self.seal_margin();
        Ok(())
    }

    /// Copy bytes starting at the absolute stream offset `off` into `p`.
    /// Returns the number of bytes copied (short reads at the arena tail).
    pub fn read_at(&self, p: &mut [u8], off: i64) -> Result<usize, Error> {
        let i = self.index_of(off)?;
        let n = p.len().min(self.data.len() - i);
        p[..n].copy_from_slice(&self.data[i..i + n]);
        Ok(n)
    }

    /// The byte at the absolute stream offset `off`.
    pub fn byte_at(&self, off: i64) -> Result<u8, Error> {
        let i = self.index_of(off)?;
        if i >= self.data.len() {
            return Err(Error::OutOfRange);
        }
        Ok(self.data[i])
    }

    fn index_of(&self, off: i64) -> Result<usize, Error> {
        if off < self.start || off > self.start + self.data.len() as i64 {
            return Err(Error::OutOfRange);
        }
        Ok((off - self.start) as usize)
    }
}

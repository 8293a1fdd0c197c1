//! Sequence records, blocks, and the crate error taxonomy.

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Seq
// ─────────────────────────────────────────────────────────────────────────────

/// One Lempel–Ziv record: emit `lit_len` bytes from the literal stream,
/// then copy `match_len` bytes from `offset` positions before the current
/// output head.
///
/// `offset == 0` is legal iff `match_len == 0` (a pure-literal sequence);
/// otherwise `offset` lies in `[1, window_size]`.  `aux` is opaque payload
/// for upper layers and travels untouched through the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Seq {
    pub lit_len: u32,
    pub match_len: u32,
    pub offset: u32,
    pub aux: u32,
}

impl Seq {
    /// Size of the binary-stable encoding.
    pub const ENCODED_LEN: usize = 16;

    /// Number of output bytes the record stands for.
    #[inline]
    pub fn len(&self) -> u64 {
        self.lit_len as u64 + self.match_len as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binary-stable encoding: four little-endian `u32` fields in record
    /// order.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut b = [0u8; Self::ENCODED_LEN];
        b[0..4].copy_from_slice(&self.lit_len.to_le_bytes());
        b[4..8].copy_from_slice(&self.match_len.to_le_bytes());
        b[8..12].copy_from_slice(&self.offset.to_le_bytes());
        b[12..16].copy_from_slice(&self.aux.to_le_bytes());
        b
    }

    /// Inverse of [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(b: &[u8; Self::ENCODED_LEN]) -> Self {
        Seq {
            lit_len: u32::from_le_bytes(b[0..4].try_into().unwrap()),
            match_len: u32::from_le_bytes(b[4..8].try_into().unwrap()),
            offset: u32::from_le_bytes(b[8..12].try_into().unwrap()),
            aux: u32::from_le_bytes(b[12..16].try_into().unwrap()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Block
// ─────────────────────────────────────────────────────────────────────────────

/// One parser output unit: ordered sequences plus the literal byte stream
/// they draw from.
///
/// Invariant: `Σ seq.lit_len <= literals.len()`.  Literal bytes past the
/// sum are trailing literals emitted after the last sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub sequences: Vec<Seq>,
    pub literals: Vec<u8>,
}

impl Block {
    pub fn new() -> Self {
        Block::default()
    }

    /// Total decoded length: `Σ match_len + literals.len()`.
    pub fn len(&self) -> u64 {
        let matched: u64 = self.sequences.iter().map(|s| s.match_len as u64).sum();
        matched + self.literals.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty() && self.literals.is_empty()
    }

    /// Empty both streams, keeping their allocations.
    pub fn clear(&mut self) {
        self.sequences.clear();
        self.literals.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Error taxonomy
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by the buffers, finders, and parsers.
///
/// `FullBuffer` and `EmptyBuffer` are recoverable: compact or drain,
/// supply more input, then retry.  `Config` is fatal to the operation and
/// leaves the instance unmodified.  The sequence-validation variants are
/// fatal to the current block; the decoder buffer rolls back to the last
/// applied sequence boundary.  I/O errors from `read_from` pass through
/// as `std::io::Error` and never appear here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("buffer is full")]
    FullBuffer,
    #[error("no data available to parse")]
    EmptyBuffer,
    #[error("literal count exceeds available literal bytes")]
    InvalidLitLen,
    #[error("match offset outside the decoded window")]
    InvalidOffset,
    #[error("match length out of range")]
    InvalidMatchLen,
    #[error("absolute offset outside the buffered range")]
    OutOfRange,
}

//! LZ77 parsing engine.
//!
//! This crate turns a byte stream into `(literal run, match)` sequence
//! records for an external entropy coder.  It ships three layers:
//!
//! - **Buffers** ([`buf`]) — the sliding-window arena every parser owns,
//!   with in-place compaction and a stable absolute offset, plus the
//!   decoder-side arena that validates and reconstructs sequences.
//! - **Match finders** — hash tables (single, dual, bucketed), suffix
//!   arrays, and a suffix-ordered B-tree ([`btree`]) that answer "what
//!   matches the bytes at the cursor?".
//! - **Parsers** ([`parse`]) — greedy strategies, greedy with backward
//!   extension, and a shortest-path optimizer driven by a pluggable cost
//!   function.
//!
//! Entropy coding, container framing, and CLI glue are deliberately out
//! of scope; blocks are handed to the caller as plain data.
//!
//! ```
//! use lzparse::{Block, Config, HpConfig, Parser};
//!
//! let cfg = Config::Hp(HpConfig {
//!     window_size: 1 << 16,
//!     ..HpConfig::default()
//! });
//! let mut parser = cfg.new_parser().unwrap();
//! parser.write(b"to be, or not to be, that is the question").unwrap();
//! let mut block = Block::new();
//! let n = parser.parse(Some(&mut block), 0).unwrap();
//! assert_eq!(block.len() as usize, n);
//! ```

pub mod btree;
pub mod buf;
pub mod config;
pub mod lorem;
pub mod parse;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level re-exports for the common API surface
// ─────────────────────────────────────────────────────────────────────────────

/// Sliding-window arena configuration.
pub use buf::BufConfig;
/// Decoder-side arena that validates and reconstructs sequences.
pub use buf::{DecoderBuffer, DecoderConfig};

/// Sequence record and block container.
pub use parse::types::{Block, Seq};
/// Crate-wide error taxonomy.
pub use parse::types::Error;

/// The parser trait every strategy implements.
pub use parse::Parser;
/// Flag suppressing the trailing-literal run of a block.
pub use parse::NO_TRAILING_LITERALS;

/// Parser strategies.
pub use parse::bucket::BucketHashParser;
pub use parse::double::{BackwardDoubleHashParser, DoubleHashParser};
pub use parse::gsap::GreedySuffixArrayParser;
pub use parse::hash::{BackwardHashParser, HashParser};
pub use parse::osap::{Cost, OptimizingSuffixArrayParser, XzCost};

/// Suffix-ordered B-tree match finder.
pub use btree::BTree;

/// Configuration types and the tag-dispatching factory.
pub use config::{
    BdhpConfig, BhpConfig, BupConfig, Config, DhpConfig, GsapConfig, HpConfig, OsapConfig,
};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

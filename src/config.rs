//! Parser configuration: one JSON-stable config type per parser, a
//! tag-dispatching factory, and the budget/effort preset resolver.
//!
//! Every config marshals as `{"Type": "<tag>", ...fields}` with the tags
//! `HP`, `BHP`, `DHP`, `BDHP`, `BUP`, `GSAP`, `OSAP`.  Zero-valued
//! fields mean "use the default"; [`Config::new_parser`] fills them in
//! before validation, so a sparse JSON document is enough to build a
//! parser.

use serde::{Deserialize, Serialize};

use crate::buf::types::MAX_SIZE;
use crate::buf::BufConfig;
use crate::parse::bucket::BucketHashParser;
use crate::parse::double::{BackwardDoubleHashParser, DoubleHashParser};
use crate::parse::gsap::GreedySuffixArrayParser;
use crate::parse::hash::{BackwardHashParser, HashParser, MAX_HASH_BITS};
use crate::parse::osap::OptimizingSuffixArrayParser;
use crate::parse::types::Error;
use crate::parse::Parser;

// ─────────────────────────────────────────────────────────────────────────────
// Shared field validation
// ─────────────────────────────────────────────────────────────────────────────

fn verify_hash_fields(window_size: usize, input_len: usize, hash_bits: u32) -> Result<(), Error> {
    if !(2..=8).contains(&input_len) {
        return Err(Error::Config(format!(
            "input_len={input_len} out of range [2, 8]"
        )));
    }
    let max_bits = MAX_HASH_BITS.min(8 * input_len as u32);
    if hash_bits > max_bits {
        return Err(Error::Config(format!(
            "hash_bits={hash_bits} exceeds maximum {max_bits} for input_len={input_len}"
        )));
    }
    if window_size < input_len {
        return Err(Error::Config(format!(
            "window_size={window_size} below input_len={input_len}"
        )));
    }
    Ok(())
}

fn verify_match_lens(min_match_len: usize, max_match_len: usize) -> Result<(), Error> {
    if min_match_len < 2 {
        return Err(Error::Config(format!(
            "min_match_len={min_match_len} below minimum 2"
        )));
    }
    if max_match_len < min_match_len {
        return Err(Error::Config(format!(
            "max_match_len={max_match_len} below min_match_len={min_match_len}"
        )));
    }
    Ok(())
}

macro_rules! buf_fields_defaults {
    ($cfg:expr) => {{
        let mut b = BufConfig {
            window_size: $cfg.window_size,
            shrink_size: $cfg.shrink_size,
            buffer_size: $cfg.buffer_size,
            block_size: $cfg.block_size,
        };
        b.apply_defaults();
        $cfg.window_size = b.window_size;
        $cfg.shrink_size = b.shrink_size;
        $cfg.buffer_size = b.buffer_size;
        $cfg.block_size = b.block_size;
    }};
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-parser configs
// ─────────────────────────────────────────────────────────────────────────────

/// Single-hash greedy parser configuration (tag `HP`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HpConfig {
    pub window_size: usize,
    pub shrink_size: usize,
    pub buffer_size: usize,
    pub block_size: usize,
    pub input_len: usize,
    pub hash_bits: u32,
    pub min_match_len: usize,
}

impl HpConfig {
    pub fn apply_defaults(&mut self) {
        buf_fields_defaults!(self);
        if self.input_len == 0 {
            self.input_len = 3;
        }
        if self.hash_bits == 0 {
            self.hash_bits = 18;
        }
        if self.min_match_len == 0 {
            self.min_match_len = self.input_len.max(3);
        }
    }

    pub fn verify(&self) -> Result<(), Error> {
        self.buf_config().verify()?;
        verify_hash_fields(self.window_size, self.input_len, self.hash_bits)?;
        verify_match_lens(self.min_match_len, self.min_match_len)
    }

    pub fn buf_config(&self) -> BufConfig {
        BufConfig {
            window_size: self.window_size,
            shrink_size: self.shrink_size,
            buffer_size: self.buffer_size,
            block_size: self.block_size,
        }
    }
}

/// Backward-extending single-hash parser configuration (tag `BHP`).
pub type BhpConfig = HpConfig;

/// Dual-hash greedy parser configuration (tag `DHP`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DhpConfig {
    pub window_size: usize,
    pub shrink_size: usize,
    pub buffer_size: usize,
    pub block_size: usize,
    pub input_len1: usize,
    pub hash_bits1: u32,
    pub input_len2: usize,
    pub hash_bits2: u32,
    pub min_match_len: usize,
}

impl DhpConfig {
    pub fn apply_defaults(&mut self) {
        buf_fields_defaults!(self);
        if self.input_len1 == 0 {
            self.input_len1 = 3;
        }
        if self.hash_bits1 == 0 {
            self.hash_bits1 = 18;
        }
        if self.input_len2 == 0 {
            self.input_len2 = 7;
        }
        if self.hash_bits2 == 0 {
            self.hash_bits2 = 18;
        }
        if self.min_match_len == 0 {
            self.min_match_len = self.input_len1.max(3);
        }
    }

    pub fn verify(&self) -> Result<(), Error> {
        self.buf_config().verify()?;
        verify_hash_fields(self.window_size, self.input_len1, self.hash_bits1)?;
        verify_hash_fields(self.window_size, self.input_len2, self.hash_bits2)?;
        if self.input_len1 >= self.input_len2 {
            return Err(Error::Config(format!(
                "input_len1={} must be smaller than input_len2={}",
                self.input_len1, self.input_len2
            )));
        }
        verify_match_lens(self.min_match_len, self.min_match_len)
    }

    pub fn buf_config(&self) -> BufConfig {
        BufConfig {
            window_size: self.window_size,
            shrink_size: self.shrink_size,
            buffer_size: self.buffer_size,
            block_size: self.block_size,
        }
    }
}

/// Backward-extending dual-hash parser configuration (tag `BDHP`).
pub type BdhpConfig = DhpConfig;

/// Bucket-hash parser configuration (tag `BUP`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BupConfig {
    pub window_size: usize,
    pub shrink_size: usize,
    pub buffer_size: usize,
    pub block_size: usize,
    pub input_len: usize,
    pub hash_bits: u32,
    pub bucket_size: usize,
    pub min_match_len: usize,
}

impl BupConfig {
    pub fn apply_defaults(&mut self) {
        buf_fields_defaults!(self);
        if self.input_len == 0 {
            self.input_len = 3;
        }
        if self.hash_bits == 0 {
            self.hash_bits = 16;
        }
        if self.bucket_size == 0 {
            self.bucket_size = 8;
        }
        if self.min_match_len == 0 {
            self.min_match_len = self.input_len.max(3);
        }
    }

    pub fn verify(&self) -> Result<(), Error> {
        self.buf_config().verify()?;
        verify_hash_fields(self.window_size, self.input_len, self.hash_bits)?;
        verify_match_lens(self.min_match_len, self.min_match_len)
    }

    pub fn buf_config(&self) -> BufConfig {
        BufConfig {
            window_size: self.window_size,
            shrink_size: self.shrink_size,
            buffer_size: self.buffer_size,
            block_size: self.block_size,
        }
    }
}

/// Suffix-array parser configuration, shared by the greedy (tag `GSAP`)
/// and optimizing (tag `OSAP`) variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GsapConfig {
    pub window_size: usize,
    pub shrink_size: usize,
    pub buffer_size: usize,
    pub block_size: usize,
    pub min_match_len: usize,
    pub max_match_len: usize,
}

impl GsapConfig {
    pub fn apply_defaults(&mut self) {
        buf_fields_defaults!(self);
        if self.min_match_len == 0 {
            self.min_match_len = 3;
        }
        if self.max_match_len == 0 {
            self.max_match_len = 273;
        }
    }

    pub fn verify(&self) -> Result<(), Error> {
        self.buf_config().verify()?;
        verify_match_lens(self.min_match_len, self.max_match_len)
    }

    pub fn buf_config(&self) -> BufConfig {
        BufConfig {
            window_size: self.window_size,
            shrink_size: self.shrink_size,
            buffer_size: self.buffer_size,
            block_size: self.block_size,
        }
    }
}

/// Optimizing suffix-array parser configuration (tag `OSAP`).
pub type OsapConfig = GsapConfig;

// ─────────────────────────────────────────────────────────────────────────────
// Config enum + factory
// ─────────────────────────────────────────────────────────────────────────────

/// Tagged union over every parser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum Config {
    #[serde(rename = "HP")]
    Hp(HpConfig),
    #[serde(rename = "BHP")]
    Bhp(BhpConfig),
    #[serde(rename = "DHP")]
    Dhp(DhpConfig),
    #[serde(rename = "BDHP")]
    Bdhp(BdhpConfig),
    #[serde(rename = "BUP")]
    Bup(BupConfig),
    #[serde(rename = "GSAP")]
    Gsap(GsapConfig),
    #[serde(rename = "OSAP")]
    Osap(OsapConfig),
}

impl Config {
    /// Fill zero fields with their defaults.
    pub fn apply_defaults(&mut self) {
        match self {
            Config::Hp(c) | Config::Bhp(c) => c.apply_defaults(),
            Config::Dhp(c) | Config::Bdhp(c) => c.apply_defaults(),
            Config::Bup(c) => c.apply_defaults(),
            Config::Gsap(c) | Config::Osap(c) => c.apply_defaults(),
        }
    }

    pub fn verify(&self) -> Result<(), Error> {
        match self {
            Config::Hp(c) | Config::Bhp(c) => c.verify(),
            Config::Dhp(c) | Config::Bdhp(c) => c.verify(),
            Config::Bup(c) => c.verify(),
            Config::Gsap(c) | Config::Osap(c) => c.verify(),
        }
    }

    pub fn buf_config(&self) -> BufConfig {
        match self {
            Config::Hp(c) | Config::Bhp(c) => c.buf_config(),
            Config::Dhp(c) | Config::Bdhp(c) => c.buf_config(),
            Config::Bup(c) => c.buf_config(),
            Config::Gsap(c) | Config::Osap(c) => c.buf_config(),
        }
    }

    /// Build the parser this config describes.
    pub fn new_parser(&self) -> Result<Box<dyn Parser>, Error> {
        Ok(match self.clone() {
            Config::Hp(c) => Box::new(HashParser::new(c)?),
            Config::Bhp(c) => Box::new(BackwardHashParser::new(c)?),
            Config::Dhp(c) => Box::new(DoubleHashParser::new(c)?),
            Config::Bdhp(c) => Box::new(BackwardDoubleHashParser::new(c)?),
            Config::Bup(c) => Box::new(BucketHashParser::new(c)?),
            Config::Gsap(c) => Box::new(GreedySuffixArrayParser::new(c)?),
            Config::Osap(c) => Box::new(OptimizingSuffixArrayParser::new(c)?),
        })
    }

    /// Marshal as the tagged JSON document.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("config serialization is infallible")
    }

    /// Unmarshal a tagged JSON document.
    pub fn from_json(s: &str) -> Result<Config, Error> {
        serde_json::from_str(s).map_err(|e| Error::Config(format!("bad config JSON: {e}")))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Budget presets
// ─────────────────────────────────────────────────────────────────────────────

/// One preset row: the smallest memory budget that affords the listed
/// table geometry.  Rows are ordered by ascending budget; the resolver
/// binary-searches for the largest row that still fits.
struct SingleRow {
    budget: u64,
    input_len: usize,
    hash_bits: u32,
}

const fn single_row(input_len: usize, hash_bits: u32) -> SingleRow {
    SingleRow {
        budget: 8 << hash_bits,
        input_len,
        hash_bits,
    }
}

static SINGLE_ROWS: &[SingleRow] = &[
    single_row(3, 11),
    single_row(3, 12),
    single_row(3, 13),
    single_row(3, 14),
    single_row(3, 15),
    single_row(4, 16),
    single_row(4, 17),
    single_row(4, 18),
    single_row(4, 19),
    single_row(5, 20),
    single_row(5, 21),
    single_row(5, 22),
    single_row(5, 23),
    single_row(5, 24),
];

struct DoubleRow {
    budget: u64,
    input_len1: usize,
    hash_bits1: u32,
    input_len2: usize,
    hash_bits2: u32,
}

const fn double_row(il1: usize, hb1: u32, il2: usize, hb2: u32) -> DoubleRow {
    DoubleRow {
        budget: (8 << hb1) + (8 << hb2),
        input_len1: il1,
        hash_bits1: hb1,
        input_len2: il2,
        hash_bits2: hb2,
    }
}

static DOUBLE_ROWS: &[DoubleRow] = &[
    double_row(3, 11, 6, 12),
    double_row(3, 12, 6, 13),
    double_row(3, 13, 6, 14),
    double_row(3, 14, 6, 15),
    double_row(3, 15, 7, 16),
    double_row(3, 16, 7, 17),
    double_row(3, 17, 7, 18),
    double_row(3, 18, 7, 19),
    double_row(4, 19, 8, 20),
    double_row(4, 20, 8, 21),
    double_row(4, 21, 8, 22),
    double_row(4, 22, 8, 23),
    double_row(4, 23, 8, 24),
];

/// Hash-bit ceiling per effort level; the upper effort of each parser
/// band unlocks the full tables.
fn effort_bits_cap(effort: u32) -> u32 {
    match effort {
        1 | 3 => 16,
        5 | 8 => 15,
        6 => 19,
        _ => 24,
    }
}

impl Config {
    /// Resolve `(memory_budget, effort, window_size)` into a concrete
    /// parser configuration.
    ///
    /// Efforts 1–2 use the single-hash parser, 3–4 its backward variant,
    /// 5–7 the dual-hash parser, and 8–9 its backward variant.  The
    /// budget left after the window allocation selects the largest
    /// fitting table row.
    pub fn from_budget(
        memory_budget: u64,
        effort: u32,
        window_size: usize,
    ) -> Result<Config, Error> {
        if !(1..=9).contains(&effort) {
            return Err(Error::Config(format!("effort={effort} out of range [1, 9]")));
        }
        if window_size == 0 || window_size > MAX_SIZE {
            return Err(Error::Config(format!(
                "window_size={window_size} out of range [1, 2^31]"
            )));
        }
        // The arena defaults to twice the window; what remains pays for
        // the hash tables.
        let window_alloc = 2 * window_size as u64;
        let table_budget = memory_budget.saturating_sub(window_alloc);
        let bits_cap = effort_bits_cap(effort);

        if effort <= 4 {
            let idx = SINGLE_ROWS
                .partition_point(|r| r.budget <= table_budget && r.hash_bits <= bits_cap);
            if idx == 0 {
                return Err(Error::Config(format!(
                    "memory budget {memory_budget} too small for window_size={window_size}"
                )));
            }
            let row = &SINGLE_ROWS[idx - 1];
            let cfg = HpConfig {
                window_size,
                input_len: row.input_len,
                hash_bits: row.hash_bits,
                ..HpConfig::default()
            };
            return Ok(if effort <= 2 {
                Config::Hp(cfg)
            } else {
                Config::Bhp(cfg)
            });
        }

        let idx =
            DOUBLE_ROWS.partition_point(|r| r.budget <= table_budget && r.hash_bits2 <= bits_cap);
        if idx == 0 {
            return Err(Error::Config(format!(
                "memory budget {memory_budget} too small for window_size={window_size}"
            )));
        }
        let row = &DOUBLE_ROWS[idx - 1];
        let cfg = DhpConfig {
            window_size,
            input_len1: row.input_len1,
            hash_bits1: row.hash_bits1,
            input_len2: row.input_len2,
            hash_bits2: row.hash_bits2,
            ..DhpConfig::default()
        };
        Ok(if effort <= 7 {
            Config::Dhp(cfg)
        } else {
            Config::Bdhp(cfg)
        })
    }
}

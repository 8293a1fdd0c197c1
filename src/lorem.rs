//! Deterministic filler-text generator.
//!
//! Tests and benchmarks need compressible input with stable content; the
//! generator below produces prose-shaped text from a small word pool and
//! a seeded xorshift generator, so every run sees identical bytes
//! without shipping a corpus file.

/// Word pool.  Small on purpose: the repetition is what makes the output
/// compressible.
static WORDS: &[&str] = &[
    "stream", "window", "buffer", "cursor", "offset", "block", "parser", "anchor", "marker",
    "record", "lattice", "vector", "segment", "bucket", "branch", "ledger", "packet", "signal",
    "filter", "margin", "region", "handle", "mirror", "copper", "timber", "harbor", "meadow",
    "bridge", "garden", "lantern", "raven", "cedar", "stone", "river", "ember", "frost",
    "the", "a", "of", "and", "or", "to", "in", "over", "under", "with", "near", "past",
];

/// 64-bit xorshift-multiply generator.  Seed zero is remapped so the
/// state never sticks at zero.
#[derive(Debug, Clone)]
pub struct LoremRng {
    state: u64,
}

impl LoremRng {
    pub fn new(seed: u64) -> Self {
        LoremRng {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform value in `[0, range)`.
    #[inline]
    pub fn below(&mut self, range: usize) -> usize {
        (((self.next_u64() >> 32) * range as u64) >> 32) as usize
    }
}

/// Generate `len` bytes of sentence-shaped text from `seed`.
pub fn lorem(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = LoremRng::new(seed);
    let mut out = Vec::with_capacity(len + 16);
    let mut sentence_left = 0usize;
    let mut capitalize = true;
    while out.len() < len {
        if sentence_left == 0 {
            sentence_left = 6 + rng.below(12);
            capitalize = true;
        }
        let word = WORDS[rng.below(WORDS.len())].as_bytes();
        let start = out.len();
        out.extend_from_slice(word);
        if capitalize {
            out[start] = out[start].to_ascii_uppercase();
            capitalize = false;
        }
        sentence_left -= 1;
        if sentence_left == 0 {
            out.extend_from_slice(b". ");
        } else {
            out.push(b' ');
        }
    }
    out.truncate(len);
    out
}

// Shared helpers for the integration tests: a streaming compression
// driver, a decoding loop over the decoder buffer, and the invariant
// checks every round-trip test applies.

// Not every test target uses every helper.
#![allow(dead_code)]

use std::io::Cursor;

use lzparse::{Block, Config, DecoderBuffer, DecoderConfig, Error, Parser, XzCost, Cost};

/// Drive `parser` over `input` the way a caller would: pump bytes with
/// `read_from`, parse block by block, compact when the arena fills up.
pub fn compress(parser: &mut dyn Parser, input: &[u8], flags: u32) -> Vec<Block> {
    let mut rdr = Cursor::new(input);
    let mut blocks = Vec::new();
    let mut block = Block::new();
    loop {
        parser.read_from(&mut rdr).expect("in-memory reader");
        match parser.parse(Some(&mut block), flags) {
            Ok(n) => {
                assert!(n >= 1, "parse must make progress");
                blocks.push(block.clone());
            }
            Err(Error::EmptyBuffer) => {
                if rdr.position() as usize >= input.len() {
                    return blocks;
                }
                parser.shrink();
            }
            Err(e) => panic!("parse failed: {e}"),
        }
        parser.shrink();
    }
}

/// Decode `blocks` through a decoder buffer with the given window.
pub fn decode(blocks: &[Block], window_size: usize, block_size: usize) -> Vec<u8> {
    let mut dec = DecoderBuffer::new(DecoderConfig {
        window_size,
        buffer_size: window_size + 2 * block_size + 4096,
    })
    .expect("decoder config");
    let mut out = Vec::new();
    let mut chunk = [0u8; 4096];
    for blk in blocks {
        dec.write_block(blk).expect("valid block");
        loop {
            let n = dec.read(&mut chunk);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        dec.shrink();
    }
    out
}

/// Check the block invariants: literal accounting, offset validity
/// against the bytes decoded so far, and total length.
pub fn check_blocks(blocks: &[Block], window_size: usize) {
    let mut produced: u64 = 0;
    for blk in blocks {
        let lit_sum: u64 = blk.sequences.iter().map(|s| s.lit_len as u64).sum();
        assert!(
            lit_sum <= blk.literals.len() as u64,
            "literal runs exceed the literal stream"
        );
        let mut here = produced;
        for seq in &blk.sequences {
            here += seq.lit_len as u64;
            if seq.match_len == 0 {
                assert_eq!(seq.offset, 0, "pure-literal sequence with an offset");
            } else {
                assert!(seq.offset >= 1, "zero offset on a match");
                assert!(
                    (seq.offset as u64) <= here.min(window_size as u64),
                    "offset {} beyond window/decoded prefix",
                    seq.offset
                );
            }
            here += seq.match_len as u64;
        }
        produced += blk.len();
    }
}

/// Full round-trip through `cfg`: compress, check invariants, decode,
/// compare.  Returns the blocks for further scenario-specific checks.
pub fn assert_roundtrip(cfg: &Config, input: &[u8]) -> Vec<Block> {
    let mut parser = cfg.new_parser().expect("valid config");
    let bc = parser.buf_config();
    let blocks = compress(parser.as_mut(), input, 0);
    check_blocks(&blocks, bc.window_size);
    let out = decode(&blocks, bc.window_size, bc.block_size);
    assert_eq!(out, input, "decode mismatch for {:?}", cfg);
    blocks
}

/// Bit cost of the blocks under the canonical cost model, literal runs
/// included.
pub fn xz_cost_bits(blocks: &[Block]) -> u64 {
    let c = XzCost;
    let mut bits: u64 = 0;
    for blk in blocks {
        let mut lit_sum: usize = 0;
        for seq in &blk.sequences {
            bits += c.cost(seq.lit_len, 0) as u64;
            bits += c.cost(seq.match_len, seq.offset) as u64;
            lit_sum += seq.lit_len as usize;
        }
        bits += c.cost((blk.literals.len() - lit_sum) as u32, 0) as u64;
    }
    bits
}

/// One small-window configuration per parser type.
pub fn all_configs(window_size: usize, block_size: usize) -> Vec<Config> {
    use lzparse::{BupConfig, DhpConfig, GsapConfig, HpConfig};
    let hp = HpConfig {
        window_size,
        block_size,
        ..HpConfig::default()
    };
    let dhp = DhpConfig {
        window_size,
        block_size,
        ..DhpConfig::default()
    };
    let bup = BupConfig {
        window_size,
        block_size,
        ..BupConfig::default()
    };
    let sap = GsapConfig {
        window_size,
        block_size,
        ..GsapConfig::default()
    };
    vec![
        Config::Hp(hp.clone()),
        Config::Bhp(hp),
        Config::Dhp(dhp.clone()),
        Config::Bdhp(dhp),
        Config::Bup(bup),
        Config::Gsap(sap.clone()),
        Config::Osap(sap),
    ]
}

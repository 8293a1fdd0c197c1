// Dual-hash parsers: long-prefix preference, the partial re-hash after
// matches, and round-trips against mixed content.

use lzparse::{Block, Config, DhpConfig, Parser};

use super::util;

fn dhp_cfg() -> DhpConfig {
    DhpConfig {
        window_size: 1 << 16,
        input_len1: 3,
        hash_bits1: 12,
        input_len2: 7,
        hash_bits2: 12,
        ..DhpConfig::default()
    }
}

#[test]
fn long_table_candidate_wins() {
    // "abcdefg" repeats at distance 40, but "abc" also repeats at a
    // nearer distance with a different continuation.  The long table
    // must pick the seven-byte repeat, not the nearer three-byte one.
    let mut input = Vec::new();
    input.extend_from_slice(b"abcdefg");
    input.extend_from_slice(b"0123456789ABCDEFGHIJKLMNO");
    input.extend_from_slice(b"abcQRSTU");
    input.extend_from_slice(b"abcdefgh");
    let mut p = Config::Dhp(dhp_cfg()).new_parser().unwrap();
    p.write(&input).unwrap();
    let mut blk = Block::new();
    p.parse(Some(&mut blk), 0).unwrap();
    let long_match = blk
        .sequences
        .iter()
        .find(|s| s.match_len >= 7)
        .expect("seven-byte repeat must be found");
    assert_eq!(long_match.offset, 40);
}

#[test]
fn round_trips_text_and_binary() {
    let text = lzparse::lorem::lorem(48 * 1024, 5);
    util::assert_roundtrip(&Config::Dhp(dhp_cfg()), &text);
    util::assert_roundtrip(&Config::Bdhp(dhp_cfg()), &text);

    let binary: Vec<u8> = (0..32 * 1024u32)
        .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
        .collect();
    util::assert_roundtrip(&Config::Dhp(dhp_cfg()), &binary);
    util::assert_roundtrip(&Config::Bdhp(dhp_cfg()), &binary);
}

#[test]
fn small_blocks_preserve_the_stream() {
    // A tiny block size forces many parse calls and exercises the
    // re-hash bounds at every block tail.
    let cfg = DhpConfig {
        block_size: 64,
        ..dhp_cfg()
    };
    let input = lzparse::lorem::lorem(8 * 1024, 9);
    util::assert_roundtrip(&Config::Dhp(cfg.clone()), &input);
    util::assert_roundtrip(&Config::Bdhp(cfg), &input);
}

#[test]
fn backward_variant_emits_no_shorter_matches() {
    let input = lzparse::lorem::lorem(16 * 1024, 13);
    let plain = util::assert_roundtrip(&Config::Dhp(dhp_cfg()), &input);
    let back = util::assert_roundtrip(&Config::Bdhp(dhp_cfg()), &input);
    let matched = |blocks: &[Block]| -> u64 {
        blocks
            .iter()
            .flat_map(|b| b.sequences.iter())
            .map(|s| s.match_len as u64)
            .sum()
    };
    assert!(matched(&back) >= matched(&plain));
}

#[test]
fn shrink_keeps_candidates_valid() {
    // Cycle write/parse/shrink long enough that the arena compacts
    // several times; decoding validates every emitted offset.
    let cfg = DhpConfig {
        window_size: 2048,
        shrink_size: 1024,
        buffer_size: 4096,
        block_size: 512,
        ..dhp_cfg()
    };
    let input = lzparse::lorem::lorem(64 * 1024, 21);
    util::assert_roundtrip(&Config::Bdhp(cfg), &input);
}

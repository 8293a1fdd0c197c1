// Greedy suffix-array parser: lexicographic neighbour matching, lazy
// rebuilds, and round-trips.

use lzparse::{Block, Config, GsapConfig, Parser};

use super::util;

fn gsap_cfg() -> GsapConfig {
    GsapConfig {
        window_size: 1 << 14,
        block_size: 4096,
        ..GsapConfig::default()
    }
}

#[test]
fn finds_repeats_without_hashing() {
    let input = b"the quick fox; the quick dog; the quick end";
    let blocks = util::assert_roundtrip(&Config::Gsap(gsap_cfg()), input);
    let matched: u64 = blocks
        .iter()
        .flat_map(|b| b.sequences.iter())
        .map(|s| s.match_len as u64)
        .sum();
    assert!(matched >= 18, "two 'the quick ' repeats expected");
}

#[test]
fn uniform_run_collapses() {
    let input = [b'a'; 64];
    let blocks = util::assert_roundtrip(&Config::Gsap(gsap_cfg()), &input);
    let blk = &blocks[0];
    assert_eq!(blk.sequences.len(), 1);
    assert_eq!(blk.sequences[0].match_len, 63);
    assert_eq!(blk.sequences[0].offset, 1);
}

#[test]
fn match_length_respects_the_configured_maximum() {
    let cfg = GsapConfig {
        max_match_len: 16,
        ..gsap_cfg()
    };
    let input = [b'z'; 256];
    let blocks = util::assert_roundtrip(&Config::Gsap(cfg), &input);
    for seq in blocks.iter().flat_map(|b| b.sequences.iter()) {
        assert!(seq.match_len <= 16);
    }
}

#[test]
fn multi_block_rebuild_round_trips() {
    let cfg = GsapConfig {
        window_size: 2048,
        shrink_size: 512,
        buffer_size: 4096,
        block_size: 512,
        ..GsapConfig::default()
    };
    let input = lzparse::lorem::lorem(24 * 1024, 31);
    util::assert_roundtrip(&Config::Gsap(cfg), &input);
}

#[test]
fn skip_then_parse_uses_skipped_dictionary() {
    let mut p = Config::Gsap(gsap_cfg()).new_parser().unwrap();
    p.write(b"distinctive phrase here!").unwrap();
    p.parse(None, 0).unwrap();
    p.write(b"distinctive phrase again").unwrap();
    let mut blk = Block::new();
    p.parse(Some(&mut blk), 0).unwrap();
    let best = blk
        .sequences
        .iter()
        .max_by_key(|s| s.match_len)
        .expect("repeat must match");
    assert!(best.match_len >= 18);
    assert_eq!(best.offset, 24);
}

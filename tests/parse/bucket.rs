// Bucket-hash parser: multi-candidate scoring, longest-then-nearest
// selection, and round-trips.

use lzparse::{Block, BupConfig, Config, Parser};

use super::util;

fn bup_cfg() -> BupConfig {
    BupConfig {
        window_size: 1 << 14,
        input_len: 3,
        hash_bits: 10,
        bucket_size: 4,
        ..BupConfig::default()
    }
}

#[test]
fn picks_the_longest_of_several_candidates() {
    // Three occurrences of "abc" with different continuations; only the
    // middle one extends to "abcdef".  A single-entry table would have
    // been overwritten by the last occurrence.
    let mut input = Vec::new();
    input.extend_from_slice(b"abcdefXX");
    input.extend_from_slice(b"abcZZZZZ");
    input.extend_from_slice(b"abcdefgh");
    let mut p = Config::Bup(bup_cfg()).new_parser().unwrap();
    p.write(&input).unwrap();
    let mut blk = Block::new();
    p.parse(Some(&mut blk), 0).unwrap();
    let best = blk
        .sequences
        .iter()
        .max_by_key(|s| s.match_len)
        .expect("matches expected");
    assert!(best.match_len >= 6, "bucket must keep the longer candidate");
    assert_eq!(best.offset, 16);
}

#[test]
fn nearest_candidate_wins_ties() {
    // Two identical continuations; the closer occurrence gives the
    // smaller offset and must win the tie.
    let mut input = Vec::new();
    input.extend_from_slice(b"tokenA..");
    input.extend_from_slice(b"tokenB..");
    input.extend_from_slice(b"tokenC..");
    let mut p = Config::Bup(bup_cfg()).new_parser().unwrap();
    p.write(&input).unwrap();
    let mut blk = Block::new();
    p.parse(Some(&mut blk), 0).unwrap();
    let tok = blk
        .sequences
        .iter()
        .find(|s| s.match_len >= 5)
        .expect("'token' repeats");
    assert_eq!(tok.offset, 8, "nearest equal-length candidate must win");
}

#[test]
fn round_trips_across_bucket_sizes() {
    let input = lzparse::lorem::lorem(24 * 1024, 17);
    for bucket_size in [1, 2, 8, 16] {
        let cfg = BupConfig {
            bucket_size,
            ..bup_cfg()
        };
        util::assert_roundtrip(&Config::Bup(cfg), &input);
    }
}

#[test]
fn shrink_with_buckets_round_trips() {
    let cfg = BupConfig {
        window_size: 2048,
        shrink_size: 512,
        buffer_size: 4096,
        block_size: 1024,
        ..bup_cfg()
    };
    let input = lzparse::lorem::lorem(32 * 1024, 29);
    util::assert_roundtrip(&Config::Bup(cfg), &input);
}

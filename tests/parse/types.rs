// Sequence records and blocks: encoding stability and accounting.

use lzparse::{Block, Seq};

#[test]
fn seq_encoding_is_sixteen_little_endian_bytes() {
    let s = Seq {
        lit_len: 1,
        match_len: 2,
        offset: 0x0102_0304,
        aux: 0xAABB_CCDD,
    };
    let b = s.to_bytes();
    assert_eq!(b.len(), Seq::ENCODED_LEN);
    assert_eq!(&b[0..4], &[1, 0, 0, 0]);
    assert_eq!(&b[4..8], &[2, 0, 0, 0]);
    assert_eq!(&b[8..12], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&b[12..16], &[0xDD, 0xCC, 0xBB, 0xAA]);
    assert_eq!(Seq::from_bytes(&b), s);
}

#[test]
fn aux_travels_untouched() {
    let s = Seq {
        lit_len: 0,
        match_len: 0,
        offset: 0,
        aux: 42,
    };
    assert_eq!(Seq::from_bytes(&s.to_bytes()).aux, 42);
}

#[test]
fn block_len_and_clear() {
    let mut blk = Block {
        sequences: vec![Seq {
            lit_len: 4,
            match_len: 6,
            offset: 2,
            aux: 0,
        }],
        literals: b"abcdef".to_vec(),
    };
    // 6 matched bytes plus 6 literal bytes (4 in-run + 2 trailing).
    assert_eq!(blk.len(), 12);
    blk.clear();
    assert!(blk.is_empty());
    assert_eq!(blk.len(), 0);
}

// Decoder-buffer behaviour: overlap-tolerant match copies, the
// validation ladder, and block-level atomicity with rollback.

use lzparse::{Block, DecoderBuffer, DecoderConfig, Error, Seq};

fn dec(window: usize, buffer: usize) -> DecoderBuffer {
    DecoderBuffer::new(DecoderConfig {
        window_size: window,
        buffer_size: buffer,
    })
    .unwrap()
}

fn drain(d: &mut DecoderBuffer) -> Vec<u8> {
    let mut out = Vec::new();
    let mut chunk = [0u8; 64];
    loop {
        let n = d.read(&mut chunk);
        if n == 0 {
            return out;
        }
        out.extend_from_slice(&chunk[..n]);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// write_match
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn long_copy_within_window() {
    let mut d = dec(64, 256);
    d.write(b"abcdefgh").unwrap();
    d.write_match(8, 8).unwrap();
    assert_eq!(drain(&mut d), b"abcdefghabcdefgh");
}

#[test]
fn self_overlap_doubles_the_run() {
    let mut d = dec(64, 256);
    d.write(b"xyz").unwrap();
    d.write_match(10, 3).unwrap();
    assert_eq!(drain(&mut d), b"xyzxyzxyzxyzx");
}

#[test]
fn offset_one_replicates_one_byte() {
    let mut d = dec(64, 256);
    d.write(b"Q").unwrap();
    d.write_match(20, 1).unwrap();
    assert_eq!(drain(&mut d), [b'Q'; 21]);
}

#[test]
fn validation_ladder() {
    let mut d = dec(16, 64);
    d.write(b"abcd").unwrap();
    // Zero offset with a length.
    assert_eq!(d.write_match(1, 0), Err(Error::InvalidOffset));
    // Offset beyond the decoded prefix.
    assert_eq!(d.write_match(1, 5), Err(Error::InvalidOffset));
    // Length beyond the window.
    assert_eq!(d.write_match(17, 2), Err(Error::InvalidMatchLen));
    // Overfull arena, atomic.
    d.write(&[b'x'; 56]).unwrap();
    assert_eq!(d.write_match(16, 2), Err(Error::FullBuffer));
    assert_eq!(d.len(), 60);
    // Offset beyond the window even though the prefix is longer.
    assert_eq!(d.write_match(2, 17), Err(Error::InvalidOffset));
}

// ─────────────────────────────────────────────────────────────────────────────
// write_block
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn block_applies_sequences_then_trailing_literals() {
    let mut d = dec(64, 256);
    let blk = Block {
        sequences: vec![
            Seq {
                lit_len: 3,
                match_len: 3,
                offset: 3,
                aux: 0,
            },
            Seq {
                lit_len: 1,
                match_len: 4,
                offset: 2,
                aux: 0,
            },
        ],
        literals: b"abc_tail".to_vec(),
    };
    let n = d.write_block(&blk).unwrap();
    assert_eq!(n as u64, blk.len());
    assert_eq!(drain(&mut d), b"abcabc_c_c_tail");
}

#[test]
fn failing_sequence_rolls_back_to_previous_boundary() {
    let mut d = dec(64, 256);
    let blk = Block {
        sequences: vec![
            Seq {
                lit_len: 2,
                match_len: 2,
                offset: 2,
                aux: 0,
            },
            // Offset far beyond the decoded prefix: must fail.
            Seq {
                lit_len: 2,
                match_len: 3,
                offset: 40,
                aux: 0,
            },
        ],
        literals: b"abcd".to_vec(),
    };
    assert_eq!(d.write_block(&blk), Err(Error::InvalidOffset));
    // First sequence survives; the failing one is fully undone.
    assert_eq!(drain(&mut d), b"abab");
}

#[test]
fn lit_len_overrun_is_rejected() {
    let mut d = dec(64, 256);
    let blk = Block {
        sequences: vec![Seq {
            lit_len: 9,
            match_len: 0,
            offset: 0,
            aux: 0,
        }],
        literals: b"abc".to_vec(),
    };
    assert_eq!(d.write_block(&blk), Err(Error::InvalidLitLen));
    assert_eq!(d.len(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// shrink / absolute reads
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn shrink_keeps_window_and_unread_bytes() {
    let mut d = dec(8, 64);
    d.write(&[1u8; 32]).unwrap();
    let mut buf = [0u8; 20];
    assert_eq!(d.read(&mut buf), 20);
    let freed = d.shrink();
    // 20 bytes were drained but the last 8 of the 32 written bytes form
    // the window; everything drained beyond that window edge is freed.
    assert_eq!(freed, 20);
    assert_eq!(d.buffered(), 12);
    assert_eq!(d.pos(), 32);
}

#[test]
fn absolute_reads_track_stream_offsets() {
    let mut d = dec(8, 64);
    d.write(b"0123456789").unwrap();
    assert_eq!(d.byte_at(3).unwrap(), b'3');
    let mut out = [0u8; 3];
    assert_eq!(d.read_at(&mut out, 7).unwrap(), 3);
    assert_eq!(&out, b"789");
    assert!(matches!(d.byte_at(10), Err(Error::OutOfRange)));
}

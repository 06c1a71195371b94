//! Integration tests for the API frame codec: escaping, checksums and bounds.

use bee_rs::api::frame::{
    calculate_checksum, decode, decode_wire, encode, is_reserved, ApiFrame, FrameHeader,
};
use bee_rs::FrameError;
use proptest::prelude::*;

const RESERVED: [u8; 4] = [0x7E, 0x7D, 0x11, 0x13];

/// Byte-stuffs `bytes` the way the wire carries them.
fn stuff(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        if is_reserved(b) {
            out.push(0x7D);
            out.push(b ^ 0x20);
        } else {
            out.push(b);
        }
    }
    out
}

/// Wire frame with an explicit checksum byte.
fn wire_with_checksum(payload: &[u8], checksum: u8) -> Vec<u8> {
    let mut wire = vec![0x7E];
    wire.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    wire.extend(stuff(payload));
    wire.extend(stuff(&[checksum]));
    wire
}

/// Tests a frame from the vendor documentation.
#[test]
fn test_encode_at_command_frame() {
    let wire = encode(&[0x08, 0x01, 0x4E, 0x44]).unwrap();
    assert_eq!(&wire[..], &[0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64]);
}

/// Tests that every reserved byte is escaped and restored.
#[test]
fn test_all_reserved_bytes() {
    let wire = encode(&RESERVED).unwrap();
    // sum 0x7E+0x7D+0x11+0x13 = 0x11F -> 0x1F, checksum 0xE0
    assert_eq!(
        &wire[..],
        &[0x7E, 0x00, 0x04, 0x7D, 0x5E, 0x7D, 0x5D, 0x7D, 0x31, 0x7D, 0x33, 0xE0]
    );
    assert_eq!(decode_wire(&wire, 8).unwrap().payload(), &RESERVED);
}

/// Tests that the length field counts logical bytes, not escaped ones.
#[test]
fn test_length_counts_logical_bytes() {
    let wire = encode(&[0x7E, 0x7E, 0x7E]).unwrap();
    assert_eq!(u16::from_be_bytes([wire[1], wire[2]]), 3);
}

/// Tests that an empty payload frames as a bare header and checksum.
#[test]
fn test_empty_payload() {
    let wire = encode(&[]).unwrap();
    assert_eq!(&wire[..], &[0x7E, 0x00, 0x00, 0xFF]);
    let frame = decode_wire(&wire, 4).unwrap();
    assert!(frame.is_empty());
    assert_eq!(frame.identifier(), None);
}

/// Tests that a frame longer than the buffer is refused.
#[test]
fn test_capacity_exceeded() {
    let wire = encode(&[0u8; 20]).unwrap();
    assert_eq!(
        decode_wire(&wire, 16),
        Err(FrameError::CapacityExceeded {
            length: 20,
            capacity: 16
        })
    );
    assert!(decode_wire(&wire, 20).is_ok());
}

/// Tests that a checksum mismatch reports the observed values.
#[test]
fn test_checksum_mismatch_details() {
    let wire = wire_with_checksum(&[0x10, 0x20], 0x00);
    assert_eq!(
        decode_wire(&wire, 8),
        Err(FrameError::ChecksumMismatch {
            sum: 0x30,
            checksum: 0x00
        })
    );
}

/// Tests decoding through a byte source that is reused across frames.
#[test]
fn test_back_to_back_frames() {
    let mut stream = encode(&[0x01]).unwrap().to_vec();
    stream.extend_from_slice(&encode(&[0x7D, 0x02]).unwrap());

    let mut source: &[u8] = &stream;
    let mut frame = ApiFrame::with_capacity(8);
    for expected in [&[0x01][..], &[0x7D, 0x02][..]] {
        let (rest, header) = FrameHeader::parse(source).unwrap();
        source = rest;
        decode(header, &mut source, &mut frame).unwrap();
        assert_eq!(frame.payload(), expected);
    }
    assert!(source.is_empty());
}

/// Tests that an escape marker at the end of the stream is a truncation.
#[test]
fn test_dangling_escape() {
    let wire = [0x7E, 0x00, 0x01, 0x7D];
    assert_eq!(decode_wire(&wire, 8), Err(FrameError::Truncated));
}

proptest! {
    #[test]
    fn prop_roundtrip_without_reserved_bytes(
        payload in prop::collection::vec(any::<u8>().prop_filter("reserved", |b| !is_reserved(*b)), 0..120)
    ) {
        let wire = encode(&payload).unwrap();
        let checksum_len = if is_reserved(calculate_checksum(&payload)) { 2 } else { 1 };
        prop_assert_eq!(wire.len(), 3 + payload.len() + checksum_len);
        prop_assert_eq!(&wire[3..3 + payload.len()], &payload[..]);
        let frame = decode_wire(&wire, 120).unwrap();
        prop_assert_eq!(frame.payload(), &payload[..]);
    }

    #[test]
    fn prop_roundtrip_with_every_reserved_byte(
        mut payload in prop::collection::vec(any::<u8>(), 0..100),
        positions in prop::collection::vec(any::<prop::sample::Index>(), 4)
    ) {
        for (byte, index) in RESERVED.iter().zip(&positions) {
            let at = index.index(payload.len() + 1);
            payload.insert(at, *byte);
        }
        let wire = encode(&payload).unwrap();
        // no reserved byte may appear raw after the delimiter
        prop_assert!(wire[3..].iter().all(|b| *b != 0x7E && *b != 0x11 && *b != 0x13));
        let frame = decode_wire(&wire, 120).unwrap();
        prop_assert_eq!(frame.payload(), &payload[..]);
    }

    #[test]
    fn prop_checksum_completes_sum(payload in prop::collection::vec(any::<u8>(), 0..120)) {
        let sum = payload.iter().fold(0u8, |s, b| s.wrapping_add(*b));
        prop_assert_eq!(sum.wrapping_add(calculate_checksum(&payload)), 0xFF);
    }

    #[test]
    fn prop_single_byte_mutation_fails_checksum(
        payload in prop::collection::vec(any::<u8>(), 1..120),
        index in any::<prop::sample::Index>(),
        delta in 1u8..=255,
    ) {
        let checksum = calculate_checksum(&payload);
        let mut mutated = payload.clone();
        let at = index.index(mutated.len());
        mutated[at] = mutated[at].wrapping_add(delta);

        let wire = wire_with_checksum(&mutated, checksum);
        let result = decode_wire(&wire, 120);
        prop_assert!(
            matches!(result, Err(FrameError::ChecksumMismatch { .. })),
            "unexpected {:?}", result
        );
    }

    #[test]
    fn prop_reencode_is_byte_identical(payload in prop::collection::vec(any::<u8>(), 0..120)) {
        let wire = encode(&payload).unwrap();
        let frame = decode_wire(&wire, 120).unwrap();
        let again = encode(frame.payload()).unwrap();
        prop_assert_eq!(&again[..], &wire[..]);
    }
}

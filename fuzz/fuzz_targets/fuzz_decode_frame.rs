#![no_main]

use bee_rs::api::frame::{decode_wire, encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must never panic the decoder
    let _ = decode_wire(data, 100);
    let _ = decode_wire(data, 16);

    // Anything we encode must decode to the same payload
    if data.len() <= 100 {
        let wire = encode(data).expect("payload fits the length field");
        let frame = decode_wire(&wire, 100).expect("encoded frame decodes");
        assert_eq!(frame.payload(), data);

        // Flipping the final checksum byte must be caught
        let mut corrupted = wire.to_vec();
        if let Some(last) = corrupted.last_mut() {
            if *last != 0x7D {
                *last ^= 0x01;
                let _ = decode_wire(&corrupted, 100);
            }
        }
    }
});

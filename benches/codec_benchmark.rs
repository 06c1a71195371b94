use bee_rs::api::command::Command;
use bee_rs::api::frame::{decode_wire, encode};
use bee_rs::util::hex::decode_hex;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn benchmark_encode(c: &mut Criterion) {
    let plain: Vec<u8> = (0..100u8).map(|b| b & 0x3F).collect();
    let reserved = [0x7E, 0x7D, 0x11, 0x13].repeat(25);

    c.bench_function("encode_plain_100", |b| {
        b.iter(|| black_box(encode(black_box(&plain))))
    });
    c.bench_function("encode_all_escaped_100", |b| {
        b.iter(|| black_box(encode(black_box(&reserved))))
    });
}

fn benchmark_decode(c: &mut Criterion) {
    // 64-bit transmit request to 0013A200400A0127 with ack disabled
    let request = decode_hex("000100 13A20040 0A0127 01 48656C6C6F").unwrap();
    let wire = encode(&request).unwrap();
    let escaped = encode(&[0x7E, 0x7D, 0x11, 0x13].repeat(25)).unwrap();

    c.bench_function("decode_transmit_request", |b| {
        b.iter(|| black_box(decode_wire(black_box(&wire), 100)))
    });
    c.bench_function("decode_all_escaped_100", |b| {
        b.iter(|| black_box(decode_wire(black_box(&escaped), 100)))
    });
    c.bench_function("decode_and_parse_command", |b| {
        b.iter(|| {
            let frame = decode_wire(black_box(&wire), 100).unwrap();
            let _ = black_box(Command::parse(frame.payload()));
        })
    });
}

criterion_group!(benches, benchmark_encode, benchmark_decode);
criterion_main!(benches);

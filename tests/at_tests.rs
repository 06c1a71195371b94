//! Integration tests for AT parameter reads and writes through the engine.

mod common;

use bee_rs::api::at::{AtParameterTable, AtStatus, AtTarget};
use bee_rs::api::command::AtCode;
use bee_rs::config::BeeConfig;
use bee_rs::radio::RadioConfig;
use common::Harness;

fn at_read(harness: &mut Harness, frame_id: u8, code: &[u8; 2]) -> Vec<u8> {
    harness.send(&[0x08, frame_id, code[0], code[1]]);
    let replies = harness.replies();
    assert_eq!(replies.len(), 1, "expected one reply to AT {code:?}");
    replies[0].payload().to_vec()
}

/// Tests that CH answers the configured channel as one byte.
#[test]
fn test_channel_read() {
    let mut harness = Harness::new();
    assert_eq!(
        at_read(&mut harness, 0x01, b"CH"),
        vec![0x88, 0x01, b'C', b'H', 0x00, 0x19]
    );
}

/// Tests that ID answers the PAN ID big-endian.
#[test]
fn test_pan_id_read() {
    let config = BeeConfig {
        radio: RadioConfig {
            pan_id: 0x3332,
            ..RadioConfig::default()
        },
        ..BeeConfig::default()
    };
    let mut harness = Harness::with_config(&config, false);
    assert_eq!(
        at_read(&mut harness, 0x02, b"ID"),
        vec![0x88, 0x02, b'I', b'D', 0x00, 0x33, 0x32]
    );
}

/// Tests that an unknown code answers InvalidCommand without data.
#[test]
fn test_unknown_code() {
    let mut harness = Harness::new();
    assert_eq!(
        at_read(&mut harness, 0x03, b"XX"),
        vec![0x88, 0x03, b'X', b'X', AtStatus::InvalidCommand as u8]
    );
}

/// Tests the address parameters of a configured node.
#[test]
fn test_address_reads() {
    let config = BeeConfig {
        radio: RadioConfig {
            channel: 15,
            pan_id: 0xAFFE,
            short_address: 0x1234,
            extended_address: 0x0013_A200_4055_6677,
        },
        ..BeeConfig::default()
    };
    let mut harness = Harness::with_config(&config, false);

    assert_eq!(&at_read(&mut harness, 1, b"CH")[5..], &[15]);
    assert_eq!(&at_read(&mut harness, 1, b"MY")[5..], &[0x12, 0x34]);
    assert_eq!(&at_read(&mut harness, 1, b"SH")[5..], &[0x00, 0x13, 0xA2, 0x00]);
    assert_eq!(&at_read(&mut harness, 1, b"SL")[5..], &[0x40, 0x55, 0x66, 0x77]);
    // destination starts as the broadcast address
    assert_eq!(&at_read(&mut harness, 1, b"DH")[5..], &[0, 0, 0, 0]);
    assert_eq!(&at_read(&mut harness, 1, b"DL")[5..], &[0, 0, 0xFF, 0xFF]);
}

/// Tests that DH/DL follow the destination of the last transmit request.
#[test]
fn test_destination_follows_transmit() {
    let mut harness = Harness::new();
    harness.send(&[
        0x00, 0x00, 0x00, 0x13, 0xA2, 0x00, 0x40, 0x0A, 0x01, 0x27, 0x01, 0x55,
    ]);
    assert!(harness.replies().is_empty());

    assert_eq!(&at_read(&mut harness, 1, b"DH")[5..], &[0x00, 0x13, 0xA2, 0x00]);
    assert_eq!(&at_read(&mut harness, 1, b"DL")[5..], &[0x40, 0x0A, 0x01, 0x27]);
}

/// Tests that an AT write is consumed silently by the standard table.
#[test]
fn test_write_is_silent_by_default() {
    let mut harness = Harness::new();
    harness.send(&[0x08, 0x01, b'C', b'H', 0x0B]);
    assert!(harness.replies().is_empty());
    assert_eq!(harness.engine.radio_config().channel, 25);
}

/// Tests a writable CH installed through the table builder.
#[test]
fn test_custom_setter() {
    fn set_channel(target: &mut AtTarget<'_>, value: &[u8]) -> Result<(), AtStatus> {
        match value {
            [channel @ 11..=26] => {
                target.radio.channel = *channel;
                Ok(())
            }
            _ => Err(AtStatus::InvalidParameter),
        }
    }

    let table = AtParameterTable::builder()
        .setter(AtCode::Channel, set_channel)
        .build();
    let Harness { uart, irq, engine } = Harness::new();
    let mut harness = Harness {
        uart,
        irq,
        engine: engine.with_at_table(table),
    };

    harness.send(&[0x08, 0x07, b'C', b'H', 0x0B]);
    assert_eq!(
        harness.replies()[0].payload(),
        &[0x88, 0x07, b'C', b'H', 0x00]
    );
    assert_eq!(at_read(&mut harness, 1, b"CH")[5..], [0x0B]);

    harness.send(&[0x08, 0x08, b'C', b'H', 0x30]);
    assert_eq!(
        harness.replies()[0].payload(),
        &[0x88, 0x08, b'C', b'H', 0x03]
    );
    assert_eq!(harness.engine.radio_config().channel, 0x0B);
}

/// Tests that the write-only commands answer Ok on the read path.
#[test]
fn test_write_and_restore_commands() {
    let mut harness = Harness::new();
    assert_eq!(at_read(&mut harness, 4, b"WR"), vec![0x88, 4, b'W', b'R', 0x00]);
    assert_eq!(at_read(&mut harness, 5, b"RE"), vec![0x88, 5, b'R', b'E', 0x00]);
}

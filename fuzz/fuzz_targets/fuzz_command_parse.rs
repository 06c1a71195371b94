#![no_main]

use bee_rs::api::command::Command;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Short or unknown payloads must come back as errors, not panics
    if let Ok(Command::Transmit(request)) = Command::parse(data) {
        assert!(request.data.len() < data.len());
    }
});

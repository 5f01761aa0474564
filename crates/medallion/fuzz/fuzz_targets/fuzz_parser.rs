//! Fuzz target for the raw extract parser.
//!
//! Malformed extracts must produce an error, never a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use medallion::input::Parser;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t', b';', b'|'] {
        let _ = parser.parse_bytes("fuzz", data, delimiter);
    }
});

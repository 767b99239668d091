//! Fuzz test for mnemonic parsing
//!
//! Ensures the phrase parser handles arbitrary input gracefully

#![no_main]

use libfuzzer_sys::fuzz_target;
use velum_core::Mnemonic;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Should never panic, only return Err for invalid input
        if let Ok(mnemonic) = Mnemonic::from_phrase(s) {
            let _ = mnemonic.to_seed("");
        }
    }
});

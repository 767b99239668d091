//! Fuzz test for sealed blob parsing
//!
//! Ensures the wire-format parser handles arbitrary input gracefully

#![no_main]

use libfuzzer_sys::fuzz_target;
use velum_keyring::SealedBlob;

fuzz_target!(|data: &[u8]| {
    // Should never panic, only return Err for malformed blobs
    if let Ok(blob) = SealedBlob::from_bytes(data) {
        // Parsed blobs must re-serialize to the same bytes
        assert_eq!(blob.to_bytes(), data);
    }
});

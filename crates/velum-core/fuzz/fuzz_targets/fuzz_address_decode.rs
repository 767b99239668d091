//! Fuzz test for address and key decoding
//!
//! Ensures bech32m decoders handle arbitrary input gracefully

#![no_main]

use libfuzzer_sys::fuzz_target;
use velum_core::{shielded, transparent, ShieldedSpendingKey};
use velum_params::ChainParams;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let params = ChainParams::mainnet();
        let _ = transparent::decode_implicit_address(&params, s);
        let _ = ShieldedSpendingKey::from_bech32(&params, s);
        let _ = shielded::decode_viewing_key(&params, s);
        let _ = shielded::decode_payment_address(&params, s);
    }
});

//! Property-based tests for the derivation pipeline
//!
//! Uses proptest to verify determinism and round-trip invariants across
//! randomized inputs.

use proptest::prelude::*;
use velum_core::{mnemonic, shielded, transparent, DerivationPath, Mnemonic, Seed};
use velum_params::ChainParams;

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

fn seed_strategy() -> impl Strategy<Value = Seed> {
    prop::array::uniform32(any::<u8>()).prop_map(|half| {
        let mut raw = [0u8; mnemonic::SEED_LEN];
        raw[..32].copy_from_slice(&half);
        raw[32..].copy_from_slice(&half);
        Seed::from_bytes(raw)
    })
}

fn path_strategy() -> impl Strategy<Value = DerivationPath> {
    (0u32..1 << 16, 0u32..2, prop::option::of(0u32..1 << 16)).prop_map(
        |(account, change, index)| DerivationPath {
            account,
            change,
            index,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Same seed and path always produce the same transparent key and address.
    #[test]
    fn prop_transparent_determinism(seed in seed_strategy(), path in path_strategy()) {
        let params = ChainParams::mainnet();
        let a = transparent::derive(&seed, &params, &path).unwrap();
        let b = transparent::derive(&seed, &params, &path).unwrap();
        prop_assert_eq!(*a.secret_bytes(), *b.secret_bytes());
        prop_assert_eq!(a.address(), b.address());
    }

    /// Implicit addresses decode back to their 20-byte payloads.
    #[test]
    fn prop_implicit_address_round_trip(seed in seed_strategy(), path in path_strategy()) {
        let params = ChainParams::mainnet();
        let key = transparent::derive(&seed, &params, &path).unwrap();
        let payload = transparent::decode_implicit_address(&params, key.address()).unwrap();
        prop_assert_eq!(payload.len(), velum_params::IMPLICIT_ADDRESS_LEN);
    }

    /// Shielded spending keys survive a bech32m encode/decode round trip.
    #[test]
    fn prop_shielded_key_round_trip(seed in seed_strategy(), account in 0u32..1 << 16) {
        let params = ChainParams::mainnet();
        let account_keys = shielded::derive(&seed, &params, account).unwrap();
        let decoded =
            shielded::ShieldedSpendingKey::from_bech32(&params, &account_keys.spending_key)
                .unwrap();
        prop_assert_eq!(&*decoded.to_bytes(), account_keys.spending_key_bytes());
    }
}

#[test]
fn mnemonic_seed_matches_reference_vector() {
    // Trezor BIP-39 reference vector: all-abandon phrase, "TREZOR" passphrase
    let mnemonic = Mnemonic::from_phrase(TEST_MNEMONIC).unwrap();
    let seed = mnemonic.to_seed("TREZOR");
    assert_eq!(
        hex::encode(seed.as_bytes()),
        "c55257c360c07c72029aebc1b53c05ed0362ada38ead3e3e9efa3708e53495531f09a6987599d18264c1e1c92f2cf141630c7a3c4ab7c81b2f001698e7463b04"
    );
}

#[test]
fn shielded_and_transparent_share_a_seed() {
    let params = ChainParams::mainnet();
    let mnemonic = Mnemonic::from_phrase(TEST_MNEMONIC).unwrap();
    let seed = mnemonic.to_seed("");

    let transparent_key = transparent::derive_root(&seed, &params).unwrap();
    let shielded_account = shielded::derive(&seed, &params, 0).unwrap();

    assert!(transparent_key.address().starts_with("vlm1"));
    assert!(shielded_account.payment_address.starts_with("vlmpay1"));
}

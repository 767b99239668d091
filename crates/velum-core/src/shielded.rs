//! Shielded account derivation
//!
//! ZIP-32 Sapling derivation from the wallet seed at `m/32'/coin'/account'`,
//! with bech32m encoding of the extended spending key, extended full viewing
//! key, and default diversified payment address under the chain's HRPs.

use crate::{mnemonic::Seed, Error, Result};
use bech32::{Bech32m, Hrp};
use velum_params::ChainParams;
use sapling_crypto::zip32::{
    ExtendedFullViewingKey as SaplingExtendedFullViewingKey,
    ExtendedSpendingKey as SaplingExtendedSpendingKey,
};
use zip32::ChildIndex;
use zeroize::Zeroizing;

/// Byte length of a serialized extended spending key
pub const SPENDING_KEY_LEN: usize = 169;

/// ZIP-32 purpose segment
const ZIP32_PURPOSE: u32 = 32;

/// Byte length of a serialized payment address
const PAYMENT_ADDRESS_LEN: usize = 43;

fn encode_bech32m(hrp: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(hrp).map_err(|e| Error::InvalidKey(format!("invalid HRP: {e}")))?;
    bech32::encode::<Bech32m>(hrp, data)
        .map_err(|e| Error::InvalidKey(format!("bech32m encoding failed: {e}")))
}

fn decode_bech32m(expected_hrp: &str, encoded: &str) -> Result<Vec<u8>> {
    let (hrp, data) = bech32::decode(encoded)
        .map_err(|e| Error::InvalidKey(format!("bech32m decoding failed: {e}")))?;
    if hrp.as_str() != expected_hrp {
        return Err(Error::InvalidKey("HRP mismatch".to_string()));
    }
    Ok(data)
}

/// Extended spending key for a shielded account
#[derive(Clone)]
pub struct ShieldedSpendingKey {
    inner: SaplingExtendedSpendingKey,
}

impl ShieldedSpendingKey {
    /// Derive the account key from a seed at `m/32'/coin'/account'`.
    pub fn from_seed(seed: &Seed, params: &ChainParams, account: u32) -> Self {
        let master = SaplingExtendedSpendingKey::master(seed.as_bytes());
        let inner = master
            .derive_child(ChildIndex::hardened(ZIP32_PURPOSE))
            .derive_child(ChildIndex::hardened(params.coin_type))
            .derive_child(ChildIndex::hardened(account));
        Self { inner }
    }

    /// Serialize to the 169-byte wire form; zeroized on drop
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.inner.to_bytes().to_vec())
    }

    /// Deserialize from the 169-byte wire form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SPENDING_KEY_LEN {
            return Err(Error::InvalidKey(
                "Invalid spending key length".to_string(),
            ));
        }
        let mut key_bytes = [0u8; SPENDING_KEY_LEN];
        key_bytes.copy_from_slice(bytes);
        let inner = SaplingExtendedSpendingKey::from_bytes(&key_bytes)
            .map_err(|_| Error::InvalidKey("Invalid spending key bytes".to_string()))?;
        Ok(Self { inner })
    }

    /// Encode under the chain's spending-key HRP
    pub fn to_bech32(&self, params: &ChainParams) -> Result<String> {
        encode_bech32m(&params.spending_key_hrp, &self.to_bytes())
    }

    /// Decode a bech32m spending key, verifying the chain's HRP
    pub fn from_bech32(params: &ChainParams, encoded: &str) -> Result<Self> {
        let data = decode_bech32m(&params.spending_key_hrp, encoded)?;
        Self::from_bytes(&data)
    }

    /// The extended full viewing key, encoded under the chain's viewing-key HRP
    pub fn viewing_key_bech32(&self, params: &ChainParams) -> Result<String> {
        #[allow(deprecated)]
        let xfvk = self.inner.to_extended_full_viewing_key();
        let mut data = Vec::new();
        xfvk.write(&mut data)
            .map_err(|e| Error::InvalidKey(format!("viewing key serialization failed: {e}")))?;
        encode_bech32m(&params.viewing_key_hrp, &data)
    }

    /// The default diversified payment address, encoded under the chain's
    /// payment-address HRP
    pub fn default_address_bech32(&self, params: &ChainParams) -> Result<String> {
        let dfvk = self.inner.to_diversifiable_full_viewing_key();
        let (_, address) = dfvk.default_address();
        encode_bech32m(&params.payment_address_hrp, &address.to_bytes())
    }
}

/// Decode a bech32m viewing key to its serialized form, verifying the HRP
/// and structural validity.
pub fn decode_viewing_key(params: &ChainParams, encoded: &str) -> Result<Vec<u8>> {
    let data = decode_bech32m(&params.viewing_key_hrp, encoded)?;
    SaplingExtendedFullViewingKey::read(&mut &data[..])
        .map_err(|_| Error::InvalidKey("Invalid viewing key bytes".to_string()))?;
    Ok(data)
}

/// Decode a bech32m payment address to its 43-byte raw form, verifying the HRP.
pub fn decode_payment_address(
    params: &ChainParams,
    encoded: &str,
) -> Result<[u8; PAYMENT_ADDRESS_LEN]> {
    let data = decode_bech32m(&params.payment_address_hrp, encoded)?;
    data.try_into()
        .map_err(|_| Error::InvalidAddress("invalid payment address length".to_string()))
}

/// A fully derived shielded account in its serialized forms
pub struct ShieldedAccount {
    /// Extended spending key, bech32m
    pub spending_key: String,
    /// Extended full viewing key, bech32m
    pub viewing_key: String,
    /// Default diversified payment address, bech32m
    pub payment_address: String,
    spending_key_bytes: Zeroizing<Vec<u8>>,
}

impl ShieldedAccount {
    /// Raw 169-byte extended spending key
    pub fn spending_key_bytes(&self) -> &[u8] {
        &self.spending_key_bytes
    }
}

/// Derive the shielded account at the given ZIP-32 account index.
pub fn derive(seed: &Seed, params: &ChainParams, account: u32) -> Result<ShieldedAccount> {
    let key = ShieldedSpendingKey::from_seed(seed, params, account);
    Ok(ShieldedAccount {
        spending_key: key.to_bech32(params)?,
        viewing_key: key.viewing_key_bech32(params)?,
        payment_address: key.default_address_bech32(params)?,
        spending_key_bytes: key.to_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::SEED_LEN;

    fn test_seed(byte: u8) -> Seed {
        Seed::from_bytes([byte; SEED_LEN])
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let params = ChainParams::mainnet();
        let seed = test_seed(0x42);

        let a = derive(&seed, &params, 0).unwrap();
        let b = derive(&seed, &params, 0).unwrap();
        assert_eq!(a.spending_key, b.spending_key);
        assert_eq!(a.viewing_key, b.viewing_key);
        assert_eq!(a.payment_address, b.payment_address);
    }

    #[test]
    fn test_accounts_are_distinct() {
        let params = ChainParams::mainnet();
        let seed = test_seed(0x42);

        let a = derive(&seed, &params, 0).unwrap();
        let b = derive(&seed, &params, 1).unwrap();
        assert_ne!(a.spending_key, b.spending_key);
        assert_ne!(a.payment_address, b.payment_address);
    }

    #[test]
    fn test_hrp_prefixes() {
        let params = ChainParams::mainnet();
        let account = derive(&test_seed(0x01), &params, 0).unwrap();
        assert!(account.spending_key.starts_with("vlmsk1"));
        assert!(account.viewing_key.starts_with("vlmfvk1"));
        assert!(account.payment_address.starts_with("vlmpay1"));
    }

    #[test]
    fn test_spending_key_round_trip() {
        let params = ChainParams::mainnet();
        let seed = test_seed(0x77);
        let key = ShieldedSpendingKey::from_seed(&seed, &params, 3);

        let encoded = key.to_bech32(&params).unwrap();
        let decoded = ShieldedSpendingKey::from_bech32(&params, &encoded).unwrap();
        assert_eq!(*key.to_bytes(), *decoded.to_bytes());
        assert_eq!(key.to_bytes().len(), SPENDING_KEY_LEN);
    }

    #[test]
    fn test_viewing_key_and_address_round_trip() {
        let params = ChainParams::mainnet();
        let account = derive(&test_seed(0x55), &params, 0).unwrap();

        let vk_bytes = decode_viewing_key(&params, &account.viewing_key).unwrap();
        assert!(!vk_bytes.is_empty());
        let addr = decode_payment_address(&params, &account.payment_address).unwrap();
        assert_eq!(addr.len(), PAYMENT_ADDRESS_LEN);
    }

    #[test]
    fn test_wrong_hrp_rejected() {
        let mainnet = ChainParams::mainnet();
        let testnet = ChainParams::testnet();
        let account = derive(&test_seed(0x09), &mainnet, 0).unwrap();
        assert!(ShieldedSpendingKey::from_bech32(&testnet, &account.spending_key).is_err());
        assert!(decode_payment_address(&testnet, &account.payment_address).is_err());
    }
}

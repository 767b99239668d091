//! Per-chain parameter definitions

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Byte length of an implicit-address payload
pub const IMPLICIT_ADDRESS_LEN: usize = 20;

/// Parameters for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Chain identifier (e.g. "velum-main")
    pub chain_id: String,
    /// BIP-44 coin type
    pub coin_type: u32,
    /// HRP for implicit (transparent) addresses
    pub address_hrp: String,
    /// HRP for extended spending keys
    pub spending_key_hrp: String,
    /// HRP for extended full viewing keys
    pub viewing_key_hrp: String,
    /// HRP for diversified payment addresses
    pub payment_address_hrp: String,
}

impl ChainParams {
    /// Mainnet parameters
    pub fn mainnet() -> Self {
        Self {
            chain_id: "velum-main".to_string(),
            coin_type: 877,
            address_hrp: "vlm".to_string(),
            spending_key_hrp: "vlmsk".to_string(),
            viewing_key_hrp: "vlmfvk".to_string(),
            payment_address_hrp: "vlmpay".to_string(),
        }
    }

    /// Testnet parameters
    pub fn testnet() -> Self {
        Self {
            chain_id: "velum-test".to_string(),
            coin_type: 1,
            address_hrp: "vlmtest".to_string(),
            spending_key_hrp: "vlmsktest".to_string(),
            viewing_key_hrp: "vlmfvktest".to_string(),
            payment_address_hrp: "vlmpaytest".to_string(),
        }
    }

    /// Implicit-address hash: SHA-256 of the input truncated to 20 bytes.
    pub fn address_hash(&self, data: &[u8]) -> [u8; IMPLICIT_ADDRESS_LEN] {
        let digest = Sha256::digest(data);
        let mut out = [0u8; IMPLICIT_ADDRESS_LEN];
        out.copy_from_slice(&digest[..IMPLICIT_ADDRESS_LEN]);
        out
    }
}

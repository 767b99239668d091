//! Transaction builder contract
//!
//! The keystore never signs anything itself; it registers decrypted secrets
//! with an external transaction builder and snapshots that builder's opaque
//! state per parent account. Three operations are consumed: key registration,
//! spending-key registration, and state encode/decode.

use crate::Result;
use serde::{Deserialize, Serialize};

/// External transaction builder consumed by the keystore
pub trait TxBuilder: Send {
    /// Register a transparent private key (lowercase hex)
    fn add_key(&mut self, private_key_hex: &str, password: &str, alias: &str);

    /// Register a shielded extended spending key (raw 169 bytes)
    fn add_spending_key(&mut self, spending_key: &[u8], password: &str, alias: &str);

    /// Snapshot the builder's opaque state
    fn encode(&self) -> Vec<u8>;

    /// Restore the builder's state from a snapshot
    fn decode(&mut self, bytes: &[u8]) -> Result<()>;
}

/// Test double that records registrations without holding real secrets.
///
/// `encode`/`decode` round-trip the alias lists only, which is enough to
/// observe snapshot re-hydration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MockTxBuilder {
    /// Aliases registered through [`TxBuilder::add_key`]
    pub keys: Vec<String>,
    /// Aliases registered through [`TxBuilder::add_spending_key`]
    pub spending_keys: Vec<String>,
}

impl MockTxBuilder {
    /// Fresh empty builder
    pub fn new() -> Self {
        Self::default()
    }
}

impl TxBuilder for MockTxBuilder {
    fn add_key(&mut self, _private_key_hex: &str, _password: &str, alias: &str) {
        self.keys.push(alias.to_string());
    }

    fn add_spending_key(&mut self, _spending_key: &[u8], _password: &str, alias: &str) {
        self.spending_keys.push(alias.to_string());
    }

    fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<()> {
        *self = serde_json::from_slice(bytes)?;
        Ok(())
    }
}

//! Derivation path tuples

use serde::{Deserialize, Serialize};
use std::fmt;

/// A BIP-44 style derivation path tuple.
///
/// Transparent accounts render as `m/44'/<coin>'/<account>/<change>[/<index>]`
/// (purpose and coin type hardened). Shielded accounts use only the index
/// component for ZIP-32 account selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationPath {
    /// Account component
    pub account: u32,
    /// Change component
    pub change: u32,
    /// Address index; omitted from the rendered path when absent
    pub index: Option<u32>,
}

impl DerivationPath {
    /// Path used by parent (mnemonic) records
    pub const fn root() -> Self {
        Self {
            account: 0,
            change: 0,
            index: None,
        }
    }

    /// Construct a full path
    pub const fn new(account: u32, change: u32, index: u32) -> Self {
        Self {
            account,
            change,
            index: Some(index),
        }
    }

    /// Index component, defaulting to 0 when absent
    pub fn index_or_zero(&self) -> u32 {
        self.index.unwrap_or(0)
    }

    /// Render as a BIP-44 path string for the given coin type
    pub fn to_bip44_string(&self, coin_type: u32) -> String {
        match self.index {
            Some(index) => format!(
                "m/44'/{}'/{}/{}/{}",
                coin_type, self.account, self.change, index
            ),
            None => format!("m/44'/{}'/{}/{}", coin_type, self.account, self.change),
        }
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}/{}/{}", self.account, self.change, index),
            None => write!(f, "{}/{}", self.account, self.change),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bip44_rendering() {
        assert_eq!(
            DerivationPath::new(0, 0, 5).to_bip44_string(877),
            "m/44'/877'/0/0/5"
        );
        assert_eq!(
            DerivationPath::root().to_bip44_string(877),
            "m/44'/877'/0/0"
        );
    }

    #[test]
    fn test_index_default() {
        assert_eq!(DerivationPath::root().index_or_zero(), 0);
        assert_eq!(DerivationPath::new(1, 2, 3).index_or_zero(), 3);
    }

    #[test]
    fn test_serde_round_trip() {
        let path = DerivationPath::new(1, 0, 7);
        let json = serde_json::to_string(&path).unwrap();
        let back: DerivationPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}

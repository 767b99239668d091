//! Chain registry keyed by chain identifier

use crate::{ChainParams, Error, Result};
use std::collections::HashMap;

/// Registry mapping chain identifiers to their parameters
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<String, ChainParams>,
}

impl ChainRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in Velum networks
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ChainParams::mainnet());
        registry.register(ChainParams::testnet());
        registry
    }

    /// Register (or replace) a chain
    pub fn register(&mut self, params: ChainParams) {
        self.chains.insert(params.chain_id.clone(), params);
    }

    /// Look up a chain by identifier
    pub fn get(&self, chain_id: &str) -> Result<&ChainParams> {
        self.chains
            .get(chain_id)
            .ok_or_else(|| Error::UnknownChain(chain_id.to_string()))
    }

    /// Whether the registry knows this chain
    pub fn contains(&self, chain_id: &str) -> bool {
        self.chains.contains_key(chain_id)
    }

    /// Registered chain identifiers
    pub fn chain_ids(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = ChainRegistry::builtin();
        assert!(registry.contains("velum-main"));
        assert!(registry.contains("velum-test"));
        assert_eq!(registry.get("velum-main").unwrap().coin_type, 877);
    }

    #[test]
    fn test_unknown_chain() {
        let registry = ChainRegistry::builtin();
        assert!(matches!(
            registry.get("nope"),
            Err(Error::UnknownChain(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_register_custom_chain() {
        let mut registry = ChainRegistry::new();
        let mut params = ChainParams::mainnet();
        params.chain_id = "custom-1".to_string();
        params.coin_type = 118;
        registry.register(params);
        assert_eq!(registry.get("custom-1").unwrap().coin_type, 118);
    }
}

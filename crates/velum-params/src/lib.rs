//! Velum chain parameters and registry
//!
//! This crate provides per-chain constants consumed by key derivation and
//! address encoding: BIP-44 coin types, bech32m human-readable parts, and
//! the implicit-address hash.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chain;
pub mod registry;

pub use chain::{ChainParams, IMPLICIT_ADDRESS_LEN};
pub use registry::ChainRegistry;

/// Error types for registry operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Chain identifier not present in the registry
    #[error("Unknown chain: {0}")]
    UnknownChain(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, Error>;

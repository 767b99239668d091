//! Velum wallet key derivation core
//!
//! This crate implements the deterministic derivation pipeline: BIP-39
//! mnemonic handling, BIP-32/BIP-44 transparent account derivation with
//! implicit-address encoding, and ZIP-32 Sapling shielded account derivation
//! with bech32m key and payment-address encoding.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod mnemonic;
pub mod path;
pub mod shielded;
pub mod transparent;

pub use error::{Error, Result};
pub use mnemonic::{Mnemonic, MnemonicSize, Seed, SEED_LEN};
pub use path::DerivationPath;
pub use shielded::{ShieldedAccount, ShieldedSpendingKey, SPENDING_KEY_LEN};
pub use transparent::{TransparentKey, SECRET_KEY_LEN};

//! Velum encrypted account keystore
//!
//! Persists wallet accounts as a flat table of records whose secrets are
//! sealed with a password-derived key (scrypt + XChaCha20-Poly1305). Exposes
//! the lock/unlock lifecycle, deterministic account identity, password
//! rotation, and cascade deletion over an abstract key-value driver.
//!
//! ## Security properties
//!
//! - Secrets are persisted only inside sealed blobs; metadata stays plaintext
//! - The password lives only in process memory and is zeroized on lock
//! - Decrypted payloads are zeroized on every exit path
//! - Nothing secret is ever logged

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod crypto;
pub mod error;
pub mod keystore;
pub mod query;
pub mod records;
pub mod sdk;
pub mod store;

pub use crypto::{KdfParams, SealedBlob};
pub use error::{Error, Result};
pub use keystore::{KeyStore, LockStatus};
pub use query::{query_balances, Balance, ChainQuery};
pub use records::{
    derived_account_id, parent_account_id, AccountRecord, AccountSummary, AccountType, Records,
    Secret, ShieldedSecret, ID_NAMESPACE,
};
pub use sdk::{MockTxBuilder, TxBuilder};
pub use store::{KvDriver, MemoryDriver, KEY_STORE, PARENT_ACCOUNT_ID, SDK_STORE};

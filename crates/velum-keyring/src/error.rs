//! Error types for the keystore

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Keystore errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operation requires an unlocked keystore
    #[error("No password: keystore is locked")]
    NoPassword,

    /// Password verification (AEAD authentication) failed
    #[error("Bad password")]
    BadPassword,

    /// Record id or address not found
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    /// Chain registry miss
    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    /// Mnemonic vocabulary, size, or checksum failure
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Record id already exists
    #[error("Duplicate account: {0}")]
    Duplicate(String),

    /// Storage failure or invariant violation
    #[error("Keystore error: {0}")]
    Store(String),
}

impl From<velum_core::Error> for Error {
    fn from(e: velum_core::Error) -> Self {
        match e {
            velum_core::Error::InvalidMnemonic(msg) => Error::InvalidMnemonic(msg),
            velum_core::Error::UnknownChain(id) => Error::UnknownChain(id),
            other => Error::Store(other.to_string()),
        }
    }
}

impl From<velum_params::Error> for Error {
    fn from(e: velum_params::Error) -> Self {
        match e {
            velum_params::Error::UnknownChain(id) => Error::UnknownChain(id),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Store(format!("serialization failed: {e}"))
    }
}

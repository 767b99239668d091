//! Error types for key derivation

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Derivation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid mnemonic phrase (vocabulary, size, or checksum)
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Invalid seed material
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// Key derivation failure
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Invalid key material or encoding
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Invalid address encoding
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Chain registry miss
    #[error("Unknown chain: {0}")]
    UnknownChain(String),
}

impl From<velum_params::Error> for Error {
    fn from(e: velum_params::Error) -> Self {
        match e {
            velum_params::Error::UnknownChain(id) => Error::UnknownChain(id),
        }
    }
}

//! BIP-39 mnemonic and seed handling
//!
//! Phrases are 12 or 24 English words; seeds are the 64-byte PBKDF2 expansion
//! defined by BIP-39. Seed bytes are zeroized when dropped.

use crate::{Error, Result};
use bip39::Language;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

/// Byte length of an expanded seed
pub const SEED_LEN: usize = 64;

/// Supported phrase sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicSize {
    /// 12 words (128 bits of entropy)
    Words12,
    /// 24 words (256 bits of entropy)
    Words24,
}

impl MnemonicSize {
    /// Number of words in a phrase of this size
    pub fn word_count(self) -> usize {
        match self {
            MnemonicSize::Words12 => 12,
            MnemonicSize::Words24 => 24,
        }
    }

    fn entropy_len(self) -> usize {
        match self {
            MnemonicSize::Words12 => 16,
            MnemonicSize::Words24 => 32,
        }
    }

    /// Map a word count onto a supported size
    pub fn from_word_count(count: usize) -> Result<Self> {
        match count {
            12 => Ok(MnemonicSize::Words12),
            24 => Ok(MnemonicSize::Words24),
            other => Err(Error::InvalidMnemonic(format!(
                "unsupported phrase size: {other} words"
            ))),
        }
    }
}

/// A validated BIP-39 mnemonic phrase
#[derive(Clone)]
pub struct Mnemonic {
    inner: bip39::Mnemonic,
}

impl Mnemonic {
    /// Generate a fresh random phrase of the given size
    pub fn generate(size: MnemonicSize) -> Self {
        let mut entropy = vec![0u8; size.entropy_len()];
        rand::thread_rng().fill_bytes(&mut entropy);

        let inner = bip39::Mnemonic::from_entropy_in(Language::English, &entropy)
            .expect("entropy of a supported size always produces a valid mnemonic");
        entropy.zeroize();

        Self { inner }
    }

    /// Parse and validate a phrase.
    ///
    /// Fails on words outside the English wordlist, a bad checksum, or a
    /// phrase size other than 12 or 24 words.
    pub fn from_phrase(phrase: &str) -> Result<Self> {
        MnemonicSize::from_word_count(phrase.split_whitespace().count())?;

        let inner = bip39::Mnemonic::parse_in_normalized(Language::English, phrase)
            .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Number of words in the phrase
    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    /// Render the phrase; the returned string is zeroized on drop
    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.inner.to_string())
    }

    /// Expand to a 64-byte seed (PBKDF2-HMAC-SHA512, 2048 iterations,
    /// salt `"mnemonic" || passphrase`).
    pub fn to_seed(&self, passphrase: &str) -> Seed {
        let mut raw = self.inner.to_seed(passphrase);
        let seed = Seed(Zeroizing::new(raw));
        raw.zeroize();
        seed
    }
}

/// Whether a phrase is a valid 12- or 24-word mnemonic.
pub fn validate(phrase: &str) -> bool {
    Mnemonic::from_phrase(phrase).is_ok()
}

/// A 64-byte seed, zeroized on drop
pub struct Seed(Zeroizing<[u8; SEED_LEN]>);

impl Seed {
    /// Wrap raw seed bytes
    pub fn from_bytes(bytes: [u8; SEED_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Access the seed bytes
    pub fn as_bytes(&self) -> &[u8; SEED_LEN] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_generate_sizes() {
        assert_eq!(Mnemonic::generate(MnemonicSize::Words12).word_count(), 12);
        assert_eq!(Mnemonic::generate(MnemonicSize::Words24).word_count(), 24);
    }

    #[test]
    fn test_generated_phrase_round_trips() {
        let mnemonic = Mnemonic::generate(MnemonicSize::Words24);
        let parsed = Mnemonic::from_phrase(&mnemonic.phrase()).unwrap();
        assert_eq!(parsed.phrase(), mnemonic.phrase());
    }

    #[test]
    fn test_known_seed_vector() {
        // BIP-39 reference vector for the all-abandon phrase with empty passphrase
        let mnemonic = Mnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        let seed = mnemonic.to_seed("");
        assert_eq!(
            hex::encode(&seed.as_bytes()[..8]),
            "5eb00bbddcf06908"
        );
    }

    #[test]
    fn test_checksum_failure() {
        // Swap the checksum word
        let bad = TEST_MNEMONIC.replace("about", "abandon");
        assert!(matches!(
            Mnemonic::from_phrase(&bad),
            Err(Error::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_word_not_in_list() {
        let bad = TEST_MNEMONIC.replace("about", "zzzzzz");
        assert!(matches!(
            Mnemonic::from_phrase(&bad),
            Err(Error::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_unsupported_size() {
        // 15-word phrases are valid BIP-39 but unsupported here
        let fifteen = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(matches!(
            Mnemonic::from_phrase(fifteen),
            Err(Error::InvalidMnemonic(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(validate(TEST_MNEMONIC));
        assert!(!validate("not a phrase"));
        assert!(!validate(&TEST_MNEMONIC.replace("about", "abandon")));
    }

    #[test]
    fn test_passphrase_changes_seed() {
        let mnemonic = Mnemonic::from_phrase(TEST_MNEMONIC).unwrap();
        assert_ne!(
            mnemonic.to_seed("").as_bytes(),
            mnemonic.to_seed("extra").as_bytes()
        );
    }
}

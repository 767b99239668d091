//! Password-based secret sealing
//!
//! Every persisted secret is wrapped in a self-describing sealed blob:
//! scrypt derives a 256-bit key from the password, XChaCha20-Poly1305
//! authenticates and encrypts the payload. KDF parameters and salt travel
//! inside the blob so password rotation needs no schema change.
//!
//! Wire layout (all integers little-endian):
//!
//! ```text
//! version(1) | kdf_id(1) | log_n(1) | r(1) | p(1) | salt(32) |
//! aead_id(1) | nonce(24) | ct_len(4) | ciphertext | tag_len(2) | tag(16)
//! ```

use crate::{Error, Result};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

/// Blob format version
const BLOB_VERSION: u8 = 1;
/// KDF identifier: scrypt
const KDF_SCRYPT: u8 = 1;
/// AEAD identifier: XChaCha20-Poly1305
const AEAD_XCHACHA20_POLY1305: u8 = 1;

/// Salt length
pub const SALT_LEN: usize = 32;
/// XChaCha20 nonce length
pub const NONCE_LEN: usize = 24;
/// Poly1305 tag length
pub const TAG_LEN: usize = 16;
/// Derived key length
const KEY_LEN: usize = 32;

/// scrypt parameters carried inside each blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// log2 of the scrypt cost parameter N
    pub log_n: u8,
    /// Block size
    pub r: u8,
    /// Parallelism
    pub p: u8,
}

impl Default for KdfParams {
    fn default() -> Self {
        // N = 2^15, r = 8, p = 1
        Self {
            log_n: 15,
            r: 8,
            p: 1,
        }
    }
}

/// An encrypted secret payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlob {
    kdf: KdfParams,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl SealedBlob {
    /// Serialize to the wire layout
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            5 + SALT_LEN + 1 + NONCE_LEN + 4 + self.ciphertext.len() + 2 + TAG_LEN,
        );
        out.push(BLOB_VERSION);
        out.push(KDF_SCRYPT);
        out.push(self.kdf.log_n);
        out.push(self.kdf.r);
        out.push(self.kdf.p);
        out.extend_from_slice(&self.salt);
        out.push(AEAD_XCHACHA20_POLY1305);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&(self.ciphertext.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&(TAG_LEN as u16).to_le_bytes());
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse from the wire layout
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        const HEADER_LEN: usize = 5 + SALT_LEN + 1 + NONCE_LEN + 4;

        if bytes.len() < HEADER_LEN + 2 + TAG_LEN {
            return Err(Error::Store("sealed blob truncated".to_string()));
        }
        if bytes[0] != BLOB_VERSION {
            return Err(Error::Store(format!(
                "unsupported sealed blob version: {}",
                bytes[0]
            )));
        }
        if bytes[1] != KDF_SCRYPT {
            return Err(Error::Store(format!("unsupported KDF id: {}", bytes[1])));
        }

        let kdf = KdfParams {
            log_n: bytes[2],
            r: bytes[3],
            p: bytes[4],
        };
        // log_n == 0 is the reserved extended-parameter escape; reject it.
        if kdf.log_n == 0 || kdf.r == 0 || kdf.p == 0 {
            return Err(Error::Store("invalid KDF parameters".to_string()));
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[5..5 + SALT_LEN]);

        let aead_id = bytes[5 + SALT_LEN];
        if aead_id != AEAD_XCHACHA20_POLY1305 {
            return Err(Error::Store(format!("unsupported AEAD id: {aead_id}")));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[6 + SALT_LEN..6 + SALT_LEN + NONCE_LEN]);

        let ct_len = u32::from_le_bytes(
            bytes[HEADER_LEN - 4..HEADER_LEN]
                .try_into()
                .expect("slice is four bytes"),
        ) as usize;

        let rest = &bytes[HEADER_LEN..];
        if rest.len() != ct_len + 2 + TAG_LEN {
            return Err(Error::Store("sealed blob length mismatch".to_string()));
        }

        let ciphertext = rest[..ct_len].to_vec();
        let tag_len = u16::from_le_bytes(
            rest[ct_len..ct_len + 2]
                .try_into()
                .expect("slice is two bytes"),
        ) as usize;
        if tag_len != TAG_LEN {
            return Err(Error::Store(format!("unsupported tag length: {tag_len}")));
        }

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&rest[ct_len + 2..]);

        Ok(Self {
            kdf,
            salt,
            nonce,
            ciphertext,
            tag,
        })
    }
}

impl Serialize for SealedBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use base64::Engine;
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for SealedBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use base64::Engine;
        let encoded = String::deserialize(deserializer)?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)?;
        SealedBlob::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

fn derive_key(
    password: &str,
    salt: &[u8; SALT_LEN],
    kdf: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    let params = scrypt::Params::new(kdf.log_n, kdf.r as u32, kdf.p as u32, KEY_LEN)
        .map_err(|e| Error::Store(format!("invalid scrypt parameters: {e}")))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(password.as_bytes(), salt, &params, &mut *key)
        .map_err(|e| Error::Store(format!("scrypt failed: {e}")))?;
    Ok(key)
}

/// Seal a payload under a password with the default scrypt parameters.
pub fn seal(password: &str, plaintext: &[u8]) -> Result<SealedBlob> {
    seal_with_params(password, plaintext, KdfParams::default())
}

/// Seal a payload under a password with explicit scrypt parameters.
pub fn seal_with_params(password: &str, plaintext: &[u8], kdf: KdfParams) -> Result<SealedBlob> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let key = derive_key(password, &salt, &kdf)?;
    let cipher = XChaCha20Poly1305::new(key.as_ref().into());

    let mut sealed = cipher
        .encrypt(
            XNonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad: &[],
            },
        )
        .map_err(|_| Error::Store("encryption failed".to_string()))?;

    // The AEAD appends the Poly1305 tag; split it out for the wire layout.
    let tag_start = sealed.len() - TAG_LEN;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&sealed[tag_start..]);
    sealed.truncate(tag_start);

    Ok(SealedBlob {
        kdf,
        salt,
        nonce,
        ciphertext: sealed,
        tag,
    })
}

/// Open a sealed blob. Fails with [`Error::BadPassword`] when the password is
/// wrong or the blob was tampered with. The plaintext is zeroized on drop.
pub fn open(blob: &SealedBlob, password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = derive_key(password, &blob.salt, &blob.kdf)?;
    let cipher = XChaCha20Poly1305::new(key.as_ref().into());

    let mut joined = Vec::with_capacity(blob.ciphertext.len() + TAG_LEN);
    joined.extend_from_slice(&blob.ciphertext);
    joined.extend_from_slice(&blob.tag);

    let plaintext = cipher
        .decrypt(
            XNonce::from_slice(&blob.nonce),
            Payload {
                msg: &joined,
                aad: &[],
            },
        )
        .map_err(|_| Error::BadPassword)?;

    Ok(Zeroizing::new(plaintext))
}

/// Whether a password opens the blob; the plaintext is discarded.
pub fn check_password(blob: &SealedBlob, password: &str) -> bool {
    open(blob, password).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small parameters keep the KDF fast under test.
    fn fast_params() -> KdfParams {
        KdfParams {
            log_n: 4,
            r: 8,
            p: 1,
        }
    }

    #[test]
    fn test_seal_open_round_trip() {
        let blob = seal_with_params("hunter2", b"secret payload", fast_params()).unwrap();
        let opened = open(&blob, "hunter2").unwrap();
        assert_eq!(&*opened, b"secret payload");
    }

    #[test]
    fn test_wrong_password_fails() {
        let blob = seal_with_params("hunter2", b"secret payload", fast_params()).unwrap();
        assert!(matches!(open(&blob, "hunter3"), Err(Error::BadPassword)));
        assert!(!check_password(&blob, "hunter3"));
        assert!(check_password(&blob, "hunter2"));
    }

    #[test]
    fn test_wire_round_trip() {
        let blob = seal_with_params("pw", b"payload", fast_params()).unwrap();
        let bytes = blob.to_bytes();
        let parsed = SealedBlob::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, blob);
        assert_eq!(&*open(&parsed, "pw").unwrap(), b"payload");
    }

    #[test]
    fn test_wire_layout_fields() {
        let blob = seal_with_params("pw", b"abc", fast_params()).unwrap();
        let bytes = blob.to_bytes();
        assert_eq!(bytes[0], BLOB_VERSION);
        assert_eq!(bytes[1], KDF_SCRYPT);
        assert_eq!(bytes[2], 4); // log_n
        assert_eq!(bytes[3], 8); // r
        assert_eq!(bytes[4], 1); // p
        assert_eq!(bytes[5 + SALT_LEN], AEAD_XCHACHA20_POLY1305);
        let ct_len_at = 6 + SALT_LEN + NONCE_LEN;
        let ct_len =
            u32::from_le_bytes(bytes[ct_len_at..ct_len_at + 4].try_into().unwrap()) as usize;
        assert_eq!(ct_len, 3);
    }

    #[test]
    fn test_tampered_blob_fails() {
        let blob = seal_with_params("pw", b"payload", fast_params()).unwrap();
        let mut bytes = blob.to_bytes();
        let flip = bytes.len() - 1;
        bytes[flip] ^= 0xFF;
        let tampered = SealedBlob::from_bytes(&bytes).unwrap();
        assert!(matches!(open(&tampered, "pw"), Err(Error::BadPassword)));
    }

    #[test]
    fn test_fresh_randomness_per_seal() {
        let a = seal_with_params("pw", b"payload", fast_params()).unwrap();
        let b = seal_with_params("pw", b"payload", fast_params()).unwrap();
        assert_ne!(a.to_bytes(), b.to_bytes());
        assert_eq!(*open(&a, "pw").unwrap(), *open(&b, "pw").unwrap());
    }

    #[test]
    fn test_truncated_blob_rejected() {
        let blob = seal_with_params("pw", b"payload", fast_params()).unwrap();
        let bytes = blob.to_bytes();
        assert!(SealedBlob::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(SealedBlob::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_zero_log_n_rejected() {
        let blob = seal_with_params("pw", b"payload", fast_params()).unwrap();
        let mut bytes = blob.to_bytes();
        bytes[2] = 0;
        assert!(SealedBlob::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_serde_base64_representation() {
        let blob = seal_with_params("pw", b"payload", fast_params()).unwrap();
        let json = serde_json::to_string(&blob).unwrap();
        assert!(json.starts_with('"'));
        let back: SealedBlob = serde_json::from_str(&json).unwrap();
        assert_eq!(back, blob);
    }

    #[test]
    fn test_default_params() {
        let kdf = KdfParams::default();
        assert_eq!((kdf.log_n, kdf.r, kdf.p), (15, 8, 1));
    }
}

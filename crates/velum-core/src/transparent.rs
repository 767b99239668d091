//! Transparent account derivation
//!
//! BIP-32 hierarchical derivation over secp256k1 along BIP-44 paths, and
//! implicit-address encoding: the chain's address hash of the compressed
//! public key, rendered as bech32m under the chain's address HRP.

use crate::{mnemonic::Seed, DerivationPath, Error, Result};
use bech32::{Bech32m, Hrp};
use hmac::{Hmac, Mac};
use secp256k1::{All, PublicKey, Scalar, Secp256k1, SecretKey};
use sha2::Sha512;
use velum_params::{ChainParams, IMPLICIT_ADDRESS_LEN};
use zeroize::{Zeroize, Zeroizing};

type HmacSha512 = Hmac<Sha512>;

/// Byte length of a transparent secret key
pub const SECRET_KEY_LEN: usize = 32;

/// BIP-44 purpose segment
const BIP44_PURPOSE: u32 = 44;

/// Hardened index offset
const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key for master key generation
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

const fn hardened(index: u32) -> u32 {
    index | HARDENED_OFFSET
}

/// Intermediate extended key; chain code is zeroized on drop.
struct ExtendedPrivKey {
    secret_key: SecretKey,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ExtendedPrivKey {
    /// Master key per BIP-32: I = HMAC-SHA512(key="Bitcoin seed", seed),
    /// secret = I_L, chain code = I_R.
    fn master(seed: &Seed) -> Result<Self> {
        let mut mac = HmacSha512::new_from_slice(MASTER_HMAC_KEY)
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;
        mac.update(seed.as_bytes());
        let mut i = mac.finalize().into_bytes();

        let secret_key = SecretKey::from_slice(&i[..32])
            .map_err(|_| Error::InvalidSeed("seed produced an invalid master key".to_string()))?;
        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&i[32..]);
        i.as_mut_slice().zeroize();

        Ok(Self {
            secret_key,
            chain_code,
        })
    }

    /// CKDpriv: hardened uses (0x00 || k_par || index), unhardened uses
    /// (serP(K_par) || index); I_L tweak-adds onto the parent key, I_R is the
    /// child chain code.
    fn ckd_priv(&self, secp: &Secp256k1<All>, index: u32) -> Result<Self> {
        let mut mac = HmacSha512::new_from_slice(self.chain_code.as_ref())
            .map_err(|e| Error::KeyDerivation(e.to_string()))?;

        if index >= HARDENED_OFFSET {
            let mut data = [0u8; 1 + 32 + 4];
            data[1..33].copy_from_slice(&self.secret_key.secret_bytes());
            data[33..].copy_from_slice(&index.to_be_bytes());
            mac.update(&data);
            data.zeroize();
        } else {
            let parent_pub = PublicKey::from_secret_key(secp, &self.secret_key);
            let mut data = [0u8; 33 + 4];
            data[..33].copy_from_slice(&parent_pub.serialize());
            data[33..].copy_from_slice(&index.to_be_bytes());
            mac.update(&data);
        }

        let mut i = mac.finalize().into_bytes();

        let mut il = [0u8; 32];
        il.copy_from_slice(&i[..32]);
        let tweak = Scalar::from_be_bytes(il)
            .map_err(|_| Error::KeyDerivation(format!("invalid child key at index {index}")))?;
        il.zeroize();

        let secret_key = self
            .secret_key
            .add_tweak(&tweak)
            .map_err(|_| Error::KeyDerivation(format!("invalid child key at index {index}")))?;

        let mut chain_code = Zeroizing::new([0u8; 32]);
        chain_code.copy_from_slice(&i[32..]);
        i.as_mut_slice().zeroize();

        Ok(Self {
            secret_key,
            chain_code,
        })
    }
}

/// A derived transparent account key with its implicit address
pub struct TransparentKey {
    secret_key: SecretKey,
    address: String,
}

impl TransparentKey {
    /// Implicit on-chain address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Secret key bytes; zeroized on drop
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LEN]> {
        Zeroizing::new(self.secret_key.secret_bytes())
    }

    /// Secret key as lowercase hex; zeroized on drop
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.secret_key.secret_bytes()))
    }
}

fn derive_segments(
    seed: &Seed,
    params: &ChainParams,
    segments: &[u32],
) -> Result<TransparentKey> {
    let secp = Secp256k1::new();

    let mut node = ExtendedPrivKey::master(seed)?;
    for &segment in segments {
        node = node.ckd_priv(&secp, segment)?;
    }

    let public_key = PublicKey::from_secret_key(&secp, &node.secret_key);
    let address = implicit_address(params, &public_key.serialize())?;

    Ok(TransparentKey {
        secret_key: node.secret_key,
        address,
    })
}

/// Derive the key at `m/44'/coin'/account/change[/index]`.
pub fn derive(seed: &Seed, params: &ChainParams, path: &DerivationPath) -> Result<TransparentKey> {
    let mut segments = vec![
        hardened(BIP44_PURPOSE),
        hardened(params.coin_type),
        path.account,
        path.change,
    ];
    if let Some(index) = path.index {
        segments.push(index);
    }
    derive_segments(seed, params, &segments)
}

/// Derive the root account key at `m/44'/coin'/0'/0`.
pub fn derive_root(seed: &Seed, params: &ChainParams) -> Result<TransparentKey> {
    derive_segments(
        seed,
        params,
        &[
            hardened(BIP44_PURPOSE),
            hardened(params.coin_type),
            hardened(0),
            0,
        ],
    )
}

/// Encode an implicit address from a compressed public key.
pub fn implicit_address(params: &ChainParams, compressed_pubkey: &[u8; 33]) -> Result<String> {
    let digest = params.address_hash(compressed_pubkey);
    let hrp = Hrp::parse(&params.address_hrp)
        .map_err(|e| Error::InvalidAddress(format!("invalid address HRP: {e}")))?;
    bech32::encode::<Bech32m>(hrp, &digest)
        .map_err(|e| Error::InvalidAddress(format!("address encoding failed: {e}")))
}

/// Decode an implicit address, verifying the chain's HRP.
pub fn decode_implicit_address(
    params: &ChainParams,
    address: &str,
) -> Result<[u8; IMPLICIT_ADDRESS_LEN]> {
    let (hrp, data) = bech32::decode(address)
        .map_err(|e| Error::InvalidAddress(format!("address decoding failed: {e}")))?;
    if hrp.as_str() != params.address_hrp {
        return Err(Error::InvalidAddress("address HRP mismatch".to_string()));
    }
    data.try_into()
        .map_err(|_| Error::InvalidAddress("invalid address payload length".to_string()))
}

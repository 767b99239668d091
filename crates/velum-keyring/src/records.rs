//! Account records and content-addressed identity
//!
//! One flat table of records indexed by UUIDv5 id; parent/child links are
//! lookups, not ownership edges. Only the `crypto` field holds secret
//! material; everything else is plaintext metadata.

use crate::crypto::SealedBlob;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use velum_core::DerivationPath;
use zeroize::{Zeroize, Zeroizing};

/// UUIDv5 namespace for record identity
pub const ID_NAMESPACE: Uuid = Uuid::from_u128(0x9bfc_eade_37fe_11ed_acc0_a3da_3461_b38c_u128);

/// Kind of secret an account record carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Parent record holding an encrypted phrase
    Mnemonic,
    /// Transparent child holding an encrypted private key
    PrivateKey,
    /// Shielded child holding encrypted spending/viewing keys
    ShieldedKeys,
}

/// Identity of a parent record: a pure function of the phrase and the number
/// of records present at import time.
pub fn parent_account_id(phrase: &str, rank: usize) -> Uuid {
    let name = Zeroizing::new(format!("{phrase}::{rank}"));
    Uuid::new_v5(&ID_NAMESPACE, name.as_bytes())
}

/// Identity of a derived record: a pure function of its kind, parent, and
/// derivation path. An absent index participates as `0`.
pub fn derived_account_id(kind: AccountType, parent_id: &Uuid, path: &DerivationPath) -> Uuid {
    let tag = match kind {
        AccountType::ShieldedKeys => "shielded-account",
        _ => "account",
    };
    let name = format!(
        "{tag}::{parent_id}::{}::{}::{}",
        path.account,
        path.change,
        path.index_or_zero()
    );
    Uuid::new_v5(&ID_NAMESPACE, name.as_bytes())
}

/// Shielded secret payload, persisted as JSON inside the sealed blob
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldedSecret {
    /// Extended spending key, bech32m
    pub spending_key: String,
    /// Extended full viewing key, bech32m
    pub viewing_key: String,
}

impl Zeroize for ShieldedSecret {
    fn zeroize(&mut self) {
        self.spending_key.zeroize();
        self.viewing_key.zeroize();
    }
}

impl Drop for ShieldedSecret {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// The plaintext secret that lives inside a record's sealed blob
pub enum Secret {
    /// Mnemonic phrase (parent records)
    Mnemonic(Zeroizing<String>),
    /// Transparent private key as lowercase hex
    Transparent(Zeroizing<String>),
    /// Shielded key pair
    Shielded(ShieldedSecret),
}

impl Secret {
    /// Serialize to the stored payload bytes
    pub fn encode(&self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(match self {
            Secret::Mnemonic(phrase) => Zeroizing::new(phrase.as_bytes().to_vec()),
            Secret::Transparent(key_hex) => Zeroizing::new(key_hex.as_bytes().to_vec()),
            Secret::Shielded(keys) => Zeroizing::new(serde_json::to_vec(keys)?),
        })
    }

    /// Parse stored payload bytes for a record of the given kind
    pub fn decode(kind: AccountType, bytes: &[u8]) -> Result<Self> {
        match kind {
            AccountType::Mnemonic => Ok(Secret::Mnemonic(Zeroizing::new(utf8(bytes)?))),
            AccountType::PrivateKey => Ok(Secret::Transparent(Zeroizing::new(utf8(bytes)?))),
            AccountType::ShieldedKeys => Ok(Secret::Shielded(serde_json::from_slice(bytes)?)),
        }
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| Error::Store("secret payload is not valid UTF-8".to_string()))
}

/// One persisted account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Stable content-addressed id
    pub id: Uuid,
    /// Parent mnemonic record; absent for parents themselves
    pub parent_id: Option<Uuid>,
    /// Human-readable label
    pub alias: String,
    /// Chain this account is bound to
    pub chain_id: String,
    /// Derivation path (parents use `(0, 0)`)
    pub path: DerivationPath,
    /// Record kind
    #[serde(rename = "type")]
    pub kind: AccountType,
    /// On-chain address (implicit or payment address)
    pub address: String,
    /// Address for transparent accounts, viewing key for shielded ones
    pub owner: String,
    /// The sealed secret payload
    pub crypto: SealedBlob,
}

impl AccountRecord {
    /// The record with its sealed blob stripped
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            parent_id: self.parent_id,
            alias: self.alias.clone(),
            chain_id: self.chain_id.clone(),
            path: self.path,
            kind: self.kind,
            address: self.address.clone(),
            owner: self.owner.clone(),
        }
    }
}

/// An account record without its `crypto` payload, safe to hand to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSummary {
    /// Stable content-addressed id
    pub id: Uuid,
    /// Parent mnemonic record, if any
    pub parent_id: Option<Uuid>,
    /// Human-readable label
    pub alias: String,
    /// Chain this account is bound to
    pub chain_id: String,
    /// Derivation path
    pub path: DerivationPath,
    /// Record kind
    #[serde(rename = "type")]
    pub kind: AccountType,
    /// On-chain address
    pub address: String,
    /// Balance-query owner
    pub owner: String,
}

/// The persisted record table
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Records(Vec<AccountRecord>);

impl Records {
    /// Number of records
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Primary index: record by id
    pub fn get(&self, id: &Uuid) -> Option<&AccountRecord> {
        self.0.iter().find(|r| &r.id == id)
    }

    /// Mutable lookup by id
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut AccountRecord> {
        self.0.iter_mut().find(|r| &r.id == id)
    }

    /// Whether a record with this id exists
    pub fn contains(&self, id: &Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Secondary index: children of a parent
    pub fn children_of(&self, parent_id: &Uuid) -> impl Iterator<Item = &AccountRecord> {
        let parent_id = *parent_id;
        self.0
            .iter()
            .filter(move |r| r.parent_id == Some(parent_id))
    }

    /// Tertiary index: record by address
    pub fn by_address(&self, address: &str) -> Option<&AccountRecord> {
        self.0.iter().find(|r| r.address == address)
    }

    /// Tertiary index: records of a kind
    pub fn of_type(&self, kind: AccountType) -> impl Iterator<Item = &AccountRecord> {
        self.0.iter().filter(move |r| r.kind == kind)
    }

    /// A record together with its children
    pub fn family(&self, id: &Uuid) -> Vec<&AccountRecord> {
        let id = *id;
        self.0
            .iter()
            .filter(|r| r.id == id || r.parent_id == Some(id))
            .collect()
    }

    /// Append a record; fails if the id is already present
    pub fn push(&mut self, record: AccountRecord) -> Result<()> {
        if self.contains(&record.id) {
            return Err(Error::Duplicate(record.id.to_string()));
        }
        self.0.push(record);
        Ok(())
    }

    /// Remove a record and every record whose parent it is; returns the
    /// number of records removed.
    pub fn remove_family(&mut self, id: &Uuid) -> usize {
        let before = self.0.len();
        let id = *id;
        self.0.retain(|r| r.id != id && r.parent_id != Some(id));
        before - self.0.len()
    }

    /// Iterate over all records
    pub fn iter(&self) -> impl Iterator<Item = &AccountRecord> {
        self.0.iter()
    }
}

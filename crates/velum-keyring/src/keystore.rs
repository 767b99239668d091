//! The account keystore
//!
//! A persisted collection of account records behind a lock/unlock lifecycle.
//! Secrets are sealed with the password-derived key before they touch the
//! driver; the password itself lives only in process memory and is the single
//! mutable shared resource. Every operation takes `&mut self`, so mutations
//! are naturally serialized; multi-threaded embedders wrap the store in one
//! `tokio::sync::Mutex`.

use crate::crypto::{self, KdfParams, SealedBlob};
use crate::query::{self, Balance, ChainQuery};
use crate::records::{
    derived_account_id, parent_account_id, AccountRecord, AccountSummary, AccountType, Records,
    Secret, ShieldedSecret,
};
use crate::sdk::TxBuilder;
use crate::store::{KvDriver, KEY_STORE, PARENT_ACCOUNT_ID, SDK_STORE};
use crate::{Error, Result};
use std::collections::HashMap;
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;
use velum_core::{shielded, transparent, DerivationPath, Mnemonic, MnemonicSize};
use velum_params::ChainRegistry;
use zeroize::Zeroizing;

/// Keystore lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    /// No records exist yet
    Empty,
    /// Records exist but no password is cached
    Locked,
    /// A password is cached in memory
    Unlocked,
}

/// Encrypted account keystore
pub struct KeyStore {
    driver: Box<dyn KvDriver>,
    registry: ChainRegistry,
    sdk: Box<dyn TxBuilder>,
    chain_id: String,
    kdf: KdfParams,
    password: Option<Zeroizing<String>>,
}

impl KeyStore {
    /// Create a keystore bound to one chain
    pub fn new(
        driver: Box<dyn KvDriver>,
        registry: ChainRegistry,
        sdk: Box<dyn TxBuilder>,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            registry,
            sdk,
            chain_id: chain_id.into(),
            kdf: KdfParams::default(),
            password: None,
        }
    }

    /// Override the scrypt parameters used for new blobs
    pub fn with_kdf_params(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Generate a fresh phrase; never persisted
    pub fn generate_mnemonic(size: MnemonicSize) -> Zeroizing<String> {
        Mnemonic::generate(size).phrase()
    }

    /// Current lifecycle state
    pub async fn status(&self) -> Result<LockStatus> {
        if self.load_records().await?.is_empty() {
            return Ok(LockStatus::Empty);
        }
        Ok(match self.password {
            Some(_) => LockStatus::Unlocked,
            None => LockStatus::Locked,
        })
    }

    /// Import a mnemonic phrase as a new parent account.
    ///
    /// Validates the phrase, derives the root transparent account at
    /// `m/44'/coin'/0'/0`, seals the phrase under the password, registers the
    /// root key with the transaction builder, marks the new parent active,
    /// and caches the password (`Empty -> Unlocked`).
    pub async fn store_mnemonic(
        &mut self,
        phrase: &str,
        password: &str,
        alias: &str,
    ) -> Result<AccountSummary> {
        if password.is_empty() {
            return Err(Error::NoPassword);
        }
        let mnemonic = Mnemonic::from_phrase(phrase)?;
        let params = self.registry.get(&self.chain_id)?.clone();

        let seed = mnemonic.to_seed("");
        let root = transparent::derive_root(&seed, &params)?;

        let mut records = self.load_records().await?;
        let rank = records.len();
        let id = parent_account_id(phrase, rank);

        let secret = Secret::Mnemonic(mnemonic.phrase());
        let crypto = self.seal(password, secret.encode()?).await?;

        let record = AccountRecord {
            id,
            parent_id: None,
            alias: alias.to_string(),
            chain_id: self.chain_id.clone(),
            path: DerivationPath::root(),
            kind: AccountType::Mnemonic,
            address: root.address().to_string(),
            owner: root.address().to_string(),
            crypto,
        };
        let summary = record.summary();

        records.push(record)?;
        self.save_records(&records).await?;

        self.sdk.add_key(&root.secret_hex(), password, alias);
        self.snapshot_sdk(&id).await?;

        self.write_active_id(&id).await?;
        self.password = Some(Zeroizing::new(password.to_string()));

        info!(%id, alias, "stored mnemonic account");
        Ok(summary)
    }

    /// Unlock against the active parent record (`Locked -> Unlocked`)
    pub async fn unlock(&mut self, password: &str) -> Result<()> {
        let record = self.active_record().await?;
        self.open(&record.crypto, password).await?;
        self.password = Some(Zeroizing::new(password.to_string()));
        debug!(id = %record.id, "keystore unlocked");
        Ok(())
    }

    /// Forget the cached password (`Unlocked -> Locked`). Idempotent.
    pub fn lock(&mut self) {
        self.password = None;
        debug!("keystore locked");
    }

    /// Whether a password opens the active parent's blob
    pub async fn check_password(&self, password: &str) -> Result<bool> {
        let record = self.active_record().await?;
        Ok(self.open(&record.crypto, password).await.is_ok())
    }

    /// Derive a child account from the active parent.
    ///
    /// Requires `Unlocked`. Decrypts the parent phrase, expands the seed, and
    /// dispatches on `kind`: transparent accounts follow
    /// `m/44'/coin'/account/change[/index]`, shielded accounts use the ZIP-32
    /// account at `path.index`. The new secret is sealed under the cached
    /// password and registered with the transaction builder.
    pub async fn derive_account(
        &mut self,
        path: DerivationPath,
        kind: AccountType,
        alias: &str,
    ) -> Result<AccountSummary> {
        let password = self.password.clone().ok_or(Error::NoPassword)?;
        let parent = self.active_record().await?;
        if parent.kind != AccountType::Mnemonic {
            return Err(Error::Store(
                "active record is not a mnemonic account".to_string(),
            ));
        }

        let phrase_bytes = self.open(&parent.crypto, &password).await?;
        let phrase = match Secret::decode(AccountType::Mnemonic, &phrase_bytes)? {
            Secret::Mnemonic(phrase) => phrase,
            _ => return Err(Error::Store("parent secret is not a phrase".to_string())),
        };
        let seed = Mnemonic::from_phrase(&phrase)?.to_seed("");
        let params = self.registry.get(&self.chain_id)?.clone();

        let id = derived_account_id(kind, &parent.id, &path);
        let mut records = self.load_records().await?;
        if records.contains(&id) {
            return Err(Error::Duplicate(id.to_string()));
        }

        let (secret, address, owner, spending_key_raw) = match kind {
            AccountType::PrivateKey => {
                let key = transparent::derive(&seed, &params, &path)?;
                let address = key.address().to_string();
                (
                    Secret::Transparent(key.secret_hex()),
                    address.clone(),
                    address,
                    None,
                )
            }
            AccountType::ShieldedKeys => {
                let account = shielded::derive(&seed, &params, path.index_or_zero())?;
                let raw = Zeroizing::new(account.spending_key_bytes().to_vec());
                let secret = Secret::Shielded(ShieldedSecret {
                    spending_key: account.spending_key.clone(),
                    viewing_key: account.viewing_key.clone(),
                });
                (
                    secret,
                    account.payment_address.clone(),
                    account.viewing_key.clone(),
                    Some(raw),
                )
            }
            AccountType::Mnemonic => {
                return Err(Error::Store(
                    "derived accounts cannot be mnemonics".to_string(),
                ))
            }
        };

        let crypto = self.seal(&password, secret.encode()?).await?;
        let record = AccountRecord {
            id,
            parent_id: Some(parent.id),
            alias: alias.to_string(),
            chain_id: self.chain_id.clone(),
            path,
            kind,
            address,
            owner,
            crypto,
        };
        let summary = record.summary();

        records.push(record)?;
        self.save_records(&records).await?;

        match &secret {
            Secret::Transparent(key_hex) => self.sdk.add_key(key_hex, &password, alias),
            Secret::Shielded(_) => {
                if let Some(raw) = &spending_key_raw {
                    self.sdk.add_spending_key(raw, &password, alias);
                }
            }
            Secret::Mnemonic(_) => {}
        }
        self.snapshot_sdk(&parent.id).await?;

        info!(%id, parent = %parent.id, ?kind, "derived account");
        Ok(summary)
    }

    /// Rotate the password for a record and all of its children, atomically.
    ///
    /// Verifies `old` against the target record first. Every blob in the
    /// family is re-sealed in memory before a single write replaces the
    /// record list, so an interruption leaves all-old or all-new ciphertexts.
    pub async fn reset_password(
        &mut self,
        old_password: &str,
        new_password: &str,
        account_id: &Uuid,
    ) -> Result<()> {
        if new_password.is_empty() {
            return Err(Error::NoPassword);
        }

        let mut records = self.load_records().await?;
        let anchor = records
            .get(account_id)
            .ok_or_else(|| Error::UnknownAccount(account_id.to_string()))?;
        self.open(&anchor.crypto, old_password).await?;

        // Stage every re-sealed blob before touching storage.
        let family: Vec<Uuid> = records.family(account_id).iter().map(|r| r.id).collect();
        let mut staged: Vec<(Uuid, SealedBlob)> = Vec::with_capacity(family.len());
        for id in &family {
            let record = records
                .get(id)
                .ok_or_else(|| Error::UnknownAccount(id.to_string()))?;
            let plaintext = self.open(&record.crypto, old_password).await.map_err(|_| {
                Error::Store(format!("record {id} failed to decrypt during rotation"))
            })?;
            staged.push((*id, self.seal(new_password, plaintext).await?));
        }

        for (id, blob) in staged {
            if let Some(record) = records.get_mut(&id) {
                record.crypto = blob;
            }
        }
        self.save_records(&records).await?;

        if self.active_id().await? == Some(*account_id) {
            self.password = Some(Zeroizing::new(new_password.to_string()));
        }

        info!(id = %account_id, rotated = family.len(), "password rotated");
        Ok(())
    }

    /// Delete a record and every record whose parent it is.
    ///
    /// Verifies the password against the target record first. Deleting the
    /// active parent forgets the cached password and the active id.
    pub async fn delete_account(&mut self, account_id: &Uuid, password: &str) -> Result<()> {
        let mut records = self.load_records().await?;
        let record = records
            .get(account_id)
            .ok_or_else(|| Error::UnknownAccount(account_id.to_string()))?;
        self.open(&record.crypto, password).await?;

        let removed = records.remove_family(account_id);
        self.save_records(&records).await?;

        let mut sdk_map = self.load_sdk_map().await?;
        if sdk_map.remove(account_id).is_some() {
            self.save_sdk_map(&sdk_map).await?;
        }

        if self.active_id().await? == Some(*account_id) {
            self.driver.delete(PARENT_ACCOUNT_ID).await?;
            self.password = None;
        }

        info!(id = %account_id, removed, "deleted account");
        Ok(())
    }

    /// The active parent and its children, stripped of `crypto`.
    /// Empty when no parent is active.
    pub async fn query_accounts(&self) -> Result<Vec<AccountSummary>> {
        let Some(active) = self.active_id().await? else {
            return Ok(Vec::new());
        };
        let records = self.load_records().await?;
        let Some(parent) = records.get(&active) else {
            return Ok(Vec::new());
        };

        let mut out = vec![parent.summary()];
        out.extend(records.children_of(&active).map(AccountRecord::summary));
        Ok(out)
    }

    /// All parent records, stripped of `crypto`
    pub async fn query_parent_accounts(&self) -> Result<Vec<AccountSummary>> {
        let records = self.load_records().await?;
        Ok(records
            .of_type(AccountType::Mnemonic)
            .map(AccountRecord::summary)
            .collect())
    }

    /// The active parent id, if any
    pub async fn active_account_id(&self) -> Result<Option<Uuid>> {
        self.active_id().await
    }

    /// Select the active parent and re-hydrate the transaction builder from
    /// its persisted snapshot. Switching parents locks the keystore.
    ///
    /// Only mnemonic records can be active; at most one parent id is active
    /// at any time.
    pub async fn set_active_account_id(&mut self, account_id: &Uuid) -> Result<()> {
        let records = self.load_records().await?;
        let record = records
            .get(account_id)
            .ok_or_else(|| Error::UnknownAccount(account_id.to_string()))?;
        if record.kind != AccountType::Mnemonic {
            return Err(Error::Store(
                "active id must be a mnemonic account".to_string(),
            ));
        }

        let previous = self.active_id().await?;
        self.write_active_id(account_id).await?;
        if previous != Some(*account_id) {
            self.password = None;
        }

        let sdk_map = self.load_sdk_map().await?;
        if let Some(encoded) = sdk_map.get(account_id) {
            let bytes = decode_base64(encoded)?;
            self.sdk.decode(&bytes)?;
        }

        debug!(id = %account_id, "active account selected");
        Ok(())
    }

    /// Balances for an owner via the external chain query
    pub async fn query_balances(&self, source: &dyn ChainQuery, owner: &str) -> Vec<Balance> {
        query::query_balances(source, owner).await
    }

    /// Wipe the backing store and return to the `Empty` state
    pub async fn clear(&mut self) -> Result<()> {
        self.driver.delete(KEY_STORE).await?;
        self.driver.delete(SDK_STORE).await?;
        self.driver.delete(PARENT_ACCOUNT_ID).await?;
        self.password = None;
        info!("keystore cleared");
        Ok(())
    }

    // ---- persistence helpers ----

    async fn load_records(&self) -> Result<Records> {
        match self.driver.get(KEY_STORE).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Records::default()),
        }
    }

    async fn save_records(&self, records: &Records) -> Result<()> {
        self.driver
            .put(KEY_STORE, serde_json::to_vec(records)?)
            .await
    }

    async fn active_id(&self) -> Result<Option<Uuid>> {
        match self.driver.get(PARENT_ACCOUNT_ID).await? {
            Some(bytes) => {
                let text = String::from_utf8(bytes)
                    .map_err(|_| Error::Store("corrupt active account id".to_string()))?;
                let id = Uuid::parse_str(&text)
                    .map_err(|_| Error::Store("corrupt active account id".to_string()))?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    async fn write_active_id(&self, id: &Uuid) -> Result<()> {
        self.driver
            .put(PARENT_ACCOUNT_ID, id.to_string().into_bytes())
            .await
    }

    async fn active_record(&self) -> Result<AccountRecord> {
        let active = self
            .active_id()
            .await?
            .ok_or_else(|| Error::UnknownAccount("no active account".to_string()))?;
        self.load_records()
            .await?
            .get(&active)
            .cloned()
            .ok_or_else(|| Error::UnknownAccount(active.to_string()))
    }

    async fn load_sdk_map(&self) -> Result<HashMap<Uuid, String>> {
        match self.driver.get(SDK_STORE).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(HashMap::new()),
        }
    }

    async fn save_sdk_map(&self, map: &HashMap<Uuid, String>) -> Result<()> {
        self.driver.put(SDK_STORE, serde_json::to_vec(map)?).await
    }

    async fn snapshot_sdk(&mut self, parent_id: &Uuid) -> Result<()> {
        let snapshot = self.sdk.encode();
        let mut map = self.load_sdk_map().await?;
        map.insert(*parent_id, encode_base64(&snapshot));
        self.save_sdk_map(&map).await
    }

    // ---- sealing helpers; scrypt runs on the blocking pool ----

    async fn seal(&self, password: &str, plaintext: Zeroizing<Vec<u8>>) -> Result<SealedBlob> {
        let password = Zeroizing::new(password.to_string());
        let kdf = self.kdf;
        task::spawn_blocking(move || crypto::seal_with_params(&password, &plaintext, kdf))
            .await
            .map_err(|e| Error::Store(format!("sealing task failed: {e}")))?
    }

    async fn open(&self, blob: &SealedBlob, password: &str) -> Result<Zeroizing<Vec<u8>>> {
        let blob = blob.clone();
        let password = Zeroizing::new(password.to_string());
        task::spawn_blocking(move || crypto::open(&blob, &password))
            .await
            .map_err(|e| Error::Store(format!("opening task failed: {e}")))?
    }
}

fn encode_base64(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| Error::Store("corrupt builder snapshot".to_string()))
}

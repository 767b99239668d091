//! Key-value persistence abstraction
//!
//! The keystore persists through a narrow byte-oriented driver so the actual
//! backend (extension storage, disk, SQLite) stays out of scope. A process
//! memory driver is provided for tests and ephemeral embedders.

use crate::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage key for the account record list
pub const KEY_STORE: &str = "key-store";
/// Storage key for the transaction builder's per-parent state map
pub const SDK_STORE: &str = "sdk-store";
/// Storage key for the active parent account id
pub const PARENT_ACCOUNT_ID: &str = "parent-account-id";

/// Byte-oriented key-value driver
#[async_trait]
pub trait KvDriver: Send + Sync {
    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a value
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Delete a value; deleting an absent key is a no-op
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory driver
#[derive(Debug, Default)]
pub struct MemoryDriver {
    cells: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryDriver {
    /// Create an empty driver
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvDriver for MemoryDriver {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.cells.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.cells.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cells.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_driver_round_trip() {
        let driver = MemoryDriver::new();
        assert_eq!(driver.get("k").await.unwrap(), None);

        driver.put("k", vec![1, 2, 3]).await.unwrap();
        assert_eq!(driver.get("k").await.unwrap(), Some(vec![1, 2, 3]));

        driver.delete("k").await.unwrap();
        assert_eq!(driver.get("k").await.unwrap(), None);

        // deleting again is fine
        driver.delete("k").await.unwrap();
    }
}

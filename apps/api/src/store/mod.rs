//! Device key-value storage.
//!
//! The store is a dumb string map. Everything structured is JSON-serialized
//! before `set` and parsed after `get`. Callers in the state container never
//! see a `StoreError`: the helpers at the bottom of this module log and
//! swallow failures so in-memory state stays authoritative for the session.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::warn;

pub mod file;
pub mod memory;
pub mod redis;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

/// Persisted key names.
pub mod keys {
    pub const USER_DATA: &str = "userData";
    pub const RELATIONSHIPS: &str = "relationships";
    pub const SPECIAL_DATES: &str = "specialDates";
    pub const DAILY_MOODS: &str = "dailyMoods";
    pub const TOTAL_MESSAGE_COUNT: &str = "totalMessageCount";
    pub const SAVED_ADVICE: &str = "savedAdvice";
    pub const LAST_USAGE_DATE: &str = "lastUsageDate";
    pub const DAILY_TOKEN_USAGE: &str = "dailyTokenUsage";
    pub const USER_LANGUAGE: &str = "user_language";
    pub const PRIVACY_LOCK_ENABLED: &str = "privacyLockEnabled";
    pub const NOTIFICATIONS_ENABLED: &str = "notificationsEnabled";

    /// Transcript key for one conversation (`general` or a relationship id).
    pub fn chat(conversation: &str) -> String {
        format!("chat_{conversation}")
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Reads a raw string. Read failures degrade to "absent".
pub async fn load_string(store: &dyn KvStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{key}' from store: {e}");
            None
        }
    }
}

/// Reads and parses a JSON value. Unparseable data is treated as absent.
pub async fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = load_string(store, key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring unparseable value stored under '{key}': {e}");
            None
        }
    }
}

/// Writes a raw string; failures are logged and dropped.
pub async fn save_string(store: &dyn KvStore, key: &str, value: &str) {
    if let Err(e) = store.set(key, value).await {
        warn!("Failed to persist '{key}': {e}");
    }
}

pub async fn save_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => save_string(store, key, &raw).await,
        Err(e) => warn!("Failed to serialize '{key}': {e}"),
    }
}

pub async fn remove_key(store: &dyn KvStore, key: &str) {
    if let Err(e) = store.remove(key).await {
        warn!("Failed to remove '{key}': {e}");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FailingStore;
    use super::*;

    #[tokio::test]
    async fn test_load_json_ignores_garbage() {
        let store = MemoryStore::new();
        store.set(keys::RELATIONSHIPS, "not json").await.unwrap();
        let parsed: Option<Vec<String>> = load_json(&store, keys::RELATIONSHIPS).await;
        assert!(parsed.is_none());
    }

    #[tokio::test]
    async fn test_helpers_swallow_failures() {
        let store = FailingStore;
        assert!(load_string(&store, keys::USER_DATA).await.is_none());
        save_json(&store, keys::SAVED_ADVICE, &vec!["x"]).await;
        remove_key(&store, keys::SAVED_ADVICE).await;
    }

    #[test]
    fn test_chat_key() {
        assert_eq!(keys::chat("general"), "chat_general");
    }
}

use log::*;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error;

mod file_store;
pub use file_store::FileStore;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Can't access stored value `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Stored value `{key}` is malformed: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Can't encode value for `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{0}` is not a valid store key")]
    InvalidKey(String),
}

/// A flat string store, addressed by key. Values survive between sessions.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Reads and decodes a JSON value. A missing key is `Ok(None)`.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get(key)? else {
        trace!("No stored value for {key}");
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: key.to_string(),
            source,
        })
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    debug!("Storing {key}: {raw}");
    store.set(key, &raw)
}

/// Keeps values in memory only. Clones share the same values.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub(crate) fn check_key(key: &str) -> Result<()> {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_memory_store_shared() {
        let mut store = MemoryStore::new();
        let other = store.clone();

        assert_eq!(other.get("gameSettings").unwrap(), None);
        store.set("gameSettings", "{}").unwrap();
        assert_eq!(other.get("gameSettings").unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn test_json_helpers() {
        let mut store = MemoryStore::new();

        assert_eq!(load_json::<Vec<String>>(&store, "lastFiveGames").unwrap(), None);

        save_json(&mut store, "lastFiveGames", &vec!["1 x 3"]).unwrap();
        assert_eq!(
            store.get("lastFiveGames").unwrap(),
            Some(r#"["1 x 3"]"#.to_string())
        );
        assert_eq!(
            load_json::<Vec<String>>(&store, "lastFiveGames").unwrap(),
            Some(vec!["1 x 3".to_string()])
        );
    }

    #[test]
    fn test_decode_error() {
        let mut store = MemoryStore::new();
        store.set("lastFiveGames", "[1 x 3").unwrap();

        let err = load_json::<Vec<String>>(&store, "lastFiveGames").unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "lastFiveGames"));
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("gameSettings").is_ok());
        assert!(check_key("last_five").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("../etc").is_err());
    }
}

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{KvStore, StoreError};

/// Single-file JSON store, the on-disk stand-in for device storage.
///
/// The whole map is rewritten on every mutation through a temp file in the
/// same directory followed by a rename, so a crash never leaves a torn file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens (or lazily creates) the store at `path`. An unparseable file is
    /// moved aside to `<path>.corrupt` and the store starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries: HashMap<String, String> = match tokio::fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    let aside = corrupt_path(&path);
                    warn!(
                        "Store file {} is unreadable ({e}), moving it to {} and starting empty",
                        path.display(),
                        aside.display()
                    );
                    tokio::fs::rename(&path, &aside).await?;
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No store file at {}, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(entries)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &body))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store writer panicked: {e}")))??;

        debug!("Flushed {} keys to {}", entries.len(), self.path.display());
        Ok(())
    }
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".corrupt");
    PathBuf::from(name)
}

fn write_atomically(path: &Path, body: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.flush(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("userData", "{\"userName\":\"Deniz\"}").await.unwrap();
        store.set("dailyTokenUsage", "120").await.unwrap();
        store.remove("dailyTokenUsage").await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("userData").await.unwrap().as_deref(),
            Some("{\"userName\":\"Deniz\"}")
        );
        assert_eq!(reopened.get("dailyTokenUsage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_empties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set("a", "1").await.unwrap();
        store.clear().await.unwrap();

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path).await.unwrap();
        assert_eq!(store.get("userData").await.unwrap(), None);
        assert!(!path.exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("store.json.corrupt")).unwrap(),
            "{ not json"
        );

        store.set("a", "1").await.unwrap();
        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
    }
}

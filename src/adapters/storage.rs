use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Stores each key as `<base>/<key>.json`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        Path::new(&self.base_path).join(format!("{}.json", key))
    }
}

impl Storage for LocalStorage {
    async fn read_entry(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.entry_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a sibling `.tmp` file and renames it over the entry, so a
    /// crash mid-write leaves the previous contents intact.
    async fn write_entry(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.entry_path(key);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = full_path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&temp_path, &full_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Process-local storage; clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    async fn read_entry(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write_entry(&self, key: &str, data: &[u8]) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_missing_entry_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        assert!(storage.read_entry("platforms").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_local_storage_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("state");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage.write_entry("platforms", b"{}").await.unwrap();

        assert!(base.join("platforms.json").exists());
        assert_eq!(storage.read_entry("platforms").await.unwrap().unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_local_storage_replaces_entry_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_entry("platforms", b"{\"github\": {}}").await.unwrap();
        storage.write_entry("platforms", b"{}").await.unwrap();

        assert_eq!(storage.read_entry("platforms").await.unwrap().unwrap(), b"{}");
        assert!(!temp_dir.path().join("platforms.json.tmp").exists());
        let names: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("platforms.json")]);
    }

    #[tokio::test]
    async fn test_local_storage_ignores_stale_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_entry("platforms", b"{}").await.unwrap();
        std::fs::write(temp_dir.path().join("platforms.json.tmp"), b"{\"trunc").unwrap();

        assert_eq!(storage.read_entry("platforms").await.unwrap().unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.write_entry("platforms", b"[]").await.unwrap();
        assert_eq!(other.read_entry("platforms").await.unwrap().unwrap(), b"[]");
    }
}

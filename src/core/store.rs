use crate::domain::model::{PersistedState, PLATFORMS_KEY};
use crate::domain::platform::PlatformId;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ViewerError};
use crate::utils::validation::validate_non_empty_string;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Username lists per platform, mirrored to [`Storage`] under `platforms`.
///
/// Every mutation rewrites the whole state while the lock is held, so
/// concurrent writers are serialized and the last one wins. After a failed
/// [`load`](Self::load) mutations are refused until a load succeeds, since a
/// rewrite would replace the unread file with an empty state.
pub struct UsernameStore<S: Storage> {
    storage: S,
    platforms: Vec<PlatformId>,
    state: Mutex<PersistedState>,
    load_failed: AtomicBool,
}

impl<S: Storage> UsernameStore<S> {
    pub fn new(storage: S, platforms: Vec<PlatformId>) -> Self {
        let state = PersistedState::with_platforms(&platforms);
        Self {
            storage,
            platforms,
            state: Mutex::new(state),
            load_failed: AtomicBool::new(false),
        }
    }

    /// Replaces the in-memory lists with what storage holds. Platforms that
    /// are missing from storage keep an empty list.
    pub async fn load(&self) -> Result<()> {
        let loaded = match self.read_state().await {
            Ok(loaded) => loaded,
            Err(e) => {
                self.load_failed.store(true, Ordering::SeqCst);
                return Err(e);
            }
        };
        let mut state = self.state.lock().await;
        *state = PersistedState::with_platforms(&self.platforms);
        for (id, stored) in loaded.platforms {
            if self.platforms.contains(&id) {
                state.platforms.insert(id, stored);
            }
        }
        self.load_failed.store(false, Ordering::SeqCst);
        tracing::debug!("Loaded usernames for {} platforms", state.platforms.len());
        Ok(())
    }

    /// Reads the persisted mapping as stored, without touching memory.
    pub async fn read_state(&self) -> Result<PersistedState> {
        match self.storage.read_entry(PLATFORMS_KEY).await? {
            Some(bytes) => PersistedState::from_bytes(&bytes),
            None => Ok(PersistedState::default()),
        }
    }

    /// Writes `state` as the full persisted mapping and adopts it in memory.
    pub async fn save(&self, state: PersistedState) -> Result<()> {
        let mut current = self.state.lock().await;
        self.storage
            .write_entry(PLATFORMS_KEY, &state.to_bytes()?)
            .await?;
        *current = state;
        Ok(())
    }

    pub async fn snapshot(&self) -> PersistedState {
        self.state.lock().await.clone()
    }

    pub async fn usernames(&self, platform: PlatformId) -> Vec<String> {
        self.state.lock().await.usernames(platform).to_vec()
    }

    /// Appends a trimmed username. Blank input and exact duplicates are rejected.
    pub async fn add(&self, platform: PlatformId, username: &str) -> Result<String> {
        self.ensure_known(platform)?;
        self.ensure_writable()?;
        let username = username.trim();
        validate_non_empty_string("username", username)?;

        let mut state = self.state.lock().await;
        if state.usernames(platform).iter().any(|u| u == username) {
            return Err(ViewerError::DuplicateUsername {
                platform: platform.to_string(),
                username: username.to_string(),
            });
        }

        let mut next = state.clone();
        next.usernames_mut(platform).push(username.to_string());
        self.persist(&next).await?;
        *state = next;

        tracing::info!("Added {} to {}", username, platform);
        Ok(username.to_string())
    }

    pub async fn remove(&self, platform: PlatformId, username: &str) -> Result<()> {
        self.ensure_known(platform)?;
        self.ensure_writable()?;
        let username = username.trim();

        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let list = next.usernames_mut(platform);
        let before = list.len();
        list.retain(|u| u != username);
        if list.len() == before {
            return Err(ViewerError::NotFound {
                platform: platform.to_string(),
                username: username.to_string(),
            });
        }

        self.persist(&next).await?;
        *state = next;

        tracing::info!("Removed {} from {}", username, platform);
        Ok(())
    }

    fn ensure_known(&self, platform: PlatformId) -> Result<()> {
        if self.platforms.contains(&platform) {
            Ok(())
        } else {
            Err(ViewerError::UnknownPlatform {
                name: platform.to_string(),
            })
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.load_failed.load(Ordering::SeqCst) {
            Err(ViewerError::StoreUnavailable {
                message: "saved usernames could not be read; refusing to overwrite them".to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn persist(&self, state: &PersistedState) -> Result<()> {
        let bytes = state.to_bytes()?;
        if let Err(e) = self.storage.write_entry(PLATFORMS_KEY, &bytes).await {
            tracing::error!("Failed to save usernames: {}", e);
            return Err(e);
        }
        tracing::debug!("Usernames saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;

    fn store(storage: MemoryStorage) -> UsernameStore<MemoryStorage> {
        UsernameStore::new(storage, PlatformId::ALL.to_vec())
    }

    #[tokio::test]
    async fn test_add_twice_keeps_one_entry() {
        let store = store(MemoryStorage::new());

        store.add(PlatformId::Github, "alice").await.unwrap();
        let err = store.add(PlatformId::Github, " alice ").await.unwrap_err();

        assert!(matches!(err, ViewerError::DuplicateUsername { .. }));
        assert_eq!(store.usernames(PlatformId::Github).await, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_duplicates_are_case_sensitive_and_per_platform() {
        let store = store(MemoryStorage::new());

        store.add(PlatformId::Github, "alice").await.unwrap();
        store.add(PlatformId::Github, "Alice").await.unwrap();
        store.add(PlatformId::Leetcode, "alice").await.unwrap();

        assert_eq!(store.usernames(PlatformId::Github).await, vec!["alice", "Alice"]);
        assert_eq!(store.usernames(PlatformId::Leetcode).await, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_blank_username_rejected() {
        let store = store(MemoryStorage::new());

        let err = store.add(PlatformId::Gfg, "   ").await.unwrap_err();
        assert!(matches!(err, ViewerError::ValidationError { .. }));
        assert!(store.usernames(PlatformId::Gfg).await.is_empty());
    }

    #[tokio::test]
    async fn test_every_mutation_rewrites_full_state() {
        let storage = MemoryStorage::new();
        let store = store(storage.clone());

        store.add(PlatformId::Leetcode, "bob").await.unwrap();

        let saved = storage.read_entry(PLATFORMS_KEY).await.unwrap().unwrap();
        let saved: serde_json::Value = serde_json::from_slice(&saved).unwrap();
        assert_eq!(
            saved,
            serde_json::json!({
                "github": {"usernames": []},
                "leetcode": {"usernames": ["bob"]},
                "gfg": {"usernames": []}
            })
        );

        store.remove(PlatformId::Leetcode, "bob").await.unwrap();
        let saved = PersistedState::from_bytes(&storage.read_entry(PLATFORMS_KEY).await.unwrap().unwrap()).unwrap();
        assert!(saved.usernames(PlatformId::Leetcode).is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_username() {
        let store = store(MemoryStorage::new());
        let err = store.remove(PlatformId::Github, "nobody").await.unwrap_err();
        assert!(matches!(err, ViewerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_preserves_insertion_order() {
        let storage = MemoryStorage::new();
        let first = store(storage.clone());
        for name in ["zed", "amy", "kim"] {
            first.add(PlatformId::Github, name).await.unwrap();
        }

        let second = store(storage);
        second.load().await.unwrap();
        assert_eq!(second.usernames(PlatformId::Github).await, vec!["zed", "amy", "kim"]);
    }

    #[tokio::test]
    async fn test_save_then_read_round_trips() {
        let storage = MemoryStorage::new();
        let store = store(storage);

        let mut state = PersistedState::default();
        state.usernames_mut(PlatformId::Github).extend(["a".to_string(), "b".to_string()]);
        state.usernames_mut(PlatformId::Gfg);

        store.save(state.clone()).await.unwrap();
        assert_eq!(store.read_state().await.unwrap(), state);
        assert_eq!(store.snapshot().await, state);
    }

    #[tokio::test]
    async fn test_failed_load_blocks_overwrite() {
        let storage = MemoryStorage::new();
        let original = br#"{"github": {"usernames": ["alice", "bob"]}, "gfg": {"usernames": 3}}"#;
        storage.write_entry(PLATFORMS_KEY, original).await.unwrap();

        let store = store(storage.clone());
        assert!(store.load().await.is_err());

        let err = store.add(PlatformId::Leetcode, "carol").await.unwrap_err();
        assert!(matches!(err, ViewerError::StoreUnavailable { .. }));
        let err = store.remove(PlatformId::Github, "alice").await.unwrap_err();
        assert!(matches!(err, ViewerError::StoreUnavailable { .. }));

        let saved = storage.read_entry(PLATFORMS_KEY).await.unwrap().unwrap();
        assert_eq!(saved, original.to_vec());
    }

    #[tokio::test]
    async fn test_unknown_platform_keys_survive_into_add() {
        let storage = MemoryStorage::new();
        storage
            .write_entry(
                PLATFORMS_KEY,
                br#"{"github": {"usernames": ["alice", "bob"]}, "codeforces": ["x"]}"#,
            )
            .await
            .unwrap();

        let store = store(storage.clone());
        store.load().await.unwrap();
        store.add(PlatformId::Leetcode, "carol").await.unwrap();

        let saved = store.read_state().await.unwrap();
        assert_eq!(saved.usernames(PlatformId::Github), ["alice".to_string(), "bob".to_string()]);
        assert_eq!(saved.usernames(PlatformId::Leetcode), ["carol".to_string()]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_all_persist() {
        let storage = MemoryStorage::new();
        let store = std::sync::Arc::new(store(storage.clone()));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add(PlatformId::Github, &format!("user{}", i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let saved = store.read_state().await.unwrap();
        assert_eq!(saved.usernames(PlatformId::Github).len(), 10);
    }
}

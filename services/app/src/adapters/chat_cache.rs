//! services/app/src/adapters/chat_cache.rs
//!
//! Local persistence for the chat id, the browser client's localStorage
//! analog: one JSON map of user id to chat id under the state directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use learnx_core::ports::{ChatIdCache, PortError, PortResult};
use tracing::warn;
use uuid::Uuid;

/// A `ChatIdCache` backed by a single JSON file. Updates go through a
/// write-then-rename so a crash never leaves a half-written map behind.
pub struct JsonFileChatIdCache {
    path: PathBuf,
}

impl JsonFileChatIdCache {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("chat_ids.json"),
        }
    }

    async fn read_map(&self) -> PortResult<HashMap<Uuid, Uuid>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(map) => Ok(map),
                Err(e) => {
                    // A corrupt cache is not worth failing over; start fresh.
                    warn!(path = %self.path.display(), "unreadable chat-id cache: {}", e);
                    Ok(HashMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    async fn write_map(&self, map: &HashMap<Uuid, Uuid>) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        let bytes =
            serde_json::to_vec_pretty(map).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl ChatIdCache for JsonFileChatIdCache {
    async fn load(&self, user_id: Uuid) -> PortResult<Option<Uuid>> {
        Ok(self.read_map().await?.get(&user_id).copied())
    }

    async fn store(&self, user_id: Uuid, chat_id: Uuid) -> PortResult<()> {
        let mut map = self.read_map().await?;
        map.insert(user_id, chat_id);
        self.write_map(&map).await
    }

    async fn clear(&self, user_id: Uuid) -> PortResult<()> {
        let mut map = self.read_map().await?;
        if map.remove(&user_id).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileChatIdCache::new(dir.path());
        let user = Uuid::new_v4();
        let chat = Uuid::new_v4();

        assert_eq!(cache.load(user).await.unwrap(), None);
        cache.store(user, chat).await.unwrap();
        assert_eq!(cache.load(user).await.unwrap(), Some(chat));

        cache.clear(user).await.unwrap();
        assert_eq!(cache.load(user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn entries_are_scoped_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileChatIdCache::new(dir.path());
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let chat = Uuid::new_v4();

        cache.store(alice, chat).await.unwrap();
        assert_eq!(cache.load(bob).await.unwrap(), None);
        assert_eq!(cache.load(alice).await.unwrap(), Some(chat));
    }

    #[tokio::test]
    async fn corrupt_cache_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat_ids.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let cache = JsonFileChatIdCache::new(dir.path());
        assert_eq!(cache.load(Uuid::new_v4()).await.unwrap(), None);
    }
}

//! Key-value storage on the local filesystem
//!
//! Each key is one file under the root directory. The file name is the hex
//! encoding of the key, so any key maps to a valid, distinct file name.

use anyhow::Context;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::storage::traits::KeyValueStore;

/// File-per-key store
///
/// Layout: `{root}/{hex(key)}.json`
#[derive(Debug, Clone)]
pub struct FsKeyValueStore {
    root: PathBuf,
}

impl FsKeyValueStore {
    /// Create a new FsKeyValueStore with the given root directory
    ///
    /// The directory is created on first write.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Get the filesystem path for a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", hex::encode(key)))
    }

    /// Clean up temp files left behind by interrupted writes
    pub async fn cleanup_temp_files(&self) -> anyhow::Result<usize> {
        let mut cleaned = 0;

        if !fs::try_exists(&self.root).await? {
            return Ok(0);
        }

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(ext) = path.extension() {
                if ext == "tmp" {
                    fs::remove_file(&path).await?;
                    cleaned += 1;
                }
            }
        }

        Ok(cleaned)
    }
}

#[async_trait]
impl KeyValueStore for FsKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let path = self.path_for(key);

        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create {}", self.root.display()))?;

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(value.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_kv_store() -> FsKeyValueStore {
        let dir = env::temp_dir().join(format!("kv_test_{}", uuid::Uuid::new_v4()));
        FsKeyValueStore::new(dir)
    }

    #[tokio::test]
    async fn test_get_before_any_write() {
        let store = temp_kv_store();
        assert_eq!(store.get("@asset_tracker_data").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let store = temp_kv_store();

        store.set("@asset_tracker_data", "[1,2,3]").await.unwrap();
        let value = store.get("@asset_tracker_data").await.unwrap();
        assert_eq!(value.as_deref(), Some("[1,2,3]"));

        // Clean up
        fs::remove_dir_all(&store.root).await.ok();
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_file() {
        let store = temp_kv_store();

        store.set("k", "old").await.unwrap();
        store.set("k", "new").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
        assert_eq!(store.cleanup_temp_files().await.unwrap(), 0);

        // Clean up
        fs::remove_dir_all(&store.root).await.ok();
    }

    #[tokio::test]
    async fn test_keys_do_not_collide() {
        let store = temp_kv_store();

        store.set("a/b", "slash").await.unwrap();
        store.set("a_b", "underscore").await.unwrap();
        assert_eq!(store.get("a/b").await.unwrap().as_deref(), Some("slash"));
        assert_eq!(store.get("a_b").await.unwrap().as_deref(), Some("underscore"));

        // Clean up
        fs::remove_dir_all(&store.root).await.ok();
    }

    #[tokio::test]
    async fn test_cleanup_temp_files() {
        let store = temp_kv_store();
        store.set("k", "v").await.unwrap();
        fs::write(store.path_for("k").with_extension("tmp"), "partial")
            .await
            .unwrap();

        assert_eq!(store.cleanup_temp_files().await.unwrap(), 1);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        // Clean up
        fs::remove_dir_all(&store.root).await.ok();
    }
}

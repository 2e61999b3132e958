//! # cr-store-local
//! civic-report/crates/cr-plugins/cr-store-local/src/lib.rs
//! Local filesystem implementation of `KeyValueStore`.
//! Each key is one JSON file under the root directory; writes go to a
//! temporary sibling first and are renamed into place.

use anyhow::Context;
use async_trait::async_trait;
use cr_core::traits::KeyValueStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct LocalFileStore {
    /// Directory holding one `<key>.json` per key (e.g., "./data")
    root_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Maps a key to "<root>/<key>.json". Keys are plain names; anything that
    /// could escape the root directory is refused.
    fn key_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            anyhow::bail!("invalid storage key {key:?}");
        }
        Ok(self.root_path.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for LocalFileStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Write-then-rename, so readers see either the old blob or the new one.
    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let target_path = self.key_path(key)?;

        fs::create_dir_all(&self.root_path)
            .await
            .with_context(|| format!("creating {}", self.root_path.display()))?;

        let tmp_path = self.root_path.join(format!(".{key}.json.tmp"));
        write_synced(&tmp_path, value)
            .await
            .with_context(|| format!("writing {}", tmp_path.display()))?;

        if let Err(e) = fs::rename(&tmp_path, &target_path).await {
            // Best effort; the original file is untouched either way.
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e).with_context(|| format!("replacing {}", target_path.display()));
        }

        log::debug!("stored {} bytes under {}", value.len(), target_path.display());
        Ok(())
    }
}

/// Writes `value` and flushes it to disk before returning, so the rename
/// that follows never publishes a file whose contents are still in cache.
async fn write_synced(path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(value.as_bytes()).await?;
    file.sync_all().await
}

//! Filesystem backend: one flat directory, keys map directly to file names.

use super::{BackendResult, StorageBackend, StoredLocation, ensure_key_safe};
use async_trait::async_trait;
use bytes::Bytes;
use std::{io::ErrorKind, path::PathBuf};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use uuid::Uuid;

/// Local-disk storage rooted at `base_path`.
///
/// Writes go through a temp file, fsync, then an atomic rename so a
/// crashed upload never leaves a half-written blob under its final key.
pub struct LocalBackend {
    base_path: PathBuf,
}

impl LocalBackend {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn object_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        _content_type: &str,
    ) -> BackendResult<StoredLocation> {
        ensure_key_safe(key)?;
        fs::create_dir_all(&self.base_path).await?;

        let final_path = self.object_path(key);
        let tmp_path = self.base_path.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        let write_result = async {
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&final_path).await?;
                fs::rename(&tmp_path, &final_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(err.into());
            }
        }

        Ok(StoredLocation {
            key: key.to_string(),
            url: None,
        })
    }

    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>> {
        ensure_key_safe(key)?;
        match fs::read(self.object_path(key)).await {
            Ok(bytes) => Ok(Some(bytes.into())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        ensure_key_safe(key)?;
        match fs::remove_file(self.object_path(key)).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self, prefix: &str) -> BackendResult<Vec<StoredLocation>> {
        let mut read_dir = match fs::read_dir(&self.base_path).await {
            Ok(rd) => rd,
            // A backend nobody has written to yet is empty, not broken.
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        while let Some(dir_entry) = read_dir.next_entry().await? {
            if !dir_entry.file_type().await?.is_file() {
                continue;
            }
            let name = dir_entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(prefix) {
                keys.push(name.to_string());
            }
        }
        keys.sort_unstable();

        Ok(keys
            .into_iter()
            .map(|key| StoredLocation { key, url: None })
            .collect())
    }
}

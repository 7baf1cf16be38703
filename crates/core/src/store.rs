//! Object store client
//!
//! Typed facade over an [`ObjectStore`] backend. Owns the key naming
//! convention and the sequencing of multi-step operations such as rename.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::archive::ScratchBundle;
use crate::error::{Error, Result};
use crate::keys;
use crate::traits::{ObjectInfo, ObjectStore};

/// Lifecycle operations on named files in a remote bucket
pub struct StoreClient<S> {
    store: S,
}

impl<S: ObjectStore> StoreClient<S> {
    /// Wrap a backend
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the underlying backend
    #[cfg(any(test, feature = "test-util"))]
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Upload the regular file at `local_path` under `nickname`
    ///
    /// Returns the key that was written. An existing object at that key is
    /// overwritten.
    pub async fn put(&self, local_path: &Path, nickname: &str) -> Result<String> {
        let metadata = std::fs::metadata(local_path)?;
        if metadata.is_dir() {
            return Err(Error::InvalidInput(format!(
                "{} is a directory; upload it recursively",
                local_path.display()
            )));
        }

        let data = std::fs::read(local_path)?;
        let key = keys::derive_key(nickname, local_path);

        tracing::debug!(key = %key, bytes = data.len(), "uploading object");
        self.store.put_object(&key, data).await?;

        Ok(key)
    }

    /// Upload a packed directory under `nickname`
    ///
    /// Takes ownership of the bundle so its scratch directory is removed as
    /// soon as the upload finishes, whether or not it succeeded.
    pub async fn put_bundle(&self, bundle: ScratchBundle, nickname: &str) -> Result<String> {
        tracing::debug!(scratch = %bundle.dir().display(), "uploading packed bundle");
        self.put(bundle.path(), nickname).await
    }

    /// Download `key` into a local file
    ///
    /// The file is named `output` when given, otherwise `key`. Returns the
    /// path that was written.
    pub async fn get(&self, key: &str, output: Option<&Path>) -> Result<PathBuf> {
        let target = output_path(key, output);
        let data = self.store.get_object(key).await?;

        tracing::debug!(key, path = %target.display(), bytes = data.len(), "writing object");
        let mut file = File::create(&target)?;
        file.write_all(&data)?;
        file.flush()?;

        Ok(target)
    }

    /// List every object in the bucket
    pub async fn list(&self) -> Result<Vec<ObjectInfo>> {
        self.store.list_objects().await
    }

    /// List keys only, for shell completion
    ///
    /// Any backend failure yields an empty list.
    pub async fn list_keys(&self) -> Vec<String> {
        match self.store.list_objects().await {
            Ok(items) => items.into_iter().map(|item| item.key).collect(),
            Err(e) => {
                tracing::debug!("key listing failed: {e}");
                Vec::new()
            }
        }
    }

    /// Delete `key`
    ///
    /// A missing key is not reported as an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        match self.store.delete_object(key).await {
            Ok(()) | Err(Error::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Rename `old_key` to `new_name`, returning the new key
    ///
    /// Read, write under the new key, then delete the old one. A failed read or
    /// write leaves the bucket untouched. A failed delete leaves both keys in
    /// place and is reported as [`Error::RenamePartial`].
    pub async fn rename(&self, old_key: &str, new_name: &str) -> Result<String> {
        let data = self.store.get_object(old_key).await?;
        let new_key = keys::rename_key(old_key, new_name);

        if new_key == old_key {
            tracing::debug!(key = old_key, "rename target equals source, nothing to do");
            return Ok(new_key);
        }

        self.store.put_object(&new_key, data).await?;

        match self.store.delete_object(old_key).await {
            Ok(()) | Err(Error::NotFound(_)) => Ok(new_key),
            Err(e) => {
                tracing::warn!(old_key, new_key = %new_key, "rename left both keys in place");
                Err(Error::RenamePartial {
                    old_key: old_key.to_string(),
                    new_key,
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Local path a download of `key` is written to
fn output_path(key: &str, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => PathBuf::from(key),
    }
}

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::backend::KeyValueStore;
use crate::error::{StoreError, StoreResult};

/// Directory-backed store: one `<key>.json` file per key, replaced atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the storage root. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::Other(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn read_entry(path: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn write_entry(dir: &Path, path: &Path, value: &str) -> StoreResult<()> {
    fs::create_dir_all(dir)?;
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(value.as_bytes())?;
    temp.flush()?;
    temp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

fn join_error(err: &tokio::task::JoinError) -> StoreError {
    StoreError::Other(format!("Task join error: {err}"))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        tokio::task::spawn_blocking(move || read_entry(&path))
            .await
            .map_err(|err| join_error(&err))?
    }

    async fn set(&self, key: &str, value: String) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let bytes = value.len();
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_entry(&dir, &target, &value))
            .await
            .map_err(|err| join_error(&err))??;
        debug!(file = %path.display(), bytes, "wrote file store entry");
        Ok(())
    }
}

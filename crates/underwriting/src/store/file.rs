use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::memory::Entries;
use super::{Record, RecordStore, StoreError};

/// JSON snapshot store: the whole collection is rewritten after every successful write.
///
/// Writes run on the blocking pool. The in-memory copy is changed in place and rolled back
/// when the snapshot cannot be written, so memory never runs ahead of the disk.
#[derive(Debug)]
pub struct FileStore<T: Record> {
    path: Arc<PathBuf>,
    entries: Arc<Mutex<Entries<T>>>,
}

impl<T: Record> Clone for FileStore<T> {
    fn clone(&self) -> Self {
        Self {
            path: Arc::clone(&self.path),
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: Record> FileStore<T> {
    /// Opens the snapshot at `path`, starting empty when the file does not exist yet.
    ///
    /// Every snapshot this store writes holds at least `[]`, so an existing zero-length file
    /// is reported as [`StoreError::Serialization`] rather than read as an empty collection.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let rows: Vec<T> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path: Arc::new(path),
            entries: Arc::new(Mutex::new(Entries::from_rows(rows)?)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn persist<T: Record>(path: &Path, entries: &Entries<T>) -> Result<(), StoreError> {
    let staging = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec(entries.rows())?;

    let mut file = File::create(&staging)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&staging, path)?;
    Ok(())
}

#[async_trait]
impl<T: Record> RecordStore<T> for FileStore<T> {
    async fn insert(&self, record: T) -> Result<T, StoreError> {
        let entries = Arc::clone(&self.entries);
        let path = Arc::clone(&self.path);

        tokio::task::spawn_blocking(move || {
            let mut entries = entries.blocking_lock();
            let key = record.key();
            let stored = entries.insert(record)?;
            if let Err(err) = persist(&path, &entries) {
                entries.discard_last(&key);
                return Err(err);
            }
            Ok(stored)
        })
        .await?
    }

    async fn update(&self, record: T) -> Result<(), StoreError> {
        let entries = Arc::clone(&self.entries);
        let path = Arc::clone(&self.path);

        tokio::task::spawn_blocking(move || {
            let mut entries = entries.blocking_lock();
            let previous = entries.update(record)?;
            if let Err(err) = persist(&path, &entries) {
                entries.update(previous)?;
                return Err(err);
            }
            Ok(())
        })
        .await?
    }

    async fn fetch(&self, key: &T::Key) -> Result<Option<T>, StoreError> {
        Ok(self.entries.lock().await.fetch(key))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.lock().await.rows().len())
    }

    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<T>, StoreError> {
        Ok(self.entries.lock().await.scan(offset, limit))
    }
}

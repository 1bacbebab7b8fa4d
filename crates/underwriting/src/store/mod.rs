//! Keyed record storage shared by the proposal and hiring services.
//!
//! Each service opens its own collection; nothing in this module knows about proposals or
//! hiring rules. Every write touches exactly one record.

mod file;
mod memory;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::StoreConfig;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Entity that can live in a [`RecordStore`].
pub trait Record: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Key: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    fn key(&self) -> Self::Key;
}

/// Storage abstraction so the directory and the hiring sink can be exercised in isolation.
///
/// Backends that touch the disk do so off the async runtime.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Inserts a new record, failing with [`StoreError::Conflict`] if the key is taken.
    async fn insert(&self, record: T) -> Result<T, StoreError>;
    /// Replaces the record stored under the same key.
    async fn update(&self, record: T) -> Result<(), StoreError>;
    async fn fetch(&self, key: &T::Key) -> Result<Option<T>, StoreError>;
    async fn count(&self) -> Result<usize, StoreError>;
    /// Records in insertion order, starting at `offset`, at most `limit` of them.
    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<T>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {key} already exists")]
    Conflict { key: String },
    #[error("record {key} not found")]
    NotFound { key: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store snapshot is not valid json: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store writer stopped: {0}")]
    Writer(#[from] tokio::task::JoinError),
}

/// Backend selected from the configured connection string.
#[derive(Debug, Clone)]
pub enum StoreBackend<T: Record> {
    Memory(MemoryStore<T>),
    File(FileStore<T>),
}

/// Opens `collection` on the backend described by `config`.
pub fn open_store<T: Record>(
    config: &StoreConfig,
    collection: &str,
) -> Result<StoreBackend<T>, StoreError> {
    match config {
        StoreConfig::Memory => Ok(StoreBackend::Memory(MemoryStore::default())),
        StoreConfig::File { directory } => {
            let path = directory.join(format!("{collection}.json"));
            FileStore::open(path).map(StoreBackend::File)
        }
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for StoreBackend<T> {
    async fn insert(&self, record: T) -> Result<T, StoreError> {
        match self {
            StoreBackend::Memory(store) => store.insert(record).await,
            StoreBackend::File(store) => store.insert(record).await,
        }
    }

    async fn update(&self, record: T) -> Result<(), StoreError> {
        match self {
            StoreBackend::Memory(store) => store.update(record).await,
            StoreBackend::File(store) => store.update(record).await,
        }
    }

    async fn fetch(&self, key: &T::Key) -> Result<Option<T>, StoreError> {
        match self {
            StoreBackend::Memory(store) => store.fetch(key).await,
            StoreBackend::File(store) => store.fetch(key).await,
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        match self {
            StoreBackend::Memory(store) => store.count().await,
            StoreBackend::File(store) => store.count().await,
        }
    }

    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<T>, StoreError> {
        match self {
            StoreBackend::Memory(store) => store.scan(offset, limit).await,
            StoreBackend::File(store) => store.scan(offset, limit).await,
        }
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Record, RecordStore, StoreError};

/// Insertion-ordered records plus a key index into them.
#[derive(Debug)]
pub(crate) struct Entries<T: Record> {
    rows: Vec<T>,
    index: HashMap<T::Key, usize>,
}

impl<T: Record> Default for Entries<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Record> Entries<T> {
    pub(crate) fn from_rows(rows: Vec<T>) -> Result<Self, StoreError> {
        let mut entries = Self::default();
        for row in rows {
            entries.insert(row)?;
        }
        Ok(entries)
    }

    pub(crate) fn rows(&self) -> &[T] {
        &self.rows
    }

    pub(crate) fn insert(&mut self, record: T) -> Result<T, StoreError> {
        let key = record.key();
        if self.index.contains_key(&key) {
            return Err(StoreError::Conflict {
                key: key.to_string(),
            });
        }
        self.index.insert(key, self.rows.len());
        self.rows.push(record.clone());
        Ok(record)
    }

    /// Replaces the record under the same key, handing back the one it displaced.
    pub(crate) fn update(&mut self, record: T) -> Result<T, StoreError> {
        let key = record.key();
        match self.index.get(&key) {
            Some(&position) => Ok(std::mem::replace(&mut self.rows[position], record)),
            None => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
        }
    }

    /// Undoes the most recent [`Entries::insert`] of `key`.
    pub(crate) fn discard_last(&mut self, key: &T::Key) {
        if self.rows.last().is_some_and(|row| &row.key() == key) {
            self.rows.pop();
            self.index.remove(key);
        }
    }

    pub(crate) fn fetch(&self, key: &T::Key) -> Option<T> {
        self.index
            .get(key)
            .map(|&position| self.rows[position].clone())
    }

    pub(crate) fn scan(&self, offset: usize, limit: usize) -> Vec<T> {
        self.rows.iter().skip(offset).take(limit).cloned().collect()
    }
}

/// Process-local store; contents are lost on restart.
#[derive(Debug)]
pub struct MemoryStore<T: Record> {
    entries: Arc<Mutex<Entries<T>>>,
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
        }
    }
}

impl<T: Record> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: Record> MemoryStore<T> {
    fn lock(&self) -> Result<MutexGuard<'_, Entries<T>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MemoryStore<T> {
    async fn insert(&self, record: T) -> Result<T, StoreError> {
        self.lock()?.insert(record)
    }

    async fn update(&self, record: T) -> Result<(), StoreError> {
        self.lock()?.update(record).map(|_| ())
    }

    async fn fetch(&self, key: &T::Key) -> Result<Option<T>, StoreError> {
        Ok(self.lock()?.fetch(key))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.rows().len())
    }

    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<T>, StoreError> {
        Ok(self.lock()?.scan(offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::Note;

    #[tokio::test]
    async fn insert_rejects_duplicate_keys() {
        let store = MemoryStore::default();
        store.insert(Note::new("a", "first")).await.expect("first insert");

        match store.insert(Note::new("a", "second")).await {
            Err(StoreError::Conflict { key }) => assert_eq!(key, "a"),
            other => panic!("expected conflict, got {other:?}"),
        }
        let stored = store.fetch(&"a".to_string()).await.expect("fetch").expect("present");
        assert_eq!(stored.body, "first", "conflict must not overwrite");
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let store: MemoryStore<Note> = MemoryStore::default();
        assert!(matches!(
            store.update(Note::new("ghost", "boo")).await,
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn update_keeps_insertion_position() {
        let store = MemoryStore::default();
        for id in ["a", "b", "c"] {
            store.insert(Note::new(id, "v1")).await.expect("insert");
        }
        store.update(Note::new("b", "v2")).await.expect("update");

        let ids: Vec<_> = store
            .scan(0, 10)
            .await
            .expect("scan")
            .into_iter()
            .map(|note| (note.id, note.body))
            .collect();
        assert_eq!(
            ids,
            vec![
                ("a".to_string(), "v1".to_string()),
                ("b".to_string(), "v2".to_string()),
                ("c".to_string(), "v1".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn scan_truncates_at_collection_end() {
        let store = MemoryStore::default();
        for id in ["a", "b", "c", "d", "e"] {
            store.insert(Note::new(id, "")).await.expect("insert");
        }

        assert_eq!(store.scan(3, 3).await.expect("scan").len(), 2);
        assert!(store.scan(5, 3).await.expect("scan").is_empty());
        assert!(store.scan(usize::MAX, 3).await.expect("scan").is_empty());
    }

    #[tokio::test]
    async fn clones_share_contents() {
        let store = MemoryStore::default();
        let handle = store.clone();
        store.insert(Note::new("a", "")).await.expect("insert");
        assert_eq!(handle.count().await.expect("count"), 1);
    }
}

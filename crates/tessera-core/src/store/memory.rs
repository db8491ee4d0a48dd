use crate::{
    error::InternalError,
    store::{RawCursor, SortedStore},
};
use bytes::Bytes;
use parking_lot::RwLock;
use std::sync::Arc;

type Entries = Arc<Vec<(Bytes, Bytes)>>;

///
/// MemStore
///
/// In-memory sorted store. Writes copy the entry table when a cursor still
/// holds the previous snapshot, so open cursors never observe later writes.
///

#[derive(Debug, Default)]
pub struct MemStore {
    entries: RwLock<Entries>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Bytes>,
        V: Into<Bytes>,
    {
        let store = Self::new();
        for (key, value) in entries {
            store.put(key, value);
        }

        store
    }

    /// Insert or replace one entry.
    pub fn put(&self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        let (key, value) = (key.into(), value.into());
        let mut guard = self.entries.write();
        let entries = Arc::make_mut(&mut *guard);

        match entries.binary_search_by(|(k, _)| k.as_ref().cmp(key.as_ref())) {
            Ok(idx) => entries[idx].1 = value,
            Err(idx) => entries.insert(idx, (key, value)),
        }
    }

    /// Remove one entry, returning its value.
    pub fn delete(&self, key: &[u8]) -> Option<Bytes> {
        let mut guard = self.entries.write();
        let entries = Arc::make_mut(&mut *guard);

        entries
            .binary_search_by(|(k, _)| k.as_ref().cmp(key))
            .ok()
            .map(|idx| entries.remove(idx).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn snapshot(&self) -> Entries {
        Arc::clone(&self.entries.read())
    }
}

impl SortedStore for MemStore {
    type Cursor = MemCursor;

    fn open_cursor(&self) -> Result<MemCursor, InternalError> {
        Ok(MemCursor {
            entries: self.snapshot(),
            pos: None,
        })
    }

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>, InternalError> {
        let entries = self.entries.read();

        Ok(entries
            .binary_search_by(|(k, _)| k.as_ref().cmp(key))
            .ok()
            .map(|idx| entries[idx].1.clone()))
    }
}

///
/// MemCursor
///

#[derive(Debug)]
pub struct MemCursor {
    entries: Entries,
    pos: Option<usize>,
}

impl MemCursor {
    fn entry(&self) -> Option<&(Bytes, Bytes)> {
        self.pos.and_then(|idx| self.entries.get(idx))
    }
}

impl RawCursor for MemCursor {
    fn seek(&mut self, key: &[u8]) {
        let idx = self.entries.partition_point(|(k, _)| k.as_ref() < key);
        self.pos = (idx < self.entries.len()).then_some(idx);
    }

    fn seek_for_prev(&mut self, key: &[u8]) {
        let idx = self.entries.partition_point(|(k, _)| k.as_ref() <= key);
        self.pos = idx.checked_sub(1);
    }

    fn seek_to_last(&mut self) {
        self.pos = self.entries.len().checked_sub(1);
    }

    fn next(&mut self) {
        self.pos = self
            .pos
            .map(|idx| idx + 1)
            .filter(|idx| *idx < self.entries.len());
    }

    fn prev(&mut self) {
        self.pos = self.pos.and_then(|idx| idx.checked_sub(1));
    }

    fn valid(&self) -> bool {
        self.entry().is_some()
    }

    fn key(&self) -> Option<&[u8]> {
        self.entry().map(|(k, _)| k.as_ref())
    }

    fn value(&self) -> Option<&[u8]> {
        self.entry().map(|(_, v)| v.as_ref())
    }
}

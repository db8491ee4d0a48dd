use crate::{
    error::InternalError,
    sorted::Order,
    store::{SortedStore, StorageScan},
};
use bytes::Bytes;
use parking_lot::Mutex;
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering},
    },
};

///
/// StoreSession
///
/// Owning session over one sorted store. Hands out lazily opened scans and
/// keeps a registry of the scans currently holding a native cursor.
/// Cloning shares the session.
///

pub struct StoreSession<S> {
    shared: Arc<SessionShared<S>>,
}

impl<S> Clone for StoreSession<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: SortedStore> StoreSession<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                store,
                open_scans: Mutex::new(HashSet::new()),
                next_scan_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Scan every entry whose key starts with `prefix`, in `order`.
    /// No cursor is opened until the scan is first pulled or forwarded.
    #[must_use]
    pub fn iterate(&self, prefix: impl Into<Bytes>, order: Order) -> StorageScan<S> {
        StorageScan::new(Arc::clone(&self.shared), prefix.into(), order)
    }

    /// Point lookup.
    pub fn get(&self, key: &[u8]) -> Result<Option<Bytes>, InternalError> {
        self.shared.ensure_open()?;

        self.shared.store.get(key)
    }

    /// Number of scans currently holding a native cursor.
    #[must_use]
    pub fn open_scans(&self) -> usize {
        self.shared.open_scans.lock().len()
    }

    /// Close the session. Open scans fail with `ResourceClosed` at their
    /// next cursor operation.
    pub fn close(&self) {
        self.shared.closed.store(true, AtomicOrdering::Release);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.shared.store
    }
}

///
/// SessionShared
///

pub(crate) struct SessionShared<S> {
    store: S,
    open_scans: Mutex<HashSet<u64>>,
    next_scan_id: AtomicU64,
    closed: AtomicBool,
}

impl<S: SortedStore> SessionShared<S> {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(AtomicOrdering::Acquire)
    }

    pub(crate) fn ensure_open(&self) -> Result<(), InternalError> {
        if self.is_closed() {
            return Err(InternalError::storage_closed("storage session is closed"));
        }

        Ok(())
    }

    // Open one native cursor and register the scan that will own it.
    pub(crate) fn open(&self) -> Result<(u64, S::Cursor), InternalError> {
        self.ensure_open()?;

        let cursor = self.store.open_cursor()?;
        let scan_id = self.next_scan_id.fetch_add(1, AtomicOrdering::Relaxed);
        self.open_scans.lock().insert(scan_id);

        Ok((scan_id, cursor))
    }

    pub(crate) fn deregister(&self, scan_id: u64) {
        self.open_scans.lock().remove(&scan_id);
    }
}

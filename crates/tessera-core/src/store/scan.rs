//! Module: store::scan
//! Responsibility: leaf adapter from a native store cursor to `Seekable`.
//! Does not own: cursor implementation or session lifetime.
//! Boundary: every persisted range read enters the sorted algebra here.

use crate::{
    error::{ErrorOrigin, InternalError},
    obs::sink::{MetricsEvent, record},
    sorted::{KeyValue, Order, Seekable, SortedIterator, StreamPosition},
    store::{RawCursor, SortedStore, session::SessionShared},
};
use bytes::Bytes;
use std::{mem, sync::Arc};
use tracing::trace;

///
/// ScanState
///
/// `Init` holds no cursor. `Forwarded` follows a seek that has not been
/// validated yet, `Unfetched` follows a consumed value, `Fetched` buffers
/// the value for `peek`/`next`. `Completed` is terminal. `Failed` keeps
/// the error of a cursor that could not be opened and reports it on every
/// later call.
///

enum ScanState<C> {
    Init,
    Forwarded(C),
    Unfetched(C),
    Fetched(C, KeyValue),
    Completed,
    Failed(InternalError),
}

///
/// StorageScan
///
/// Lazily opened scan over every entry whose key starts with `prefix`.
/// The native cursor is released exactly once, on exhaustion, close,
/// session shutdown or drop.
///

pub struct StorageScan<S: SortedStore> {
    session: Arc<SessionShared<S>>,
    prefix: Bytes,
    // First key past the prefix range; `None` when no such key exists.
    successor: Option<Bytes>,
    order: Order,
    state: ScanState<S::Cursor>,
    scan_id: Option<u64>,
    closed: bool,
    rows_read: u64,
    position: StreamPosition<KeyValue>,
}

impl<S: SortedStore> StorageScan<S> {
    pub(crate) fn new(session: Arc<SessionShared<S>>, prefix: Bytes, order: Order) -> Self {
        let successor = prefix_successor(&prefix);

        Self {
            session,
            prefix,
            successor,
            order,
            state: ScanState::Init,
            scan_id: None,
            closed: false,
            rows_read: 0,
            position: StreamPosition::new(order, ErrorOrigin::Storage),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    #[must_use]
    pub const fn rows_read(&self) -> u64 {
        self.rows_read
    }

    #[must_use]
    pub const fn is_opened(&self) -> bool {
        self.scan_id.is_some()
    }

    // Open the native cursor; positioning is left to the caller. A failed
    // open leaves the scan `Failed`.
    fn open_cursor(&mut self) -> Result<S::Cursor, InternalError> {
        let (scan_id, cursor) = match self.session.open() {
            Ok(opened) => opened,
            Err(err) => {
                self.state = ScanState::Failed(err.clone());
                return Err(err);
            }
        };
        self.scan_id = Some(scan_id);
        record(MetricsEvent::ScanOpened { order: self.order });
        trace!(scan_id, order = %self.order, prefix_len = self.prefix.len(), "storage scan opened");

        Ok(cursor)
    }

    // Position `cursor` at the first entry of the range under the scan order.
    fn seek_start(&self, cursor: &mut S::Cursor) {
        match (self.order, self.successor.as_ref()) {
            (Order::Asc, _) => cursor.seek(&self.prefix),
            (Order::Desc, Some(successor)) => {
                cursor.seek_for_prev(successor);
                if cursor.key() == Some(successor.as_ref()) {
                    cursor.prev();
                }
            }
            (Order::Desc, None) => cursor.seek_to_last(),
        }
    }

    // Position `cursor` at the first entry at or past `key`, clamped into
    // the prefix range.
    fn seek_target(&self, cursor: &mut S::Cursor, key: &[u8]) {
        match self.order {
            Order::Asc if key <= self.prefix.as_ref() => self.seek_start(cursor),
            Order::Asc => cursor.seek(key),
            Order::Desc => match self.successor.as_ref() {
                Some(successor) if key >= successor.as_ref() => self.seek_start(cursor),
                _ => cursor.seek_for_prev(key),
            },
        }
    }

    fn step(&self, cursor: &mut S::Cursor) {
        match self.order {
            Order::Asc => cursor.next(),
            Order::Desc => cursor.prev(),
        }
    }

    // Buffer the cursor entry when it lies inside the prefix range;
    // otherwise release the cursor and complete.
    fn validate(&mut self, cursor: S::Cursor) -> Result<bool, InternalError> {
        let entry = if cursor.valid() {
            cursor
                .key()
                .zip(cursor.value())
                .filter(|(key, _)| key.starts_with(&self.prefix))
                .map(|(key, value)| {
                    KeyValue::new(Bytes::copy_from_slice(key), Bytes::copy_from_slice(value))
                })
        } else {
            None
        };
        let Some(entry) = entry else {
            self.release(cursor);
            return Ok(false);
        };

        if let Err(err) = self.position.check_produced(&entry) {
            self.release(cursor);
            return Err(err);
        }
        self.state = ScanState::Fetched(cursor, entry);

        Ok(true)
    }

    // Session shutdown invalidates the scan at its next cursor operation.
    fn ensure_session_open(&mut self) -> Result<(), InternalError> {
        if !self.session.is_closed() {
            return Ok(());
        }

        self.close();
        Err(InternalError::storage_closed(
            "storage session closed while the scan was in use",
        ))
    }

    fn failure(&self) -> Result<(), InternalError> {
        match &self.state {
            ScanState::Failed(err) => Err(err.clone()),
            _ => Ok(()),
        }
    }

    fn closed_error(&self) -> InternalError {
        if self.closed {
            InternalError::storage_closed("storage scan is closed")
        } else {
            InternalError::no_such_element(ErrorOrigin::Storage)
        }
    }

    // Drop the cursor, deregister, and account the scan exactly once.
    fn release(&mut self, cursor: S::Cursor) {
        drop(cursor);
        self.state = ScanState::Completed;

        if let Some(scan_id) = self.scan_id.take() {
            self.session.deregister(scan_id);
            record(MetricsEvent::ScanClosed {
                rows_read: self.rows_read,
            });
            trace!(scan_id, rows_read = self.rows_read, "storage scan released");
        }
    }
}

impl<S: SortedStore> SortedIterator for StorageScan<S> {
    type Item = KeyValue;

    fn order(&self) -> Order {
        self.order
    }

    fn has_next(&mut self) -> Result<bool, InternalError> {
        self.failure()?;
        if matches!(self.state, ScanState::Completed) {
            return Ok(false);
        }
        if matches!(self.state, ScanState::Fetched(..)) {
            return Ok(true);
        }
        self.ensure_session_open()?;

        match mem::replace(&mut self.state, ScanState::Completed) {
            ScanState::Init => {
                let mut cursor = self.open_cursor()?;
                self.seek_start(&mut cursor);
                self.validate(cursor)
            }
            ScanState::Forwarded(cursor) => self.validate(cursor),
            ScanState::Unfetched(mut cursor) => {
                self.step(&mut cursor);
                self.validate(cursor)
            }
            ScanState::Fetched(..) | ScanState::Completed | ScanState::Failed(_) => Err(
                InternalError::storage_illegal_state("storage scan state changed during has_next"),
            ),
        }
    }

    fn peek(&mut self) -> Result<&KeyValue, InternalError> {
        if !self.has_next()? {
            return Err(self.closed_error());
        }

        match &self.state {
            ScanState::Fetched(_, entry) => Ok(entry),
            _ => Err(InternalError::storage_illegal_state(
                "storage scan reported an entry it did not fetch",
            )),
        }
    }

    fn next(&mut self) -> Result<KeyValue, InternalError> {
        if !self.has_next()? {
            return Err(self.closed_error());
        }

        match mem::replace(&mut self.state, ScanState::Completed) {
            ScanState::Fetched(cursor, entry) => {
                self.state = ScanState::Unfetched(cursor);
                self.rows_read = self.rows_read.saturating_add(1);
                self.position.advance(&entry);
                Ok(entry)
            }
            other => {
                self.state = other;
                Err(InternalError::storage_illegal_state(
                    "storage scan reported an entry it did not fetch",
                ))
            }
        }
    }

    fn close(&mut self) {
        self.closed = true;

        match mem::replace(&mut self.state, ScanState::Completed) {
            ScanState::Forwarded(cursor)
            | ScanState::Unfetched(cursor)
            | ScanState::Fetched(cursor, _) => self.release(cursor),
            ScanState::Init | ScanState::Completed | ScanState::Failed(_) => {}
        }
    }
}

impl<S: SortedStore> Seekable for StorageScan<S> {
    fn forward(&mut self, target: &KeyValue) -> Result<(), InternalError> {
        if self.closed {
            return Err(self.closed_error());
        }
        self.failure()?;
        self.position.check_forward(target)?;
        self.position.advance(target);

        if matches!(self.state, ScanState::Completed) {
            return Ok(());
        }
        self.ensure_session_open()?;

        let mut cursor = match mem::replace(&mut self.state, ScanState::Completed) {
            ScanState::Fetched(cursor, entry) if !self.order.is_before(&entry, target) => {
                self.state = ScanState::Fetched(cursor, entry);
                return Ok(());
            }
            ScanState::Init => self.open_cursor()?,
            ScanState::Forwarded(cursor)
            | ScanState::Unfetched(cursor)
            | ScanState::Fetched(cursor, _) => cursor,
            ScanState::Completed | ScanState::Failed(_) => return Ok(()),
        };

        self.seek_target(&mut cursor, target.key());
        self.state = ScanState::Forwarded(cursor);
        record(MetricsEvent::ScanForwarded);
        if let Some(scan_id) = self.scan_id {
            trace!(scan_id, target_len = target.key().len(), "storage scan forwarded");
        }

        Ok(())
    }
}

impl<S: SortedStore> Drop for StorageScan<S> {
    fn drop(&mut self) {
        self.close();
    }
}

// Smallest key greater than every key carrying `prefix`.
pub(crate) fn prefix_successor(prefix: &[u8]) -> Option<Bytes> {
    let end = prefix.iter().rposition(|byte| *byte != u8::MAX)?;
    let mut successor = prefix[..=end].to_vec();
    successor[end] += 1;

    Some(Bytes::from(successor))
}


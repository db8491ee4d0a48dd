use crate::error::InternalError;
use bytes::Bytes;

///
/// RawCursor
///
/// Native positioned cursor over a sorted key-value store. Positioning
/// calls never fail; an unpositioned cursor reports `valid() == false`.
///

pub trait RawCursor: Send {
    /// Position at the first key `>= key`.
    fn seek(&mut self, key: &[u8]);

    /// Position at the last key `<= key`.
    fn seek_for_prev(&mut self, key: &[u8]);

    fn seek_to_last(&mut self);

    fn next(&mut self);

    fn prev(&mut self);

    fn valid(&self) -> bool;

    fn key(&self) -> Option<&[u8]>;

    fn value(&self) -> Option<&[u8]>;
}

///
/// SortedStore
///
/// Storage collaborator boundary: hands out raw cursors and answers point
/// lookups. Durability and transactions stay behind this trait.
///

pub trait SortedStore: Send + Sync {
    type Cursor: RawCursor;

    fn open_cursor(&self) -> Result<Self::Cursor, InternalError>;

    fn get(&self, key: &[u8]) -> Result<Option<Bytes>, InternalError>;
}

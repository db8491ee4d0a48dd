use bytes::Bytes;
use derive_more::Deref;
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

///
/// SortableProjection
///
/// Pairs a domain value with the derived key that defines its order.
/// Ordering, equality and hashing look at the key only; the value is
/// reachable through `Deref`.
///

#[derive(Clone, Debug, Deref)]
pub struct SortableProjection<V, K = Bytes> {
    key: K,
    #[deref]
    value: V,
}

impl<V, K> SortableProjection<V, K> {
    #[must_use]
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }

    #[must_use]
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<V, K: PartialEq> PartialEq for SortableProjection<V, K> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<V, K: Eq> Eq for SortableProjection<V, K> {}

impl<V, K: Ord> PartialOrd for SortableProjection<V, K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V, K: Ord> Ord for SortableProjection<V, K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl<V, K: Hash> Hash for SortableProjection<V, K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// One stored entry: the store key orders it, the value rides along.
pub type KeyValue = SortableProjection<Bytes, Bytes>;

impl KeyValue {
    /// Build a value-less entry usable as a `forward` target.
    #[must_use]
    pub fn seek_target(key: impl Into<Bytes>) -> Self {
        Self::new(key.into(), Bytes::new())
    }
}

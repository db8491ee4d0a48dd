//! Module: store
//! Responsibility: storage collaborator boundary and its sorted leaf adapter.
//! Does not own: durability, transactions or key layout.
//! Boundary: `StoreSession::iterate` is the only way persisted entries
//! become sorted iterators.

mod contracts;
mod memory;
mod scan;
mod session;

#[cfg(test)]
mod tests;

pub use contracts::{RawCursor, SortedStore};
pub use memory::{MemCursor, MemStore};
pub use scan::StorageScan;
pub use session::StoreSession;

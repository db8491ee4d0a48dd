//! ## Crate layout
//! - `core`: sorted iterator algebra, storage leaf adapter, base iterator
//!   algebra, production engine, configuration and observability.
//!
//! The `prelude` module brings the iterator traits into scope together with
//! the constructors most callers start from.

pub use tessera_core as core;

pub use crate::core::error::{ErrorClass, InternalError};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        config::ProducerConfig,
        iter::{IteratorExt as _, iterate, link},
        produce::{AsyncProducer, InlineExecutor, Producer as _, ThreadPool, channel_queue},
        sorted::{
            KeyValue, Order, Seekable as _, SortedIterator as _, SortedIteratorExt as _,
            empty_sorted, iterate_sorted, merge,
        },
        store::{MemStore, StoreSession},
    };
}

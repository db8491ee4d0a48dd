//! Core runtime for Tessera: sorted iterator algebra, the storage leaf
//! adapter, the base iterator algebra and the concurrent production engine.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod error;
pub mod iter;
pub mod obs;
pub mod produce;
pub mod sorted;
pub mod store;

///
/// Prelude
///
/// Traits and constructors needed to build and drain iterators.
/// No stores, sinks or errors are re-exported here.
///

pub mod prelude {
    pub use crate::{
        iter::IteratorExt as _,
        produce::Producer as _,
        sorted::{Order, Seekable as _, SortedIterator as _, SortedIteratorExt as _},
    };
}

//! Module: sorted
//! Responsibility: sorted-iterator contracts, comparators and combinators.
//! Does not own: physical store traversal (see `store`) or parallel fan-out
//! (see `produce`).
//! Boundary: every ordered stream in the crate speaks `SortedIterator`.

mod based;
mod contracts;
mod distinct;
mod ext;
mod filter;
mod finalise;
mod mapped;
mod merge;
mod order;
mod projection;


pub(crate) use contracts::StreamPosition;

pub use based::{EmptySorted, SetSorted, empty_sorted, iterate_sorted};
pub use contracts::{Seekable, SeekableBox, SortedIterator};
pub use distinct::DistinctSorted;
pub use ext::{IntoResults, SortedIteratorExt};
pub use filter::FilteredSorted;
pub use finalise::FinaliseSorted;
pub use mapped::MappedSorted;
pub use merge::{MergeSorted, merge};
pub use order::Order;
pub use projection::{KeyValue, SortableProjection};

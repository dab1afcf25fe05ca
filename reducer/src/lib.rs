//! Non-destructive, subscribable reductions over in-memory collections.
//!
//! A [`Reducer`] wraps a backing store (a `Vec` or an insertion-ordered map) and
//! maintains a computed key index under a set of weighted filters and one optional
//! sort. The backing data is never mutated by reduction; iteration reads through the
//! index. Index recomputation is hash-gated so subscribers only hear about changes
//! that altered the surviving key sequence.
//!
//! Derived reducers chain off a parent's index: they share the parent's backing store
//! without copying it and narrow the parent's survivors further with their own
//! filters and sort.
//!
//! Everything here is single-threaded: handles are `Rc`-backed, callbacks run
//! synchronously, and a host event loop drives mutation.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod backing;
mod derived;
mod engine;
mod error;
mod filter;
mod hash;
mod reducer;
mod sort;

#[cfg(test)]
mod tests;

pub use backing::{Backing, DataCell};
pub use error::ReducerError;
pub use filter::{Filter, FilterFn, NotifyFn, SubscribeFn, Unsubscribe};
pub use reducer::{
    ArrayReducer, DerivedApi, DerivedOptions, DerivedReducer, FiltersApi, IndexApi, MapReducer,
    Reducer, ReducerOptions, SortApi, Subscription,
};
pub use sort::{CompareFn, Sort};

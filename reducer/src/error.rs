/// Errors raised synchronously at API boundaries, before any state mutation.
///
/// Cancellation-free by design: nothing in this crate reports failure through
/// callbacks or deferred channels.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ReducerError {
    /// A filter weight fell outside the inclusive `[0, 1]` range.
    #[error("filter weight {weight} is outside [0, 1]")]
    InvalidWeight { weight: f64 },

    /// The same predicate was registered with a live subscription twice.
    #[error("filter is already registered with a live subscription")]
    DuplicateLiveFilter,

    /// The reducer (or its derived registry) has been destroyed.
    #[error("this reducer has been destroyed")]
    Destroyed,

    /// A derived reducer was created without a usable name.
    #[error("derived reducer name must not be empty")]
    EmptyDerivedName,
}

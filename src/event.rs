//! The `Event` stored in `EventMap`.
//!
//! The map is keyed on `start` only; `end` and `name` ride along as payload.
//! `start <= end` is expected but not enforced here, and the key type only
//! needs a total order, not a particular calendar representation.

/// A time-interval event indexed by its start time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event<T> {
    /// Caller-assigned identifier, unique across a store
    pub id: u64,
    /// Start time, the tree key
    pub start: T,
    /// End time
    pub end: T,
    /// Arbitrary text label
    pub name: String,
}

impl<T: Ord> Event<T> {
    /// Create a new `Event`
    #[inline]
    pub fn new(id: u64, start: T, end: T, name: impl Into<String>) -> Self {
        Self {
            id,
            start,
            end,
            name: name.into(),
        }
    }
}

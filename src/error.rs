use chrono::NaiveDateTime;

/// Errors surfaced by [`EventStore`](crate::EventStore) operations.
///
/// The tree engine itself has no failure path; everything here is recovered
/// at the store boundary and handed back as a value. User-facing wording
/// lives in the [`report`](crate::report) module, not in these messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid date format: {0:?}")]
    InvalidDateFormat(String),

    #[error("invalid event id token: {0:?}")]
    InvalidId(String),

    #[error("event id {0} already exists")]
    DuplicateId(u64),

    #[error("no event with id {0}")]
    NotFound(u64),

    #[error("no event between {from} and {to}")]
    EmptyRange {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::error::StoreError;
use crate::event::Event;
use crate::eventmap::EventMap;

/// Timestamp format accepted and produced by the store: `dd/mm/yyyy hh:mm:ss`.
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Owned snapshot of a stored event, detached from the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: u64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub name: String,
}

impl From<&Event<NaiveDateTime>> for EventRecord {
    fn from(event: &Event<NaiveDateTime>) -> Self {
        Self {
            id: event.id,
            start: event.start,
            end: event.end,
            name: event.name.clone(),
        }
    }
}

/// Successful outcome of [`EventStore::add_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    pub id: u64,
    pub name: String,
}

/// Successful outcome of [`EventStore::remove_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    pub id: u64,
    pub name: String,
}

/// Successful outcome of [`EventStore::search_by_range`]: the queried bounds
/// plus the matching records, sorted ascending by start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMatches {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub events: Vec<EventRecord>,
}

/// Façade over an [`EventMap`] keyed on `NaiveDateTime`.
///
/// The store owns the tree for its whole lifetime, parses and validates the
/// string inputs, enforces id uniqueness on insert, and resolves ids to
/// start times before deletion (the tree deletes by start time only).
/// It is driven by one logical caller at a time; any mutual exclusion for
/// concurrent callers belongs around these methods, not inside the tree.
///
/// # Example
/// ```rust
/// use avl_event_map::EventStore;
///
/// let mut store = EventStore::new();
/// store
///     .add_event(1, "01/01/2024 10:00:00", "01/01/2024 11:00:00", "Standup")
///     .unwrap();
/// let record = store.search_event("1").unwrap();
/// assert_eq!(record.name, "Standup");
/// ```
#[derive(Debug, Default)]
pub struct EventStore {
    pub(crate) tree: EventMap<NaiveDateTime>,
}

impl EventStore {
    /// Create an empty `EventStore`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: EventMap::new(),
        }
    }

    /// Parse both timestamps, reject duplicate ids, and insert the event.
    pub fn add_event(
        &mut self,
        id: u64,
        start: &str,
        end: &str,
        name: &str,
    ) -> Result<Added, StoreError> {
        let start = parse_datetime(start)?;
        let end = parse_datetime(end)?;
        if self.tree.get_by_id(id).is_some() {
            return Err(StoreError::DuplicateId(id));
        }
        debug!("adding event {id} ({name})");
        self.tree.insert(Event::new(id, start, end, name));
        Ok(Added {
            id,
            name: name.to_owned(),
        })
    }

    /// Remove the event with the given id token.
    ///
    /// The tree is keyed on start time, so the id is resolved to its start
    /// time first (an `O(n)` lookup) and the delete runs on that key.
    pub fn remove_event(&mut self, id: &str) -> Result<Removed, StoreError> {
        let id = parse_id(id)?;
        let (start, name) = match self.tree.get_by_id(id) {
            Some(event) => (event.start, event.name.clone()),
            None => return Err(StoreError::NotFound(id)),
        };
        debug!("removing event {id} ({name})");
        if self.tree.remove_by_start(&start).is_none() {
            warn!("event {id} resolved to start {start} but the delete found nothing");
            return Err(StoreError::Unexpected(format!(
                "event {id} vanished during removal"
            )));
        }
        Ok(Removed { id, name })
    }

    /// Look up a single event by its id token.
    pub fn search_event(&self, id: &str) -> Result<EventRecord, StoreError> {
        let id = parse_id(id)?;
        self.tree
            .get_by_id(id)
            .map(EventRecord::from)
            .ok_or(StoreError::NotFound(id))
    }

    /// Return all events starting in the given inclusive range, sorted
    /// ascending by start time.
    ///
    /// The tree hands results back in traversal order, so the store owns
    /// the ordering contract and sorts here. An empty result is reported as
    /// [`StoreError::EmptyRange`].
    pub fn search_by_range(&self, start: &str, end: &str) -> Result<RangeMatches, StoreError> {
        let from = parse_datetime(start)?;
        let to = parse_datetime(end)?;
        let mut events: Vec<EventRecord> = self
            .tree
            .range_search(&from, &to)
            .into_iter()
            .map(EventRecord::from)
            .collect();
        if events.is_empty() {
            return Err(StoreError::EmptyRange { from, to });
        }
        events.sort_by_key(|record| record.start);
        Ok(RangeMatches { from, to, events })
    }

    /// Return the number of stored events.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Return `true` if the store holds no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

fn parse_datetime(input: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| StoreError::InvalidDateFormat(input.to_owned()))
}

fn parse_id(token: &str) -> Result<u64, StoreError> {
    token
        .trim()
        .parse()
        .map_err(|_| StoreError::InvalidId(token.to_owned()))
}

//! `avl_event_map` is an index of time-interval events keyed on start time,
//! backed by an AVL tree.
//!
//! It fully implements AVL insertion and deletion, ensuring that each
//! modification operation requires at most O(logN) time complexity, and
//! supports point lookup by event id (O(N), the tree is not keyed on id)
//! and pruned range queries over start times.
//!
//! To safely and efficiently handle the subtree rewrites that rebalancing
//! performs, `avl_event_map` uses an array to simulate pointers for managing
//! the child references of the tree: nodes live in a growable vector and
//! refer to each other by stable integer handles, and every mutating call
//! returns the new subtree root up the recursion instead of keeping parent
//! pointers.
//!
//! On top of the tree, [`EventStore`] binds the key type to
//! `chrono::NaiveDateTime` and exposes the domain operations (add, remove,
//! search by id, search by range) with structured results and errors, the
//! [`report`] module renders those outcomes as user-facing text, and
//! [`batch::process`] drives a store from a line-oriented command reader.
//!
//! # Example
//!
//! ```rust
//! use avl_event_map::{Event, EventMap};
//!
//! let mut map = EventMap::new();
//! map.insert(Event::new(1, 10, 20, "standup"));
//! map.insert(Event::new(2, 5, 8, "prep"));
//! assert_eq!(map.get_by_id(2).map(|e| e.name.as_str()), Some("prep"));
//! let starts: Vec<i32> = map.iter().map(|e| e.start).collect();
//! assert_eq!(starts, vec![5, 10]);
//! ```

pub mod batch;
mod error;
mod event;
mod eventmap;
mod index;
mod iter;
mod node;
pub mod report;
mod store;

#[cfg(test)]
mod tests;

pub use error::StoreError;
pub use event::Event;
pub use eventmap::EventMap;
pub use iter::{Iter, RangeIter};
pub use store::{Added, EventRecord, EventStore, RangeMatches, Removed, DATE_FORMAT};

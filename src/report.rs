//! User-facing text for store outcomes.
//!
//! The store returns structured results and errors; this module is the only
//! place their wording lives, so the logic stays testable independent of the
//! messages. One function per store operation, since some errors read
//! differently depending on what was attempted.

use chrono::NaiveDateTime;

use crate::error::StoreError;
use crate::store::{Added, EventRecord, RangeMatches, Removed, DATE_FORMAT};

const SEPARATOR_WIDTH: usize = 90;

/// Format a timestamp in the store's `dd/mm/yyyy hh:mm:ss` format.
#[must_use]
pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(DATE_FORMAT).to_string()
}

/// Render the outcome of an add operation.
#[must_use]
pub fn add_outcome(result: &Result<Added, StoreError>) -> String {
    match result {
        Ok(added) => format!("ADDED: {} - {}", added.id, added.name),
        Err(err) => error_line(err),
    }
}

/// Render the outcome of a remove operation.
#[must_use]
pub fn remove_outcome(result: &Result<Removed, StoreError>) -> String {
    match result {
        Ok(removed) => format!("REMOVED: {} - {}", removed.id, removed.name),
        Err(StoreError::NotFound(_)) => "Event to be removed not found".to_owned(),
        Err(err) => error_line(err),
    }
}

/// Render the outcome of a search-by-id operation.
#[must_use]
pub fn search_outcome(result: &Result<EventRecord, StoreError>) -> String {
    match result {
        Ok(record) => {
            let separator = separator();
            format!(
                "SEARCHED: {}\n{separator}\n{}\n{separator}",
                record.id,
                record_line(record)
            )
        }
        Err(err) => error_line(err),
    }
}

/// Render the outcome of a range search, one line per matching event.
#[must_use]
pub fn range_outcome(result: &Result<RangeMatches, StoreError>) -> String {
    match result {
        Ok(matches) => {
            let separator = separator();
            let lines: Vec<String> = matches.events.iter().map(record_line).collect();
            format!(
                "SEARCHED: Events from {} to {}\n{separator}\n{}\n{separator}",
                format_datetime(&matches.from),
                format_datetime(&matches.to),
                lines.join("\n")
            )
        }
        Err(err) => error_line(err),
    }
}

fn record_line(record: &EventRecord) -> String {
    format!(
        "{} - {} - {} - {}",
        record.id,
        record.name,
        format_datetime(&record.start),
        format_datetime(&record.end)
    )
}

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

fn error_line(err: &StoreError) -> String {
    match err {
        StoreError::InvalidDateFormat(_) => {
            "Invalid date format. Please use dd/mm/yyyy hh:mm:ss.".to_owned()
        }
        StoreError::InvalidId(_) => "Invalid Event ID".to_owned(),
        StoreError::DuplicateId(id) => format!("Event ID {id} already exists."),
        StoreError::NotFound(id) => format!("No event found with event ID {id}"),
        StoreError::EmptyRange { from, to } => format!(
            "No event found from {} to {}",
            format_datetime(from),
            format_datetime(to)
        ),
        StoreError::Unexpected(msg) => format!("ERROR: {msg}"),
    }
}

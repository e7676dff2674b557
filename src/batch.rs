//! Line-oriented command processing.
//!
//! Each input line is `<command>: <param> - <param> - ...`; one rendered
//! result is written per line. The four commands mirror the store
//! operations. Anything unparseable renders as `INVALID COMMAND` and the
//! batch keeps going; no command can abort the loop.

use std::io::{self, BufRead, Write};

use log::warn;

use crate::error::StoreError;
use crate::report;
use crate::store::EventStore;

const INVALID_COMMAND: &str = "INVALID COMMAND";

/// Drive a store with commands read line by line from `input`, writing one
/// rendered outcome per command to `output`. Blank lines are skipped.
pub fn process<R, W>(store: &mut EventStore, input: R, output: &mut W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        writeln!(output, "{}", dispatch(store, line))?;
    }
    Ok(())
}

/// Parse and run a single command line.
fn dispatch(store: &mut EventStore, line: &str) -> String {
    let Some((command, params)) = line.split_once(": ") else {
        warn!("line without a command separator: {line:?}");
        return INVALID_COMMAND.to_owned();
    };
    let params: Vec<&str> = params.split(" - ").map(str::trim).collect();
    match (command.trim(), params.as_slice()) {
        ("Add Event", [id, start, end, name]) => match id.parse::<u64>() {
            Ok(id) => report::add_outcome(&store.add_event(id, start, end, name)),
            Err(_) => report::add_outcome(&Err(StoreError::InvalidId((*id).to_owned()))),
        },
        ("Remove Event", [id]) => report::remove_outcome(&store.remove_event(id)),
        ("Search Event by ID", [id]) => report::search_outcome(&store.search_event(id)),
        ("Search Event by Range", [start, end]) => {
            report::range_outcome(&store.search_by_range(start, end))
        }
        _ => {
            warn!("unrecognized command: {line:?}");
            INVALID_COMMAND.to_owned()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn run(input: &str) -> String {
        let mut store = EventStore::new();
        let mut output = Vec::new();
        process(&mut store, input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn command_file_round_trip() {
        let input = "\
Add Event: 1 - 01/01/2024 10:00:00 - 01/01/2024 11:00:00 - Standup
Add Event: 2 - 01/01/2024 09:00:00 - 01/01/2024 09:30:00 - Prep
Add Event: 1 - 01/01/2024 12:00:00 - 01/01/2024 13:00:00 - Clash
Remove Event: 99
Search Event by ID: 2

not a command
Remove Event: 2
";
        let separator = "-".repeat(90);
        let expected = format!(
            "ADDED: 1 - Standup\n\
             ADDED: 2 - Prep\n\
             Event ID 1 already exists.\n\
             Event to be removed not found\n\
             SEARCHED: 2\n{separator}\n2 - Prep - 01/01/2024 09:00:00 - 01/01/2024 09:30:00\n{separator}\n\
             INVALID COMMAND\n\
             REMOVED: 2 - Prep\n"
        );
        assert_eq!(run(input), expected);
    }

    #[test]
    fn range_command_reports_sorted_events() {
        let input = "\
Add Event: 1 - 01/01/2024 10:00:00 - 01/01/2024 11:00:00 - Standup
Add Event: 2 - 01/01/2024 09:00:00 - 01/01/2024 09:30:00 - Prep
Search Event by Range: 01/01/2024 08:00:00 - 01/01/2024 12:00:00
";
        let separator = "-".repeat(90);
        let expected = format!(
            "ADDED: 1 - Standup\n\
             ADDED: 2 - Prep\n\
             SEARCHED: Events from 01/01/2024 08:00:00 to 01/01/2024 12:00:00\n\
             {separator}\n\
             2 - Prep - 01/01/2024 09:00:00 - 01/01/2024 09:30:00\n\
             1 - Standup - 01/01/2024 10:00:00 - 01/01/2024 11:00:00\n\
             {separator}\n"
        );
        assert_eq!(run(input), expected);
    }

    #[test]
    fn malformed_parameter_counts_are_invalid() {
        let output = run("Add Event: 1 - 01/01/2024 10:00:00\nSearch Event by ID: 1 - 2\n");
        assert_eq!(output, "INVALID COMMAND\nINVALID COMMAND\n");
    }

    #[test]
    fn non_numeric_add_id_is_rejected() {
        let output = run(
            "Add Event: abc - 01/01/2024 10:00:00 - 01/01/2024 11:00:00 - Standup\n",
        );
        assert_eq!(output, "Invalid Event ID\n");
    }
}

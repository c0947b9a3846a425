//! Run filters against JSON records

use std::collections::HashSet;

use tracing::debug;

use super::{CliError, load_records};
use crate::{FilterSession, Record, Schema, explain, print};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Filters, applied additively in order
    pub filters: Vec<String>,
    /// JSON input string
    pub input: Option<String>,
    /// Stop after compiling, don't evaluate
    pub syntax_only: bool,
    /// Print null guards and earlier filters
    pub explain: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Every filter compiled
    SyntaxValid { filter: String },
    /// Records matching the combined filter, in input order. When only
    /// directories match, their children instead
    Matches { filter: String, records: Vec<Record> },
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let json = options.input.as_ref().ok_or(CliError::NoInput)?;
    let records = load_records(json)?;
    let schema = Schema::infer(&records);

    let mut session = FilterSession::new();
    for text in &options.filters {
        session.add(text, &schema)?;
    }

    let filter = match session.active() {
        Some(active) if options.explain => explain(active),
        Some(active) => print(active),
        None => String::new(),
    };

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid { filter });
    }

    let matched = session.select(&records);
    let records = contents_of_directories(matched, &records)
        .into_iter()
        .cloned()
        .collect();
    Ok(CheckResult::Matches { filter, records })
}

/// When every match is a directory (some record names it as parent), the
/// filter was on a directory-level property: list the directories' children
/// instead.
fn contents_of_directories<'a>(matched: Vec<&'a Record>, records: &'a [Record]) -> Vec<&'a Record> {
    let parents: HashSet<&str> = records.iter().filter_map(Record::parent).collect();
    if matched.is_empty() || !matched.iter().all(|record| parents.contains(record.id())) {
        return matched;
    }

    let directories: HashSet<&str> = matched.iter().map(|record| record.id()).collect();
    debug!(directories = directories.len(), "only directories matched, listing their contents");
    records
        .iter()
        .filter(|record| record.parent().is_some_and(|parent| directories.contains(parent)))
        .collect()
}

/// Lists record ids grouped under their parent, parents in order of first
/// appearance. Records without a parent come first.
pub fn render_matches(records: &[Record]) -> String {
    let mut groups: Vec<(Option<&str>, Vec<&str>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(parent, _)| *parent == record.parent()) {
            Some((_, ids)) => ids.push(record.id()),
            None => groups.push((record.parent(), vec![record.id()])),
        }
    }
    groups.sort_by_key(|(parent, _)| parent.is_some());

    let mut out = String::new();
    for (parent, ids) in groups {
        match parent {
            Some(parent) => {
                out.push_str(parent);
                out.push_str(":\n");
                for id in ids {
                    out.push_str("  ");
                    out.push_str(id);
                    out.push('\n');
                }
            }
            None => {
                for id in ids {
                    out.push_str(id);
                    out.push('\n');
                }
            }
        }
    }
    out
}

//! CLI support for fquery
//!
//! Loads records from JSON, infers their schema and runs filters over them.
//! Everything the `fq` binary does is available here for embedding.

mod check;
mod convert;
mod docs;
mod properties;

pub use check::{CheckOptions, CheckResult, execute_check, render_matches};
pub use convert::{json_to_records, json_to_value, load_records, record_to_json, value_to_json};
pub use docs::{DocTopic, get_doc_topic, get_docs_overview};
pub use properties::list_properties;

use std::io;

use thiserror::Error;

use crate::FilterError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    /// The JSON parsed but is not an array of objects
    #[error("Invalid records: {0}")]
    InvalidRecords(String),

    #[error("Unknown topic: '{0}'\nRun 'fq docs' to see available topics.")]
    UnknownTopic(String),
}

//! Human / JSON formatting of command results and errors.
//!
//! - **Human** (default): plain lines, errors prefixed with `(error)`
//! - **JSON** (`--json`): one compact object per line

use txjournal_catalog::OutputFormat;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    /// Entry rendering used by the catalog printer
    pub fn entry_format(self) -> OutputFormat {
        match self {
            OutputMode::Human => OutputFormat::Text,
            OutputMode::Json => OutputFormat::Json,
        }
    }
}

/// Format the header printed before a listing, if any.
pub fn format_listing_header(store: &str, mode: OutputMode) -> Option<String> {
    match mode {
        OutputMode::Human => Some(format!("Reading data from store {}:", store)),
        OutputMode::Json => None,
    }
}

/// Format the result of a prune.
pub fn format_deleted(count: usize, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("Deleted: {}", count),
        OutputMode::Json => serde_json::json!({ "deleted": count }).to_string(),
    }
}

/// Format an error with its whole cause chain.
pub fn format_error(err: &anyhow::Error, mode: OutputMode) -> String {
    let chain = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    match mode {
        OutputMode::Json => serde_json::json!({ "error": chain }).to_string(),
        OutputMode::Human => format!("(error) {}", chain),
    }
}
